//! Blink demo
//!
//! Smallest possible check that the board and the radio are alive: the
//! onboard LED (wired through the CYW43439) blinks forever.

#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_rp::block::ImageDef;
use embassy_rp::config::Config;
use picow_playground::split_resources;
use picow_playground::system::net as wifi;
use picow_playground::system::resources::{
    AssignedResources, ConsoleResources, FlashResources, WatchdogResources, WifiResources,
};
use {defmt_rtt as _, panic_probe as _};

/// Firmware image type for bootloader
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Config::default());
    let r = split_resources!(p);

    let (_stack, mut control) = wifi::start(r.wifi, spawner).await;

    defmt::info!("blinking");
    loop {
        wifi::blink(&mut control, 1, 500, 500).await;
    }
}
