//! Shell OS
//!
//! The full demo: boots the storage, clock and network subsystems, spawns
//! the background services and drops into the command shell on the serial
//! terminal. WiFi credentials saved by the `wifi` command are rejoined
//! automatically on boot.

#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_rp::block::ImageDef;
use embassy_rp::config::Config;
use embassy_rp::watchdog::Watchdog;
use picow_playground::net::{httpd, ntp};
use picow_playground::shell::{self, console::Console};
use picow_playground::split_resources;
use picow_playground::system::net as wifi;
use picow_playground::system::orchestrator::orchestrate;
use picow_playground::system::resources::{
    AssignedResources, ConsoleResources, FlashResources, WatchdogResources, WifiResources,
};
use picow_playground::system::storage::{self, StorageKey, TimezoneOffset, WifiConfig};
use picow_playground::system::{clock, log};
use picow_playground::cprintln;
use {defmt_rtt as _, panic_probe as _};

/// Firmware image type for bootloader
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Config::default());
    let r = split_resources!(p);

    let mut console = Console::new(r.console);
    shell::banner(&mut console).await;

    spawner.spawn(orchestrate()).unwrap();

    cprintln!(console, "[boot] flash store");
    storage::init(r.flash).await;
    log::record("boot");

    if let Ok(Some(TimezoneOffset(offset))) =
        storage::fetch::<TimezoneOffset>(StorageKey::Timezone).await
    {
        clock::set_timezone(offset);
    }

    cprintln!(console, "[boot] wifi radio");
    let (stack, mut control) = wifi::start(r.wifi, spawner).await;

    match storage::fetch::<WifiConfig>(StorageKey::WifiConfig).await {
        Ok(Some(config)) => {
            cprintln!(console, "[boot] rejoining {}", config.ssid);
            match wifi::join(&mut control, stack, &config.ssid, &config.password).await {
                Ok(ip) => cprintln!(console, "[boot] connected, ip {}", ip),
                Err(e) => cprintln!(console, "[boot] rejoin failed: {:?}", e),
            }
        }
        _ => cprintln!(console, "[boot] no saved network; use 'wifi' to join"),
    }

    spawner.spawn(ntp::sync_task(stack)).unwrap();
    spawner.spawn(httpd::serve(stack)).unwrap();

    cprintln!(console, "[boot] ready");
    cprintln!(console);

    let watchdog = Watchdog::new(r.watchdog.watchdog);
    shell::run(console, control, stack, watchdog).await
}
