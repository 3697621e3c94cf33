//! Todo list demo
//!
//! The two-slot todo list on its own: serial menu, tasks persisted in
//! flash so they survive a power cycle. No WiFi needed.

#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_rp::block::ImageDef;
use embassy_rp::config::Config;
use picow_playground::apps::todo;
use picow_playground::shell::console::{ansi, Console};
use picow_playground::split_resources;
use picow_playground::system::resources::{
    AssignedResources, ConsoleResources, FlashResources, WatchdogResources, WifiResources,
};
use picow_playground::system::storage;
use picow_playground::{cprint, cprintln};
use {defmt_rtt as _, panic_probe as _};

/// Firmware image type for bootloader
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_rp::init(Config::default());
    let r = split_resources!(p);

    storage::init(r.flash).await;

    let mut console = Console::new(r.console);
    console.clear_screen().await;
    cprintln!(console, "{}Pico 2 W todo list{}", ansi::BOLD, ansi::RESET);
    cprintln!(console, "{} tasks of {} chars, kept in flash", todo::SLOT_COUNT, todo::TASK_MAX);

    loop {
        todo::run_menu(&mut console).await;
        cprint!(console, "press any key to reopen");
        console.read_key().await;
        cprintln!(console);
    }
}
