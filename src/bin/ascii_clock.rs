//! ASCII clock demo
//!
//! Joins WiFi, syncs the wall clock over NTP and then redraws a big-digit
//! clock on the serial terminal once a second. Without a network (or when
//! the sync fails) it falls back to a fixed manual time so the display
//! still runs.

#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_rp::block::ImageDef;
use embassy_rp::config::Config;
use embassy_time::{Duration, Ticker};
use picow_playground::apps::bigclock;
use picow_playground::net::ntp;
use picow_playground::shell::console::Console;
use picow_playground::split_resources;
use picow_playground::system::net as wifi;
use picow_playground::system::orchestrator::orchestrate;
use picow_playground::system::resources::{
    AssignedResources, ConsoleResources, FlashResources, WatchdogResources, WifiResources,
};
use picow_playground::system::{clock, log};
use {defmt_rtt as _, panic_probe as _};

/// Firmware image type for bootloader
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

const WIFI_SSID: &str = match option_env!("WIFI_SSID") {
    Some(s) => s,
    None => "YOUR_SSID",
};
const WIFI_PASSWORD: &str = match option_env!("WIFI_PASSWORD") {
    Some(s) => s,
    None => "YOUR_PASS",
};

/// Fallback time when NTP is unreachable: 2026-02-01 10:48:00 UTC
const MANUAL_UNIX_TIME: i64 = 1_769_942_880;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Config::default());
    let r = split_resources!(p);

    let mut console = Console::new(r.console);
    spawner.spawn(orchestrate()).unwrap();

    let (stack, mut control) = wifi::start(r.wifi, spawner).await;

    let mut ntp_synced = false;
    match wifi::join(&mut control, stack, WIFI_SSID, WIFI_PASSWORD).await {
        Ok(_) => match ntp::sync_now(stack).await {
            Ok(()) => ntp_synced = true,
            Err(e) => log::record_fmt(format_args!("ntp failed: {:?}", e)),
        },
        Err(e) => log::record_fmt(format_args!("wifi failed: {:?}", e)),
    }

    if !ntp_synced {
        clock::set_unix_time(MANUAL_UNIX_TIME);
    }

    console.clear_screen().await;
    let mut ticker = Ticker::every(Duration::from_secs(1));
    loop {
        if let Some(time) = clock::now_local() {
            let frame = bigclock::render(&time, ntp_synced);
            console.write(&frame).await;
        }
        ticker.next().await;
    }
}
