//! Web server demo
//!
//! Joins WiFi, installs a sample page in the flash store if none exists and
//! serves it on port 80. Progress is reported on the serial terminal.

#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_rp::block::ImageDef;
use embassy_rp::config::Config;
use embassy_time::{Duration, Timer};
use picow_playground::net::httpd;
use picow_playground::shell::console::Console;
use picow_playground::split_resources;
use picow_playground::system::net as wifi;
use picow_playground::system::orchestrator::orchestrate;
use picow_playground::system::resources::{
    AssignedResources, ConsoleResources, FlashResources, WatchdogResources, WifiResources,
};
use picow_playground::system::state::SYSTEM_STATE;
use picow_playground::system::{fs, storage};
use picow_playground::{cprint, cprintln};
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

const PAGE: &str = "<!DOCTYPE html>\n<html>\n<head><title>Pico 2 W</title></head>\n\
<body>\n<h1>Hello from the Pico 2 W</h1>\n\
<p>Served by an RP2350 out of its own flash.</p>\n\
</body>\n</html>\n";

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Config::default());
    let r = split_resources!(p);

    let mut console = Console::new(r.console);
    spawner.spawn(orchestrate()).unwrap();

    storage::init(r.flash).await;
    if fs::read("index.html").await.is_err() {
        match fs::write("index.html", PAGE.as_bytes()).await {
            Ok(()) => cprintln!(console, "sample page installed"),
            Err(e) => cprintln!(console, "could not install page: {:?}", e),
        }
    }

    let (stack, mut control) = wifi::start(r.wifi, spawner).await;
    cprint!(console, "joining {}... ", WIFI_SSID);
    match wifi::join(&mut control, stack, WIFI_SSID, WIFI_PASSWORD).await {
        Ok(ip) => cprintln!(console, "ok, http://{}/", ip),
        Err(e) => {
            cprintln!(console, "failed: {:?}", e);
            cprintln!(console, "check the WIFI_SSID / WIFI_PASSWORD build settings");
            return;
        }
    }

    spawner.spawn(httpd::serve(stack)).unwrap();
    httpd::enable();

    // Report request counts while the server task does the work
    let mut reported = 0;
    loop {
        Timer::after(Duration::from_secs(10)).await;
        let served = SYSTEM_STATE.lock().await.requests_served;
        if served != reported {
            cprintln!(console, "{} requests served", served);
            reported = served;
        }
    }
}
