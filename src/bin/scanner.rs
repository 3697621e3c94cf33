//! Port scanner demo
//!
//! Joins WiFi and listens on TCP port 9999 for scan commands. Connect with
//! netcat and send `SCAN <ip> <start>-<end>`; open ports stream back as
//! they are found, with a progress line every 100 ports.

#![no_std]
#![no_main]

use core::fmt::Write as FmtWrite;

use defmt::{info, warn};
use embassy_executor::Spawner;
use embassy_net::tcp::TcpSocket;
use embassy_net::Stack;
use embassy_rp::block::ImageDef;
use embassy_rp::config::Config;
use embassy_time::{Duration, Instant};
use embedded_io_async::Write;
use heapless::String;
use picow_playground::net::scan;
use picow_playground::split_resources;
use picow_playground::system::net as wifi;
use picow_playground::system::orchestrator::orchestrate;
use picow_playground::system::resources::{
    AssignedResources, ConsoleResources, FlashResources, WatchdogResources, WifiResources,
};
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

/// Command server port
const LISTEN_PORT: u16 = 9999;

/// Per-port connect timeout
const PROBE_TIMEOUT: Duration = Duration::from_millis(500);

const BANNER: &str = "Pico 2 W port scanner\r\n\
usage: SCAN <ip> <start>-<end>\r\n\r\n";

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Config::default());
    let r = split_resources!(p);

    spawner.spawn(orchestrate()).unwrap();
    let (stack, mut control) = wifi::start(r.wifi, spawner).await;

    match wifi::join(&mut control, stack, WIFI_SSID, WIFI_PASSWORD).await {
        Ok(ip) => info!("scan server at {}:{}", ip, LISTEN_PORT),
        Err(e) => {
            warn!("wifi failed: {:?}, nothing to do", e);
            return;
        }
    }

    let mut rx_buffer = [0; 512];
    let mut tx_buffer = [0; 1024];
    loop {
        let mut socket = TcpSocket::new(stack, &mut rx_buffer, &mut tx_buffer);
        socket.set_timeout(Some(Duration::from_secs(300)));

        if let Err(e) = socket.accept(LISTEN_PORT).await {
            warn!("accept failed: {:?}", e);
            continue;
        }
        info!("client connected");

        let _ = socket.write_all(BANNER.as_bytes()).await;
        serve_client(&mut socket, stack).await;
        socket.close();
    }
}

async fn serve_client(socket: &mut TcpSocket<'_>, stack: Stack<'static>) {
    let mut line_buf = [0u8; 128];
    let mut len = 0;

    loop {
        let mut byte = [0u8; 1];
        match socket.read(&mut byte).await {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }
        if byte[0] != b'\n' {
            if len < line_buf.len() {
                line_buf[len] = byte[0];
                len += 1;
            }
            continue;
        }

        let line = core::str::from_utf8(&line_buf[..len])
            .unwrap_or("")
            .trim_end_matches('\r');
        let parsed = scan::parse_scan_command(line);
        len = 0;

        match parsed {
            Ok(request) => run_scan(socket, stack, request).await,
            Err(e) => {
                let mut reply: String<96> = String::new();
                let _ = write!(reply, "error: {:?}\r\nusage: SCAN <ip> <start>-<end>\r\n", e);
                if socket.write_all(reply.as_bytes()).await.is_err() {
                    return;
                }
            }
        }
    }
}

async fn run_scan(socket: &mut TcpSocket<'_>, stack: Stack<'static>, request: scan::ScanRequest) {
    let mut reply: String<128> = String::new();
    let _ = write!(
        reply,
        "scanning {} ports {}-{}\r\n",
        request.target, request.start_port, request.end_port
    );
    if socket.write_all(reply.as_bytes()).await.is_err() {
        return;
    }

    let started = Instant::now();
    let total = request.end_port - request.start_port + 1;
    let mut open = 0u16;

    for (done, port) in (request.start_port..=request.end_port).enumerate() {
        if scan::probe(stack, request.target, port, PROBE_TIMEOUT).await {
            open += 1;
            let mut line: String<64> = String::new();
            let _ = write!(line, "{:>5}/tcp open  {}\r\n", port, scan::service_name(port));
            if socket.write_all(line.as_bytes()).await.is_err() {
                return;
            }
        }
        let done = done as u16 + 1;
        if done % 100 == 0 && done != total {
            let mut line: String<48> = String::new();
            let _ = write!(line, "... {}/{} ports\r\n", done, total);
            if socket.write_all(line.as_bytes()).await.is_err() {
                return;
            }
        }
    }

    let mut summary: String<96> = String::new();
    let _ = write!(
        summary,
        "done: {} of {} ports open, {}s elapsed\r\n",
        open,
        total,
        started.elapsed().as_secs()
    );
    let _ = socket.write_all(summary.as_bytes()).await;
}
