//! Command Shell
//!
//! The interactive loop behind the serial console: prompt, read a line,
//! dispatch. Commands either run inline (files, settings, info) or hand the
//! console to one of the apps until it exits.

pub mod command;
pub mod console;

use core::fmt::Write as FmtWrite;

use cyw43::Control;
use embassy_net::Stack;
use embassy_rp::watchdog::Watchdog;
use embassy_time::{Duration, Instant};
use heapless::{String, Vec};

use crate::apps;
use crate::net::{httpd, ntp, scan};
use crate::system::clock;
use crate::system::fs;
use crate::system::log;
use crate::system::net as wifi;
use crate::system::state::{WifiStatus, SYSTEM_STATE};
use crate::system::storage::{self, StorageKey, TimezoneOffset, WifiConfig};
use crate::{cprint, cprintln};

use command::{parse, Command, HELP_TEXT};
use console::{ansi, Console};

const LOGO: &[&str] = &[
    "   .~~.   .~~.  ",
    "  '. \\ ' ' / .' ",
    "   .~ .~~~..~.  ",
    "  : .~.'~'.~. : ",
    " ~ (   ) (   ) ~",
    "( : '~'.~.'~' : )",
    " ~ .~ (   ) ~. ~",
    "  (  : '~' :  ) ",
    "   '~ .~~~. ~'  ",
    "       '~'      ",
];

const SAMPLE_PAGE: &str = "<!DOCTYPE html>\n<html>\n<head><title>Pico 2 W</title></head>\n\
<body>\n<h1>Hello from the Pico 2 W</h1>\n\
<p>This page is served straight out of the on-chip flash.</p>\n\
</body>\n</html>\n";

/// Prints the boot banner.
pub async fn banner(console: &mut Console) {
    console.clear_screen().await;
    cprintln!(console, "{}{}pico-os{} on RP2350", ansi::BOLD, ansi::GREEN, ansi::RESET);
    cprintln!(console, "type 'help' for the command list");
    cprintln!(console);
}

/// Runs the shell forever.
pub async fn run(
    mut console: Console,
    mut control: Control<'static>,
    stack: Stack<'static>,
    mut watchdog: Watchdog,
) -> ! {
    loop {
        prompt(&mut console).await;
        let line: String<64> = console.read_line(false).await;
        let Some(cmd) = parse(&line) else {
            continue;
        };

        match cmd {
            Command::Help => help(&mut console).await,
            Command::Neofetch => neofetch(&mut console).await,
            Command::Sysinfo => sysinfo(&mut console).await,
            Command::Time => time(&mut console).await,
            Command::ViewLog => viewlog(&mut console).await,
            Command::Clear => console.clear_screen().await,
            Command::Reboot => {
                cprintln!(console, "rebooting...");
                watchdog.trigger_reset();
            }
            Command::Ls => ls(&mut console).await,
            Command::Cat(name) => cat(&mut console, name).await,
            Command::Nano(name) => nano(&mut console, name).await,
            Command::Make(name) => make(&mut console, name).await,
            Command::Delete(name) => delete(&mut console, name).await,
            Command::ShowSpace => showspace(&mut console).await,
            Command::ShowRam => showram(&mut console).await,
            Command::Wifi => wifi_join(&mut console, &mut control, stack).await,
            Command::Ipa => ipa(&mut console).await,
            Command::Nmap => nmap(&mut console, stack).await,
            Command::Timer => apps::timer::run(&mut console).await,
            Command::Todo => apps::todo::run_menu(&mut console).await,
            Command::Ascii => apps::ascii::run(&mut console).await,
            Command::Tetris => apps::tetris::run(&mut console).await,
            Command::Snake => apps::snake::run(&mut console).await,
            Command::Localhost => localhost(&mut console).await,
            Command::StopWeb => stopweb(&mut console).await,
            Command::CreateWeb => createweb(&mut console).await,
            Command::Settings => settings(&mut console).await,
            Command::Ps => ps(&mut console).await,
            Command::Usage(usage) => cprintln!(console, "usage: {}", usage),
            Command::Unknown(word) => cprintln!(console, "{}: command not found", word),
        }
    }
}

async fn prompt(console: &mut Console) {
    match clock::now_local() {
        Some(t) => {
            cprint!(
                console,
                "{}[{:02}:{:02}:{:02}]{} pico@os:~$ ",
                ansi::CYAN,
                t.hour,
                t.min,
                t.sec,
                ansi::RESET
            )
        }
        None => {
            cprint!(
                console,
                "{}[+{:05}s]{} pico@os:~$ ",
                ansi::CYAN,
                Instant::now().as_secs(),
                ansi::RESET
            )
        }
    }
}

async fn help(console: &mut Console) {
    cprintln!(console, "available commands:");
    for (name, blurb) in HELP_TEXT {
        cprintln!(console, "  {:<16} {}", name, blurb);
    }
}

async fn neofetch(console: &mut Console) {
    let state = SYSTEM_STATE.lock().await.clone();
    let uptime = Instant::now().as_secs();

    let mut fields: Vec<String<48>, 10> = Vec::new();
    let mut push = |s: String<48>| {
        let _ = fields.push(s);
    };
    let mut f: String<48> = String::new();
    let _ = write!(f, "host:    pico-os");
    push(f);
    let mut f: String<48> = String::new();
    let _ = write!(f, "chip:    RP2350, 2x Cortex-M33");
    push(f);
    let mut f: String<48> = String::new();
    let _ = write!(f, "memory:  512KB SRAM, 4MB flash");
    push(f);
    let mut f: String<48> = String::new();
    let _ = write!(f, "uptime:  {}h {}m {}s", uptime / 3600, uptime / 60 % 60, uptime % 60);
    push(f);
    let mut f: String<48> = String::new();
    match state.wifi {
        WifiStatus::Up => {
            let _ = write!(f, "wifi:    {}", state.ssid);
        }
        _ => {
            let _ = write!(f, "wifi:    down");
        }
    }
    push(f);
    let mut f: String<48> = String::new();
    match state.ip {
        Some(ip) => {
            let _ = write!(f, "ip:      {}", ip);
        }
        None => {
            let _ = write!(f, "ip:      none");
        }
    }
    push(f);

    for (i, row) in LOGO.iter().enumerate() {
        match fields.get(i) {
            Some(field) => {
                cprintln!(console, "{}{}{}   {}", ansi::RED, row, ansi::RESET, field)
            }
            None => cprintln!(console, "{}{}{}", ansi::RED, row, ansi::RESET),
        }
    }
}

async fn sysinfo(console: &mut Console) {
    let state = SYSTEM_STATE.lock().await.clone();
    cprintln!(console, "chip:       RP2350 (2x Cortex-M33 @ 150MHz)");
    cprintln!(console, "memory:     512KB SRAM");
    cprintln!(console, "flash:      4MB, {}KB reserved for storage", storage::STORAGE_SIZE / 1024);
    cprintln!(console, "uptime:     {}s", Instant::now().as_secs());
    cprintln!(console, "wifi:       {:?}", state.wifi);
    cprintln!(console, "clock:      {}", if state.time_synced { "synced" } else { "not synced" });
    cprintln!(
        console,
        "httpd:      {} ({} requests)",
        if state.httpd_running { "running" } else { "stopped" },
        state.requests_served
    );
}

async fn time(console: &mut Console) {
    match clock::now_local() {
        Some(t) => {
            cprintln!(
                console,
                "{} {} {:2} {:02}:{:02}:{:02} {}",
                t.weekday_name(),
                t.month_name(),
                t.day,
                t.hour,
                t.min,
                t.sec,
                t.year
            )
        }
        None => cprintln!(console, "clock not synced; join wifi or use 'setting'"),
    }
}

async fn viewlog(console: &mut Console) {
    let count = log::len();
    if count == 0 {
        cprintln!(console, "log is empty");
        return;
    }
    for i in 0..count {
        if let Some(line) = log::get(i) {
            cprintln!(console, "{}", line);
        }
    }
}

async fn ls(console: &mut Console) {
    match fs::list().await {
        Ok(files) if files.is_empty() => cprintln!(console, "no files"),
        Ok(files) => {
            for (name, size) in &files {
                cprintln!(console, "{:<24} {:>5} bytes", name, size);
            }
        }
        Err(e) => cprintln!(console, "ls failed: {:?}", e),
    }
}

async fn cat(console: &mut Console, name: &str) {
    match fs::read(name).await {
        Ok(record) => match core::str::from_utf8(&record.data) {
            Ok(text) => {
                for line in text.lines() {
                    cprintln!(console, "{}", line);
                }
            }
            Err(_) => cprintln!(console, "{}: not a text file", name),
        },
        Err(fs::FsError::NotFound) => cprintln!(console, "{}: no such file", name),
        Err(e) => cprintln!(console, "cat failed: {:?}", e),
    }
}

async fn nano(console: &mut Console, name: &str) {
    cprintln!(console, "editing {}; finish with a single '.' on its own line", name);
    let mut data: Vec<u8, { fs::FILE_MAX }> = Vec::new();
    loop {
        let line: String<128> = console.read_line(false).await;
        if line == "." {
            break;
        }
        if data.extend_from_slice(line.as_bytes()).is_err()
            || data.push(b'\n').is_err()
        {
            cprintln!(console, "file full, truncating");
            break;
        }
    }
    match fs::write(name, &data).await {
        Ok(()) => cprintln!(console, "wrote {} ({} bytes)", name, data.len()),
        Err(fs::FsError::Full) => cprintln!(console, "all {} file slots taken", fs::SLOT_COUNT),
        Err(e) => cprintln!(console, "write failed: {:?}", e),
    }
}

async fn make(console: &mut Console, name: &str) {
    match fs::write(name, b"").await {
        Ok(()) => cprintln!(console, "created {}", name),
        Err(fs::FsError::Full) => cprintln!(console, "all {} file slots taken", fs::SLOT_COUNT),
        Err(e) => cprintln!(console, "make failed: {:?}", e),
    }
}

async fn delete(console: &mut Console, name: &str) {
    match fs::remove(name).await {
        Ok(()) => cprintln!(console, "deleted {}", name),
        Err(fs::FsError::NotFound) => cprintln!(console, "{}: no such file", name),
        Err(e) => cprintln!(console, "delete failed: {:?}", e),
    }
}

/// Total SRAM on the RP2350
const RAM_SIZE: usize = 512 * 1024;

/// Bytes of RAM taken by the firmware's statics (.data + .bss). The
/// section bounds come from the cortex-m-rt linker script.
pub fn static_ram_used() -> usize {
    extern "C" {
        static __sdata: u8;
        static __edata: u8;
        static __sbss: u8;
        static __ebss: u8;
    }
    unsafe {
        let data = core::ptr::addr_of!(__edata) as usize - core::ptr::addr_of!(__sdata) as usize;
        let bss = core::ptr::addr_of!(__ebss) as usize - core::ptr::addr_of!(__sbss) as usize;
        data + bss
    }
}

async fn showram(console: &mut Console) {
    let used = static_ram_used();
    cprintln!(console, "{} bytes static (.data + .bss)", used);
    cprintln!(
        console,
        "{} of {} KB left for stack and task arena",
        (RAM_SIZE - used) / 1024,
        RAM_SIZE / 1024
    );
}

async fn showspace(console: &mut Console) {
    match fs::usage().await {
        Ok((bytes, slots)) => {
            cprintln!(console, "{} of {} file slots used", slots, fs::SLOT_COUNT);
            cprintln!(
                console,
                "{} bytes in files, {} bytes reserved",
                bytes,
                storage::STORAGE_SIZE
            );
        }
        Err(e) => cprintln!(console, "showspace failed: {:?}", e),
    }
}

async fn wifi_join(console: &mut Console, control: &mut Control<'static>, stack: Stack<'static>) {
    cprint!(console, "ssid: ");
    let ssid: String<32> = console.read_line(false).await;
    if ssid.is_empty() {
        cprintln!(console, "cancelled");
        return;
    }
    cprint!(console, "password: ");
    let password: String<64> = console.read_line(true).await;

    cprintln!(console, "joining {}...", ssid);
    match wifi::join(control, stack, &ssid, &password).await {
        Ok(ip) => {
            cprintln!(console, "{}connected{}, ip {}", ansi::GREEN, ansi::RESET, ip);
            let config = WifiConfig {
                ssid,
                password,
            };
            if storage::store(StorageKey::WifiConfig, &config).await.is_err() {
                cprintln!(console, "warning: could not persist credentials");
            }
            ntp::NTP_KICK.signal(());
        }
        Err(e) => cprintln!(console, "{}join failed{}: {:?}", ansi::RED, ansi::RESET, e),
    }
}

async fn ipa(console: &mut Console) {
    let state = SYSTEM_STATE.lock().await.clone();
    match (state.wifi, state.ip) {
        (WifiStatus::Up, Some(ip)) => {
            cprintln!(console, "ssid: {}", state.ssid);
            cprintln!(console, "ip:   {}", ip);
        }
        (WifiStatus::Joining, _) => cprintln!(console, "wifi: joining..."),
        _ => cprintln!(console, "wifi is down; use 'wifi' to join"),
    }
}

async fn nmap(console: &mut Console, stack: Stack<'static>) {
    if SYSTEM_STATE.lock().await.wifi != WifiStatus::Up {
        cprintln!(console, "wifi is down; use 'wifi' first");
        return;
    }
    cprint!(console, "target ip: ");
    let target_line: String<32> = console.read_line(false).await;
    let Some(target) = scan::parse_ipv4(&target_line) else {
        cprintln!(console, "not an ipv4 address");
        return;
    };
    cprint!(console, "scan [1] common ports or [2] a range? ");
    let choice: String<8> = console.read_line(false).await;

    let started = Instant::now();
    let mut open = 0u16;

    match choice.as_str() {
        "2" => {
            cprint!(console, "range (e.g. 1-1024): ");
            let range_line: String<16> = console.read_line(false).await;
            let mut line: String<64> = String::new();
            let _ = write!(line, "SCAN {} {}", target_line.trim(), range_line.trim());
            let request = match scan::parse_scan_command(&line) {
                Ok(r) => r,
                Err(e) => {
                    cprintln!(console, "bad range: {:?}", e);
                    return;
                }
            };
            cprintln!(
                console,
                "scanning {} ports {}-{}...",
                target_line.trim(),
                request.start_port,
                request.end_port
            );
            for port in request.start_port..=request.end_port {
                if scan::probe(stack, target, port, Duration::from_millis(500)).await {
                    open += 1;
                    cprintln!(console, "  {:>5}/tcp open  {}", port, scan::service_name(port));
                }
            }
        }
        _ => {
            cprintln!(console, "scanning {} common ports...", target_line.trim());
            for (port, name) in scan::COMMON_PORTS {
                if scan::probe(stack, target, port, Duration::from_millis(500)).await {
                    open += 1;
                    cprintln!(console, "  {:>5}/tcp open  {}", port, name);
                }
            }
        }
    }

    cprintln!(
        console,
        "done: {} open, {}s elapsed",
        open,
        started.elapsed().as_secs()
    );
}

async fn localhost(console: &mut Console) {
    if SYSTEM_STATE.lock().await.wifi != WifiStatus::Up {
        cprintln!(console, "wifi is down; use 'wifi' first");
        return;
    }
    if fs::read("index.html").await.is_err() {
        cprintln!(console, "no index.html yet; run 'createweb' or 'nano index.html'");
    }
    httpd::enable();
    let ip = SYSTEM_STATE.lock().await.ip;
    match ip {
        Some(ip) => cprintln!(console, "web server starting at http://{}/", ip),
        None => cprintln!(console, "web server starting"),
    }
}

async fn stopweb(console: &mut Console) {
    if httpd::is_enabled() {
        httpd::disable();
        cprintln!(console, "web server stopping");
    } else {
        cprintln!(console, "web server is not running");
    }
}

async fn createweb(console: &mut Console) {
    match fs::write("index.html", SAMPLE_PAGE.as_bytes()).await {
        Ok(()) => cprintln!(console, "index.html installed; run 'localhost' to serve it"),
        Err(e) => cprintln!(console, "createweb failed: {:?}", e),
    }
}

async fn settings(console: &mut Console) {
    loop {
        cprintln!(console, "settings:");
        cprintln!(console, "  1  sync clock now");
        cprintln!(console, "  2  set timezone (currently UTC{:+})", clock::timezone());
        cprintln!(console, "  3  forget wifi credentials");
        cprintln!(console, "  4  format flash store");
        cprintln!(console, "  0  back");
        cprint!(console, "> ");
        let choice: String<8> = console.read_line(false).await;

        match choice.as_str() {
            "1" => {
                ntp::NTP_KICK.signal(());
                cprintln!(console, "sync requested");
            }
            "2" => {
                cprint!(console, "offset from UTC in hours (-12 to 14): ");
                let line: String<8> = console.read_line(false).await;
                match line.trim().parse::<i8>() {
                    Ok(offset) if (-12..=14).contains(&offset) => {
                        clock::set_timezone(offset);
                        let _ = storage::store(StorageKey::Timezone, &TimezoneOffset(offset)).await;
                        cprintln!(console, "timezone set to UTC{:+}", offset);
                    }
                    _ => cprintln!(console, "not a valid offset"),
                }
            }
            "3" => match storage::remove(StorageKey::WifiConfig).await {
                Ok(()) => cprintln!(console, "credentials forgotten"),
                Err(e) => cprintln!(console, "failed: {:?}", e),
            },
            "4" => {
                cprint!(console, "this erases every file and setting; type yes to confirm: ");
                let confirm: String<8> = console.read_line(false).await;
                if confirm == "yes" {
                    match storage::erase_all().await {
                        Ok(()) => cprintln!(console, "flash store formatted"),
                        Err(e) => cprintln!(console, "format failed: {:?}", e),
                    }
                } else {
                    cprintln!(console, "cancelled");
                }
            }
            "0" | "" => return,
            other => cprintln!(console, "{}: not an option", other),
        }
    }
}

async fn ps(console: &mut Console) {
    let state = SYSTEM_STATE.lock().await.clone();
    if state.services.is_empty() {
        cprintln!(console, "no background services registered");
        return;
    }
    cprintln!(console, "{:<12} uptime", "service");
    for service in &state.services {
        let secs = service.started.elapsed().as_secs();
        cprintln!(console, "{:<12} {}h {}m {}s", service.name, secs / 3600, secs / 60 % 60, secs % 60);
    }
}
