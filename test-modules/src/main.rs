//! On-target checks for the library's pure logic
//!
//! Flash this to a Pico 2 W and watch the defmt output: each group of
//! checks reports as it passes, ending with "all checks passed". No
//! network or flash access, so it runs on a bare board.

#![no_std]
#![no_main]

use defmt::{assert, assert_eq, info};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::{block::ImageDef, config::Config};
use embassy_time::Timer;
use panic_probe as _;

use picow_playground::apps::{ascii, bigclock, snake, tetris, todo};
use picow_playground::net::{httpd, ntp, scan};
use picow_playground::shell::command::{self, Command};
use picow_playground::shell::static_ram_used;
use picow_playground::system::clock::{days_in_month, is_leap_year, DateTime};
use picow_playground::system::log;

/// Firmware image type for bootloader
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let _p = embassy_rp::init(Config::default());

    info!("running checks");

    check_clock();
    check_log();
    check_ram();
    check_ntp();
    check_httpd();
    check_scan();
    check_command();
    check_tetris();
    check_snake();
    check_todo();
    check_render();

    info!("all checks passed");
    loop {
        Timer::after_secs(5).await;
        info!("idle");
    }
}

fn check_clock() {
    let epoch = DateTime::from_unix(0);
    assert_eq!(epoch.year, 1970);
    assert_eq!(epoch.month, 1);
    assert_eq!(epoch.day, 1);
    assert_eq!(epoch.weekday, 4); // Thursday
    assert_eq!(epoch.hour, 0);

    // 2026-02-01 10:48:00 UTC, a Sunday
    let t = DateTime::from_unix(1_769_942_880);
    assert_eq!(t.year, 2026);
    assert_eq!(t.month, 2);
    assert_eq!(t.day, 1);
    assert_eq!(t.weekday, 0);
    assert_eq!(t.hour, 10);
    assert_eq!(t.min, 48);
    assert_eq!(t.sec, 0);

    assert!(is_leap_year(2024));
    assert!(!is_leap_year(1900));
    assert!(is_leap_year(2000));
    assert_eq!(days_in_month(2024, 2), 29);
    assert_eq!(days_in_month(2026, 2), 28);

    // New year rollover
    let mut t = DateTime {
        year: 2026,
        month: 12,
        day: 31,
        weekday: 4,
        hour: 23,
        min: 59,
        sec: 59,
    };
    t.tick();
    assert_eq!(t.year, 2027);
    assert_eq!(t.month, 1);
    assert_eq!(t.day, 1);
    assert_eq!(t.weekday, 5);
    assert_eq!(t.hour, 0);
    assert_eq!(t.min, 0);
    assert_eq!(t.sec, 0);

    info!("clock ok");
}

fn check_log() {
    let before = log::len();
    // Same shape the http server records per request
    log::record_fmt(format_args!("http: served index.html ({} bytes)", 120));
    assert_eq!(log::len(), before + 1);

    let line = log::get(log::len() - 1).unwrap();
    assert!(line.contains("http: served index.html (120 bytes)"));
    // Uptime prefix until the clock is synced
    assert!(line.starts_with("[+"));

    info!("log ok");
}

fn check_ram() {
    let used = static_ram_used();
    // The executor arena alone is close to 100KB of .bss
    assert!(used > 0);
    assert!(used < 512 * 1024);

    info!("ram ok");
}

fn check_ntp() {
    let request = ntp::build_request();
    assert_eq!(request.len(), 48);
    assert_eq!(request[0], 0x1b);
    assert!(request[1..].iter().all(|&b| b == 0));

    assert!(ntp::parse_transmit_secs(&[0u8; 20]).is_none());
    assert!(ntp::parse_transmit_secs(&[0u8; 48]).is_none());

    let mut reply = [0u8; 48];
    reply[40..44].copy_from_slice(&0xE000_0000u32.to_be_bytes());
    assert_eq!(ntp::parse_transmit_secs(&reply), Some(0xE000_0000));

    info!("ntp ok");
}

fn check_httpd() {
    assert_eq!(
        httpd::parse_request_line("GET / HTTP/1.1"),
        httpd::Request::Get("/")
    );
    assert_eq!(
        httpd::parse_request_line("GET /style.css HTTP/1.1"),
        httpd::Request::Get("/style.css")
    );
    assert_eq!(
        httpd::parse_request_line("POST /form HTTP/1.1"),
        httpd::Request::BadMethod
    );
    assert_eq!(httpd::parse_request_line("nonsense"), httpd::Request::Malformed);
    assert_eq!(httpd::parse_request_line(""), httpd::Request::Malformed);

    assert_eq!(httpd::resolve_path("/"), "index.html");
    assert_eq!(httpd::resolve_path("/page.html"), "page.html");

    assert_eq!(httpd::mime_type("index.html"), "text/html");
    assert_eq!(httpd::mime_type("app.js"), "application/javascript");
    assert_eq!(httpd::mime_type("readme.txt"), "text/plain");
    assert_eq!(httpd::mime_type("blob"), "application/octet-stream");

    info!("httpd ok");
}

fn check_scan() {
    assert!(scan::parse_ipv4("192.168.1.10").is_some());
    assert!(scan::parse_ipv4("256.1.1.1").is_none());
    assert!(scan::parse_ipv4("1.2.3").is_none());
    assert!(scan::parse_ipv4("1.2.3.4.5").is_none());
    assert!(scan::parse_ipv4("a.b.c.d").is_none());

    let request = scan::parse_scan_command("SCAN 10.0.0.1 1-1024").unwrap();
    assert_eq!(request.start_port, 1);
    assert_eq!(request.end_port, 1024);

    assert_eq!(
        scan::parse_scan_command("PING 10.0.0.1 1-10"),
        Err(scan::ScanParseError::NotScan)
    );
    assert_eq!(
        scan::parse_scan_command("SCAN 10.0.0.1"),
        Err(scan::ScanParseError::MissingArgs)
    );
    assert_eq!(
        scan::parse_scan_command("SCAN 10.0.0.1 80-22"),
        Err(scan::ScanParseError::BadRange)
    );
    assert_eq!(
        scan::parse_scan_command("SCAN 10.0.0.1 0-22"),
        Err(scan::ScanParseError::BadRange)
    );
    assert_eq!(
        scan::parse_scan_command("SCAN not.an.ip.addr 1-10"),
        Err(scan::ScanParseError::BadAddress)
    );

    assert_eq!(scan::service_name(22), "ssh");
    assert_eq!(scan::service_name(4444), "unknown");

    info!("scan ok");
}

fn check_command() {
    assert_eq!(command::parse(""), None);
    assert_eq!(command::parse("   "), None);
    assert_eq!(command::parse("help"), Some(Command::Help));
    assert_eq!(command::parse("cat notes.txt"), Some(Command::Cat("notes.txt")));
    assert_eq!(command::parse("cat"), Some(Command::Usage("cat <file>")));
    assert_eq!(command::parse("nano notes.txt"), Some(Command::Nano("notes.txt")));
    // make creates immediately, it is not an editor alias
    assert_eq!(command::parse("make empty.txt"), Some(Command::Make("empty.txt")));
    assert_eq!(command::parse("make"), Some(Command::Usage("make <file>")));
    assert_eq!(command::parse("showram"), Some(Command::ShowRam));
    assert_eq!(command::parse("rm junk"), Some(Command::Delete("junk")));
    assert_eq!(command::parse("frobnicate"), Some(Command::Unknown("frobnicate")));

    info!("command ok");
}

fn check_tetris() {
    // The O piece never changes shape
    assert_eq!(tetris::cells(1, 0), tetris::cells(1, 3));
    // Everything else comes back after four rotations
    assert_eq!(tetris::cells(0, 0), tetris::cells(0, 4));

    let mut board = [[false; 10]; 20];
    assert!(!tetris::collides(&board, 2, 0, 5, 5));
    assert!(tetris::collides(&board, 2, 0, -1, 5)); // left wall
    assert!(tetris::collides(&board, 2, 0, 5, 19)); // floor

    board[19] = [true; 10];
    board[18][3] = true;
    assert_eq!(tetris::clear_lines(&mut board), 1);
    // The partial row drops into the cleared space
    assert!(board[19][3]);
    assert!(!board[18][3]);

    info!("tetris ok");
}

fn check_snake() {
    use snake::Direction;
    assert!(Direction::Up.opposes(Direction::Down));
    assert!(Direction::Left.opposes(Direction::Right));
    assert!(!Direction::Up.opposes(Direction::Left));
    assert!(!Direction::Up.opposes(Direction::Up));

    // A snake covering every cell ends the game instead of looping on
    // food placement
    assert!(snake::field_full(snake::MAX_LEN));
    assert!(!snake::field_full(snake::MAX_LEN - 1));

    info!("snake ok");
}

fn check_todo() {
    let mut list = todo::TodoList::default();
    assert!(list.add("buy milk").is_ok());
    assert!(list.add("water plants").is_ok());
    assert_eq!(list.add("one too many"), Err(todo::TodoError::Full));
    assert_eq!(list.add(""), Err(todo::TodoError::BadText));

    assert!(list.mark_done(0).is_ok());
    assert!(list.items[0].done);
    assert_eq!(list.mark_done(5), Err(todo::TodoError::BadIndex));

    // Removing the first slot shifts the second down
    assert!(list.remove(0).is_ok());
    assert_eq!(list.items.len(), 1);
    assert_eq!(list.items[0].text.as_str(), "water plants");

    info!("todo ok");
}

fn check_render() {
    let time = DateTime {
        year: 2026,
        month: 2,
        day: 1,
        weekday: 0,
        hour: 10,
        min: 48,
        sec: 0,
    };
    let frame = bigclock::render(&time, true);
    assert!(frame.contains("Time source: NTP"));
    assert!(frame.contains("2026-02-01"));
    let frame = bigclock::render(&time, false);
    assert!(frame.contains("Time source: MANUAL"));

    for row in ascii::glyph('A') {
        assert_eq!(row.len(), 5);
    }
    for row in ascii::glyph('7') {
        assert_eq!(row.len(), 5);
    }
    // Unknown characters render blank
    for row in ascii::glyph('%') {
        assert_eq!(row, "     ");
    }

    info!("render ok");
}
