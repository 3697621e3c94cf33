//! Big-Digit Clock Rendering
//!
//! Renders HH:MM:SS in a 5-row block font, centered for an 80-column
//! terminal, with the date and time source underneath. Pure formatting so
//! the clock demo just ticks and calls [`render`].

use core::fmt::Write;

use heapless::String;

use crate::system::clock::DateTime;

/// Block font, one glyph per digit
pub const DIGITS: [[&str; 5]; 10] = [
    [" ### ", "#   #", "#   #", "#   #", " ### "],
    ["  #  ", " ##  ", "  #  ", "  #  ", "#####"],
    [" ### ", "#   #", "  ## ", " #   ", "#####"],
    [" ### ", "#   #", "  ## ", "#   #", " ### "],
    ["#   #", "#   #", "#####", "    #", "    #"],
    ["#####", "#    ", "#### ", "    #", "#### "],
    [" ### ", "#    ", "#### ", "#   #", " ### "],
    ["#####", "    #", "   # ", "  #  ", " #   "],
    [" ### ", "#   #", " ### ", "#   #", " ### "],
    [" ### ", "#   #", " ####", "    #", " ### "],
];

/// Colon separator rows
pub const COLON: [&str; 5] = ["  ", " #", "  ", " #", "  "];

const TERMINAL_WIDTH: usize = 80;

/// Six 5-wide digits, two colons, seven separating spaces
const CLOCK_WIDTH: usize = 6 * 5 + 2 * 2 + 7;

const PADDING: usize = (TERMINAL_WIDTH - CLOCK_WIDTH) / 2;

/// Output buffer large enough for a full frame
pub type Frame = String<768>;

fn pad(out: &mut Frame) {
    for _ in 0..PADDING {
        let _ = out.push(' ');
    }
}

/// Renders one full frame, cursor homed, ready to write to the terminal.
pub fn render(time: &DateTime, synced: bool) -> Frame {
    let mut out: Frame = String::new();
    let _ = out.push_str("\x1b[H\r\n");

    pad(&mut out);
    let _ = out.push_str("Pico 2 W ASCII Clock\r\n\r\n");

    let digits = [
        (time.hour / 10) as usize,
        (time.hour % 10) as usize,
        (time.min / 10) as usize,
        (time.min % 10) as usize,
        (time.sec / 10) as usize,
        (time.sec % 10) as usize,
    ];

    for row in 0..5 {
        pad(&mut out);
        let _ = write!(
            out,
            "{} {} {} {} {} {} {} {}\r\n",
            DIGITS[digits[0]][row],
            DIGITS[digits[1]][row],
            COLON[row],
            DIGITS[digits[2]][row],
            DIGITS[digits[3]][row],
            COLON[row],
            DIGITS[digits[4]][row],
            DIGITS[digits[5]][row],
        );
    }

    let _ = out.push_str("\r\n");
    pad(&mut out);
    let _ = write!(
        out,
        "{:04}-{:02}-{:02}  ({})\r\n",
        time.year,
        time.month,
        time.day,
        time.weekday_name()
    );
    pad(&mut out);
    let _ = out.push_str(if synced {
        "Time source: NTP\r\n"
    } else {
        "Time source: MANUAL\r\n"
    });
    out
}
