//! System Log
//!
//! Small in-memory ring of timestamped messages, readable from the shell
//! with `viewlog`. Every entry is also mirrored to defmt so it shows up on
//! the debug probe.

use core::cell::RefCell;
use core::fmt::Write;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::Instant;
use heapless::String;

use crate::system::clock;

/// Maximum entries kept; oldest are overwritten
pub const LOG_CAPACITY: usize = 50;

/// One formatted log line
pub type LogLine = String<96>;

struct LogRing {
    entries: [Option<LogLine>; LOG_CAPACITY],
    /// Next write position
    head: usize,
    /// Total entries recorded, saturating at capacity
    len: usize,
}

const EMPTY: Option<LogLine> = None;

static LOG: Mutex<CriticalSectionRawMutex, RefCell<LogRing>> = Mutex::new(RefCell::new(LogRing {
    entries: [EMPTY; LOG_CAPACITY],
    head: 0,
    len: 0,
}));

/// Appends a message to the log, prefixed with the wall-clock time when the
/// clock is synced and the uptime otherwise.
pub fn record(message: &str) {
    let mut line: LogLine = String::new();
    match clock::now_local() {
        Some(t) => {
            let _ = write!(line, "[{:02}:{:02}:{:02}] ", t.hour, t.min, t.sec);
        }
        None => {
            let _ = write!(line, "[+{:05}s] ", Instant::now().as_secs());
        }
    }
    // Truncate quietly if the message does not fit
    let _ = line.push_str(message);

    defmt::info!("{}", line.as_str());

    LOG.lock(|l| {
        let mut l = l.borrow_mut();
        let head = l.head;
        l.entries[head] = Some(line);
        l.head = (head + 1) % LOG_CAPACITY;
        if l.len < LOG_CAPACITY {
            l.len += 1;
        }
    });
}

/// Formatted variant of [`record`].
pub fn record_fmt(args: core::fmt::Arguments<'_>) {
    let mut msg: String<96> = String::new();
    let _ = msg.write_fmt(args);
    record(&msg);
}

/// Number of entries currently held.
pub fn len() -> usize {
    LOG.lock(|l| l.borrow().len)
}

/// Returns entry `index`, where 0 is the oldest held entry.
pub fn get(index: usize) -> Option<LogLine> {
    LOG.lock(|l| {
        let l = l.borrow();
        if index >= l.len {
            return None;
        }
        let start = (l.head + LOG_CAPACITY - l.len) % LOG_CAPACITY;
        l.entries[(start + index) % LOG_CAPACITY].clone()
    })
}
