//! Wall Clock
//!
//! Keeps civil time without an RTC: an NTP sync (or a manual `set`) records
//! a unix timestamp together with the monotonic [`Instant`] at which it was
//! taken, and every later reading is that base plus the elapsed uptime. The
//! timezone offset is applied on read so a sync never shifts local state.

use core::cell::RefCell;

use defmt::Format;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::Instant;

/// Seconds between the NTP epoch (1900) and the unix epoch (1970)
pub const NTP_UNIX_DELTA: u32 = 2_208_988_800;

const DAYS_PER_MONTH: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

struct WallClock {
    /// Unix time at the moment of the last sync
    base_unix: Option<i64>,
    /// Uptime at the moment of the last sync
    base_instant: Option<Instant>,
    /// Offset from UTC in whole hours
    tz_offset_hours: i8,
}

static CLOCK: Mutex<CriticalSectionRawMutex, RefCell<WallClock>> =
    Mutex::new(RefCell::new(WallClock {
        base_unix: None,
        base_instant: None,
        tz_offset_hours: 0,
    }));

/// Anchors the clock at the given unix timestamp (UTC).
pub fn set_unix_time(unix: i64) {
    CLOCK.lock(|c| {
        let mut c = c.borrow_mut();
        c.base_unix = Some(unix);
        c.base_instant = Some(Instant::now());
    });
}

/// Sets the offset from UTC, in whole hours.
pub fn set_timezone(offset_hours: i8) {
    CLOCK.lock(|c| c.borrow_mut().tz_offset_hours = offset_hours);
}

/// Current offset from UTC, in whole hours.
pub fn timezone() -> i8 {
    CLOCK.lock(|c| c.borrow().tz_offset_hours)
}

/// Whether the clock has ever been set.
pub fn is_synced() -> bool {
    CLOCK.lock(|c| c.borrow().base_unix.is_some())
}

/// Current unix time (UTC), or `None` before the first sync.
pub fn now_unix() -> Option<i64> {
    CLOCK.lock(|c| {
        let c = c.borrow();
        let base = c.base_unix?;
        let since = c.base_instant?.elapsed().as_secs() as i64;
        Some(base + since)
    })
}

/// Current local civil time, or `None` before the first sync.
pub fn now_local() -> Option<DateTime> {
    CLOCK.lock(|c| {
        let c = c.borrow();
        let base = c.base_unix?;
        let since = c.base_instant?.elapsed().as_secs() as i64;
        Some(DateTime::from_unix(
            base + since + c.tz_offset_hours as i64 * 3600,
        ))
    })
}

/// Broken-down civil time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub struct DateTime {
    pub year: u16,
    /// 1 to 12
    pub month: u8,
    /// 1 to 31
    pub day: u8,
    /// 0 = Sunday
    pub weekday: u8,
    pub hour: u8,
    pub min: u8,
    pub sec: u8,
}

impl DateTime {
    /// Converts a unix timestamp into civil time. Timestamps before the
    /// epoch clamp to it.
    pub fn from_unix(unix: i64) -> Self {
        let unix = unix.max(0);
        let mut days = (unix / 86_400) as u32;
        let secs = (unix % 86_400) as u32;

        // 1970-01-01 was a Thursday
        let weekday = ((days + 4) % 7) as u8;

        let mut year: u16 = 1970;
        loop {
            let len = if is_leap_year(year) { 366 } else { 365 };
            if days < len {
                break;
            }
            days -= len;
            year += 1;
        }

        let mut month: u8 = 1;
        loop {
            let len = days_in_month(year, month) as u32;
            if days < len {
                break;
            }
            days -= len;
            month += 1;
        }

        Self {
            year,
            month,
            day: days as u8 + 1,
            weekday,
            hour: (secs / 3600) as u8,
            min: (secs / 60 % 60) as u8,
            sec: (secs % 60) as u8,
        }
    }

    /// Advances by one second, rolling over fields as needed. Used by the
    /// clock demo to tick locally between renders.
    pub fn tick(&mut self) {
        self.sec += 1;
        if self.sec < 60 {
            return;
        }
        self.sec = 0;
        self.min += 1;
        if self.min < 60 {
            return;
        }
        self.min = 0;
        self.hour += 1;
        if self.hour < 24 {
            return;
        }
        self.hour = 0;
        self.weekday = (self.weekday + 1) % 7;
        self.day += 1;
        if self.day <= days_in_month(self.year, self.month) {
            return;
        }
        self.day = 1;
        self.month += 1;
        if self.month <= 12 {
            return;
        }
        self.month = 1;
        self.year += 1;
    }

    /// Three-letter weekday name.
    pub fn weekday_name(&self) -> &'static str {
        ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"][self.weekday as usize % 7]
    }

    /// Three-letter month name.
    pub fn month_name(&self) -> &'static str {
        [
            "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
        ][(self.month as usize - 1) % 12]
    }
}

/// Gregorian leap year rule.
pub fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in the given month.
pub fn days_in_month(year: u16, month: u8) -> u8 {
    if month == 2 && is_leap_year(year) {
        29
    } else {
        DAYS_PER_MONTH[(month as usize - 1) % 12]
    }
}
