//! MS-DOS date/time stamps as stored in ZIP headers.
//!
//! Time: `hhhhhmmmmmmsssss` (seconds in 2-second units).
//! Date: `yyyyyyymmmmddddd` (years since 1980).
//!
//! Conversions are done in UTC; times outside the DOS range (1980..=2107)
//! are clamped to its ends.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A DOS timestamp pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DosDateTime {
    /// Packed time field.
    pub time: u16,
    /// Packed date field.
    pub date: u16,
}

impl DosDateTime {
    /// 1980-01-01 00:00:00, the DOS epoch.
    pub const MIN: Self = Self {
        time: 0,
        date: (1 << 5) | 1,
    };

    /// 2107-12-31 23:59:58.
    pub const MAX: Self = Self {
        time: (23 << 11) | (59 << 5) | 29,
        date: (127 << 9) | (12 << 5) | 31,
    };

    /// Build from calendar fields. Out-of-range values are not checked.
    pub fn from_parts(year: u16, month: u16, day: u16, hour: u16, minute: u16, second: u16) -> Self {
        Self {
            time: (hour << 11) | (minute << 5) | (second / 2),
            date: (year.saturating_sub(1980) << 9) | (month << 5) | day,
        }
    }

    /// Convert a system time (UTC) to DOS format.
    pub fn from_system_time(time: SystemTime) -> Self {
        let secs = match time.duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_secs(),
            Err(_) => return Self::MIN,
        };

        let days = (secs / 86_400) as i64;
        let time_of_day = secs % 86_400;
        let (year, month, day) = civil_from_days(days);

        if year < 1980 {
            return Self::MIN;
        }
        if year > 2107 {
            return Self::MAX;
        }

        Self::from_parts(
            year as u16,
            month as u16,
            day as u16,
            (time_of_day / 3600) as u16,
            ((time_of_day % 3600) / 60) as u16,
            (time_of_day % 60) as u16,
        )
    }

    /// The current time in DOS format.
    pub fn now() -> Self {
        Self::from_system_time(SystemTime::now())
    }

    /// Year (1980..=2107).
    pub fn year(&self) -> u16 {
        ((self.date >> 9) & 0x7F) + 1980
    }

    /// Month (1..=12).
    pub fn month(&self) -> u16 {
        (self.date >> 5) & 0x0F
    }

    /// Day of month (1..=31).
    pub fn day(&self) -> u16 {
        self.date & 0x1F
    }

    /// Hour (0..=23).
    pub fn hour(&self) -> u16 {
        (self.time >> 11) & 0x1F
    }

    /// Minute (0..=59).
    pub fn minute(&self) -> u16 {
        (self.time >> 5) & 0x3F
    }

    /// Second, always even (0..=58).
    pub fn second(&self) -> u16 {
        (self.time & 0x1F) * 2
    }

    /// Convert back to a system time (UTC).
    ///
    /// Invalid month/day values (e.g. a zeroed date) are clamped to 1.
    pub fn to_system_time(&self) -> SystemTime {
        let days = days_from_civil(
            i64::from(self.year()),
            i64::from(self.month().clamp(1, 12)),
            i64::from(self.day().max(1)),
        );
        let secs = days * 86_400
            + i64::from(self.hour()) * 3600
            + i64::from(self.minute()) * 60
            + i64::from(self.second());
        UNIX_EPOCH + Duration::from_secs(secs.max(0) as u64)
    }
}

// Howard Hinnant's days <-> civil date algorithms (proleptic Gregorian).
fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = y.div_euclid(400);
    let yoe = y.rem_euclid(400);
    let mp = if month > 2 { month - 3 } else { month + 9 };
    let doy = (153 * mp + 2) / 5 + day - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}
