//! Wall-clock time: calendar conversions and the software clock the face reads.
//!
//! The software clock is a Unix-second base plus the monotonic millisecond counter, so
//! it keeps ticking between RTC reads and can be edited from settings mode.

use log::info;

/// Calendar time, valid from 1970 through 2105.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DateTime {
    pub year: u16,    // full year, e.g., 2024
    pub month: u8,    // 1-12
    pub day: u8,      // 1-31
    pub hour: u8,     // 0-23
    pub minute: u8,   // 0-59
    pub second: u8,   // 0-59
    pub weekday: u8,  // 0 = Monday .. 6 = Sunday
}

/// A settable calendar field.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimeField {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

// Days since 1970-01-01 (civil-from-days inverse). Linear in `day`, so out-of-range
// days simply roll into neighbouring months.
fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    let (y, m) = if month <= 2 { (year - 1, month + 12) } else { (year, month) };
    let era = y.div_euclid(400);
    let yoe = y - era * 400; // year of era
    let doy = (153 * (m - 3) + 2) / 5 + day - 1; // days since March 1
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy; // days since era
    era * 146_097 + doe - 719_468 // 719468 = days from 0000-03-01 to 1970-01-01
}

impl DateTime {
    /// Build a date, filling in the weekday. Fields are normalised like `mktime`.
    pub fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self::from_unix(unix_from_fields(
            year as i64,
            month as i64,
            day as i64,
            hour as i64,
            minute as i64,
            second as i64,
        ))
    }

    /// Seconds since 1970-01-01 00:00:00.
    pub fn to_unix(&self) -> u32 {
        unix_from_fields(
            self.year as i64,
            self.month as i64,
            self.day as i64,
            self.hour as i64,
            self.minute as i64,
            self.second as i64,
        )
    }

    pub fn from_unix(ts: u32) -> Self {
        let days = ts / 86_400;
        let mut rem = ts % 86_400;
        let hour = (rem / 3600) as u8;
        rem %= 3600;
        let minute = (rem / 60) as u8;
        let second = (rem % 60) as u8;

        let z = days as i64 + 719_468;
        let era = z.div_euclid(146_097); // 146097 = days in 400 years
        let doe = z - era * 146_097;
        let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
        let y = yoe + era * 400;
        let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
        let mp = (5 * doy + 2) / 153; // March = 0
        let day = doy - (153 * mp + 2) / 5 + 1;
        let month = if mp < 10 { mp + 3 } else { mp - 9 };
        let year = if month <= 2 { y + 1 } else { y };

        Self {
            year: year as u16,
            month: month as u8,
            day: day as u8,
            hour,
            minute,
            second,
            // 1970-01-01 was a Thursday
            weekday: ((days + 3) % 7) as u8,
        }
    }

    /// Add signed offsets to each field and normalise, e.g. Jan 31 + 1 month = Mar 3
    /// (Mar 2 in leap years). Results before 1970 clamp to the epoch.
    pub fn shifted(&self, years: i32, months: i32, days: i32, hours: i32, minutes: i32, seconds: i32) -> Self {
        Self::from_unix(unix_from_fields(
            self.year as i64 + years as i64,
            self.month as i64 + months as i64,
            self.day as i64 + days as i64,
            self.hour as i64 + hours as i64,
            self.minute as i64 + minutes as i64,
            self.second as i64 + seconds as i64,
        ))
    }

    /// Shift a single field by `delta`.
    pub fn adjusted(&self, field: TimeField, delta: i32) -> Self {
        match field {
            TimeField::Year => self.shifted(delta, 0, 0, 0, 0, 0),
            TimeField::Month => self.shifted(0, delta, 0, 0, 0, 0),
            TimeField::Day => self.shifted(0, 0, delta, 0, 0, 0),
            TimeField::Hour => self.shifted(0, 0, 0, delta, 0, 0),
            TimeField::Minute => self.shifted(0, 0, 0, 0, delta, 0),
            TimeField::Second => self.shifted(0, 0, 0, 0, 0, delta),
        }
    }
}

fn unix_from_fields(year: i64, month: i64, day: i64, hour: i64, minute: i64, second: i64) -> u32 {
    // Month first so the day count sees a real month.
    let month0 = month - 1;
    let year = year + month0.div_euclid(12);
    let month = month0.rem_euclid(12) + 1;
    let days = days_from_civil(year, month, 1) + (day - 1);
    let secs = days * 86_400 + hour * 3600 + minute * 60 + second;
    secs.clamp(0, u32::MAX as i64) as u32
}

/// Software wall clock.
#[derive(Copy, Clone, Debug)]
pub struct WallClock {
    base_unix: u32,
    base_ms: u64,
}

impl WallClock {
    /// Clock reading `unix` at monotonic time `now_ms`.
    pub const fn new(unix: u32, now_ms: u64) -> Self {
        Self {
            base_unix: unix,
            base_ms: now_ms,
        }
    }

    pub fn unix(&self, now_ms: u64) -> u32 {
        let elapsed_s = now_ms.saturating_sub(self.base_ms) / 1000;
        (self.base_unix as u64 + elapsed_s).min(u32::MAX as u64) as u32
    }

    pub fn now(&self, now_ms: u64) -> DateTime {
        DateTime::from_unix(self.unix(now_ms))
    }

    /// Set the time, keeping the current sub-second phase so seconds keep ticking
    /// on the same edge.
    pub fn set(&mut self, dt: &DateTime, now_ms: u64) {
        let elapsed_s = now_ms.saturating_sub(self.base_ms) / 1000;
        self.base_ms += elapsed_s * 1000;
        self.base_unix = dt.to_unix();
    }

    /// Shift one field of the current time.
    pub fn adjust(&mut self, field: TimeField, delta: i32, now_ms: u64) {
        let updated = self.now(now_ms).adjusted(field, delta);
        info!(
            "clock {:?} {:+} -> {:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            field, delta, updated.year, updated.month, updated.day, updated.hour, updated.minute, updated.second
        );
        self.set(&updated, now_ms);
    }
}
