//! Safe time functions.
use std::time::SystemTime;

fn is_leap_year(year: i64) -> bool {
    if year % 400 == 0 {
        true
    } else if year % 100 == 0 {
        false
    } else {
        year % 4 == 0
    }
}

fn year_len_days(year: i64) -> i64 {
    if is_leap_year(year) { 366 } else { 365 }
}

#[allow(clippy::match_same_arms)]
fn month_len_days(year: i64, month: i64) -> i64 {
    match month {
        1 => 31,
        2 if is_leap_year(year) => 29,
        2 => 28,
        3 => 31,
        4 => 30,
        5 => 31,
        6 => 30,
        7 => 31,
        8 => 31,
        9 => 30,
        10 => 31,
        11 => 30,
        12 => 31,
        _ => unimplemented!(),
    }
}

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

struct DateTime {
    pub year: i64,
    pub month: i64,
    pub day: i64,
    pub weekday: i64,
    pub hour: i64,
    pub min: i64,
    pub sec: i64,
}
impl DateTime {
    // Epoch time assumes that every day is the same length, 24 * 60 * 60 seconds.
    // It ignores leap seconds.
    #[must_use]
    pub fn new(epoch_seconds: i64) -> Self {
        let mut days = epoch_seconds.div_euclid(86400);
        let day_seconds = epoch_seconds.rem_euclid(86400);
        // 1970-01-01 was a Thursday.
        let weekday = (days + 4).rem_euclid(7);
        let mut year = 1970;
        while days >= year_len_days(year) {
            days -= year_len_days(year);
            year += 1;
        }
        let mut month = 1;
        while days >= month_len_days(year, month) {
            days -= month_len_days(year, month);
            month += 1;
        }
        Self {
            year,
            month,
            day: days + 1,
            weekday,
            hour: day_seconds / 3600,
            min: (day_seconds / 60) % 60,
            sec: day_seconds % 60,
        }
    }
}

#[allow(clippy::module_name_repetitions)]
pub trait FormatTime {
    fn rfc1123_utc(&self) -> String;
}

impl FormatTime for SystemTime {
    /// Formats like `Thu, 01 Jan 1970 00:00:00 GMT`.
    #[allow(clippy::missing_panics_doc)]
    fn rfc1123_utc(&self) -> String {
        let epoch_seconds = i64::try_from(
            self.duration_since(SystemTime::UNIX_EPOCH)
                .unwrap()
                .as_secs(),
        )
        .unwrap();
        let dt = DateTime::new(epoch_seconds);
        format!(
            "{}, {:02} {} {:04} {:02}:{:02}:{:02} GMT",
            DAY_NAMES[usize::try_from(dt.weekday).unwrap()],
            dt.day,
            MONTH_NAMES[usize::try_from(dt.month - 1).unwrap()],
            dt.year,
            dt.hour,
            dt.min,
            dt.sec
        )
    }
}
