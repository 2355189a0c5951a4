//! Wall clock and local time formatting.

use std::time::{SystemTime, UNIX_EPOCH};

use time::{OffsetDateTime, UtcOffset};

use crate::settings::DateFormat;

/// Wall clock in whole seconds since the Unix epoch (UTC)
pub trait Clock {
    fn now(&self) -> u64;
}

/// System time; only meaningful after network time has been set
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Local date-time for `timestamp` shifted by `offset_secs`
pub fn local_time(timestamp: u64, offset_secs: i32) -> Option<OffsetDateTime> {
    let offset = UtcOffset::from_whole_seconds(offset_secs).ok()?;
    let utc = OffsetDateTime::from_unix_timestamp(i64::try_from(timestamp).ok()?).ok()?;
    Some(utc.to_offset(offset))
}

/// `HH:MM` followed by the two-digit date in the configured order
pub fn format_timestamp(timestamp: u64, offset_secs: i32, order: DateFormat) -> String {
    let Some(local) = local_time(timestamp, offset_secs) else {
        return String::from("--:-- --/--/--");
    };
    let (day, month, year) = (
        local.day(),
        u8::from(local.month()),
        local.year().rem_euclid(100),
    );
    let date = match order {
        DateFormat::Dmy => format!("{:02}/{:02}/{:02}", day, month, year),
        DateFormat::Ymd => format!("{:02}/{:02}/{:02}", year, month, day),
        DateFormat::Mdy => format!("{:02}/{:02}/{:02}", month, day, year),
    };
    format!("{:02}:{:02} {}", local.hour(), local.minute(), date)
}
