//! Conversions between `SystemTime` and the two zip timestamp encodings.

use chrono::{Datelike, Local, NaiveDate, TimeZone, Timelike};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use zip::DateTime;
use zip::extra_fields::ExtraField;

/// Header id of the extended timestamp extra field ("UT").
pub(super) const EXTENDED_TIMESTAMP_ID: u16 = 0x5455;

/// DOS timestamp in local time. Times outside the DOS range (before 1980) clamp to its start.
pub(super) fn to_dos_time(time: SystemTime) -> DateTime {
    let local: chrono::DateTime<Local> = time.into();
    let Ok(year) = u16::try_from(local.year()) else {
        return DateTime::default();
    };
    DateTime::from_date_and_time(
        year,
        local.month() as u8,
        local.day() as u8,
        local.hour() as u8,
        local.minute() as u8,
        local.second() as u8,
    )
    .unwrap_or_default()
}

/// Extended timestamp payload carrying only the modification time (flags byte + u32 seconds).
pub(super) fn extended_timestamp_field(time: SystemTime) -> Option<Box<[u8]>> {
    let seconds = u32::try_from(time.duration_since(UNIX_EPOCH).ok()?.as_secs()).ok()?;
    let mut data = Vec::with_capacity(5);
    data.push(0x01);
    data.extend_from_slice(&seconds.to_le_bytes());
    Some(data.into_boxed_slice())
}

/// Modification time from an entry's extended timestamp field, if it has one.
pub(super) fn extended_mod_time<'a>(mut fields: impl Iterator<Item = &'a ExtraField>) -> Option<u32> {
    fields.find_map(|field| match field {
        ExtraField::ExtendedTimestamp(timestamp) => timestamp.mod_time(),
        _ => None,
    })
}

/// Prefers the extended timestamp, falls back to the DOS one.
pub(super) fn entry_modified(extended: Option<u32>, dos: Option<DateTime>) -> Option<SystemTime> {
    if let Some(seconds) = extended {
        return Some(UNIX_EPOCH + Duration::from_secs(u64::from(seconds)));
    }
    let dos = dos?;
    let naive = NaiveDate::from_ymd_opt(i32::from(dos.year()), u32::from(dos.month()), u32::from(dos.day()))?
        .and_hms_opt(u32::from(dos.hour()), u32::from(dos.minute()), u32::from(dos.second()))?;
    let local = Local.from_local_datetime(&naive).earliest()?;
    Some(SystemTime::from(local))
}
