use chrono::{DateTime, Duration, NaiveDateTime, Utc};

/// Offset of the application's reference timezone (IST) from UTC, in minutes.
pub const REFERENCE_OFFSET_MINUTES: i64 = 5 * 60 + 30;

pub const STORED_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Shift a naive UTC timestamp to the reference timezone.
pub fn utc_to_reference(utc: NaiveDateTime) -> NaiveDateTime {
    utc + Duration::minutes(REFERENCE_OFFSET_MINUTES)
}

/// Current wall clock in the reference timezone.
pub fn reference_now() -> NaiveDateTime {
    utc_to_reference(Utc::now().naive_utc())
}

/// Parse a stored timestamp written as text.
///
/// Accepts `%Y-%m-%d %H:%M:%S` first, then ISO-8601. Values carrying an offset (`Z`, `+00:00`)
/// are converted to the reference timezone; offset-less ISO values are taken as already local.
pub fn parse_stored_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, STORED_TIME_FORMAT) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(utc_to_reference(dt.naive_utc()));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()
}
