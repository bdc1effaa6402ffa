use chrono::{Duration, NaiveDateTime, Utc};
use serde::Serializer;

/// Stored timestamps carry no offset marker and are UTC by convention;
/// everything that leaves the API appends the marker explicitly so a viewer
/// cannot misread them as local time.
const UTC_FMT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub fn utc_now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

pub fn format_utc(t: &NaiveDateTime) -> String {
    t.format(UTC_FMT).to_string()
}

pub fn serialize_utc<S: Serializer>(t: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format_utc(t))
}

pub fn serialize_utc_opt<S: Serializer>(
    t: &Option<NaiveDateTime>,
    s: S,
) -> Result<S::Ok, S::Error> {
    match t {
        Some(t) => s.serialize_some(&format_utc(t)),
        None => s.serialize_none(),
    }
}

/// Shift a stored UTC timestamp into a viewer's local wall-clock time.
pub fn to_viewer_local(t: NaiveDateTime, utc_offset_minutes: i32) -> NaiveDateTime {
    t + Duration::minutes(utc_offset_minutes as i64)
}

/// Whole minutes elapsed since a stored UTC timestamp.
pub fn minutes_since(t: NaiveDateTime) -> i64 {
    (utc_now() - t).num_minutes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn stored(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn stored_value_renders_in_viewer_local_time() {
        // 09:15 UTC viewed from UTC+5:30 is 14:45, not 09:15.
        let local = to_viewer_local(stored("2026-01-15 09:15:00"), 330);
        assert_eq!(local.format("%H:%M").to_string(), "14:45");
        assert_eq!(
            local.date(),
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
        );
    }

    #[test]
    fn negative_offsets_shift_backwards_across_midnight() {
        let local = to_viewer_local(stored("2026-01-15 01:00:00"), -300);
        assert_eq!(local.format("%Y-%m-%d %H:%M").to_string(), "2026-01-14 20:00");
    }

    #[test]
    fn formatting_appends_the_utc_marker() {
        assert_eq!(format_utc(&stored("2026-01-15 09:15:00")), "2026-01-15T09:15:00Z");
    }
}
