//! Time utilities: lenient parsing of stored instants and timezone-aware due dates.

use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Parse a stored timestamp, reading offset-less values as UTC.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    parse_instant_in(raw, &Utc)
}

/// Parse a stored timestamp.
///
/// Accepts RFC3339, an offset-less `YYYY-MM-DDTHH:MM[:SS[.fff]]` (local time
/// in `tz`) or a bare `YYYY-MM-DD` (midnight UTC). Anything else is `None`.
pub fn parse_instant_in<Z: TimeZone>(raw: &str, tz: &Z) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return resolve_local(&ndt, tz);
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
}

/// Earlier reading of an ambiguous local time; a time skipped by a DST jump
/// moves forward an hour.
fn resolve_local<Z: TimeZone>(ndt: &NaiveDateTime, tz: &Z) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(ndt)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(*ndt + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Canonical text for an instant written to storage.
pub fn format_instant(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Fractional days from `from` to `to` (negative when `to` is earlier).
pub fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MILLIS_PER_DAY
}

pub fn parse_timezone(tz: &str) -> Result<Tz> {
    tz.parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))
}

/// Parse a due date like "2026-02-20 23:59" in an IANA tz like "America/Chicago",
/// returning UTC. A bare date means 23:59 local on that day.
pub fn parse_local_due_to_utc(local: &str, tz: &str) -> Result<DateTime<Utc>> {
    let tz = parse_timezone(tz)?;
    let local = local.trim();

    let ndt = NaiveDateTime::parse_from_str(local, "%Y-%m-%d %H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(local, "%Y-%m-%dT%H:%M"))
        .or_else(|_| {
            NaiveDate::parse_from_str(local, "%Y-%m-%d").map(|d| {
                d.and_hms_opt(23, 59, 0)
                    .unwrap_or_else(|| d.and_time(NaiveTime::MIN))
            })
        })
        .map_err(|e| anyhow::anyhow!("invalid local datetime '{local}': {e}"))?;

    let local_dt = tz
        .from_local_datetime(&ndt)
        .single()
        .ok_or_else(|| anyhow::anyhow!("ambiguous or invalid local time (DST?): {local} {tz}"))?;

    Ok(local_dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chicago_due_date() {
        // Feb is CST (UTC-6)
        let utc = parse_local_due_to_utc("2026-02-20 23:59", "America/Chicago").unwrap();
        assert_eq!(utc.to_rfc3339(), "2026-02-21T05:59:00+00:00");
    }

    #[test]
    fn test_bare_local_date_is_end_of_day() {
        let utc = parse_local_due_to_utc("2026-07-04", "UTC").unwrap();
        assert_eq!(utc.to_rfc3339(), "2026-07-04T23:59:00+00:00");
    }

    #[test]
    fn test_rejects_bad_timezone() {
        assert!(parse_local_due_to_utc("2026-02-20 10:00", "Mars/Olympus").is_err());
    }

    #[test]
    fn test_parse_instant_formats() {
        let expected = Utc.with_ymd_and_hms(2026, 3, 1, 14, 30, 0).unwrap();
        assert_eq!(parse_instant("2026-03-01T14:30:00Z"), Some(expected));
        assert_eq!(parse_instant("2026-03-01T14:30:00.000Z"), Some(expected));
        assert_eq!(parse_instant("2026-03-01T08:30:00-06:00"), Some(expected));
        assert_eq!(parse_instant("2026-03-01T14:30"), Some(expected));
        assert_eq!(
            parse_instant("2026-03-01"),
            Some(Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_offset_less_instant_reads_in_zone() {
        // March 12 is CDT (UTC-5); bare dates stay UTC midnight
        let chicago = parse_timezone("America/Chicago").unwrap();
        assert_eq!(
            parse_instant_in("2026-03-12T17:00", &chicago),
            Some(Utc.with_ymd_and_hms(2026, 3, 12, 22, 0, 0).unwrap())
        );
        assert_eq!(
            parse_instant_in("2026-03-12T17:00:00Z", &chicago),
            Some(Utc.with_ymd_and_hms(2026, 3, 12, 17, 0, 0).unwrap())
        );
        assert_eq!(
            parse_instant_in("2026-03-12", &chicago),
            Some(Utc.with_ymd_and_hms(2026, 3, 12, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_skipped_local_time_moves_forward() {
        // 02:30 doesn't exist on 2026-03-08 in Chicago
        let chicago = parse_timezone("America/Chicago").unwrap();
        assert_eq!(
            parse_instant_in("2026-03-08T02:30", &chicago),
            Some(Utc.with_ymd_and_hms(2026, 3, 8, 8, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_format_instant() {
        let at = Utc.with_ymd_and_hms(2026, 3, 12, 17, 0, 0).unwrap();
        assert_eq!(format_instant(at), "2026-03-12T17:00:00Z");
    }

    #[test]
    fn test_parse_instant_garbage_is_none() {
        assert_eq!(parse_instant(""), None);
        assert_eq!(parse_instant("next tuesday"), None);
        assert_eq!(parse_instant("2026-13-45"), None);
    }

    #[test]
    fn test_days_between_is_signed() {
        let a = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(days_between(a, a + Duration::hours(36)), 1.5);
        assert_eq!(days_between(a + Duration::hours(12), a), -0.5);
    }
}
