//! Timestamp parsing and formatting utilities.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Parse a timestamp written either as RFC 3339 or as a naive ISO-8601
/// local date-time (`2025-03-01T10:15:30.123456`) or plain date.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Today's date in local time, formatted `YYYY-MM-DD`.
#[must_use]
pub fn today_key() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Serde adapter for optional timestamps that tolerates foreign formats.
///
/// Unparseable values deserialize to `None` instead of failing the document.
pub mod lenient_timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(super::parse_timestamp))
    }
}

/// Format a countdown to a future time.
#[must_use]
pub fn format_countdown(target: DateTime<Utc>) -> String {
    let now = Utc::now();
    let duration = target.signed_duration_since(now);

    if duration.num_seconds() <= 0 {
        return "now".to_string();
    }

    let hours = duration.num_hours();
    let minutes = duration.num_minutes() % 60;

    if hours > 24 {
        let days = hours / 24;
        format!("in {days} day{}", if days == 1 { "" } else { "s" })
    } else if hours > 0 {
        format!("in {hours}h {minutes}m")
    } else {
        format!("in {minutes}m")
    }
}

/// Format a past time relative to now.
#[must_use]
pub fn format_relative_time(target: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(target);

    if duration.num_seconds().abs() < 60 {
        return "just now".to_string();
    }

    let minutes = duration.num_minutes().abs();
    let hours = duration.num_hours().abs();
    let days = duration.num_days().abs();
    let suffix = if duration.num_seconds() > 0 {
        "ago"
    } else {
        "from now"
    };

    if days > 0 {
        format!("{days} day{} {suffix}", if days == 1 { "" } else { "s" })
    } else if hours > 0 {
        format!("{hours} hour{} {suffix}", if hours == 1 { "" } else { "s" })
    } else {
        format!(
            "{minutes} minute{} {suffix}",
            if minutes == 1 { "" } else { "s" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Duration};

    #[test]
    fn parses_rfc3339() {
        let dt = parse_timestamp("2025-03-01T10:15:30Z").unwrap();
        assert_eq!(dt.year(), 2025);
    }

    #[test]
    fn parses_naive_iso_with_fraction() {
        assert!(parse_timestamp("2025-03-01T10:15:30.123456").is_some());
        assert!(parse_timestamp("2025-03-01").is_some());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_timestamp("soon").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn countdown_days() {
        let target = Utc::now() + Duration::days(3) + Duration::hours(1);
        assert!(format_countdown(target).contains("3 days"));
    }

    #[test]
    fn relative_time_past() {
        let target = Utc::now() - Duration::hours(2);
        assert_eq!(format_relative_time(target), "2 hours ago");
    }
}
