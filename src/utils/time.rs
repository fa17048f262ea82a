use chrono::{DateTime, Duration, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

pub fn from_rfc3339(s: &str) -> anyhow::Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

/// Look-back window named by `24h`, `7d` or `30d`.
pub fn period_duration(period: &str) -> Option<Duration> {
    match period {
        "24h" => Some(Duration::hours(24)),
        "7d" => Some(Duration::days(7)),
        "30d" => Some(Duration::days(30)),
        _ => None,
    }
}

pub fn export_stamp(dt: DateTime<Utc>) -> String {
    dt.format("%Y%m%d_%H%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_periods() {
        assert_eq!(period_duration("24h"), Some(Duration::hours(24)));
        assert_eq!(period_duration("7d"), Some(Duration::days(7)));
        assert_eq!(period_duration("30d"), Some(Duration::days(30)));
        assert_eq!(period_duration("1y"), None);
    }

    #[test]
    fn rfc3339_is_normalized_to_utc() {
        let dt = from_rfc3339("2025-12-04T10:00:00-03:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-12-04T13:00:00+00:00");
        assert!(from_rfc3339("yesterday").is_err());
    }
}
