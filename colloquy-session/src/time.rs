use chrono::{DateTime, Utc};

/// Short age label for list views: `now`, `5m ago`, `3h ago`, `2d ago`, then a date.
pub fn format_relative(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if hours < 24 {
        format!("{}h ago", hours)
    } else if days < 7 {
        format!("{}d ago", days)
    } else {
        then.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_format_relative_buckets() {
        let now = base();
        assert_eq!(format_relative(now - Duration::seconds(30), now), "now");
        assert_eq!(format_relative(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(format_relative(now - Duration::minutes(59), now), "59m ago");
        assert_eq!(format_relative(now - Duration::hours(3), now), "3h ago");
        assert_eq!(format_relative(now - Duration::days(2), now), "2d ago");
        assert_eq!(format_relative(now - Duration::days(10), now), "2024-03-05");
    }

    #[test]
    fn test_future_timestamp_is_now() {
        let now = base();
        assert_eq!(format_relative(now + Duration::minutes(3), now), "now");
    }
}
