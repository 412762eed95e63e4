use chrono::{DateTime, Utc};

fn plural(n: i64, unit: &str) -> String {
    if n > 1 {
        format!("{} {}s", n, unit)
    } else {
        format!("{} {}", n, unit)
    }
}

pub fn format_time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now - then;
    let mins = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if mins < 1 {
        "Just now".to_string()
    } else if mins < 60 {
        format!("{} min ago", mins)
    } else if hours < 24 {
        format!("{} ago", plural(hours, "hour"))
    } else {
        format!("{} ago", plural(days, "day"))
    }
}

pub fn format_expires_in(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let left = expires_at - now;
    let days = left.num_days();
    let hours = left.num_hours();

    if days > 0 {
        plural(days, "day")
    } else if hours > 0 {
        plural(hours, "hour")
    } else {
        "Soon".to_string()
    }
}

pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 4, 15, 30, 0).unwrap()
    }

    #[test]
    fn time_ago_buckets() {
        let now = now();
        assert_eq!(format_time_ago(now - Duration::seconds(30), now), "Just now");
        assert_eq!(format_time_ago(now - Duration::minutes(5), now), "5 min ago");
        assert_eq!(format_time_ago(now - Duration::minutes(61), now), "1 hour ago");
        assert_eq!(format_time_ago(now - Duration::hours(3), now), "3 hours ago");
        assert_eq!(format_time_ago(now - Duration::days(2), now), "2 days ago");
    }

    #[test]
    fn expires_in_buckets() {
        let now = now();
        assert_eq!(format_expires_in(now + Duration::days(7), now), "7 days");
        assert_eq!(format_expires_in(now + Duration::hours(25), now), "1 day");
        assert_eq!(format_expires_in(now + Duration::hours(5), now), "5 hours");
        assert_eq!(format_expires_in(now + Duration::minutes(20), now), "Soon");
        assert_eq!(format_expires_in(now - Duration::hours(1), now), "Soon");
    }

    #[test]
    fn sizes_use_binary_units() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2 * 1024 * 1024 + 400 * 1024), "2.4 MB");
        assert_eq!(format_size(45 * 1024 * 1024 * 1024), "45.0 GB");
    }
}
