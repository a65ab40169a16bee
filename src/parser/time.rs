use chrono::{DateTime, Duration, Utc};

/// Formats the time elapsed since `start_ms` (epoch milliseconds) relative to `now`.
#[must_use]
pub fn time_since(start_ms: i64, now: DateTime<Utc>) -> String {
    let Some(started) = DateTime::<Utc>::from_timestamp_millis(start_ms) else {
        return time_ago(Duration::zero());
    };
    time_ago(now - started)
}

/// Buckets an elapsed duration into a human string such as "3 hours ago".
#[must_use]
pub fn time_ago(elapsed: Duration) -> String {
    if elapsed < Duration::minutes(1) {
        "just now".to_string()
    } else if elapsed < Duration::hours(1) {
        plural(elapsed.num_minutes(), "minute")
    } else if elapsed < Duration::days(1) {
        plural(elapsed.num_hours(), "hour")
    } else if elapsed < Duration::days(7) {
        plural(elapsed.num_days(), "day")
    } else {
        plural(elapsed.num_days() / 7, "week")
    }
}

fn plural(count: i64, unit: &str) -> String {
    let suffix = if count > 1 { "s" } else { "" };
    format!("{count} {unit}{suffix} ago")
}
