use chrono::{DateTime, Duration, Utc};

pub fn now_ts() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

/// Expiry timestamp `ttl` from now.
pub fn expiry_after(ttl: Duration) -> u64 {
    (Utc::now() + ttl).timestamp().max(0) as u64
}

pub fn time_remaining(expiry: u64) -> String {
    if expiry == 0 {
        return "NEVER".to_string();
    }

    let end = match DateTime::<Utc>::from_timestamp(expiry as i64, 0) {
        Some(end) => end,
        None => return "INVALID".to_string(),
    };
    let diff = end - Utc::now();

    if diff.num_seconds() <= 0 {
        return "EXPIRED".to_string();
    }

    let days = diff.num_days();
    let hours = diff.num_hours() % 24;
    let mins = diff.num_minutes() % 60;

    format!("{}d {:02}h {:02}m", days, hours, mins)
}
