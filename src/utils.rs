use chrono::{DateTime, Duration, Local, Utc};
use once_cell::sync::Lazy;

pub static RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to build Tokio runtime")
});

/// Runs a future to completion from synchronous front-end code.
pub fn block_on<F: std::future::Future>(fut: F) -> F::Output {
    RUNTIME.block_on(fut)
}

pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// `HH:MM` within the last day, `Mon D` for anything older.
pub fn format_time(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let local = ts.with_timezone(&Local);
    if now - ts < Duration::hours(24) {
        local.format("%H:%M").to_string()
    } else {
        local.format("%b %-d").to_string()
    }
}

pub fn initials(name: &str) -> String {
    name.split_whitespace().filter_map(|part| part.chars().next()).collect()
}
