use chrono::Utc;

/// Wall-clock UNIX seconds, for token expiry and metrics. Refresh cadence
/// uses `tokio::time::Instant` instead.
pub fn now_i64() -> i64 {
    Utc::now().timestamp()
}
