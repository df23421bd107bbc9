//! One-time password reset codes

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

/// A six-digit reset code and its expiry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetCode {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl ResetCode {
    /// Generate a fresh code valid for `ttl_seconds` from `now`.
    pub fn generate(now: DateTime<Utc>, ttl_seconds: u64) -> Self {
        let code = rand::rng().random_range(100_000..1_000_000u32);
        Self {
            code: code.to_string(),
            expires_at: now + Duration::seconds(ttl_seconds as i64),
        }
    }
}
