use async_trait::async_trait;
use crate::repository::RepoError;

/// Short-lived shared keys: rate-limit counters and idempotency claims.
#[async_trait]
pub trait HotCache: Send + Sync {
    /// Fixed window counter. `true` while under `limit`.
    async fn check_rate_limit(&self, key: &str, limit: i64, window_seconds: i64) -> Result<bool, RepoError>;

    /// Set `key` to `value` unless already held. Returns the current holder's
    /// value when the key was taken, `None` when this call claimed it.
    async fn claim_key(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<Option<String>, RepoError>;

    async fn release_key(&self, key: &str) -> Result<(), RepoError>;
}

pub fn idempotency_cache_key(key: &uuid::Uuid) -> String {
    format!("idempotency:booking:{}", key)
}

pub fn rate_limit_cache_key(ip: &str) -> String {
    format!("ratelimit:{}", ip)
}
