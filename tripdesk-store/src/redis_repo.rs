use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::{debug, info};
use tripdesk_core::cache::HotCache;
use tripdesk_core::repository::RepoError;

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        info!("Redis client configured");
        Ok(Self { client })
    }
}

#[async_trait]
impl HotCache for RedisClient {
    async fn check_rate_limit(&self, key: &str, limit: i64, window_seconds: i64) -> Result<bool, RepoError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let (count,): (i64,) = redis::pipe()
            .atomic()
            .incr(key, 1)
            .expire(key, window_seconds)
            .ignore()
            .query_async(&mut conn)
            .await?;

        Ok(count <= limit)
    }

    async fn claim_key(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<Option<String>, RepoError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        // SET NX: Only set if key does not exist
        let claimed: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(ttl_seconds)
            .query_async(&mut conn)
            .await?;

        if claimed.is_some() {
            debug!("Claimed {}", key);
            return Ok(None);
        }

        let holder: Option<String> = conn.get(key).await?;
        Ok(Some(holder.unwrap_or_default()))
    }

    async fn release_key(&self, key: &str) -> Result<(), RepoError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.del(key).await?;
        Ok(())
    }
}
