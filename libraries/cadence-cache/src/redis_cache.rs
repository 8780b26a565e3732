/// Redis-backed cache
use crate::{Cache, Result};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::time::Duration;

/// Keys scanned per `SCAN` round trip during pattern deletes
const SCAN_BATCH: usize = 200;

/// Shares one multiplexed connection; `ConnectionManager` reconnects on failure
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
}

impl RedisCache {
    /// Connect to `redis://host:port[/db]`
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let connection = ConnectionManager::new(client).await?;
        tracing::info!("Connected to Redis cache");
        Ok(Self { connection })
    }

    /// Collect every key matching `pattern` with a non-blocking `SCAN` loop
    async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>> {
        let mut conn = self.connection.clone();
        let mut cursor: u64 = 0;
        let mut found = Vec::new();

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;

            found.extend(keys);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(found)
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection.clone();
        let value: Option<String> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let mut conn = self.connection.clone();
        // Redis rejects EX 0
        let seconds = ttl.as_secs().max(1);
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(seconds)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection.clone();
        let removed: usize = redis::cmd("DEL").arg(key).query_async(&mut conn).await?;
        Ok(removed > 0)
    }

    async fn delete_many(&self, keys: &[String]) -> Result<usize> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut cmd = redis::cmd("DEL");
        for key in keys {
            cmd.arg(key);
        }
        let mut conn = self.connection.clone();
        let removed: usize = cmd.query_async(&mut conn).await?;
        Ok(removed)
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<usize> {
        let keys = self.scan_keys(pattern).await?;
        let removed = self.delete_many(&keys).await?;
        tracing::debug!(pattern, removed, "Invalidated cache keys");
        Ok(removed)
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
