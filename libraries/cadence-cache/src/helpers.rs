/// Best-effort JSON helpers on top of [`Cache`]
///
/// A cache outage must never fail a request, so every backend error is logged
/// at `warn` and swallowed here.
use crate::keys::{self, EntityKind};
use crate::Cache;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

/// Read and decode a cached value. Undecodable entries are deleted.
pub async fn get_json<T: DeserializeOwned>(cache: &dyn Cache, key: &str) -> Option<T> {
    let raw = match cache.get(key).await {
        Ok(raw) => raw?,
        Err(e) => {
            tracing::warn!(key, error = %e, "Cache read failed");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => {
            tracing::trace!(key, "Cache hit");
            Some(value)
        }
        Err(e) => {
            tracing::warn!(key, error = %e, "Dropping undecodable cache entry");
            if let Err(e) = cache.delete(key).await {
                tracing::warn!(key, error = %e, "Cache delete failed");
            }
            None
        }
    }
}

pub async fn set_json<T: Serialize + ?Sized>(cache: &dyn Cache, key: &str, value: &T, ttl: Duration) {
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to serialize cache value");
            return;
        }
    };

    if let Err(e) = cache.set(key, raw, ttl).await {
        tracing::warn!(key, error = %e, "Cache write failed");
    }
}

/// Delete every key matching any of `patterns`
pub async fn invalidate(cache: &dyn Cache, patterns: &[String]) {
    for pattern in patterns {
        match cache.delete_pattern(pattern).await {
            Ok(removed) => tracing::debug!(pattern = %pattern, removed, "Cache invalidated"),
            Err(e) => tracing::warn!(pattern = %pattern, error = %e, "Cache invalidation failed"),
        }
    }
}

/// Drop every cached resource and listing of one kind
pub async fn invalidate_kind(cache: &dyn Cache, kind: EntityKind) {
    invalidate(cache, &keys::kind_patterns(kind)).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CacheError, MemoryCache, MockCache};
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Payload {
        name: String,
    }

    #[tokio::test]
    async fn json_values_round_trip() {
        let cache = MemoryCache::new();
        let payload = Payload {
            name: "Rock".to_string(),
        };

        set_json(&cache, "genre_1", &payload, Duration::from_secs(60)).await;
        let cached: Option<Payload> = get_json(&cache, "genre_1").await;
        assert_eq!(cached, Some(payload));
    }

    #[tokio::test]
    async fn undecodable_entries_are_dropped() {
        let cache = MemoryCache::new();
        cache
            .set("genre_1", "not json".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        let cached: Option<Payload> = get_json(&cache, "genre_1").await;
        assert!(cached.is_none());
        assert!(cache.get("genre_1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn backend_failures_are_swallowed() {
        let mut cache = MockCache::new();
        cache
            .expect_get()
            .returning(|_| Err(CacheError::Unavailable("down".to_string())));
        cache
            .expect_set()
            .returning(|_, _, _| Err(CacheError::Unavailable("down".to_string())));
        cache
            .expect_delete_pattern()
            .times(2)
            .returning(|_| Err(CacheError::Unavailable("down".to_string())));

        let cached: Option<Payload> = get_json(&cache, "artist_1").await;
        assert!(cached.is_none());
        set_json(&cache, "artist_1", &Payload { name: "x".to_string() }, Duration::from_secs(1)).await;
        invalidate_kind(&cache, EntityKind::Artist).await;
    }

    #[tokio::test]
    async fn invalidate_kind_removes_entities_and_lists_only() {
        let cache = MemoryCache::new();
        let ttl = Duration::from_secs(60);
        for key in [
            "artist_1",
            "artist_1_user_9",
            "artists_list:page_1:limit_10",
            "album_1",
            "albums_list:page_1:limit_10",
        ] {
            cache.set(key, "{}".to_string(), ttl).await.unwrap();
        }

        invalidate_kind(&cache, EntityKind::Artist).await;

        assert!(cache.get("artist_1").await.unwrap().is_none());
        assert!(cache.get("artist_1_user_9").await.unwrap().is_none());
        assert!(cache.get("artists_list:page_1:limit_10").await.unwrap().is_none());
        assert!(cache.get("album_1").await.unwrap().is_some());
        assert!(cache.get("albums_list:page_1:limit_10").await.unwrap().is_some());
    }
}
