/// In-process cache with the same glob semantics as the Redis backend
use crate::{Cache, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

/// Used by the test suites and when no Redis server is configured.
/// Expired entries are dropped lazily on access.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) entries
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| e.expires_at > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > now => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Expired: drop it under the write lock
        self.entries.write().await.remove(key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn delete_many(&self, keys: &[String]) -> Result<usize> {
        let mut entries = self.entries.write().await;
        Ok(keys.iter().filter(|k| entries.remove(*k).is_some()).count())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<usize> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !glob_match(pattern, key));
        Ok(before - entries.len())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// Redis `MATCH` glob: `*` matches any run (including none), `?` one byte,
/// `[...]` a class (`^` negates, `a-z` ranges) and `\` escapes the next byte.
pub(crate) fn glob_match(pattern: &str, text: &str) -> bool {
    match_bytes(pattern.as_bytes(), text.as_bytes())
}

fn match_bytes(pattern: &[u8], text: &[u8]) -> bool {
    let Some((&first, rest)) = pattern.split_first() else {
        return text.is_empty();
    };

    match first {
        b'*' => (0..=text.len()).any(|skip| match_bytes(rest, &text[skip..])),
        b'?' => !text.is_empty() && match_bytes(rest, &text[1..]),
        b'[' => {
            let Some((&c, text_rest)) = text.split_first() else {
                return false;
            };
            let (matched, after) = match_class(rest, c);
            matched && match_bytes(after, text_rest)
        }
        b'\\' if !rest.is_empty() => {
            text.first() == Some(&rest[0]) && match_bytes(&rest[1..], &text[1..])
        }
        literal => text.first() == Some(&literal) && match_bytes(rest, &text[1..]),
    }
}

/// Match `c` against the class body following `[`; returns the pattern after `]`
fn match_class(class: &[u8], c: u8) -> (bool, &[u8]) {
    let (negate, mut class) = match class.split_first() {
        Some((b'^', rest)) => (true, rest),
        _ => (false, class),
    };

    let mut matched = false;
    loop {
        match class {
            [] => break,
            [b']', rest @ ..] => {
                class = rest;
                break;
            }
            [b'\\', escaped, rest @ ..] => {
                matched |= *escaped == c;
                class = rest;
            }
            [start, b'-', end, rest @ ..] if *end != b']' => {
                let (lo, hi) = if start <= end { (*start, *end) } else { (*end, *start) };
                matched |= (lo..=hi).contains(&c);
                class = rest;
            }
            [literal, rest @ ..] => {
                matched |= *literal == c;
                class = rest;
            }
        }
    }

    (matched != negate, class)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_matching() {
        assert!(glob_match("artist_*", "artist_123"));
        assert!(glob_match("artist_*", "artist_123_user_9"));
        assert!(glob_match("artist_*", "artist_"));
        assert!(!glob_match("artist_*", "artists_list:page_1"));
        assert!(glob_match("artists_list:*", "artists_list:page_1:limit_10"));
        assert!(glob_match("user_news:42:*", "user_news:42:page_2:limit_10"));
        assert!(!glob_match("user_news:42:*", "user_news:421:page_2"));
        assert!(glob_match("*_user_7", "playlist_1_user_7"));
        assert!(glob_match("a*b*c", "axxbyyc"));
        assert!(!glob_match("a*b*c", "axxbyy"));
        assert!(glob_match("exact", "exact"));
        assert!(!glob_match("exact", "exactly"));
    }

    #[test]
    fn glob_matching_follows_redis_metacharacters() {
        assert!(glob_match("h?llo", "hello"));
        assert!(!glob_match("h?llo", "hllo"));
        assert!(glob_match("h[ae]llo", "hallo"));
        assert!(!glob_match("h[ae]llo", "hillo"));
        assert!(glob_match("h[^e]llo", "hallo"));
        assert!(!glob_match("h[^e]llo", "hello"));
        assert!(glob_match("page_[0-9]", "page_7"));
        assert!(!glob_match("page_[0-9]", "page_x"));

        // Escaped metacharacters only match themselves
        assert!(glob_match("artist_\\*", "artist_*"));
        assert!(!glob_match("artist_\\*", "artist_1"));
        assert!(glob_match("a\\?b", "a?b"));
        assert!(!glob_match("a\\?b", "axb"));
    }

    #[tokio::test]
    async fn escaped_patterns_delete_only_the_literal_key() {
        let cache = MemoryCache::new();
        let ttl = Duration::from_secs(60);
        for key in ["artist_*", "artist_1", "artist_1_user_2"] {
            cache.set(key, "{}".to_string(), ttl).await.unwrap();
        }

        for pattern in crate::keys::entity_patterns(crate::keys::EntityKind::Artist, "*") {
            cache.delete_pattern(&pattern).await.unwrap();
        }

        assert!(cache.get("artist_*").await.unwrap().is_none());
        assert!(cache.get("artist_1").await.unwrap().is_some());
        assert!(cache.get("artist_1_user_2").await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let cache = MemoryCache::new();
        cache
            .set("k", "v".to_string(), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));

        tokio::time::advance(Duration::from_secs(6)).await;
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(cache.is_empty().await);
    }
}
