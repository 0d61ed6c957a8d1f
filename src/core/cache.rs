//! Time-bounded in-memory cache for upstream payloads.
//!
//! Two independent staleness mechanisms apply:
//!
//! * the *coalescing window*: keys embed the minute bucket of the request
//!   time, so requests in the same minute share a key and requests in
//!   different minutes never do;
//! * the *expiry window*: an entry is only served while
//!   `now - stored_at < ttl`.
//!
//! Nothing is evicted in the background. Entries for past minute buckets
//! stay in memory until the cache is dropped, so long-running callers must
//! bound the set of symbols and timeframes they request.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

pub const DEFAULT_TTL_SECS: u64 = 300;

/// Source of wall-clock time for bucketing and expiry.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataKind {
    Quote,
    Candles(String),
}

impl Display for DataKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataKind::Quote => write!(f, "quote"),
            DataKind::Candles(timeframe) => write!(f, "candlestick_{timeframe}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    symbol: String,
    kind: DataKind,
    bucket: String,
}

impl CacheKey {
    pub fn new(symbol: &str, kind: DataKind, now: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.to_string(),
            kind,
            bucket: now.format("%Y%m%d_%H%M").to_string(),
        }
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}_{}", self.symbol, self.kind, self.bucket)
    }
}

#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub stored_at: DateTime<Utc>,
}

pub struct TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    inner: Arc<Mutex<HashMap<CacheKey, CacheEntry<V>>>>,
    ttl: Duration,
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync,
{
    pub fn new(ttl: std::time::Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl: Duration::from_std(ttl)
                .unwrap_or_else(|_| Duration::seconds(DEFAULT_TTL_SECS as i64)),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get(&self, key: &CacheKey) -> Option<CacheEntry<V>> {
        let cache = self.inner.lock().await;
        cache.get(key).cloned()
    }

    pub async fn is_valid(&self, key: &CacheKey, now: DateTime<Utc>) -> bool {
        let cache = self.inner.lock().await;
        cache
            .get(key)
            .is_some_and(|entry| now - entry.stored_at < self.ttl)
    }

    /// Returns the stored value only while it is inside the expiry window.
    pub async fn get_valid(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<V> {
        let cache = self.inner.lock().await;
        match cache.get(key) {
            Some(entry) if now - entry.stored_at < self.ttl => {
                debug!("Cache HIT for key: {}", key);
                Some(entry.value.clone())
            }
            Some(_) => {
                debug!("Cache entry expired for key: {}", key);
                None
            }
            None => {
                debug!("Cache MISS for key: {}", key);
                None
            }
        }
    }

    pub async fn put(&self, key: CacheKey, value: V, now: DateTime<Utc>) {
        let mut cache = self.inner.lock().await;
        debug!("Cache PUT for key: {}", key);
        cache.insert(
            key,
            CacheEntry {
                value,
                stored_at: now,
            },
        );
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

impl<V> Default for TtlCache<V>
where
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new(std::time::Duration::from_secs(DEFAULT_TTL_SECS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, h, m, s).unwrap()
    }

    #[test]
    fn test_key_embeds_minute_bucket() {
        let key = CacheKey::new("AAPL", DataKind::Quote, at(14, 30, 5));
        assert_eq!(key.to_string(), "AAPL_quote_20240315_1430");

        let key = CacheKey::new("AAPL", DataKind::Candles("1h".into()), at(9, 5, 59));
        assert_eq!(key.to_string(), "AAPL_candlestick_1h_20240315_0905");
    }

    #[test]
    fn test_same_minute_collapses_to_one_key() {
        let a = CacheKey::new("AAPL", DataKind::Quote, at(14, 30, 1));
        let b = CacheKey::new("AAPL", DataKind::Quote, at(14, 30, 59));
        let c = CacheKey::new("AAPL", DataKind::Quote, at(14, 31, 0));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[tokio::test]
    async fn test_cache_get_put() {
        let cache = TtlCache::<i32>::default();
        let key = CacheKey::new("AAPL", DataKind::Quote, at(10, 0, 0));

        assert!(cache.get(&key).await.is_none());
        assert!(!cache.is_valid(&key, at(10, 0, 0)).await);

        cache.put(key.clone(), 123, at(10, 0, 0)).await;

        let entry = cache.get(&key).await.unwrap();
        assert_eq!(entry.value, 123);
        assert_eq!(entry.stored_at, at(10, 0, 0));
        assert_eq!(cache.get_valid(&key, at(10, 0, 30)).await, Some(123));
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let cache = TtlCache::<i32>::new(std::time::Duration::from_secs(10));
        let key = CacheKey::new("MSFT", DataKind::Quote, at(10, 0, 0));
        cache.put(key.clone(), 7, at(10, 0, 0)).await;

        assert!(cache.is_valid(&key, at(10, 0, 9)).await);
        assert!(!cache.is_valid(&key, at(10, 0, 10)).await);
        assert!(cache.get_valid(&key, at(10, 0, 10)).await.is_none());
        // Expired entries are not swept
        assert!(cache.get(&key).await.is_some());
    }

    #[tokio::test]
    async fn test_entries_accumulate_across_buckets() {
        let cache = TtlCache::<i32>::default();
        for minute in 0..3 {
            let now = at(10, minute, 0);
            cache
                .put(CacheKey::new("AAPL", DataKind::Quote, now), 1, now)
                .await;
        }
        assert_eq!(cache.len().await, 3);
    }
}
