use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// Freshness window for leaderboard and ranking reads
pub const LEADERBOARD_TTL: Duration = Duration::from_secs(5 * 60);

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// Cache-aside map whose entries expire after a fixed TTL.
/// Concurrent misses on one key share a single load.
pub struct TimedCache<K, V> {
    entries: Mutex<HashMap<K, Entry<V>>>,
    in_flight: Mutex<HashMap<K, Arc<Mutex<()>>>>,
    ttl: Duration,
}

impl<K, V> TimedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Fresh value for `key`; an expired entry is dropped
    pub async fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock().await;

        match entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub async fn insert(&self, key: K, value: V) {
        self.entries.lock().await.insert(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    pub async fn invalidate(&self, key: &K) {
        self.entries.lock().await.remove(key);
    }

    /// Returns the cached value, or runs `load` and caches its success.
    /// Callers missing on the same key wait for the first load instead of
    /// running their own. Errors are passed through and never cached.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: K, load: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key).await {
            debug!("Cache hit");
            return Ok(value);
        }

        let gate = Arc::clone(
            self.in_flight
                .lock()
                .await
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        );
        let _loading = gate.lock().await;

        if let Some(value) = self.get(&key).await {
            debug!("Cache filled by a concurrent load");
            return Ok(value);
        }

        let result = load().await;
        if let Ok(value) = &result {
            self.insert(key.clone(), value.clone()).await;
        }
        self.in_flight.lock().await.remove(&key);
        result
    }
}
