//! TTL cache for decoded extraction payloads, keyed by document digest, so a
//! re-uploaded identical document skips the paid inference call. Disabled by
//! default.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tokio::task;
use tokio::time::{sleep, Duration};
use tracing::debug;

/// Cache key for a document: hex digest of its raw bytes.
pub fn digest(document: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(document);
    format!("{:x}", hasher.finalize())
}

pub struct Config {
    pub enabled: bool,
    pub ttl: Duration,
}

pub struct Cache<K, V> {
    enabled: bool,
    inner: RwLock<HashMap<K, Arc<V>>>,
    ttl: Duration,
}

impl<K, V> Cache<K, V>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    pub fn new(config: Config) -> Arc<Self> {
        Arc::new(Self {
            enabled: config.enabled,
            ttl: config.ttl,
            inner: Default::default(),
        })
    }

    /// Stores a value and schedules its expiry. Returns the shared handle
    /// whether or not caching is enabled.
    pub async fn insert(self: Arc<Self>, key: K, value: V) -> Arc<V> {
        let arcd = Arc::new(value);
        if !self.enabled {
            return arcd;
        }

        self.inner
            .write()
            .await
            .insert(key.clone(), Arc::clone(&arcd));

        let self_clone = Arc::clone(&self);
        task::spawn(async move {
            sleep(self_clone.ttl).await;
            self_clone.inner.write().await.remove(&key);
        });

        arcd
    }

    pub async fn get(&self, key: &K) -> Option<Arc<V>> {
        if !self.enabled {
            return None;
        }

        let hit = self.inner.read().await.get(key).map(Arc::clone);
        if hit.is_some() {
            debug!("cache hit");
        }

        hit
    }
}
