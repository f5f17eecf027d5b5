use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use log::debug;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::CacheStore;
use crate::errors::Result;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }
}

/// In-process cache backed by a sharded concurrent map.
///
/// Expired entries are dropped lazily on read, or in bulk through
/// [`purge_expired`](Self::purge_expired). Keys that are never read again are
/// only reclaimed by a purge, so long-lived caches should run
/// [`spawn_purge_task`](Self::spawn_purge_task).
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: DashMap<String, CacheEntry>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every expired entry and return how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!("Purged {} expired cache entries", removed);
        }
        removed
    }

    /// Purge expired entries every `period` until the cache is dropped.
    ///
    /// The task only holds a weak reference, so it never keeps the cache alive.
    pub fn spawn_purge_task(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let cache: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match cache.upgrade() {
                    Some(cache) => {
                        cache.purge_expired();
                    }
                    None => break,
                }
            }
            debug!("In-memory cache dropped, purge task exiting");
        })
    }
}

#[async_trait]
impl CacheStore for InMemoryCache {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let expires_at = if ttl.is_zero() {
            None
        } else {
            Some(Instant::now() + ttl)
        };
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        let hit = self.entries.get(key).map(|entry| {
            if entry.is_expired(now) {
                None
            } else {
                Some(entry.value.clone())
            }
        });

        match hit {
            Some(Some(value)) => Ok(Some(value)),
            Some(None) => {
                // Guard is released above; re-check so a concurrent refresh is kept.
                self.entries.remove_if(key, |_, entry| entry.is_expired(now));
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn del(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}
