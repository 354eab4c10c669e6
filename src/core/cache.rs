//! Time-boxed memoization of the validated catalog.
//!
//! One [`ContentCache`] is built at startup and shared by every request
//! handler. Within the revalidation window every caller gets the same
//! `Arc<Catalog>`; the first call after expiry reloads synchronously.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::core::data::{Catalog, ContentError, ContentLoader};

/// Default revalidation window.
pub const DEFAULT_TTL_SECS: u64 = 3600;

/// What the cache does when a reload after expiry fails.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReloadPolicy {
    /// Return the error to the caller.
    #[default]
    Propagate,
    /// Keep serving the last catalog that loaded; the next call retries.
    ServeStale,
}

struct CacheEntry {
    data: Arc<Catalog>,
    expires_at: DateTime<Utc>,
}

pub struct ContentCache {
    loader: ContentLoader,
    ttl: Duration,
    policy: ReloadPolicy,
    entry: RwLock<Option<CacheEntry>>,
}

impl ContentCache {
    pub fn new(loader: ContentLoader, ttl: std::time::Duration, policy: ReloadPolicy) -> Self {
        ContentCache {
            loader,
            ttl: Duration::from_std(ttl).unwrap_or_else(|_| Duration::days(36_500)),
            policy,
            entry: RwLock::new(None),
        }
    }

    /// Current catalog, reloading it if the window has passed.
    pub fn get(&self) -> Result<Arc<Catalog>, ContentError> {
        self.get_at(Utc::now())
    }

    /// Drop the cached catalog so the next [`get`](Self::get) reloads.
    pub fn invalidate(&self) {
        let mut entry = self.entry.write().unwrap_or_else(|e| e.into_inner());
        if entry.take().is_some() {
            info!(path = %self.loader.path().display(), "content cache invalidated");
        }
    }

    pub(crate) fn get_at(&self, now: DateTime<Utc>) -> Result<Arc<Catalog>, ContentError> {
        let stale = {
            let entry = self.entry.read().unwrap_or_else(|e| e.into_inner());
            match entry.as_ref() {
                Some(entry) if now < entry.expires_at => {
                    debug!("content cache hit");
                    return Ok(Arc::clone(&entry.data));
                }
                Some(entry) => Some(Arc::clone(&entry.data)),
                None => None,
            }
        };

        info!(
            path = %self.loader.path().display(),
            expired = stale.is_some(),
            "content cache miss, reloading"
        );

        // Load outside the lock; concurrent misses may reload twice.
        match self.loader.load() {
            Ok(catalog) => {
                let data = Arc::new(catalog);
                let mut entry = self.entry.write().unwrap_or_else(|e| e.into_inner());
                *entry = Some(CacheEntry {
                    data: Arc::clone(&data),
                    expires_at: now.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
                });
                Ok(data)
            }
            Err(err) => match (self.policy, stale) {
                (ReloadPolicy::ServeStale, Some(stale)) => {
                    warn!(error = %err, "reload failed, serving last good catalog");
                    Ok(stale)
                }
                _ => Err(err),
            },
        }
    }
}
