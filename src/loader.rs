// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::{DEFAULT_TTL, SnapshotCache};
use crate::catalog::Catalog;
use crate::error::{CatalogError, LoadError, RefreshError};
use crate::filter::{FilterSpec, Listing, PlayablePredicate, filter_and_sort_with};
use crate::model::{Snapshot, Stream};
use crate::source::{CatalogSource, Feed};

#[derive(Debug, Clone)]
pub struct LoaderOptions {
    pub cache_path: PathBuf,
    pub ttl: Duration,
    pub default_country: Option<String>,
    pub playable: PlayablePredicate,
}

impl LoaderOptions {
    pub fn new(cache_path: impl Into<PathBuf>) -> Self {
        Self {
            cache_path: cache_path.into(),
            ttl: DEFAULT_TTL,
            default_country: None,
            playable: Stream::is_browser_playable,
        }
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn default_country(mut self, country: Option<String>) -> Self {
        self.default_country = country.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn playable(mut self, playable: PlayablePredicate) -> Self {
        self.playable = playable;
        self
    }
}

/// Cache-backed catalog loader.
///
/// `load` serves the on-disk snapshot while it is fresh, refreshes it from the
/// source once it is stale, and falls back to a stale snapshot when the
/// refresh fails. `refresh` always goes to the source and never falls back.
#[derive(Debug)]
pub struct Loader<S> {
    options: LoaderOptions,
    cache: SnapshotCache,
    source: S,
    write_lock: Mutex<()>,
}

impl<S: CatalogSource> Loader<S> {
    pub fn new(source: S, options: LoaderOptions) -> Self {
        let cache = SnapshotCache::new(options.cache_path.clone(), options.ttl);
        Self {
            options,
            cache,
            source,
            write_lock: Mutex::new(()),
        }
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    pub async fn load(&self) -> Result<Catalog, LoadError> {
        if self.cache.is_fresh().await {
            debug!("Using fresh snapshot at {}", self.cache.path().display());
            let snapshot = self.cache.read().await?;
            return Ok(Catalog::from_snapshot(&snapshot));
        }

        let snapshot = match self.fetch_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                if !self.cache.exists().await {
                    return Err(CatalogError::CacheUnavailable {
                        reason: e.to_string(),
                    });
                }

                warn!(
                    "Refresh failed ({}), falling back to stale snapshot at {}",
                    e,
                    self.cache.path().display()
                );
                let snapshot = self.cache.read().await?;
                return Ok(Catalog::from_snapshot(&snapshot));
            }
        };

        // Fetched data is served even when it cannot be persisted.
        if let Err(e) = self.persist(&snapshot).await {
            match std::error::Error::source(&e) {
                Some(source) => {
                    warn!("Serving fetched catalog without caching it: {}: {}", e, source)
                }
                None => warn!("Serving fetched catalog without caching it: {}", e),
            }
        }

        Ok(Catalog::from_snapshot(&snapshot))
    }

    /// Forces a refresh regardless of freshness. On failure the previous
    /// artifact is left untouched.
    pub async fn refresh(&self) -> Result<(), RefreshError> {
        let snapshot = self.fetch_snapshot().await?;
        self.persist(&snapshot).await
    }

    async fn fetch_snapshot(&self) -> Result<Snapshot, RefreshError> {
        let (channels, streams) = tokio::try_join!(
            self.source.fetch(Feed::Channels),
            self.source.fetch(Feed::Streams)
        )?;

        Ok(Snapshot::new(channels, streams))
    }

    async fn persist(&self, snapshot: &Snapshot) -> Result<(), RefreshError> {
        {
            let _guard = self.write_lock.lock().await;
            self.cache.write(snapshot).await?;
        }

        info!(
            "Refreshed catalog snapshot: {} channels, {} streams",
            snapshot.channels.len(),
            snapshot.streams.len()
        );

        Ok(())
    }

    /// Filter spec pre-seeded with the configured default country.
    pub fn default_filter(&self) -> FilterSpec {
        FilterSpec {
            country: self.options.default_country.clone(),
            ..FilterSpec::default()
        }
    }

    pub fn listing<'a>(&self, catalog: &'a Catalog, spec: &FilterSpec) -> Vec<Listing<'a>> {
        filter_and_sort_with(catalog, spec, self.options.playable)
    }
}
