// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};

use tokio::fs as async_fs;
use tracing::debug;

use crate::error::{CatalogError, Result};
use crate::model::Snapshot;

pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

// Keeps temporary file names unique across writers within one process.
static WRITE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Freshness is decided from the artifact's modification time only.
/// A modification time in the future counts as age zero.
pub fn is_fresh_at(modified: Option<SystemTime>, now: SystemTime, ttl: Duration) -> bool {
    match modified {
        None => false,
        Some(modified) => {
            let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
            age < ttl
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheStatus {
    pub path: PathBuf,
    pub exists: bool,
    pub size_bytes: u64,
    pub age: Option<Duration>,
    pub fresh: bool,
    pub fetched_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// The on-disk snapshot artifact.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    path: PathBuf,
    ttl: Duration,
}

impl SnapshotCache {
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn exists(&self) -> bool {
        async_fs::try_exists(&self.path).await.unwrap_or(false)
    }

    async fn modified(&self) -> Option<SystemTime> {
        async_fs::metadata(&self.path)
            .await
            .ok()
            .filter(|m| m.is_file())
            .and_then(|m| m.modified().ok())
    }

    pub async fn is_fresh(&self) -> bool {
        is_fresh_at(self.modified().await, SystemTime::now(), self.ttl)
    }

    pub async fn read(&self) -> Result<Snapshot> {
        let content = async_fs::read_to_string(&self.path)
            .await
            .map_err(|e| CatalogError::io(&self.path, e))?;

        let snapshot: Snapshot = serde_json::from_str(&content)
            .map_err(|e| CatalogError::parse(self.path.display(), e))?;

        debug!(
            "Read snapshot from {} ({} channels, {} streams)",
            self.path.display(),
            snapshot.channels.len(),
            snapshot.streams.len()
        );

        Ok(snapshot)
    }

    /// Writes to a sibling temporary file and renames it over the artifact,
    /// so readers see either the previous snapshot or the new one.
    pub async fn write(&self, snapshot: &Snapshot) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| CatalogError::io(parent, e))?;
        }

        let content = serde_json::to_vec(snapshot)
            .map_err(|e| CatalogError::parse(self.path.display(), e))?;

        let tmp_path = self.temp_path();
        if let Err(e) = async_fs::write(&tmp_path, &content).await {
            let _ = async_fs::remove_file(&tmp_path).await;
            return Err(CatalogError::io(&tmp_path, e));
        }

        if let Err(e) = async_fs::rename(&tmp_path, &self.path).await {
            let _ = async_fs::remove_file(&tmp_path).await;
            return Err(CatalogError::io(&self.path, e));
        }

        debug!(
            "Wrote snapshot to {} ({} bytes)",
            self.path.display(),
            content.len()
        );

        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "snapshot".to_string());
        let seq = WRITE_SEQ.fetch_add(1, Ordering::Relaxed);
        self.path.with_file_name(format!(
            ".{}.{}.{}.tmp",
            file_name,
            std::process::id(),
            seq
        ))
    }

    pub async fn status(&self) -> CacheStatus {
        let metadata = async_fs::metadata(&self.path)
            .await
            .ok()
            .filter(|m| m.is_file());
        let modified = metadata.as_ref().and_then(|m| m.modified().ok());
        let now = SystemTime::now();

        let fetched_at = if metadata.is_some() {
            self.read().await.ok().and_then(|s| s.fetched_at())
        } else {
            None
        };

        CacheStatus {
            path: self.path.clone(),
            exists: metadata.is_some(),
            size_bytes: metadata.as_ref().map(|m| m.len()).unwrap_or(0),
            age: modified.map(|m| now.duration_since(m).unwrap_or(Duration::ZERO)),
            fresh: is_fresh_at(modified, now, self.ttl),
            fetched_at,
        }
    }

    /// Removes the artifact. A missing artifact is not an error.
    pub async fn clear(&self) -> Result<bool> {
        match async_fs::remove_file(&self.path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CatalogError::io(&self.path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_freshness_is_strict() {
        let now = SystemTime::now();
        let ttl = Duration::from_secs(1800);

        assert!(!is_fresh_at(None, now, ttl));
        assert!(is_fresh_at(Some(now), now, ttl));
        assert!(is_fresh_at(Some(now - Duration::from_secs(1799)), now, ttl));
        assert!(!is_fresh_at(Some(now - Duration::from_secs(1800)), now, ttl));
        assert!(!is_fresh_at(Some(now - Duration::from_secs(7200)), now, ttl));
    }

    #[test]
    fn test_future_mtime_is_fresh() {
        let now = SystemTime::now();
        let future = now + Duration::from_secs(60);
        assert!(is_fresh_at(Some(future), now, Duration::from_secs(10)));
    }

    #[test]
    fn test_zero_ttl_is_never_fresh() {
        let now = SystemTime::now();
        assert!(!is_fresh_at(Some(now), now, Duration::ZERO));
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let cache = SnapshotCache::new(dir.path().join("nested").join("cache.json"), DEFAULT_TTL);
        assert!(!cache.exists().await);
        assert!(!cache.is_fresh().await);

        let snapshot = Snapshot::new(
            vec![json!({"id": "canal", "name": "Canal Tú", "country": "MX"})],
            vec![json!({"channel": "canal", "url": "http://x/1"})],
        );
        cache.write(&snapshot).await.unwrap();

        assert!(cache.exists().await);
        assert!(cache.is_fresh().await);
        assert_eq!(cache.read().await.unwrap(), snapshot);

        let raw = std::fs::read_to_string(cache.path()).unwrap();
        assert!(raw.contains("Canal Tú"));
    }

    #[tokio::test]
    async fn test_write_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let cache = SnapshotCache::new(dir.path().join("cache.json"), DEFAULT_TTL);
        cache.write(&Snapshot::new(vec![], vec![])).await.unwrap();
        cache.write(&Snapshot::new(vec![], vec![])).await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, vec!["cache.json"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers_do_not_share_temp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let first = SnapshotCache::new(&path, DEFAULT_TTL);
        let second = SnapshotCache::new(&path, DEFAULT_TTL);

        let big = Snapshot::new(
            (0..2000)
                .map(|i| json!({"id": format!("ch{i}"), "name": format!("Channel {i}")}))
                .collect(),
            vec![],
        );
        let small = Snapshot::new(vec![json!({"id": "solo"})], vec![]);

        for _ in 0..10 {
            let (a, b) = tokio::join!(first.write(&big), second.write(&small));
            a.unwrap();
            b.unwrap();

            let on_disk = first.read().await.unwrap();
            assert!(on_disk == big || on_disk == small);
        }

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, vec!["cache.json"]);
    }

    #[tokio::test]
    async fn test_read_rejects_wrong_shape() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, r#"{"channels": {}, "streams": []}"#).unwrap();

        let cache = SnapshotCache::new(&path, DEFAULT_TTL);
        let err = cache.read().await.unwrap_err();
        assert!(matches!(err, CatalogError::Parse { .. }));

        std::fs::write(&path, "not json").unwrap();
        let err = cache.read().await.unwrap_err();
        assert!(matches!(err, CatalogError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_status_and_clear() {
        let dir = TempDir::new().unwrap();
        let cache = SnapshotCache::new(dir.path().join("cache.json"), DEFAULT_TTL);

        let status = cache.status().await;
        assert!(!status.exists);
        assert!(!status.fresh);
        assert_eq!(status.size_bytes, 0);

        cache.write(&Snapshot::new(vec![], vec![])).await.unwrap();
        let status = cache.status().await;
        assert!(status.exists);
        assert!(status.fresh);
        assert!(status.size_bytes > 0);
        assert!(status.fetched_at.is_some());

        assert!(cache.clear().await.unwrap());
        assert!(!cache.clear().await.unwrap());
        assert!(!cache.exists().await);
    }
}
