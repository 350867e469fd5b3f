// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::loader::LoaderOptions;
use crate::source::{DEFAULT_CHANNELS_URL, DEFAULT_STREAMS_URL, HttpSource};
use crate::sweep::Sweeper;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub cache: CacheConfig,
    pub filter: FilterConfig,
    pub sweep: SweepConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub channels_url: String,
    pub streams_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub dir: PathBuf,
    pub file_name: String,
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub default_country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub dir: PathBuf,
    pub max_age_secs: u64,
    pub period_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            channels_url: DEFAULT_CHANNELS_URL.to_string(),
            streams_url: DEFAULT_STREAMS_URL.to_string(),
            timeout_secs: 20,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: dirs::cache_dir()
                .map(|p| p.join("iptv-catalog"))
                .unwrap_or_else(|| PathBuf::from("cache")),
            file_name: "iptv_cache.json".to_string(),
            ttl_secs: 30 * 60,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            default_country: "MX".to_string(),
        }
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("downloads"),
            max_age_secs: 60 * 60,
            period_secs: 5 * 60,
        }
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join("iptv-catalog").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;

        Ok(config)
    }

    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize config to TOML")?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Applies environment overrides from the process environment.
    pub fn with_env(self) -> Self {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    pub fn with_env_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = var("IPTV_CACHE_DIR") {
            self.cache.dir = PathBuf::from(dir);
        }
        if let Some(ttl) = var("IPTV_CACHE_TTL") {
            match ttl.trim().parse() {
                Ok(secs) => self.cache.ttl_secs = secs,
                Err(_) => tracing::warn!("Ignoring invalid IPTV_CACHE_TTL: {}", ttl),
            }
        }
        if let Some(country) = var("DEFAULT_COUNTRY") {
            self.filter.default_country = country.trim().to_string();
        }
        if let Some(url) = var("IPTV_CHANNELS_URL") {
            self.source.channels_url = url;
        }
        if let Some(url) = var("IPTV_STREAMS_URL") {
            self.source.streams_url = url;
        }
        if let Some(dir) = var("IPTV_DOWNLOAD_DIR") {
            self.sweep.dir = PathBuf::from(dir);
        }

        self
    }

    pub fn cache_path(&self) -> PathBuf {
        self.cache.dir.join(&self.cache.file_name)
    }

    pub fn loader_options(&self) -> LoaderOptions {
        let country = Some(self.filter.default_country.clone());
        LoaderOptions::new(self.cache_path())
            .ttl(Duration::from_secs(self.cache.ttl_secs))
            .default_country(country)
    }

    pub fn http_source(&self) -> Result<HttpSource> {
        HttpSource::new(
            self.source.channels_url.clone(),
            self.source.streams_url.clone(),
            Duration::from_secs(self.source.timeout_secs),
        )
        .with_context(|| "Failed to create HTTP client")
    }

    pub fn sweeper(&self) -> Sweeper {
        Sweeper::new(self.sweep.dir.clone())
            .max_age(Duration::from_secs(self.sweep.max_age_secs))
            .period(Duration::from_secs(self.sweep.period_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.cache.ttl_secs, 1800);
        assert_eq!(config.filter.default_country, "MX");
        assert_eq!(config.source.timeout_secs, 20);
        assert!(config.cache_path().ends_with("iptv_cache.json"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [cache]
            ttl_secs = 60

            [filter]
            default_country = "UK"
            "#,
        )
        .unwrap();
        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(config.cache.file_name, "iptv_cache.json");
        assert_eq!(config.filter.default_country, "UK");
        assert_eq!(config.source.channels_url, DEFAULT_CHANNELS_URL);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("IPTV_CACHE_DIR", "/var/cache/iptv"),
            ("IPTV_CACHE_TTL", "90"),
            ("DEFAULT_COUNTRY", " FR "),
            ("IPTV_STREAMS_URL", "http://mirror/streams.json"),
        ]);
        let config = Config::default().with_env_from(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.cache_path(), PathBuf::from("/var/cache/iptv/iptv_cache.json"));
        assert_eq!(config.cache.ttl_secs, 90);
        assert_eq!(config.filter.default_country, "FR");
        assert_eq!(config.source.streams_url, "http://mirror/streams.json");
        assert_eq!(config.source.channels_url, DEFAULT_CHANNELS_URL);
    }

    #[test]
    fn test_invalid_env_ttl_is_ignored() {
        let config = Config::default().with_env_from(|k| {
            (k == "IPTV_CACHE_TTL").then(|| "half an hour".to_string())
        });
        assert_eq!(config.cache.ttl_secs, 1800);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("conf").join("config.toml");

        let mut config = Config::default();
        config.filter.default_country = "AR".to_string();
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);

        let missing = Config::load_or_default(dir.path().join("missing.toml")).unwrap();
        assert_eq!(missing, Config::default());
    }

    #[test]
    fn test_loader_options_from_config() {
        let mut config = Config::default();
        config.cache.ttl_secs = 5;
        let options = config.loader_options();
        assert_eq!(options.ttl, Duration::from_secs(5));
        assert_eq!(options.default_country.as_deref(), Some("MX"));

        config.filter.default_country = String::new();
        assert_eq!(config.loader_options().default_country, None);
    }

    #[test]
    fn test_zero_sweep_period_is_clamped() {
        let config: Config = toml::from_str(
            r#"
            [sweep]
            period_secs = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.sweep.period_secs, 0);
        assert_eq!(config.sweeper().period, crate::sweep::MIN_PERIOD);
    }
}
