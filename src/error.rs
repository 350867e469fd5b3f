// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// Remote endpoint unreachable, timed out, or answered with a non-success status.
    #[error("failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },
    /// Payload is not JSON or does not have the expected top-level shape.
    #[error("failed to parse {origin}: {message}")]
    Parse { origin: String, message: String },
    /// Refresh failed and there is no cache artifact to fall back to.
    #[error("catalog unavailable, no cached copy exists: {reason}")]
    CacheUnavailable { reason: String },
    #[error("io error at {path}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl CatalogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CatalogError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(origin: impl std::fmt::Display, message: impl std::fmt::Display) -> Self {
        CatalogError::Parse {
            origin: origin.to_string(),
            message: message.to_string(),
        }
    }

    pub fn is_fetch(&self) -> bool {
        matches!(self, CatalogError::Fetch { .. })
    }
}

pub type LoadError = CatalogError;
pub type RefreshError = CatalogError;

pub type Result<T> = std::result::Result<T, CatalogError>;
