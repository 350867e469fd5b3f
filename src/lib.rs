// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod source;
pub mod sweep;

pub use cache::SnapshotCache;
pub use catalog::Catalog;
pub use config::Config;
pub use error::{CatalogError, LoadError, RefreshError, Result};
pub use filter::{FilterSpec, Listing, filter_and_sort, filter_and_sort_with};
pub use loader::{Loader, LoaderOptions};
pub use model::{Channel, Snapshot, Stream};
pub use source::{CatalogSource, Feed, HttpSource};
pub use sweep::Sweeper;
