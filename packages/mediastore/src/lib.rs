//! Mediastore: a pluggable key-addressed binary object store.
//!
//! Persists large binary assets (media files) locally, backed by one of two
//! interchangeable substrates behind a single [`ObjectStore`] contract:
//!
//! - [`KvObjectStore`] - a transactional embedded database
//! - [`DirObjectStore`] - a directory of one entry per key
//!
//! Backend choice happens once, at startup, via capability probing; after
//! construction, calling code speaks only the contract and never learns
//! which backend is active. Drivers never fall back on their own.
//!
//! # Example
//!
//! ```rust,no_run
//! use mediastore::{open, Key, MediaObject, MediaStoreConfig};
//!
//! # async fn demo() -> Result<(), mediastore::StoreError> {
//! let config = MediaStoreConfig::new("/var/lib/app");
//! let mut store = open(&config)?;
//!
//! let key = Key::parse("covers/album-7.png")?;
//! store.set(&key, MediaObject::new("image/png", vec![1, 2, 3])).await?;
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

pub use mediastore_dir_store::{DirObjectStore, DirStoreConfig};
pub use mediastore_kv_store::{KvObjectStore, KvStoreConfig};
pub use mediastore_store::{Bytes, Key, KeyError, MediaObject, ObjectStore, StoreError};

/// The available backend drivers, in probe-preference order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    /// Transactional embedded-database substrate.
    Kv,
    /// Directory-of-entries filesystem substrate.
    Directory,
}

/// Bundled construction parameters for both drivers.
#[derive(Clone, Debug)]
pub struct MediaStoreConfig {
    pub kv: KvStoreConfig,
    pub dir: DirStoreConfig,
}

impl MediaStoreConfig {
    /// Configure both backends under one root directory, with the default
    /// `media` namespace.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            kv: KvStoreConfig::new(root.join("media.redb"), "media"),
            dir: DirStoreConfig::new(root),
        }
    }
}

/// Probe which backend the current environment supports.
///
/// Static and side-effect-free, like the per-driver probes it composes.
/// The database substrate is preferred; the directory substrate is the
/// fallback. `None` means neither substrate is usable here.
pub fn probe(config: &MediaStoreConfig) -> Option<Backend> {
    if KvObjectStore::is_supported(&config.kv) {
        Some(Backend::Kv)
    } else if DirObjectStore::is_supported(&config.dir.root) {
        Some(Backend::Directory)
    } else {
        None
    }
}

/// Probe once and construct the selected backend driver.
///
/// The choice is made here and never revisited: a store returned by this
/// function stays on its backend for its whole lifetime.
pub fn open(config: &MediaStoreConfig) -> Result<Box<dyn ObjectStore>, StoreError> {
    match probe(config) {
        Some(Backend::Kv) => Ok(Box::new(KvObjectStore::new(config.kv.clone()))),
        Some(Backend::Directory) => Ok(Box::new(DirObjectStore::new(config.dir.clone()))),
        None => Err(StoreError::Unsupported {
            backend: "mediastore",
            reason: format!(
                "no usable substrate under '{}'",
                config.dir.root.display()
            ),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_prefers_kv() {
        let dir = tempfile::tempdir().unwrap();
        let config = MediaStoreConfig::new(dir.path());
        assert_eq!(probe(&config), Some(Backend::Kv));
    }

    #[test]
    fn probe_falls_back_to_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = MediaStoreConfig::new(dir.path());
        // Break the kv probe: occupy the database path with a directory.
        std::fs::create_dir(&config.kv.database_path).unwrap();
        assert_eq!(probe(&config), Some(Backend::Directory));
    }

    #[test]
    fn open_fails_without_any_substrate() {
        let config = MediaStoreConfig::new("/nonexistent-mediastore-root");
        assert_eq!(probe(&config), None);
        assert!(matches!(
            open(&config),
            Err(StoreError::Unsupported { .. })
        ));
    }
}
