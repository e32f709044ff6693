//! Directory-backed mediastore driver.
//!
//! Drives a hierarchical filesystem substrate: one flat entry per key inside
//! a per-namespace subdirectory under a caller-supplied root. The namespace
//! directory is re-resolved on every operation rather than cached - a small
//! latency cost, traded for robustness against the root changing between
//! calls.
//!
//! Writes are staged and renamed into place, so readers never observe a
//! partially written entry. Only the payload is persisted; size and
//! modified time come back from the filesystem entry, and the content type
//! is guessed from the key's extension.
//!
//! # Example
//!
//! ```rust,no_run
//! use mediastore_dir_store::{DirObjectStore, DirStoreConfig};
//! use mediastore_store::{Key, MediaObject, ObjectStore};
//!
//! # async fn demo() -> Result<(), mediastore_store::StoreError> {
//! let config = DirStoreConfig::new("/var/lib/app");
//! let mut store = DirObjectStore::new(config);
//!
//! let key = Key::parse("covers/album-7.png")?;
//! store.set(&key, MediaObject::new("image/png", vec![1, 2, 3])).await?;
//! # Ok(())
//! # }
//! ```

mod entry_name;
mod local_dir;

pub use local_dir::{DirObjectStore, DirStoreConfig};
