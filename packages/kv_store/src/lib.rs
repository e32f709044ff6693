//! Database-backed mediastore driver.
//!
//! Drives a transactional embedded key-value substrate (`redb`). One
//! [`KvObjectStore`] instance owns one lazily opened database handle bound
//! to one namespace (database path + table name). Every contract operation
//! runs in exactly one short-lived transaction: read transactions for
//! `get`/`list`, write transactions for `set`/`remove`/`clear`.
//!
//! The substrate is blocking, so transactions run on the blocking thread
//! pool; the contract surface stays async.
//!
//! # Example
//!
//! ```rust,no_run
//! use mediastore_kv_store::{KvObjectStore, KvStoreConfig};
//! use mediastore_store::{Key, MediaObject, ObjectStore};
//!
//! # async fn demo() -> Result<(), mediastore_store::StoreError> {
//! let config = KvStoreConfig::new("media.redb", "media");
//! let mut store = KvObjectStore::new(config);
//!
//! let key = Key::parse("covers/album-7.png")?;
//! store.set(&key, MediaObject::new("image/png", vec![1, 2, 3])).await?;
//! # Ok(())
//! # }
//! ```

mod record;
mod redb_store;

pub use redb_store::{KvObjectStore, KvStoreConfig};
