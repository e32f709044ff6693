//! Mediastore: the adapter contract for key-addressed binary object stores.
//!
//! This is the narrow waist of the mediastore stack. Everything at this level
//! is backend-neutral: a validated [`Key`], a [`MediaObject`] payload with its
//! metadata, and the five-operation [`ObjectStore`] contract that every
//! backend driver satisfies.
//!
//! Two drivers ship in sibling crates:
//!
//! - `mediastore-kv-store` - a transactional embedded database substrate
//! - `mediastore-dir-store` - a directory-of-entries filesystem substrate
//!
//! Callers probe each driver's `is_supported` at startup, construct exactly
//! one driver per namespace, and from then on speak only this contract.
//!
//! # Absence is not an error
//!
//! `get` on a missing key returns `Ok(None)` and `remove` on a missing key
//! returns `Ok(())`. Drivers translate their substrate's not-found signal
//! into these results; only genuine substrate faults surface as
//! [`StoreError`].
//!
//! # Example
//!
//! ```rust
//! use mediastore_store::{Key, MediaObject, ObjectStore, StoreError};
//!
//! async fn thumbnail(
//!     store: &mut dyn ObjectStore,
//!     id: &str,
//! ) -> Result<Option<MediaObject>, StoreError> {
//!     let key = Key::parse(id)?;
//!     store.get(&key).await
//! }
//! ```

pub use bytes::Bytes;

mod error;
mod key;
mod object;
mod traits;

pub use error::StoreError;
pub use key::{Key, KeyError};
pub use object::MediaObject;
pub use traits::ObjectStore;

#[cfg(any(test, feature = "test-utils"))]
pub mod trait_test_suite;
