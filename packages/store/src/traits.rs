//! The five-operation contract every backend driver satisfies.

use async_trait::async_trait;

use crate::{Key, MediaObject, StoreError};

/// Key-addressed binary object store, bound to one namespace.
///
/// Every operation is a suspension point: both target substrates perform
/// asynchronous I/O, and control may yield to other pending work at each
/// `.await`. Read-your-own-writes ordering holds only for sequentially
/// awaited calls; operations issued concurrently race, and the final stored
/// state is substrate-determined.
///
/// The stored value type is fixed: every driver persists [`MediaObject`]
/// and nothing else, so the contract carries no generic object parameter.
///
/// Capability probing is deliberately *not* part of this trait: a probe must
/// be callable before any store handle exists, so each driver exposes a
/// static, side-effect-free `is_supported` inherent function instead.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn ObjectStore>`.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch the most recently set object for `key`.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - No object is associated with the key. Absence is a
    ///   normal outcome, not a failure.
    /// * `Ok(Some(object))` - The stored object.
    /// * `Err(StoreError)` - A substrate fault other than not-found.
    async fn get(&mut self, key: &Key) -> Result<Option<MediaObject>, StoreError>;

    /// Store `object` at `key`, fully replacing any prior value.
    ///
    /// On return the object is durably visible to subsequent `get` calls on
    /// this driver instance. There is no partial merge and no partial write:
    /// readers observe either the previous object or the new one.
    async fn set(&mut self, key: &Key, object: MediaObject) -> Result<(), StoreError>;

    /// Delete the association for `key` if present.
    ///
    /// Idempotent: removing an absent key succeeds silently.
    async fn remove(&mut self, key: &Key) -> Result<(), StoreError>;

    /// Every currently associated key in the namespace.
    ///
    /// The returned sequence is a point-in-time snapshot in unspecified
    /// order; callers must not rely on ordering or liveness.
    async fn list(&mut self) -> Result<Vec<Key>, StoreError>;

    /// Remove every key/object association in the namespace.
    ///
    /// Atomic with respect to subsequent `list` calls: a `list` issued after
    /// `clear` completes returns empty. A `set` racing the `clear` may land
    /// before or after it, commit order decides.
    async fn clear(&mut self) -> Result<(), StoreError>;
}

// Blanket implementations for references and boxes

#[async_trait]
impl<T: ObjectStore + ?Sized> ObjectStore for &mut T {
    async fn get(&mut self, key: &Key) -> Result<Option<MediaObject>, StoreError> {
        (**self).get(key).await
    }

    async fn set(&mut self, key: &Key, object: MediaObject) -> Result<(), StoreError> {
        (**self).set(key, object).await
    }

    async fn remove(&mut self, key: &Key) -> Result<(), StoreError> {
        (**self).remove(key).await
    }

    async fn list(&mut self) -> Result<Vec<Key>, StoreError> {
        (**self).list().await
    }

    async fn clear(&mut self) -> Result<(), StoreError> {
        (**self).clear().await
    }
}

#[async_trait]
impl<T: ObjectStore + ?Sized> ObjectStore for Box<T> {
    async fn get(&mut self, key: &Key) -> Result<Option<MediaObject>, StoreError> {
        self.as_mut().get(key).await
    }

    async fn set(&mut self, key: &Key, object: MediaObject) -> Result<(), StoreError> {
        self.as_mut().set(key, object).await
    }

    async fn remove(&mut self, key: &Key) -> Result<(), StoreError> {
        self.as_mut().remove(key).await
    }

    async fn list(&mut self) -> Result<Vec<Key>, StoreError> {
        self.as_mut().list().await
    }

    async fn clear(&mut self) -> Result<(), StoreError> {
        self.as_mut().clear().await
    }
}
