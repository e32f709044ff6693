//! Error types for the adapter contract.
//!
//! Absence is not represented here: a missing key is `Ok(None)` from `get`
//! and a successful no-op from `remove`. These variants cover the two
//! failure families the contract recognizes - an unusable substrate and a
//! substrate fault other than not-found.

use crate::key::KeyError;

/// Errors surfaced by [`ObjectStore`](crate::ObjectStore) operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A caller-supplied key failed validation.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// The chosen substrate is not available in this environment.
    ///
    /// Returned before any I/O is attempted, in the situations where the
    /// driver's capability probe would return false. Callers should pick a
    /// different backend at startup; drivers never fall back on their own.
    #[error("{backend} substrate is not supported in this environment: {reason}")]
    Unsupported {
        backend: &'static str,
        reason: String,
    },

    /// The native substrate reported a failure other than not-found.
    ///
    /// The cause is preserved unmodified in `source`. Quota exhaustion,
    /// permission problems, and I/O faults land here; drivers perform no
    /// retries.
    #[error("{backend} substrate failed during {operation}: {source}")]
    Substrate {
        backend: &'static str,
        operation: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl StoreError {
    /// Wrap a native substrate failure, preserving its cause.
    pub fn substrate<E>(backend: &'static str, operation: &'static str, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        StoreError::Substrate {
            backend,
            operation,
            source: source.into(),
        }
    }
}
