use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use mediastore_store::{Key, MediaObject, ObjectStore, StoreError};

use crate::entry_name;

pub(crate) const BACKEND: &str = "directory";

/// Distinguishes concurrent staging entries within one process.
static STAGING_COUNTER: AtomicU64 = AtomicU64::new(0);

fn substrate<E>(operation: &'static str, source: E) -> StoreError
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    StoreError::substrate(BACKEND, operation, source)
}

fn is_not_found(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::NotFound
}

/// Construction parameters for [`DirObjectStore`].
#[derive(Clone, Debug)]
pub struct DirStoreConfig {
    /// Root directory the substrate lives under. Must already exist and be
    /// writable; the driver never creates it.
    pub root: PathBuf,
    /// Namespace subdirectory under the root, created on first use.
    pub subdirectory: String,
}

impl DirStoreConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            subdirectory: "media".to_string(),
        }
    }

    pub fn with_subdirectory(mut self, subdirectory: impl Into<String>) -> Self {
        self.subdirectory = subdirectory.into();
        self
    }
}

/// Driver for the hierarchical filesystem substrate.
///
/// Holds no live handle: every operation checks the capability probe, then
/// re-resolves (creating if absent) the namespace subdirectory. Caching the
/// resolved directory would change the documented consistency profile when
/// the root is swapped out underneath a long-lived instance.
pub struct DirObjectStore {
    config: DirStoreConfig,
}

impl DirObjectStore {
    pub fn new(config: DirStoreConfig) -> Self {
        Self { config }
    }

    /// Capability probe: can this environment host the directory substrate?
    ///
    /// Static and side-effect-free - the root must exist, be a directory,
    /// and not be read-only. Metadata checks only.
    pub fn is_supported(root: &Path) -> bool {
        match std::fs::metadata(root) {
            Ok(attr) => attr.is_dir() && !attr.permissions().readonly(),
            Err(_) => false,
        }
    }

    fn ensure_supported(&self) -> Result<(), StoreError> {
        if Self::is_supported(&self.config.root) {
            Ok(())
        } else {
            Err(StoreError::Unsupported {
                backend: BACKEND,
                reason: format!(
                    "root '{}' is not an existing writable directory",
                    self.config.root.display()
                ),
            })
        }
    }

    /// Re-resolve the namespace directory, creating it if absent.
    async fn namespace_dir(&self) -> Result<PathBuf, StoreError> {
        let dir = self.config.root.join(&self.config.subdirectory);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| substrate("resolve", e))?;
        Ok(dir)
    }

    fn entry_path(&self, dir: &Path, key: &Key) -> PathBuf {
        dir.join(entry_name::escape_key(key.as_str()))
    }
}

/// Write the payload to a staging entry and flush it to disk.
async fn stage_write(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(data).await?;
    file.sync_all().await?;
    Ok(())
}

#[async_trait]
impl ObjectStore for DirObjectStore {
    async fn get(&mut self, key: &Key) -> Result<Option<MediaObject>, StoreError> {
        self.ensure_supported()?;
        let dir = self.namespace_dir().await?;
        let path = self.entry_path(&dir, key);

        let attr = match fs::metadata(&path).await {
            Ok(attr) => attr,
            Err(e) if is_not_found(&e) => return Ok(None),
            Err(e) => return Err(substrate("get", e)),
        };
        let data = match fs::read(&path).await {
            Ok(data) => data,
            Err(e) if is_not_found(&e) => return Ok(None),
            Err(e) => return Err(substrate("get", e)),
        };

        let modified = attr
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());
        Ok(Some(MediaObject {
            content_type: entry_name::content_type_for(key.as_str()).to_string(),
            modified,
            data: data.into(),
        }))
    }

    async fn set(&mut self, key: &Key, object: MediaObject) -> Result<(), StoreError> {
        self.ensure_supported()?;
        let dir = self.namespace_dir().await?;
        let path = self.entry_path(&dir, key);

        // Stage under a dot-prefixed name (invisible to list), then rename
        // over the final entry. The rename is the commit point.
        let staging = dir.join(format!(
            ".stage-{}-{}",
            std::process::id(),
            STAGING_COUNTER.fetch_add(1, Ordering::SeqCst)
        ));

        if let Err(e) = stage_write(&staging, &object.data).await {
            let _ = fs::remove_file(&staging).await;
            return Err(substrate("set", e));
        }
        if let Err(e) = fs::rename(&staging, &path).await {
            let _ = fs::remove_file(&staging).await;
            return Err(substrate("set", e));
        }
        Ok(())
    }

    async fn remove(&mut self, key: &Key) -> Result<(), StoreError> {
        self.ensure_supported()?;
        let dir = self.namespace_dir().await?;
        let path = self.entry_path(&dir, key);

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if is_not_found(&e) => Ok(()),
            Err(e) => Err(substrate("remove", e)),
        }
    }

    async fn list(&mut self) -> Result<Vec<Key>, StoreError> {
        self.ensure_supported()?;
        let dir = self.namespace_dir().await?;

        let mut entries = fs::read_dir(&dir).await.map_err(|e| substrate("list", e))?;
        let mut keys = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| substrate("list", e))?
        {
            // Entries racing a concurrent remove just drop out of the snapshot.
            let Ok(file_type) = entry.file_type().await else {
                continue;
            };
            if !file_type.is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                log::warn!("skipping non-unicode entry in '{}'", dir.display());
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            match entry_name::unescape_entry(name).and_then(|s| Key::parse(&s).ok()) {
                Some(key) => keys.push(key),
                None => {
                    log::warn!("skipping foreign entry '{}' in '{}'", name, dir.display());
                }
            }
        }
        Ok(keys)
    }

    async fn clear(&mut self) -> Result<(), StoreError> {
        self.ensure_supported()?;
        let dir = self.namespace_dir().await?;

        let mut entries = fs::read_dir(&dir).await.map_err(|e| substrate("clear", e))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| substrate("clear", e))?
        {
            let Ok(file_type) = entry.file_type().await else {
                continue;
            };
            if !file_type.is_file() {
                continue;
            }
            // Stale staging entries are swept up along with the objects.
            match fs::remove_file(entry.path()).await {
                Ok(()) => {}
                Err(e) if is_not_found(&e) => {}
                Err(e) => return Err(substrate("clear", e)),
            }
        }
        Ok(())
    }
}
