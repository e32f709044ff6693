use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use redb::{Database, ReadableTable, TableDefinition, TableError};
use tokio::task;

use mediastore_store::{Key, MediaObject, ObjectStore, StoreError};

use crate::record;

pub(crate) const BACKEND: &str = "kv";

/// Meta table carrying the provisioned schema version.
const META_TABLE: TableDefinition<&str, u32> = TableDefinition::new("mediastore_meta");
const SCHEMA_VERSION_KEY: &str = "schema_version";

fn substrate<E>(operation: &'static str, source: E) -> StoreError
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    StoreError::substrate(BACKEND, operation, source)
}

/// Construction parameters for [`KvObjectStore`].
///
/// The namespace is the (database path, table name) pair; one driver
/// instance is bound to exactly one such pair for its lifetime.
#[derive(Clone, Debug)]
pub struct KvStoreConfig {
    /// Filesystem path of the database file.
    pub database_path: PathBuf,
    /// Name of the object table inside the database.
    pub table_name: String,
    /// Schema version recorded on first provisioning.
    pub schema_version: u32,
}

impl KvStoreConfig {
    pub fn new(database_path: impl Into<PathBuf>, table_name: impl Into<String>) -> Self {
        Self {
            database_path: database_path.into(),
            table_name: table_name.into(),
            schema_version: 1,
        }
    }
}

/// Driver for the transactional embedded-database substrate.
///
/// The database handle is created on first use and cached for the instance
/// lifetime. If that first open fails, the failure is latched and every
/// subsequent operation reports an unavailable substrate without retrying;
/// picking a different backend is the caller's decision, made once at
/// startup via capability probing.
pub struct KvObjectStore {
    config: KvStoreConfig,
    db: Option<Arc<Database>>,
    open_failed: bool,
}

impl KvObjectStore {
    pub fn new(config: KvStoreConfig) -> Self {
        Self {
            config,
            db: None,
            open_failed: false,
        }
    }

    /// Capability probe: can this environment host the database substrate?
    ///
    /// Static and side-effect-free - metadata checks only, nothing is opened
    /// or created. The parent directory of the database path must be a
    /// writable directory, and an existing database path must be a regular
    /// file.
    pub fn is_supported(config: &KvStoreConfig) -> bool {
        let parent = match config.database_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let Ok(attr) = fs::metadata(parent) else {
            return false;
        };
        if !attr.is_dir() || attr.permissions().readonly() {
            return false;
        }
        match fs::metadata(&config.database_path) {
            Ok(file_attr) => file_attr.is_file(),
            Err(_) => true,
        }
    }

    /// Open (and provision, on first ever open) the cached database handle.
    async fn database(&mut self, operation: &'static str) -> Result<Arc<Database>, StoreError> {
        if let Some(db) = &self.db {
            return Ok(Arc::clone(db));
        }
        if self.open_failed {
            return Err(substrate(operation, "database previously failed to open"));
        }
        if !Self::is_supported(&self.config) {
            return Err(StoreError::Unsupported {
                backend: BACKEND,
                reason: format!(
                    "database path '{}' is not usable",
                    self.config.database_path.display()
                ),
            });
        }

        let config = self.config.clone();
        let opened = task::spawn_blocking(move || open_database(&config))
            .await
            .map_err(|e| substrate(operation, e))?;

        match opened {
            Ok(db) => {
                let db = Arc::new(db);
                self.db = Some(Arc::clone(&db));
                Ok(db)
            }
            Err(err) => {
                self.open_failed = true;
                Err(err)
            }
        }
    }
}

/// Create the database file if absent and provision the object and meta
/// tables. Provisioning is idempotent; the schema version is written when
/// missing or lower than the configured one.
fn open_database(config: &KvStoreConfig) -> Result<Database, StoreError> {
    let db = Database::create(&config.database_path).map_err(|e| substrate("open", e))?;

    let txn = db.begin_write().map_err(|e| substrate("open", e))?;
    {
        txn.open_table(TableDefinition::<&str, &[u8]>::new(&config.table_name))
            .map_err(|e| substrate("open", e))?;

        let mut meta = txn.open_table(META_TABLE).map_err(|e| substrate("open", e))?;
        let recorded = meta
            .get(SCHEMA_VERSION_KEY)
            .map_err(|e| substrate("open", e))?
            .map(|guard| guard.value());
        if recorded.map_or(true, |v| v < config.schema_version) {
            meta.insert(SCHEMA_VERSION_KEY, config.schema_version)
                .map_err(|e| substrate("open", e))?;
            log::debug!(
                "provisioned table '{}' at schema version {}",
                config.table_name,
                config.schema_version
            );
        }
    }
    txn.commit().map_err(|e| substrate("open", e))?;

    Ok(db)
}

#[async_trait]
impl ObjectStore for KvObjectStore {
    async fn get(&mut self, key: &Key) -> Result<Option<MediaObject>, StoreError> {
        let db = self.database("get").await?;
        let table_name = self.config.table_name.clone();
        let key = key.clone();

        task::spawn_blocking(move || {
            let txn = db.begin_read().map_err(|e| substrate("get", e))?;
            let table = match txn.open_table(TableDefinition::<&str, &[u8]>::new(&table_name)) {
                Ok(table) => table,
                Err(TableError::TableDoesNotExist(_)) => return Ok(None),
                Err(e) => return Err(substrate("get", e)),
            };
            let Some(guard) = table.get(key.as_str()).map_err(|e| substrate("get", e))? else {
                return Ok(None);
            };
            Ok(record::decode(&key, guard.value()))
        })
        .await
        .map_err(|e| substrate("get", e))?
    }

    async fn set(&mut self, key: &Key, object: MediaObject) -> Result<(), StoreError> {
        let db = self.database("set").await?;
        let table_name = self.config.table_name.clone();
        let payload = record::encode(key, &object)?;
        let key = key.clone();

        task::spawn_blocking(move || {
            let txn = db.begin_write().map_err(|e| substrate("set", e))?;
            {
                let mut table = txn
                    .open_table(TableDefinition::<&str, &[u8]>::new(&table_name))
                    .map_err(|e| substrate("set", e))?;
                table
                    .insert(key.as_str(), payload.as_slice())
                    .map_err(|e| substrate("set", e))?;
            }
            txn.commit().map_err(|e| substrate("set", e))
        })
        .await
        .map_err(|e| substrate("set", e))?
    }

    async fn remove(&mut self, key: &Key) -> Result<(), StoreError> {
        let db = self.database("remove").await?;
        let table_name = self.config.table_name.clone();
        let key = key.clone();

        task::spawn_blocking(move || {
            let txn = db.begin_write().map_err(|e| substrate("remove", e))?;
            {
                let mut table = txn
                    .open_table(TableDefinition::<&str, &[u8]>::new(&table_name))
                    .map_err(|e| substrate("remove", e))?;
                // Removing an absent key is a no-op, so the prior value is
                // deliberately ignored.
                table
                    .remove(key.as_str())
                    .map_err(|e| substrate("remove", e))?;
            }
            txn.commit().map_err(|e| substrate("remove", e))
        })
        .await
        .map_err(|e| substrate("remove", e))?
    }

    async fn list(&mut self) -> Result<Vec<Key>, StoreError> {
        let db = self.database("list").await?;
        let table_name = self.config.table_name.clone();

        task::spawn_blocking(move || {
            let txn = db.begin_read().map_err(|e| substrate("list", e))?;
            let table = match txn.open_table(TableDefinition::<&str, &[u8]>::new(&table_name)) {
                Ok(table) => table,
                Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
                Err(e) => return Err(substrate("list", e)),
            };

            let mut keys = Vec::new();
            for item in table.iter().map_err(|e| substrate("list", e))? {
                let (stored_key, _value) = item.map_err(|e| substrate("list", e))?;
                match Key::parse(stored_key.value()) {
                    Ok(key) => keys.push(key),
                    Err(err) => {
                        log::warn!("skipping unlistable stored key: {}", err);
                    }
                }
            }
            Ok(keys)
        })
        .await
        .map_err(|e| substrate("list", e))?
    }

    async fn clear(&mut self) -> Result<(), StoreError> {
        let db = self.database("clear").await?;
        let table_name = self.config.table_name.clone();

        task::spawn_blocking(move || {
            let txn = db.begin_write().map_err(|e| substrate("clear", e))?;
            // Drop and recreate inside one transaction: a list issued after
            // commit sees the empty table, never a partial deletion.
            txn.delete_table(TableDefinition::<&str, &[u8]>::new(&table_name))
                .map_err(|e| substrate("clear", e))?;
            txn.open_table(TableDefinition::<&str, &[u8]>::new(&table_name))
                .map_err(|e| substrate("clear", e))?;
            txn.commit().map_err(|e| substrate("clear", e))
        })
        .await
        .map_err(|e| substrate("clear", e))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use mediastore_store::trait_test_suite;

    fn test_store(dir: &tempfile::TempDir) -> KvObjectStore {
        let config = KvStoreConfig::new(dir.path().join("media.redb"), "media");
        KvObjectStore::new(config)
    }

    #[tokio::test]
    async fn passes_contract_suite() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = test_store(&dir);
        trait_test_suite::run_all(&mut store).await;
    }

    #[tokio::test]
    async fn metadata_roundtrips_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = test_store(&dir);

        let key = Key::parse("covers/album-7.png").unwrap();
        let object = MediaObject::new("image/png", Bytes::from_static(b"\x89PNG\r\n"));
        store.set(&key, object.clone()).await.unwrap();

        let found = store.get(&key).await.unwrap().unwrap();
        assert_eq!(found, object);
    }

    #[tokio::test]
    async fn persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let key = Key::parse("durable").unwrap();

        {
            let mut store = test_store(&dir);
            store
                .set(&key, MediaObject::new("text/plain", Bytes::from_static(b"kept")))
                .await
                .unwrap();
        }

        let mut store = test_store(&dir);
        let found = store.get(&key).await.unwrap().unwrap();
        assert_eq!(found.data, Bytes::from_static(b"kept"));
    }

    #[tokio::test]
    async fn bare_object_records_are_readable() {
        let dir = tempfile::tempdir().unwrap();
        let config = KvStoreConfig::new(dir.path().join("media.redb"), "media");
        let key = Key::parse("legacy.bin").unwrap();
        let object = MediaObject::new("application/octet-stream", Bytes::from_static(b"old"));

        // Plant a record in the earlier bare-object layout directly.
        {
            let db = Database::create(&config.database_path).unwrap();
            let txn = db.begin_write().unwrap();
            {
                let mut table = txn
                    .open_table(TableDefinition::<&str, &[u8]>::new("media"))
                    .unwrap();
                let bytes = bincode::serialize(&object).unwrap();
                table.insert(key.as_str(), bytes.as_slice()).unwrap();
            }
            txn.commit().unwrap();
        }

        let mut store = KvObjectStore::new(config);
        let found = store.get(&key).await.unwrap().unwrap();
        assert_eq!(found, object);
    }

    #[tokio::test]
    async fn malformed_record_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let config = KvStoreConfig::new(dir.path().join("media.redb"), "media");
        let key = Key::parse("corrupt").unwrap();

        {
            let db = Database::create(&config.database_path).unwrap();
            let txn = db.begin_write().unwrap();
            {
                let mut table = txn
                    .open_table(TableDefinition::<&str, &[u8]>::new("media"))
                    .unwrap();
                table
                    .insert(key.as_str(), b"\xde\xad\xbe\xef".as_slice())
                    .unwrap();
            }
            txn.commit().unwrap();
        }

        let mut store = KvObjectStore::new(config);
        assert!(store.get(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unsupported_environment_fails_fast() {
        let config = KvStoreConfig::new("/nonexistent-mediastore-root/media.redb", "media");
        assert!(!KvObjectStore::is_supported(&config));

        let mut store = KvObjectStore::new(config);
        let key = Key::parse("k").unwrap();
        assert!(matches!(
            store.get(&key).await,
            Err(StoreError::Unsupported { .. })
        ));
    }

    #[tokio::test]
    async fn open_failure_latches() {
        // A file that is not a database passes the probe but fails to open.
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("media.redb");
        std::fs::write(&db_path, b"not a database").unwrap();

        let mut store = KvObjectStore::new(KvStoreConfig::new(&db_path, "media"));
        let key = Key::parse("k").unwrap();

        assert!(matches!(
            store.get(&key).await,
            Err(StoreError::Substrate { .. })
        ));
        // Latch: still failing, without another open attempt.
        assert!(matches!(
            store.list().await,
            Err(StoreError::Substrate { .. })
        ));
    }

    #[test]
    fn probe_checks_environment() {
        let dir = tempfile::tempdir().unwrap();

        let fresh = KvStoreConfig::new(dir.path().join("media.redb"), "media");
        assert!(KvObjectStore::is_supported(&fresh));

        let missing_parent = KvStoreConfig::new(dir.path().join("no/such/dir/media.redb"), "media");
        assert!(!KvObjectStore::is_supported(&missing_parent));

        // An existing path that is not a regular file cannot host a database.
        let occupied = dir.path().join("occupied.redb");
        std::fs::create_dir(&occupied).unwrap();
        assert!(!KvObjectStore::is_supported(&KvStoreConfig::new(&occupied, "media")));
    }

    #[test]
    fn probe_rejects_readonly_parent() {
        let dir = tempfile::tempdir().unwrap();
        let locked = dir.path().join("locked");
        std::fs::create_dir(&locked).unwrap();

        let mut perms = std::fs::metadata(&locked).unwrap().permissions();
        perms.set_readonly(true);
        std::fs::set_permissions(&locked, perms.clone()).unwrap();
        let config = KvStoreConfig::new(locked.join("media.redb"), "media");
        assert!(!KvObjectStore::is_supported(&config));

        // Restore so the tempdir can clean up.
        perms.set_readonly(false);
        std::fs::set_permissions(&locked, perms).unwrap();
        assert!(KvObjectStore::is_supported(&config));
    }
}
