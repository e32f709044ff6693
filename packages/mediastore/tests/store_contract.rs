//! Cross-backend contract tests: both drivers, one set of expectations.

use bytes::Bytes;
use mediastore::{
    open, probe, Backend, DirObjectStore, DirStoreConfig, Key, KvObjectStore, KvStoreConfig,
    MediaObject, MediaStoreConfig, ObjectStore, StoreError,
};
use mediastore_store::trait_test_suite;

#[tokio::test]
async fn kv_driver_honors_the_contract() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = KvObjectStore::new(KvStoreConfig::new(dir.path().join("media.redb"), "media"));
    trait_test_suite::run_all(&mut store).await;
}

#[tokio::test]
async fn dir_driver_honors_the_contract() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = DirObjectStore::new(DirStoreConfig::new(dir.path()));
    trait_test_suite::run_all(&mut store).await;
}

#[tokio::test]
async fn opened_store_works_through_the_boxed_contract() {
    let dir = tempfile::tempdir().unwrap();
    let config = MediaStoreConfig::new(dir.path());
    assert_eq!(probe(&config), Some(Backend::Kv));

    let mut store = open(&config).unwrap();
    trait_test_suite::run_all(&mut store).await;
}

#[tokio::test]
async fn payloads_agree_across_backends() {
    let dir = tempfile::tempdir().unwrap();
    let key = Key::parse("covers/album-7.png").unwrap();
    let payload = Bytes::from_static(b"\x89PNG\r\n\x1a\n png bytes");

    let mut kv = KvObjectStore::new(KvStoreConfig::new(dir.path().join("media.redb"), "media"));
    let mut fs = DirObjectStore::new(DirStoreConfig::new(dir.path()));

    kv.set(&key, MediaObject::new("image/png", payload.clone()))
        .await
        .unwrap();
    fs.set(&key, MediaObject::new("image/png", payload.clone()))
        .await
        .unwrap();

    let from_kv = kv.get(&key).await.unwrap().unwrap();
    let from_fs = fs.get(&key).await.unwrap().unwrap();

    assert_eq!(from_kv.data, payload);
    assert_eq!(from_fs.data, payload);
    assert_eq!(from_kv.content_type, from_fs.content_type);
    assert_eq!(from_kv.size(), from_fs.size());
}

#[tokio::test]
async fn unsupported_environment_fails_fast_not_late() {
    let root = std::path::PathBuf::from("/nonexistent-mediastore-root");
    assert!(!DirObjectStore::is_supported(&root));

    let mut store = DirObjectStore::new(DirStoreConfig::new(&root));
    let key = Key::parse("k").unwrap();
    match store.set(&key, MediaObject::new("text/plain", Bytes::new())).await {
        Err(StoreError::Unsupported { backend, .. }) => assert_eq!(backend, "directory"),
        other => panic!("expected Unsupported, got {:?}", other.map(|_| ())),
    }
}
