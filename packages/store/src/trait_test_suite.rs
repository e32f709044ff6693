//! Shared conformance checks for [`ObjectStore`] implementations.
//!
//! Driver crates enable the `test-utils` feature and run these against a
//! freshly constructed, empty store. Each check leaves the namespace empty
//! so they can be chained on one instance.

use bytes::Bytes;

use crate::{Key, MediaObject, ObjectStore};

fn key(s: &str) -> Key {
    Key::parse(s).unwrap()
}

fn object(payload: &'static [u8]) -> MediaObject {
    MediaObject::new("application/octet-stream", Bytes::from_static(payload))
}

/// `get` on a never-set key yields `Ok(None)`, not an error.
pub async fn get_missing_is_absent(store: &mut impl ObjectStore) {
    let found = store.get(&key("missing")).await.unwrap();
    assert!(found.is_none());
}

/// `set` followed by a sequential `get` returns a bit-identical payload.
pub async fn set_then_get_roundtrips(store: &mut impl ObjectStore) {
    let k = key("roundtrip.bin");
    let stored = object(b"\x00\x01\x02\xff payload");

    store.set(&k, stored.clone()).await.unwrap();
    let found = store.get(&k).await.unwrap().expect("object should be present");
    assert_eq!(found.data, stored.data);
    assert_eq!(found.size(), stored.size());

    store.remove(&k).await.unwrap();
}

/// Two sequential `set` calls on one key: the second payload wins.
pub async fn last_write_wins(store: &mut impl ObjectStore) {
    let k = key("contested");

    store.set(&k, object(b"first")).await.unwrap();
    store.set(&k, object(b"second")).await.unwrap();

    let found = store.get(&k).await.unwrap().expect("object should be present");
    assert_eq!(found.data, Bytes::from_static(b"second"));

    store.remove(&k).await.unwrap();
}

/// `remove` succeeds whether or not the key is present.
pub async fn remove_is_idempotent(store: &mut impl ObjectStore) {
    let k = key("ephemeral");

    store.remove(&k).await.unwrap();
    store.set(&k, object(b"x")).await.unwrap();
    store.remove(&k).await.unwrap();
    store.remove(&k).await.unwrap();

    assert!(store.get(&k).await.unwrap().is_none());
}

/// `list` reflects sets and removes, order-independently.
pub async fn list_tracks_live_keys(store: &mut impl ObjectStore) {
    let k1 = key("one");
    let k2 = key("two");

    store.set(&k1, object(b"1")).await.unwrap();
    store.set(&k2, object(b"2")).await.unwrap();
    store.remove(&k1).await.unwrap();

    let listed = store.list().await.unwrap();
    assert_eq!(listed, vec![k2.clone()]);

    store.remove(&k2).await.unwrap();
}

/// Three keys in, `list` returns exactly that set; `clear` empties it.
pub async fn clear_empties_namespace(store: &mut impl ObjectStore) {
    store.set(&key("a"), object(b"alpha")).await.unwrap();
    store.set(&key("b"), object(b"bravo")).await.unwrap();
    store.set(&key("c"), object(b"charlie")).await.unwrap();

    let mut listed = store.list().await.unwrap();
    listed.sort();
    assert_eq!(listed, vec![key("a"), key("b"), key("c")]);

    store.clear().await.unwrap();
    assert!(store.list().await.unwrap().is_empty());
}

/// Keys that could collide under naive name mapping stay distinct.
pub async fn multi_part_keys_stay_distinct(store: &mut impl ObjectStore) {
    let slash = key("covers/a.png");
    let literal = key("covers%2Fa.png");

    store.set(&slash, object(b"slash")).await.unwrap();
    store.set(&literal, object(b"literal")).await.unwrap();

    let found = store.get(&slash).await.unwrap().expect("slash key present");
    assert_eq!(found.data, Bytes::from_static(b"slash"));
    let found = store.get(&literal).await.unwrap().expect("literal key present");
    assert_eq!(found.data, Bytes::from_static(b"literal"));

    let mut listed = store.list().await.unwrap();
    listed.sort();
    assert_eq!(listed, vec![literal.clone(), slash.clone()]);

    store.clear().await.unwrap();
}

/// Run every check in sequence against one store instance.
pub async fn run_all(store: &mut impl ObjectStore) {
    get_missing_is_absent(store).await;
    set_then_get_roundtrips(store).await;
    last_write_wins(store).await;
    remove_is_idempotent(store).await;
    list_tracks_live_keys(store).await;
    clear_empties_namespace(store).await;
    multi_part_keys_stay_distinct(store).await;
}
