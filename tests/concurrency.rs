use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use jsonkv::store::KeyStore;
use serde_json::{Map, Value, json};

const WRITERS: usize = 32;

fn single(key: String, value: Value) -> Map<String, Value> {
    let mut pairs = Map::new();
    pairs.insert(key, value);
    pairs
}

#[test]
fn concurrent_distinct_upserts_lose_nothing() {
    let store = KeyStore::new();

    thread::scope(|scope| {
        for i in 0..WRITERS {
            let store = store.clone();
            scope.spawn(move || {
                let key = format!("key-{i}");
                let outcome = store.upsert(single(key, json!({ "writer": i })), false);
                assert_eq!(outcome.set, vec![format!("key-{i}")]);
            });
        }
        // Readers run alongside the writers and never see a null value
        for _ in 0..4 {
            let store = store.clone();
            scope.spawn(move || {
                for _ in 0..100 {
                    assert!(store.snapshot().values().all(|value| !value.is_null()));
                    let _ = store.list_keys();
                }
            });
        }
    });

    let snapshot = store.snapshot();
    assert_eq!(snapshot.len(), WRITERS);
    for i in 0..WRITERS {
        assert_eq!(snapshot[&format!("key-{i}")], json!({ "writer": i }));
    }
}

#[test]
fn readers_never_observe_half_applied_batch() {
    let store = KeyStore::new();
    store.upsert(
        json!({"left": 0, "right": 0}).as_object().cloned().unwrap_or_default(),
        true,
    );
    let done = AtomicBool::new(false);

    thread::scope(|scope| {
        scope.spawn(|| {
            for n in 1..=2_000 {
                let mut batch = Map::new();
                batch.insert("left".to_string(), json!(n));
                batch.insert("right".to_string(), json!(n));
                store.upsert(batch, true);
            }
            done.store(true, Ordering::Release);
        });

        for _ in 0..4 {
            scope.spawn(|| {
                while !done.load(Ordering::Acquire) {
                    let snapshot = store.snapshot();
                    assert_eq!(snapshot["left"], snapshot["right"]);
                }
            });
        }
    });

    assert_eq!(store.get("left"), Some(json!(2_000)));
}

#[test]
fn concurrent_create_if_absent_has_single_winner() {
    let store = KeyStore::new();

    let winners: usize = thread::scope(|scope| {
        let handles: Vec<_> = (0..WRITERS)
            .map(|i| {
                let store = store.clone();
                scope.spawn(move || {
                    let pairs = single("contested".to_string(), json!(i));
                    let outcome = store.upsert(pairs, false);
                    outcome.set.len()
                })
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).sum()
    });

    assert_eq!(winners, 1);
    assert_eq!(store.list_keys().len(), 1);
}
