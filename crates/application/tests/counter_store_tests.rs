use std::sync::Arc;

use application::CounterStore;
use async_trait::async_trait;
use domain::{CounterId, CounterSpec, DomainError, KeyValueStore, StoredValue};
use infrastructure::MemoryKeyValueStore;
use mockall::mock;
use mockall::predicate::always;

mock! {
    pub Store {}

    #[async_trait]
    impl KeyValueStore for Store {
        async fn get(&self, key: &str) -> Result<Option<StoredValue>, DomainError>;
        async fn put_all(&self, entries: Vec<(String, StoredValue)>) -> Result<(), DomainError>;
    }
}

fn c1() -> CounterId {
    CounterId::new("counter1").unwrap()
}

fn c2() -> CounterId {
    CounterId::new("counter2").unwrap()
}

async fn fresh() -> (Arc<MemoryKeyValueStore>, CounterStore) {
    let store = Arc::new(MemoryKeyValueStore::new());
    let counters = CounterStore::load(store.clone(), CounterSpec::defaults())
        .await
        .unwrap();
    (store, counters)
}

#[tokio::test]
async fn test_fresh_counters_start_at_zero() {
    let (_, counters) = fresh().await;

    for (_, counter) in counters.counters().await {
        assert_eq!(counter.current(), 0);
        assert_eq!(counter.last_printed(), 0);
    }
    assert_eq!(
        counters.reprint_target(&c1()).await,
        Err(DomainError::NoNumberYet)
    );
}

#[tokio::test]
async fn test_advance_issues_consecutive_numbers_and_persists() {
    let (store, counters) = fresh().await;

    assert_eq!(counters.advance(&c1()).await.unwrap(), 1);
    assert_eq!(counters.advance(&c1()).await.unwrap(), 2);
    assert_eq!(counters.advance(&c1()).await.unwrap(), 3);

    let saved = store.dump();
    assert_eq!(saved.get("counter1.current"), Some(&StoredValue::Int(3)));
    assert_eq!(saved.get("counter1.last"), Some(&StoredValue::Int(3)));
    assert_eq!(counters.reprint_target(&c1()).await.unwrap(), 3);
}

#[tokio::test]
async fn test_counters_are_independent() {
    let (_, counters) = fresh().await;

    counters.advance(&c1()).await.unwrap();
    counters.advance(&c1()).await.unwrap();
    counters.advance(&c2()).await.unwrap();

    assert_eq!(counters.counter(&c1()).await.unwrap().current(), 2);
    assert_eq!(counters.counter(&c2()).await.unwrap().current(), 1);
}

#[tokio::test]
async fn test_restore_continues_the_sequence() {
    let store = Arc::new(MemoryKeyValueStore::with_entries([
        ("counter1.current", StoredValue::Int(7)),
        ("counter1.last", StoredValue::Int(7)),
    ]));
    let counters = CounterStore::load(store, CounterSpec::defaults())
        .await
        .unwrap();

    assert_eq!(counters.advance(&c1()).await.unwrap(), 8);
    assert_eq!(counters.counter(&c2()).await.unwrap().current(), 0);
}

#[tokio::test]
async fn test_restore_reads_numeric_text() {
    let store = Arc::new(MemoryKeyValueStore::with_entries([
        ("counter2.current", StoredValue::Text("12".into())),
        ("counter2.last", StoredValue::Text("11".into())),
    ]));
    let counters = CounterStore::load(store, CounterSpec::defaults())
        .await
        .unwrap();

    let counter = counters.counter(&c2()).await.unwrap();
    assert_eq!(counter.current(), 12);
    assert_eq!(counter.last_printed(), 11);
}

#[tokio::test]
async fn test_reset_clears_both_fields() {
    let (store, counters) = fresh().await;
    counters.advance(&c2()).await.unwrap();
    counters.advance(&c2()).await.unwrap();

    counters.reset(&c2()).await.unwrap();

    let counter = counters.counter(&c2()).await.unwrap();
    assert_eq!(counter.current(), 0);
    assert_eq!(counter.last_printed(), 0);
    assert_eq!(store.dump().get("counter2.current"), Some(&StoredValue::Int(0)));
    assert!(counters.pick_range(&c2()).await.is_err());
    assert!(counters.pick(&c2(), 1).await.is_err());
    assert_eq!(counters.advance(&c2()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_pick_only_accepts_issued_numbers() {
    let (_, counters) = fresh().await;
    for _ in 0..5 {
        counters.advance(&c1()).await.unwrap();
    }

    assert_eq!(counters.pick_range(&c1()).await.unwrap(), 1..=5);
    assert_eq!(counters.pick(&c1(), 3).await.unwrap(), 3);
    assert_eq!(counters.pick(&c1(), 5).await.unwrap(), 5);
    assert_eq!(
        counters.pick(&c1(), 6).await,
        Err(DomainError::OutOfRange {
            requested: 6,
            issued: 5
        })
    );
    assert!(counters.pick(&c1(), 0).await.is_err());
    assert!(counters.pick(&c1(), -2).await.is_err());

    // Picking never moves the counter
    assert_eq!(counters.counter(&c1()).await.unwrap().current(), 5);
}

#[tokio::test]
async fn test_find_by_id_or_label() {
    let (_, counters) = fresh().await;

    assert_eq!(counters.find("counter2").unwrap().label, "C2");
    assert_eq!(counters.find("c1").unwrap().id, c1());
    assert!(counters.find("counter3").is_none());
}

#[tokio::test]
async fn test_duplicate_ids_rejected() {
    let store = Arc::new(MemoryKeyValueStore::new());
    let specs = vec![
        CounterSpec::new(c1(), "A"),
        CounterSpec::new(c1(), "B"),
    ];

    assert!(matches!(
        CounterStore::load(store, specs).await,
        Err(DomainError::InvalidCounterId(_))
    ));
}

#[tokio::test]
async fn test_failed_write_leaves_counter_unchanged() {
    let mut store = MockStore::new();
    store.expect_get().returning(|key| {
        Ok(match key {
            "counter1.current" | "counter1.last" => Some(StoredValue::Int(4)),
            _ => None,
        })
    });
    store
        .expect_put_all()
        .with(always())
        .times(2)
        .returning(|_| Err(DomainError::Storage("disk full".into())));

    let counters = CounterStore::load(Arc::new(store), CounterSpec::defaults())
        .await
        .unwrap();

    assert_eq!(
        counters.advance(&c1()).await,
        Err(DomainError::Storage("disk full".into()))
    );
    assert!(counters.reset(&c1()).await.is_err());

    let counter = counters.counter(&c1()).await.unwrap();
    assert_eq!(counter.current(), 4);
    assert_eq!(counter.last_printed(), 4);
}

#[tokio::test]
async fn test_concurrent_advances_issue_distinct_numbers() {
    let (_, counters) = fresh().await;
    let counters = Arc::new(counters);

    let mut handles = Vec::new();
    for _ in 0..20 {
        let counters = counters.clone();
        handles.push(tokio::spawn(async move { counters.advance(&c1()).await }));
    }

    let mut numbers = Vec::new();
    for handle in handles {
        numbers.push(handle.await.unwrap().unwrap());
    }
    numbers.sort_unstable();

    assert_eq!(numbers, (1..=20).collect::<Vec<u32>>());
}
