use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::Arc;

use domain::{Counter, CounterId, CounterSpec, DomainError, KeyValueStore, StoredValue};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Owns the per-counter sequences and keeps them in step with the store.
///
/// Every mutation computes the next `Counter`, persists both fields in one
/// `put_all`, and only then replaces the in-memory value, all under one lock.
/// A failed write therefore leaves the counter exactly as it was.
pub struct CounterStore {
    store: Arc<dyn KeyValueStore>,
    specs: Vec<CounterSpec>,
    counters: Mutex<HashMap<CounterId, Counter>>,
}

impl CounterStore {
    /// Restore all counters from the store. Missing keys read as `0`.
    pub async fn load(
        store: Arc<dyn KeyValueStore>,
        specs: Vec<CounterSpec>,
    ) -> Result<Self, DomainError> {
        let mut counters = HashMap::with_capacity(specs.len());

        for spec in &specs {
            if counters.contains_key(&spec.id) {
                return Err(DomainError::InvalidCounterId(format!(
                    "Duplicate counter ID: {}",
                    spec.id
                )));
            }

            let current = read_int(store.as_ref(), &spec.id.current_key()).await?;
            let last = read_int(store.as_ref(), &spec.id.last_key()).await?;
            let counter = Counter::restore(spec.id.clone(), current, last);

            debug!(counter = %spec.id, current = counter.current(), last = counter.last_printed(), "Counter restored");
            counters.insert(spec.id.clone(), counter);
        }

        info!(count = specs.len(), "Counters loaded");

        Ok(Self {
            store,
            specs,
            counters: Mutex::new(counters),
        })
    }

    pub fn specs(&self) -> &[CounterSpec] {
        &self.specs
    }

    /// Look a counter up by ID or (case-insensitive) label
    pub fn find(&self, name: &str) -> Option<&CounterSpec> {
        self.specs
            .iter()
            .find(|s| s.id.as_str() == name)
            .or_else(|| {
                self.specs
                    .iter()
                    .find(|s| s.label.eq_ignore_ascii_case(name))
            })
    }

    pub fn label(&self, id: &CounterId) -> Result<&str, DomainError> {
        self.specs
            .iter()
            .find(|s| &s.id == id)
            .map(|s| s.label.as_str())
            .ok_or_else(|| DomainError::UnknownCounter(id.to_string()))
    }

    pub async fn counter(&self, id: &CounterId) -> Result<Counter, DomainError> {
        let counters = self.counters.lock().await;
        lookup(&counters, id).cloned()
    }

    /// Snapshot of every counter, in configuration order
    pub async fn counters(&self) -> Vec<(CounterSpec, Counter)> {
        let counters = self.counters.lock().await;
        self.specs
            .iter()
            .filter_map(|spec| counters.get(&spec.id).map(|c| (spec.clone(), c.clone())))
            .collect()
    }

    /// Issue the next number: `current += 1`, `last = current`
    pub async fn advance(&self, id: &CounterId) -> Result<u32, DomainError> {
        let mut counters = self.counters.lock().await;
        let next = lookup(&counters, id)?.advanced();

        self.persist(&next).await?;
        let number = next.current();
        counters.insert(id.clone(), next);

        debug!(counter = %id, number, "Counter advanced");
        Ok(number)
    }

    pub async fn reprint_target(&self, id: &CounterId) -> Result<u32, DomainError> {
        let counters = self.counters.lock().await;
        lookup(&counters, id)?.reprint_target()
    }

    pub async fn reset(&self, id: &CounterId) -> Result<(), DomainError> {
        let mut counters = self.counters.lock().await;
        let cleared = lookup(&counters, id)?.cleared();

        self.persist(&cleared).await?;
        counters.insert(id.clone(), cleared);

        info!(counter = %id, "Counter reset");
        Ok(())
    }

    pub async fn pick(&self, id: &CounterId, requested: i64) -> Result<u32, DomainError> {
        let counters = self.counters.lock().await;
        lookup(&counters, id)?.pick(requested)
    }

    pub async fn pick_range(&self, id: &CounterId) -> Result<RangeInclusive<u32>, DomainError> {
        let counters = self.counters.lock().await;
        lookup(&counters, id)?.pick_range()
    }

    async fn persist(&self, counter: &Counter) -> Result<(), DomainError> {
        self.store
            .put_all(vec![
                (
                    counter.id().current_key(),
                    StoredValue::Int(counter.current()),
                ),
                (
                    counter.id().last_key(),
                    StoredValue::Int(counter.last_printed()),
                ),
            ])
            .await
    }
}

fn lookup<'a>(
    counters: &'a HashMap<CounterId, Counter>,
    id: &CounterId,
) -> Result<&'a Counter, DomainError> {
    counters
        .get(id)
        .ok_or_else(|| DomainError::UnknownCounter(id.to_string()))
}

async fn read_int(store: &dyn KeyValueStore, key: &str) -> Result<u32, DomainError> {
    match store.get(key).await? {
        None => Ok(0),
        Some(StoredValue::Int(v)) => Ok(v),
        Some(StoredValue::Text(t)) => t
            .trim()
            .parse()
            .map_err(|_| DomainError::Storage(format!("Key {key} holds non-integer {t:?}"))),
    }
}
