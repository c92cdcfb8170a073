use std::collections::BTreeMap;

use gni_store::{Counter, EntityStore, Registry, SINGLETON_ID};
use gni_types::{EntityKey, EventKind};

use crate::error::Result;

/// Aggregation context for the occurrence counters.
///
/// The counter is read from the store once per run. Each event gets a
/// bumped copy to stage alongside its own writes; the copy becomes current
/// only after the event commits, so a failed event leaves no trace in the
/// totals.
#[derive(Debug, Default)]
pub struct CounterAggregator {
    current: Option<Counter>,
}

impl CounterAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter value to stage for an event of `kind`.
    pub fn stage<S: EntityStore + ?Sized>(&mut self, store: &S, kind: EventKind) -> Result<Counter> {
        let current = match &self.current {
            Some(counter) => counter.clone(),
            None => {
                let loaded = load_counter(store)?;
                self.current = Some(loaded.clone());
                loaded
            }
        };
        Ok(bump(current, kind))
    }

    /// Adopt a staged counter once its event has committed.
    pub fn settle(&mut self, counter: Counter) {
        self.current = Some(counter);
    }

    /// Totals as of the last committed event, if any were loaded.
    pub fn current(&self) -> Option<&Counter> {
        self.current.as_ref()
    }
}

fn load_counter<S: EntityStore + ?Sized>(store: &S) -> Result<Counter> {
    let id = EntityKey::new(SINGLETON_ID)?;
    let registry = Registry::new(store);
    Ok(registry.load::<Counter>(&id)?.unwrap_or(Counter {
        id,
        event_count: 0,
        domains: BTreeMap::new(),
        kinds: BTreeMap::new(),
    }))
}

fn bump(mut counter: Counter, kind: EventKind) -> Counter {
    counter.event_count += 1;
    for domain in kind.domains() {
        *counter.domains.entry(domain.as_str().to_string()).or_insert(0) += 1;
    }
    *counter.kinds.entry(kind.name().to_string()).or_insert(0) += 1;
    counter
}
