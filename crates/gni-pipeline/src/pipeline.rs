use gni_store::{Checkpoint, Counter, EntityStore, Registry, StagedStore, SINGLETON_ID};
use gni_types::{EntityKey, EventPosition, RawEvent};
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::context::{HandlerContext, Services};
use crate::counter::CounterAggregator;
use crate::dispatch::DispatchTable;
use crate::error::{PipelineError, Result};
use crate::metadata::ContentFetcher;
use crate::params::ParamReader;
use crate::state::ContractStateReader;

/// What happened to one event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventOutcome {
    /// The event's writes were committed.
    Applied { writes: usize },
    /// The event is at or before the checkpoint and was already applied.
    Skipped,
}

/// An event that failed with a fatal error and left no writes.
#[derive(Debug)]
pub struct FailedEvent {
    pub position: EventPosition,
    pub signature: String,
    pub error: PipelineError,
}

/// Summary of a run over an event stream.
#[derive(Debug, Default)]
pub struct RunReport {
    pub applied: u64,
    pub skipped: u64,
    pub failed: Vec<FailedEvent>,
    /// The run stopped at the last recorded failure.
    pub halted: bool,
    pub last_position: Option<EventPosition>,
}

impl RunReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Sequential reconciliation of an ordered event stream into a store.
///
/// Each event is applied against a [`StagedStore`] overlay. Its entity
/// writes, the bumped counters and the new checkpoint are committed as one
/// batch, or not at all when the handler fails.
pub struct Pipeline<S: EntityStore> {
    store: S,
    config: PipelineConfig,
    dispatch: DispatchTable,
    services: Services,
    counters: CounterAggregator,
    /// `None` until read from the store.
    checkpoint: Option<Option<EventPosition>>,
}

impl<S: EntityStore> Pipeline<S> {
    pub fn new(store: S, config: PipelineConfig) -> Self {
        let services = Services::from_config(&config);
        Self {
            store,
            config,
            dispatch: DispatchTable::standard(),
            services,
            counters: CounterAggregator::new(),
            checkpoint: None,
        }
    }

    pub fn with_fetcher(mut self, fetcher: impl ContentFetcher + 'static) -> Self {
        self.services.fetcher = Box::new(fetcher);
        self
    }

    pub fn with_state_reader(mut self, reader: impl ContractStateReader + 'static) -> Self {
        self.services.state = Box::new(reader);
        self
    }

    pub fn with_dispatch(mut self, dispatch: DispatchTable) -> Self {
        self.dispatch = dispatch;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Counter totals as of the last applied event.
    pub fn counter(&self) -> Option<&Counter> {
        self.counters.current()
    }

    /// Last applied position, read from the store on first use.
    pub fn checkpoint(&mut self) -> Result<Option<EventPosition>> {
        if let Some(cached) = self.checkpoint {
            return Ok(cached);
        }
        let id = EntityKey::new(SINGLETON_ID)?;
        let loaded = Registry::new(&self.store)
            .load::<Checkpoint>(&id)?
            .map(|c| c.position);
        self.checkpoint = Some(loaded);
        Ok(loaded)
    }

    /// Apply one event.
    ///
    /// On `MalformedInput` or `IntegrityViolation` nothing is written, not
    /// even the counters or the checkpoint.
    pub fn process(&mut self, event: &RawEvent) -> Result<EventOutcome> {
        let position = event.position();
        let checkpoint = self.checkpoint()?;
        if self.config.skip_replayed {
            if let Some(checkpoint) = checkpoint {
                if !position.is_after(&checkpoint) {
                    debug!(%position, %checkpoint, signature = %event.signature, "skipping replayed event");
                    return Ok(EventOutcome::Skipped);
                }
            }
        }

        let handler = self.dispatch.resolve(&event.signature)?;
        let event_id = event.event_id()?;
        let staged = StagedStore::new(&self.store);

        {
            let ctx = HandlerContext::new(event, event_id.clone(), &staged, &self.services);
            let mut params = ParamReader::new(event.signature, &event.params);
            handler(&ctx, &mut params)?;
            params.finish()?;
        }

        let counter = self.counters.stage(&self.store, event.signature.kind)?;
        let next_checkpoint = checkpoint.map_or(position, |c| c.max(position));
        let registry = Registry::new(&staged);
        registry.save(counter.clone())?;
        registry.save(Checkpoint {
            id: EntityKey::new(SINGLETON_ID)?,
            position: next_checkpoint,
        })?;

        let writes = staged.commit()?;
        self.counters.settle(counter);
        self.checkpoint = Some(Some(next_checkpoint));

        debug!(
            %position,
            event = %event_id,
            signature = %event.signature,
            writes,
            "applied event"
        );
        Ok(EventOutcome::Applied { writes })
    }

    /// Apply events in order.
    ///
    /// Event-fatal failures are recorded in the report; with
    /// `halt_on_fatal` the run stops at the first one. Store errors abort
    /// the run and are returned.
    pub fn run<'e, I>(&mut self, events: I) -> Result<RunReport>
    where
        I: IntoIterator<Item = &'e RawEvent>,
    {
        let mut report = RunReport::default();
        for event in events {
            match self.process(event) {
                Ok(EventOutcome::Applied { .. }) => {
                    report.applied += 1;
                    report.last_position = Some(event.position());
                }
                Ok(EventOutcome::Skipped) => report.skipped += 1,
                Err(error) if error.is_event_fatal() => {
                    let halt = self.config.halt_on_fatal;
                    warn!(
                        position = %event.position(),
                        signature = %event.signature,
                        halt,
                        %error,
                        "event rejected"
                    );
                    report.failed.push(FailedEvent {
                        position: event.position(),
                        signature: event.signature.to_string(),
                        error,
                    });
                    if halt {
                        report.halted = true;
                        break;
                    }
                }
                Err(error) => return Err(error),
            }
        }

        info!(
            applied = report.applied,
            skipped = report.skipped,
            failed = report.failed.len(),
            halted = report.halted,
            "run complete"
        );
        Ok(report)
    }
}

impl<S: EntityStore + std::fmt::Debug> std::fmt::Debug for Pipeline<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("store", &self.store)
            .field("config", &self.config)
            .field("dispatch", &self.dispatch)
            .finish_non_exhaustive()
    }
}
