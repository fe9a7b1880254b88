//! Engine: owns every counter attached to a page and steps them once per host frame.
//!
//! Counters are independent. The engine only shares the host's frame callback
//! between them: each tick applies queued inputs, samples each live counter at
//! the same timestamp and reports what changed.
//!
//! Methods:
//! - new, attach, attach_observed, detach, update (inputs → sample → outputs)

use log::{debug, warn};

use crate::config::Config;
use crate::counter::{Counter, Phase};
use crate::data::CounterSpec;
use crate::error::CounterError;
use crate::ids::{CounterId, IdAllocator};
use crate::inputs::{CounterCommand, Inputs};
use crate::outputs::{Change, CounterEvent, Outputs};
use crate::trigger::VisibilitySubscription;

/// A counter plus the last value handed to the host.
#[derive(Debug)]
struct Slot {
    id: CounterId,
    counter: Counter,
    last_emitted: Option<f64>,
}

#[derive(Debug)]
pub struct Engine {
    cfg: Config,
    ids: IdAllocator,
    slots: Vec<Slot>,

    // Per-tick outputs
    outputs: Outputs,
    dropped_events: usize,
}

impl Engine {
    /// Create a new engine with the given config.
    pub fn new(cfg: Config) -> Self {
        Self {
            slots: Vec::with_capacity(cfg.capacity),
            outputs: Outputs {
                changes: Vec::with_capacity(cfg.capacity),
                events: Vec::new(),
            },
            cfg,
            ids: IdAllocator::new(),
            dropped_events: 0,
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Validate `spec` and register an Idle counter.
    pub fn attach(&mut self, spec: CounterSpec) -> Result<CounterId, CounterError> {
        let counter = Counter::new(spec).map_err(|e| {
            warn!("countup: rejected counter: {e}");
            e
        })?;
        self.insert(counter)
    }

    /// Register a counter together with the host's visibility subscription for
    /// its display region. The subscription is released on first trigger or detach.
    pub fn attach_observed(
        &mut self,
        spec: CounterSpec,
        subscription: Box<dyn VisibilitySubscription>,
    ) -> Result<CounterId, CounterError> {
        let counter = Counter::with_subscription(spec, subscription).map_err(|e| {
            warn!("countup: rejected observed counter: {e}");
            e
        })?;
        self.insert(counter)
    }

    fn insert(&mut self, counter: Counter) -> Result<CounterId, CounterError> {
        let id = self.ids.alloc_counter().ok_or_else(|| {
            warn!("countup: no counter ids left");
            CounterError::IdsExhausted
        })?;
        debug!("countup: attached {:?} ({:?})", id, counter.spec().trigger);
        self.slots.push(Slot {
            id,
            counter,
            last_emitted: None,
        });
        Ok(id)
    }

    /// Dispose the counter and drop it from the engine.
    pub fn detach(&mut self, id: CounterId) -> Result<(), CounterError> {
        let idx = self.index_of(id)?;
        let mut slot = self.slots.remove(idx);
        slot.counter.dispose();
        debug!("countup: detached {:?}", id);
        Ok(())
    }

    fn index_of(&self, id: CounterId) -> Result<usize, CounterError> {
        self.slots
            .iter()
            .position(|s| s.id == id)
            .ok_or(CounterError::UnknownCounter { id })
    }

    pub fn counter(&self, id: CounterId) -> Result<&Counter, CounterError> {
        self.index_of(id).map(|i| &self.slots[i].counter)
    }

    pub fn value(&self, id: CounterId) -> Result<f64, CounterError> {
        self.counter(id).map(Counter::current_value)
    }

    pub fn is_complete(&self, id: CounterId) -> Result<bool, CounterError> {
        self.counter(id).map(Counter::is_complete)
    }

    /// Start a counter outside of a tick. Returns whether it left Idle.
    pub fn start(&mut self, id: CounterId, now_ms: f64) -> Result<bool, CounterError> {
        let idx = self.index_of(id)?;
        Ok(self.slots[idx].counter.start(now_ms))
    }

    /// Forward a visibility report outside of a tick. Returns whether it started the counter.
    pub fn report_visibility(
        &mut self,
        id: CounterId,
        ratio: f64,
        now_ms: f64,
    ) -> Result<bool, CounterError> {
        let idx = self.index_of(id)?;
        Ok(self.slots[idx].counter.report_visibility(ratio, now_ms))
    }

    /// True while some counter still needs frames: running, or Immediate and
    /// not yet sampled. Hosts stop their frame loop when this turns false.
    pub fn has_pending_work(&self) -> bool {
        self.slots
            .iter()
            .any(|s| s.counter.is_running() || s.counter.awaits_first_frame())
    }

    pub fn ids(&self) -> impl Iterator<Item = CounterId> + '_ {
        self.slots.iter().map(|s| s.id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    fn push_event(&mut self, event: CounterEvent) {
        push_capped(
            &mut self.outputs,
            self.cfg.max_events_per_tick,
            &mut self.dropped_events,
            event,
        );
    }

    /// Apply visibility reports, then commands, in the order given.
    fn apply_inputs(&mut self, now_ms: f64, inputs: Inputs) {
        for report in inputs.visibility {
            let Ok(idx) = self.index_of(report.counter) else {
                debug!(
                    "countup: visibility report for unknown {:?} skipped",
                    report.counter
                );
                continue;
            };
            if self.slots[idx].counter.report_visibility(report.ratio, now_ms) {
                debug!(
                    "countup: {:?} visible at ratio {} -> started",
                    report.counter, report.ratio
                );
                self.push_event(CounterEvent::Started {
                    counter: report.counter,
                    at_ms: now_ms,
                });
            }
        }

        for cmd in inputs.commands {
            match cmd {
                CounterCommand::Start { counter } => match self.index_of(counter) {
                    Ok(idx) => {
                        if self.slots[idx].counter.start(now_ms) {
                            debug!("countup: {:?} started by command", counter);
                            self.push_event(CounterEvent::Started {
                                counter,
                                at_ms: now_ms,
                            });
                        }
                    }
                    Err(_) => debug!("countup: start for unknown {:?} skipped", counter),
                },
                CounterCommand::Dispose { counter } => {
                    if self.detach(counter).is_ok() {
                        self.push_event(CounterEvent::Disposed { counter });
                    } else {
                        debug!("countup: dispose for unknown {:?} skipped", counter);
                    }
                }
            }
        }
    }

    /// Step every counter to `now_ms` with the given inputs, producing outputs.
    pub fn update(&mut self, now_ms: f64, inputs: Inputs) -> &Outputs {
        self.outputs.clear();
        self.dropped_events = 0;

        // 1) Visibility reports and commands
        self.apply_inputs(now_ms, inputs);

        // 2) Sample each counter at the frame timestamp
        let cap = self.cfg.max_events_per_tick;
        for slot in self.slots.iter_mut() {
            let before = slot.counter.phase();
            let value = slot.counter.sample(now_ms);
            let after = slot.counter.phase();

            if before == Phase::Idle && after != Phase::Idle {
                debug!("countup: {:?} started on first frame", slot.id);
                push_capped(
                    &mut self.outputs,
                    cap,
                    &mut self.dropped_events,
                    CounterEvent::Started {
                        counter: slot.id,
                        at_ms: now_ms,
                    },
                );
            }
            if before != Phase::Completed && after == Phase::Completed {
                debug!("countup: {:?} completed at {}", slot.id, value);
                push_capped(
                    &mut self.outputs,
                    cap,
                    &mut self.dropped_events,
                    CounterEvent::Completed {
                        counter: slot.id,
                        value,
                    },
                );
            }

            // 3) Emit only moved values unless configured otherwise
            if self.cfg.emit_unchanged || slot.last_emitted != Some(value) {
                slot.last_emitted = Some(value);
                self.outputs.push_change(Change {
                    counter: slot.id,
                    value,
                });
            }
        }

        if self.dropped_events > 0 {
            warn!(
                "countup: dropped {} events over the per-tick limit of {}",
                self.dropped_events, cap
            );
        }

        &self.outputs
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

fn push_capped(outputs: &mut Outputs, cap: usize, dropped: &mut usize, event: CounterEvent) {
    if outputs.events.len() < cap {
        outputs.push_event(event);
    } else {
        *dropped += 1;
    }
}
