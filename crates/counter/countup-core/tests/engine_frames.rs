use std::cell::Cell;
use std::rc::Rc;

use countup_core::{
    Config, CounterCommand, CounterEvent, CounterSpec, Easing, Engine, Inputs, TriggerMode,
    VisibilitySubscription,
};

const FRAME_MS: f64 = 16.0;

struct ReleaseFlag(Rc<Cell<u32>>);

impl VisibilitySubscription for ReleaseFlag {
    fn release(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

/// Drive the engine the way a host frame loop would, collecting every change value.
fn run_frames(eng: &mut Engine, from_ms: f64, frames: usize) -> Vec<(f64, Vec<(u32, f64)>)> {
    let mut log = Vec::new();
    for i in 0..frames {
        let now = from_ms + i as f64 * FRAME_MS;
        let out = eng.update(now, Inputs::default());
        let changes = out
            .changes
            .iter()
            .map(|c| (c.counter.0, c.value))
            .collect();
        log.push((now, changes));
    }
    log
}

#[test]
fn first_tick_emits_idle_values_and_starts_immediate() {
    let mut eng = Engine::default();
    let readers = eng.attach(CounterSpec::new(12000.0)).unwrap();
    let rating = eng
        .attach(
            CounterSpec::new(4.9)
                .decimals(1)
                .trigger(TriggerMode::on_visible(0.5)),
        )
        .unwrap();

    let out = eng.update(0.0, Inputs::default());
    assert_eq!(out.change_for(readers), Some(0.0));
    assert_eq!(out.change_for(rating), Some(0.0));
    assert_eq!(
        out.events,
        vec![CounterEvent::Started {
            counter: readers,
            at_ms: 0.0
        }]
    );

    // The idle counter stays silent on later ticks.
    let out = eng.update(FRAME_MS, Inputs::default());
    assert_eq!(out.change_for(rating), None);
    assert!(out.change_for(readers).is_some());
}

#[test]
fn counters_run_independently_on_shared_frames() {
    let mut eng = Engine::default();
    let fast = eng
        .attach(CounterSpec::new(50.0).duration_ms(400.0).easing(Easing::Linear))
        .unwrap();
    let slow = eng
        .attach(CounterSpec::new(12000.0).duration_ms(2000.0))
        .unwrap();

    let log = run_frames(&mut eng, 0.0, 130);
    assert!(!eng.has_pending_work());
    assert_eq!(eng.value(fast), Ok(50.0));
    assert_eq!(eng.value(slow), Ok(12000.0));

    // Each counter emits only while moving; after completion it goes quiet.
    let fast_last = log
        .iter()
        .filter(|(_, ch)| ch.iter().any(|(id, _)| *id == fast.0))
        .map(|(t, _)| *t)
        .last()
        .unwrap();
    assert_eq!(fast_last, 400.0);
    let slow_last = log
        .iter()
        .filter(|(_, ch)| ch.iter().any(|(id, _)| *id == slow.0))
        .map(|(t, _)| *t)
        .last()
        .unwrap();
    assert_eq!(slow_last, 2000.0);
}

#[test]
fn completion_reported_once() {
    let mut eng = Engine::default();
    let id = eng
        .attach(CounterSpec::new(3.0).duration_ms(100.0))
        .unwrap();
    let mut completions = 0;
    for i in 0..20 {
        let out = eng.update(i as f64 * FRAME_MS, Inputs::default());
        completions += out
            .events
            .iter()
            .filter(|e| matches!(e, CounterEvent::Completed { counter, value } if *counter == id && *value == 3.0))
            .count();
    }
    assert_eq!(completions, 1);
}

#[test]
fn visibility_input_starts_observed_counter_and_releases() {
    let released = Rc::new(Cell::new(0));
    let mut eng = Engine::default();
    let id = eng
        .attach_observed(
            CounterSpec::new(4.9)
                .decimals(1)
                .trigger(TriggerMode::on_visible(0.5)),
            Box::new(ReleaseFlag(released.clone())),
        )
        .unwrap();

    eng.update(0.0, Inputs::default().visible(id, 0.25));
    assert!(!eng.has_pending_work());
    assert_eq!(released.get(), 0);

    let out = eng.update(1000.0, Inputs::default().visible(id, 0.75));
    assert_eq!(
        out.events,
        vec![CounterEvent::Started {
            counter: id,
            at_ms: 1000.0
        }]
    );
    assert_eq!(released.get(), 1);
    assert!(eng.has_pending_work());
    assert_eq!(eng.counter(id).unwrap().started_at_ms(), Some(1000.0));

    // Scrolling away and back does not replay.
    eng.update(3000.0, Inputs::default().visible(id, 0.0));
    let out = eng.update(3016.0, Inputs::default().visible(id, 1.0));
    assert!(out.events.is_empty());
    assert_eq!(eng.value(id), Ok(4.9));
    assert_eq!(eng.counter(id).unwrap().started_at_ms(), Some(1000.0));
}

#[test]
fn dispose_command_releases_and_removes() {
    let released = Rc::new(Cell::new(0));
    let mut eng = Engine::default();
    let id = eng
        .attach_observed(
            CounterSpec::new(10.0).trigger(TriggerMode::on_visible(0.5)),
            Box::new(ReleaseFlag(released.clone())),
        )
        .unwrap();
    let out = eng.update(
        0.0,
        Inputs::default().command(CounterCommand::Dispose { counter: id }),
    );
    assert_eq!(out.events, vec![CounterEvent::Disposed { counter: id }]);
    assert_eq!(released.get(), 1);
    assert!(eng.is_empty());

    // A late observer callback for the removed counter is harmless.
    let out = eng.update(16.0, Inputs::default().visible(id, 1.0));
    assert!(out.is_empty());
    assert_eq!(released.get(), 1);
}

#[test]
fn start_command_overrides_visibility_wait() {
    let mut eng = Engine::default();
    let id = eng
        .attach(CounterSpec::new(10.0).trigger(TriggerMode::on_visible(1.0)))
        .unwrap();
    let out = eng.update(
        50.0,
        Inputs::default()
            .command(CounterCommand::Start { counter: id })
            .command(CounterCommand::Start { counter: id }),
    );
    assert_eq!(
        out.events,
        vec![CounterEvent::Started {
            counter: id,
            at_ms: 50.0
        }]
    );
    assert_eq!(eng.counter(id).unwrap().started_at_ms(), Some(50.0));
}

#[test]
fn emit_unchanged_reports_every_counter() {
    let mut eng = Engine::new(Config {
        emit_unchanged: true,
        ..Config::default()
    });
    let id = eng
        .attach(CounterSpec::new(10.0).trigger(TriggerMode::on_visible(0.5)))
        .unwrap();
    for i in 0..3 {
        let out = eng.update(i as f64 * FRAME_MS, Inputs::default());
        assert_eq!(out.change_for(id), Some(0.0));
    }
}

#[test]
fn detach_then_ids_skip_removed() {
    let mut eng = Engine::default();
    let a = eng.attach(CounterSpec::new(1.0)).unwrap();
    let b = eng.attach(CounterSpec::new(2.0)).unwrap();
    eng.detach(a).unwrap();
    assert_eq!(eng.ids().collect::<Vec<_>>(), vec![b]);
    let c = eng.attach(CounterSpec::new(3.0)).unwrap();
    assert_ne!(c, a);
    assert_eq!(eng.len(), 2);
}

#[test]
fn inputs_round_trip_through_json() {
    let json = r#"{
        "visibility": [{"counter": 0, "ratio": 0.6}],
        "commands": [{"Start": {"counter": 1}}, {"Dispose": {"counter": 2}}]
    }"#;
    let inputs: Inputs = serde_json::from_str(json).unwrap();
    assert_eq!(inputs.visibility.len(), 1);
    assert_eq!(inputs.commands.len(), 2);

    let mut eng = Engine::default();
    let id = eng
        .attach(CounterSpec::new(5.0).trigger(TriggerMode::on_visible(0.5)))
        .unwrap();
    let out = eng.update(0.0, inputs);
    let text = serde_json::to_value(out).unwrap();
    assert_eq!(text["events"][0]["Started"]["counter"], id.0);
}
