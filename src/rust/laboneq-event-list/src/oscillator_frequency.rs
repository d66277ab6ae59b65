// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use laboneq_common::types::SignalUid;
use laboneq_log::{debug, warn};

use crate::Result;
use crate::event::{Event, EventKind, EventType, sorted_by_priority};
use crate::filter::{collect_handled_events, remove_handled_events};
use crate::signal_map::SignalMap;

// At equal time, the frequency must be in place before the pulse is resolved.
const INITIAL_OSCILLATOR_FREQUENCY: i32 = -30;
const SET_OSCILLATOR_FREQUENCY_START: i32 = -15;
const PULSE_START: i32 = 0;

fn priority(event_type: EventType) -> Option<i32> {
    match event_type {
        EventType::InitialOscillatorFrequency => Some(INITIAL_OSCILLATOR_FREQUENCY),
        EventType::SetOscillatorFrequencyStart => Some(SET_OSCILLATOR_FREQUENCY_START),
        EventType::PlayStart | EventType::AcquireStart => Some(PULSE_START),
        _ => None,
    }
}

/// Software oscillator frequency currently in effect, per signal.
#[derive(Default)]
struct FrequencyTracker {
    current: HashMap<SignalUid, f64>,
}

impl FrequencyTracker {
    fn set(&mut self, signal: SignalUid, value: f64) {
        self.current.insert(signal, value);
    }

    fn current(&self, signal: SignalUid) -> Option<f64> {
        self.current.get(&signal).copied()
    }
}

/// Annotate pulses with the frequency of their software oscillator.
///
/// Play and acquire events get `oscillator_frequency` from the latest
/// frequency set on their signal. Frequency events consumed this way are
/// removed from the returned list, hardware oscillator events are kept for
/// the code generator.
pub fn resolve_oscillator_frequencies(
    mut events: Vec<Event>,
    signals: &SignalMap,
) -> Result<Vec<Event>> {
    let mut tracker = FrequencyTracker::default();
    for idx in sorted_by_priority(&events, priority) {
        match &mut events[idx].kind {
            EventKind::SetOscillatorFrequencyStart(ob) | EventKind::InitialOscillatorFrequency(ob) => {
                for signal in &ob.signals {
                    if signals.oscillator(*signal)?.is_none() {
                        warn!(
                            "Frequency of oscillator targets signal '{}' without an oscillator",
                            signals.display_name(*signal)
                        );
                    }
                    if !signals.is_hw_oscillator(*signal)? {
                        tracker.set(*signal, ob.value);
                    }
                }
            }
            EventKind::PlayStart(pulse) | EventKind::AcquireStart(pulse) => {
                if !signals.is_hw_oscillator(pulse.signal)?
                    && let Some(frequency) = tracker.current(pulse.signal)
                {
                    pulse.oscillator_frequency = Some(frequency);
                }
            }
            _ => {}
        }
    }
    let handled = collect_handled_events(&events, signals)?;
    debug!("Removing {} handled oscillator events", handled.len());
    Ok(remove_handled_events(events, &handled))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use laboneq_common::types::DeviceKind;
    use laboneq_ir::builders::IrTreeBuilder;
    use laboneq_ir::{Oscillator, OscillatorKind};

    use super::*;
    use crate::event::{OscillatorFrequencyEvent, PulseEvent};

    fn set_freq(id: usize, time: f64, oscillator: &Oscillator, value: f64) -> Event {
        Event {
            id,
            time,
            kind: EventKind::SetOscillatorFrequencyStart(OscillatorFrequencyEvent {
                oscillator: oscillator.uid,
                signals: oscillator.signals.clone(),
                value,
                parameter: None,
                section: None,
                iteration: 0,
            }),
        }
    }

    fn initial_freq(id: usize, oscillator: &Oscillator, value: f64) -> Event {
        let mut event = set_freq(id, 0.0, oscillator, value);
        let EventKind::SetOscillatorFrequencyStart(ob) = event.kind else {
            unreachable!()
        };
        event.kind = EventKind::InitialOscillatorFrequency(ob);
        event
    }

    fn play(id: usize, time: f64, signal: SignalUid) -> Event {
        Event {
            id,
            time,
            kind: EventKind::PlayStart(PulseEvent::new(signal, None)),
        }
    }

    fn frequency_of(events: &[Event], id: usize) -> Option<f64> {
        events
            .iter()
            .find(|e| e.id == id)
            .and_then(|e| e.pulse())
            .and_then(|p| p.oscillator_frequency)
    }

    struct Setup {
        tree: laboneq_ir::IrTree,
        drive: SignalUid,
        measure: SignalUid,
        flux: SignalUid,
        sw_osc: Arc<Oscillator>,
        hw_osc: Arc<Oscillator>,
    }

    fn setup() -> Setup {
        let mut builder = IrTreeBuilder::new();
        let dev = builder.device("shfsg_0", DeviceKind::Shfsg);
        let qa = builder.device("shfqa_0", DeviceKind::Shfqa);
        let drive = builder.signal("q0/drive", dev);
        let flux = builder.signal("q0/flux", dev);
        let measure = builder.signal("q0/measure", qa);
        let sw_osc = builder.oscillator("drive_osc", OscillatorKind::Software, &[drive]);
        let hw_osc = builder.oscillator("measure_osc", OscillatorKind::Hardware, &[measure]);
        Setup {
            tree: builder.build(None),
            drive,
            measure,
            flux,
            sw_osc,
            hw_osc,
        }
    }

    #[test]
    fn test_play_observes_frequency_set_at_same_time() {
        let s = setup();
        let signals = SignalMap::new(&s.tree);
        let events = vec![
            play(0, 5e-7, s.drive),
            set_freq(1, 5e-7, &s.sw_osc, 20e6),
            set_freq(2, 0.0, &s.sw_osc, 10e6),
            play(3, 1e-7, s.drive),
        ];
        let events = resolve_oscillator_frequencies(events, &signals).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(frequency_of(&events, 0), Some(20e6));
        assert_eq!(frequency_of(&events, 3), Some(10e6));
    }

    #[test]
    fn test_initial_frequency_is_consumed() {
        let s = setup();
        let signals = SignalMap::new(&s.tree);
        let events = vec![
            initial_freq(0, &s.sw_osc, 5e6),
            initial_freq(1, &s.hw_osc, 7e6),
            play(2, 0.0, s.drive),
            play(3, 0.0, s.measure),
            play(4, 0.0, s.flux),
        ];
        let events = resolve_oscillator_frequencies(events, &signals).unwrap();
        let ids: Vec<_> = events.iter().map(|e| e.id).collect();
        assert_eq!(ids, [2, 3, 4]);
        assert_eq!(frequency_of(&events, 2), Some(5e6));
        // Hardware oscillators and signals without oscillator stay unannotated
        assert_eq!(frequency_of(&events, 3), None);
        assert_eq!(frequency_of(&events, 4), None);
    }

    #[test]
    fn test_hardware_frequency_set_survives() {
        let s = setup();
        let signals = SignalMap::new(&s.tree);
        let events = vec![
            set_freq(0, 0.0, &s.hw_osc, 100e6),
            Event {
                id: 1,
                time: 1e-7,
                kind: EventKind::SetOscillatorFrequencyEnd {
                    oscillator: s.hw_osc.uid,
                    signals: s.hw_osc.signals.clone(),
                    chain_element_id: 0,
                },
            },
            play(2, 1e-7, s.measure),
        ];
        let resolved = resolve_oscillator_frequencies(events.clone(), &signals).unwrap();
        assert_eq!(resolved, events);
    }

    #[test]
    fn test_idempotent_on_filtered_list() {
        let s = setup();
        let signals = SignalMap::new(&s.tree);
        let events = vec![
            set_freq(0, 0.0, &s.sw_osc, 10e6),
            play(1, 1e-7, s.drive),
            set_freq(2, 2e-7, &s.hw_osc, 10e6),
            play(3, 3e-7, s.measure),
        ];
        let once = resolve_oscillator_frequencies(events, &signals).unwrap();
        let twice = resolve_oscillator_frequencies(once.clone(), &signals).unwrap();
        assert_eq!(once, twice);
        assert_eq!(frequency_of(&twice, 1), Some(10e6));
    }

    #[test]
    fn test_unknown_signal_is_fatal() {
        let s = setup();
        let other = IrTreeBuilder::new().build(None);
        let signals = SignalMap::new(&other);
        let events = vec![play(0, 0.0, s.drive)];
        assert!(matches!(
            resolve_oscillator_frequencies(events, &signals),
            Err(crate::Error::UnknownSignal { .. })
        ));
    }
}
