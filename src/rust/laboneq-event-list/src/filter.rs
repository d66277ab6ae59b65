// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Removal of oscillator events whose effect was folded into the pulses.

use std::collections::HashSet;

use crate::Result;
use crate::event::{Event, EventId, EventKind};
use crate::signal_map::SignalMap;

/// Collect the IDs of the oscillator events that are no longer needed.
///
/// A frequency set is handled once any of its signals has a software
/// oscillator, initial frequencies are always handled. End events follow
/// their start event.
pub fn collect_handled_events(events: &[Event], signals: &SignalMap) -> Result<HashSet<EventId>> {
    let mut handled = HashSet::new();
    for event in events {
        match &event.kind {
            EventKind::SetOscillatorFrequencyStart(ob) => {
                for signal in &ob.signals {
                    if !signals.is_hw_oscillator(*signal)? {
                        handled.insert(event.id);
                        break;
                    }
                }
            }
            EventKind::InitialOscillatorFrequency(_) => {
                handled.insert(event.id);
            }
            _ => {}
        }
    }
    // Second scan, the start of a pair may come after its end in the list.
    for event in events {
        if let EventKind::SetOscillatorFrequencyEnd {
            chain_element_id, ..
        } = &event.kind
            && handled.contains(chain_element_id)
        {
            handled.insert(event.id);
        }
    }
    Ok(handled)
}

pub fn remove_handled_events(mut events: Vec<Event>, handled: &HashSet<EventId>) -> Vec<Event> {
    if !handled.is_empty() {
        events.retain(|event| !handled.contains(&event.id));
    }
    events
}

#[cfg(test)]
mod tests {
    use laboneq_common::types::DeviceKind;
    use laboneq_ir::OscillatorKind;
    use laboneq_ir::builders::IrTreeBuilder;

    use super::*;
    use crate::event::{OscillatorFrequencyEvent, PulseEvent};

    #[test]
    fn test_pairs_are_removed_together() {
        let mut builder = IrTreeBuilder::new();
        let dev = builder.device("shfsg_0", DeviceKind::Shfsg);
        let sw_signal = builder.signal("q0/drive", dev);
        let hw_signal = builder.signal("q1/drive", dev);
        let sw_osc = builder.oscillator("sw_osc", OscillatorKind::Software, &[sw_signal]);
        let hw_osc = builder.oscillator("hw_osc", OscillatorKind::Hardware, &[hw_signal]);
        let tree = builder.build(None);
        let signals = SignalMap::new(&tree);

        let freq = |oscillator: &laboneq_ir::Oscillator| OscillatorFrequencyEvent {
            oscillator: oscillator.uid,
            signals: oscillator.signals.clone(),
            value: 1e6,
            parameter: None,
            section: None,
            iteration: 0,
        };
        let end = |id, oscillator: &laboneq_ir::Oscillator, chain_element_id| Event {
            id,
            time: 1e-6,
            kind: EventKind::SetOscillatorFrequencyEnd {
                oscillator: oscillator.uid,
                signals: oscillator.signals.clone(),
                chain_element_id,
            },
        };
        let events = vec![
            // End listed before its start
            end(10, &sw_osc, 0),
            Event {
                id: 0,
                time: 0.0,
                kind: EventKind::SetOscillatorFrequencyStart(freq(&sw_osc)),
            },
            Event {
                id: 1,
                time: 0.0,
                kind: EventKind::SetOscillatorFrequencyStart(freq(&hw_osc)),
            },
            end(11, &hw_osc, 1),
            Event {
                id: 2,
                time: 0.0,
                kind: EventKind::InitialOscillatorFrequency(freq(&hw_osc)),
            },
            Event {
                id: 3,
                time: 0.0,
                kind: EventKind::PlayStart(PulseEvent::new(sw_signal, None)),
            },
        ];

        let handled = collect_handled_events(&events, &signals).unwrap();
        assert_eq!(handled, HashSet::from([0, 2, 10]));
        let remaining: Vec<_> = remove_handled_events(events, &handled)
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(remaining, [1, 11, 3]);
    }
}
