// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use laboneq_common::types::SignalUid;

use crate::event::{Event, EventKind, EventType, PulseEvent, Seconds, sorted_by_priority};
use crate::signal_map::SignalMap;
use crate::{Error, Result};

// A reset at the same time as a pulse applies to that pulse.
const RESET_SW_OSCILLATOR_PHASE: i32 = -15;
const PULSE_START: i32 = 0;

fn priority(event_type: EventType) -> Option<i32> {
    match event_type {
        EventType::ResetSwOscillatorPhase => Some(RESET_SW_OSCILLATOR_PHASE),
        EventType::PlayStart | EventType::DelayStart | EventType::AcquireStart => {
            Some(PULSE_START)
        }
        _ => None,
    }
}

#[derive(Default)]
struct SignalPhaseTracker {
    cumulative: f64,
    // Time of the last absolute phase set
    reference_time: Seconds,
}

#[derive(Default)]
struct PhaseTracker {
    trackers: HashMap<SignalUid, SignalPhaseTracker>,
    global_reset_time: Seconds,
}

impl PhaseTracker {
    fn set(&mut self, signal: SignalUid, time: Seconds, value: f64) {
        let tracker = self.trackers.entry(signal).or_default();
        tracker.cumulative = value;
        tracker.reference_time = time;
    }

    fn increment(&mut self, signal: SignalUid, value: f64) {
        self.trackers.entry(signal).or_default().cumulative += value;
    }

    /// Reset the phase of all software oscillators.
    fn global_reset(&mut self, time: Seconds) {
        for tracker in self.trackers.values_mut() {
            tracker.cumulative = 0.0;
        }
        self.global_reset_time = time;
    }

    fn calculate_phase_at(&self, signal: SignalUid, freq: f64, time: Seconds) -> f64 {
        let (reference_time, cumulative) = match self.trackers.get(&signal) {
            Some(tracker) => (
                tracker.reference_time.max(self.global_reset_time),
                tracker.cumulative,
            ),
            None => (self.global_reset_time, 0.0),
        };
        (time - reference_time) * 2.0 * std::f64::consts::PI * freq + cumulative
    }
}

fn resolve_pulse(
    pulse: &mut PulseEvent,
    time: Seconds,
    tracker: &mut PhaseTracker,
    signals: &SignalMap,
) -> Result<()> {
    let is_hw_osc = signals.is_hw_oscillator(pulse.signal)?;
    if !is_hw_osc && let Some(increment) = pulse.increment_oscillator_phase.take() {
        tracker.increment(pulse.signal, increment);
    }
    // An absolute phase overrides the increment of the same pulse
    if let Some(phase) = pulse.set_oscillator_phase.take() {
        if is_hw_osc {
            return Err(Error::HardwareOscillatorPhaseSet {
                signal: signals.display_name(pulse.signal),
            });
        }
        tracker.set(pulse.signal, time, phase);
    }
    pulse.oscillator_phase = if is_hw_osc {
        None
    } else if signals.is_qa_device(pulse.signal)? {
        Some(0.0)
    } else {
        let freq = pulse.oscillator_frequency.unwrap_or(0.0);
        Some(tracker.calculate_phase_at(pulse.signal, freq, time))
    };
    Ok(())
}

/// Resolve the software oscillator phase of every play, delay and acquire event.
///
/// Must run after the frequency resolution, the phase is accumulated from the
/// `oscillator_frequency` of the pulses. Increments and absolute sets of
/// software oscillators are consumed, increments of hardware oscillators are
/// left on the event for the code generator.
pub fn resolve_oscillator_phases(events: &mut [Event], signals: &SignalMap) -> Result<()> {
    let mut tracker = PhaseTracker::default();
    for idx in sorted_by_priority(events, priority) {
        let event = &mut events[idx];
        let time = event.time;
        match &mut event.kind {
            EventKind::ResetSwOscillatorPhase { .. } => tracker.global_reset(time),
            EventKind::PlayStart(pulse)
            | EventKind::DelayStart(pulse)
            | EventKind::AcquireStart(pulse) => resolve_pulse(pulse, time, &mut tracker, signals)?,
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use laboneq_common::types::DeviceKind;
    use laboneq_ir::OscillatorKind;
    use laboneq_ir::builders::IrTreeBuilder;

    use super::*;

    fn pulse_event(id: usize, time: Seconds, pulse: PulseEvent) -> Event {
        Event {
            id,
            time,
            kind: EventKind::PlayStart(pulse),
        }
    }

    fn with_freq(signal: SignalUid, freq: f64) -> PulseEvent {
        PulseEvent {
            oscillator_frequency: Some(freq),
            ..PulseEvent::new(signal, None)
        }
    }

    fn reset(id: usize, time: Seconds) -> Event {
        Event {
            id,
            time,
            kind: EventKind::ResetSwOscillatorPhase { section: None },
        }
    }

    fn phase_of(events: &[Event], id: usize) -> Option<f64> {
        events
            .iter()
            .find(|e| e.id == id)
            .and_then(|e| e.pulse())
            .and_then(|p| p.oscillator_phase)
    }

    #[test]
    fn test_phase_continuity_after_set() {
        let mut builder = IrTreeBuilder::new();
        let dev = builder.device("hdawg_0", DeviceKind::Hdawg);
        let drive = builder.signal("q0/drive", dev);
        builder.oscillator("osc", OscillatorKind::Software, &[drive]);
        let tree = builder.build(None);
        let signals = SignalMap::new(&tree);

        let freq = 1e6;
        let t0 = 2e-7;
        let phi0 = 0.25;
        let mut events = vec![
            pulse_event(
                0,
                t0,
                PulseEvent {
                    increment_oscillator_phase: Some(1.0),
                    set_oscillator_phase: Some(phi0),
                    ..with_freq(drive, freq)
                },
            ),
            pulse_event(1, 5e-7, with_freq(drive, freq)),
            pulse_event(2, 1e-6, with_freq(drive, freq)),
        ];
        resolve_oscillator_phases(&mut events, &signals).unwrap();

        let first = events[0].pulse().unwrap();
        assert_eq!(first.oscillator_phase, Some(phi0));
        assert_eq!(first.increment_oscillator_phase, None);
        assert_eq!(first.set_oscillator_phase, None);
        for (idx, t) in [(1, 5e-7), (2, 1e-6)] {
            let expected = (t - t0) * 2.0 * PI * freq + phi0;
            assert_eq!(phase_of(&events, idx), Some(expected));
        }
    }

    #[test]
    fn test_reset_applies_to_all_signals() {
        let mut builder = IrTreeBuilder::new();
        let dev = builder.device("shfsg_0", DeviceKind::Shfsg);
        let q0 = builder.signal("q0/drive", dev);
        let q1 = builder.signal("q1/drive", dev);
        builder.oscillator("q0_osc", OscillatorKind::Software, &[q0]);
        builder.oscillator("q1_osc", OscillatorKind::Software, &[q1]);
        let tree = builder.build(None);
        let signals = SignalMap::new(&tree);

        let incremented = |signal, increment| PulseEvent {
            increment_oscillator_phase: Some(increment),
            ..with_freq(signal, 0.0)
        };
        let mut events = vec![
            pulse_event(0, 0.0, incremented(q0, 0.5)),
            pulse_event(1, 0.0, incremented(q1, 1.5)),
            // Reset at the same time as the pulses after it
            pulse_event(3, 1e-6, with_freq(q0, 1e6)),
            reset(2, 1e-6),
            pulse_event(4, 1e-6, incremented(q1, 0.25)),
            pulse_event(5, 2e-6, with_freq(q0, 1e6)),
        ];
        resolve_oscillator_phases(&mut events, &signals).unwrap();

        assert_eq!(phase_of(&events, 0), Some(0.5));
        assert_eq!(phase_of(&events, 1), Some(1.5));
        assert_eq!(phase_of(&events, 3), Some(0.0));
        assert_eq!(phase_of(&events, 4), Some(0.25));
        assert_eq!(phase_of(&events, 5), Some((2e-6 - 1e-6) * 2.0 * PI * 1e6));
    }

    #[test]
    fn test_delay_increment_carries_into_play() {
        let mut builder = IrTreeBuilder::new();
        let dev = builder.device("shfsg_0", DeviceKind::Shfsg);
        let drive = builder.signal("q0/drive", dev);
        builder.oscillator("osc", OscillatorKind::Software, &[drive]);
        let tree = builder.build(None);
        let signals = SignalMap::new(&tree);

        let mut events = vec![
            Event {
                id: 0,
                time: 0.0,
                kind: EventKind::DelayStart(PulseEvent {
                    increment_oscillator_phase: Some(0.7),
                    ..with_freq(drive, 1e6)
                }),
            },
            pulse_event(1, 1e-7, with_freq(drive, 1e6)),
        ];
        resolve_oscillator_phases(&mut events, &signals).unwrap();

        let delay = events[0].pulse().unwrap();
        assert_eq!(delay.increment_oscillator_phase, None);
        assert_eq!(delay.oscillator_phase, Some(0.7));
        let expected = (1e-7 - 0.0) * 2.0 * PI * 1e6 + 0.7;
        assert_eq!(phase_of(&events, 1), Some(expected));
        assert!((expected - 1.3283185307179586).abs() < 1e-12);
    }

    #[test]
    fn test_reset_after_set_becomes_reference() {
        let mut builder = IrTreeBuilder::new();
        let dev = builder.device("hdawg_0", DeviceKind::Hdawg);
        let drive = builder.signal("q0/drive", dev);
        builder.oscillator("osc", OscillatorKind::Software, &[drive]);
        let tree = builder.build(None);
        let signals = SignalMap::new(&tree);

        let mut events = vec![
            pulse_event(
                0,
                2e-7,
                PulseEvent {
                    set_oscillator_phase: Some(0.4),
                    ..with_freq(drive, 1e6)
                },
            ),
            reset(1, 5e-7),
            pulse_event(2, 6e-7, with_freq(drive, 1e6)),
        ];
        resolve_oscillator_phases(&mut events, &signals).unwrap();

        assert_eq!(phase_of(&events, 0), Some(0.4));
        // The reset zeroes the set phase and is the later reference
        let expected = (6e-7 - 5e-7) * 2.0 * PI * 1e6;
        assert_eq!(phase_of(&events, 2), Some(expected));
        assert!((expected - 0.6283185307179586).abs() < 1e-12);
    }

    #[test]
    fn test_hardware_and_qa_signals() {
        let mut builder = IrTreeBuilder::new();
        let sg = builder.device("shfsg_0", DeviceKind::Shfsg);
        let qa = builder.device("uhfqa_0", DeviceKind::Uhfqa);
        let drive = builder.signal("q0/drive", sg);
        let measure = builder.signal("q0/measure", qa);
        builder.oscillator("drive_osc", OscillatorKind::Hardware, &[drive]);
        builder.oscillator("measure_osc", OscillatorKind::Software, &[measure]);
        let tree = builder.build(None);
        let signals = SignalMap::new(&tree);

        let mut events = vec![
            pulse_event(
                0,
                1e-6,
                PulseEvent {
                    increment_oscillator_phase: Some(0.5),
                    ..with_freq(drive, 1e6)
                },
            ),
            Event {
                id: 1,
                time: 3e-6,
                kind: EventKind::AcquireStart(PulseEvent {
                    increment_oscillator_phase: Some(0.5),
                    ..with_freq(measure, 1e8)
                }),
            },
        ];
        resolve_oscillator_phases(&mut events, &signals).unwrap();

        let hw = events[0].pulse().unwrap();
        assert_eq!(hw.oscillator_phase, None);
        assert_eq!(hw.increment_oscillator_phase, Some(0.5));
        let qa = events[1].pulse().unwrap();
        assert_eq!(qa.oscillator_phase, Some(0.0));
        assert_eq!(qa.increment_oscillator_phase, None);
    }

    #[test]
    fn test_set_phase_of_hardware_oscillator_is_fatal() {
        let mut builder = IrTreeBuilder::new();
        let dev = builder.device("shfsg_0", DeviceKind::Shfsg);
        let drive = builder.signal("q0/drive", dev);
        builder.oscillator("osc", OscillatorKind::Hardware, &[drive]);
        let tree = builder.build(None);
        let signals = SignalMap::new(&tree);

        let mut events = vec![pulse_event(
            0,
            0.0,
            PulseEvent {
                set_oscillator_phase: Some(1.0),
                ..PulseEvent::new(drive, None)
            },
        )];
        let err = resolve_oscillator_phases(&mut events, &signals).unwrap_err();
        assert!(matches!(err, Error::HardwareOscillatorPhaseSet { ref signal } if signal == "q0/drive"));
    }
}
