// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Display;

use laboneq_common::types::{
    DeviceUid, HandleUid, OscillatorUid, ParameterUid, PulseUid, SectionUid, SignalUid,
};
use num_complex::Complex64;

pub type EventId = usize;

/// Time in seconds.
pub type Seconds = f64;

/// Kind of an event, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    SectionStart,
    SectionEnd,
    LoopStart,
    LoopEnd,
    LoopIterationStart,
    LoopIterationEnd,
    PlayStart,
    PlayEnd,
    DelayStart,
    DelayEnd,
    AcquireStart,
    AcquireEnd,
    SetOscillatorFrequencyStart,
    SetOscillatorFrequencyEnd,
    InitialOscillatorFrequency,
    ResetSwOscillatorPhase,
    ResetHwOscillatorPhase,
    InitialResetHwOscillatorPhase,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::SectionStart => "SECTION_START",
            EventType::SectionEnd => "SECTION_END",
            EventType::LoopStart => "LOOP_START",
            EventType::LoopEnd => "LOOP_END",
            EventType::LoopIterationStart => "LOOP_ITERATION_START",
            EventType::LoopIterationEnd => "LOOP_ITERATION_END",
            EventType::PlayStart => "PLAY_START",
            EventType::PlayEnd => "PLAY_END",
            EventType::DelayStart => "DELAY_START",
            EventType::DelayEnd => "DELAY_END",
            EventType::AcquireStart => "ACQUIRE_START",
            EventType::AcquireEnd => "ACQUIRE_END",
            EventType::SetOscillatorFrequencyStart => "SET_OSCILLATOR_FREQUENCY_START",
            EventType::SetOscillatorFrequencyEnd => "SET_OSCILLATOR_FREQUENCY_END",
            EventType::InitialOscillatorFrequency => "INITIAL_OSCILLATOR_FREQUENCY",
            EventType::ResetSwOscillatorPhase => "RESET_SW_OSCILLATOR_PHASE",
            EventType::ResetHwOscillatorPhase => "RESET_HW_OSCILLATOR_PHASE",
            EventType::InitialResetHwOscillatorPhase => "INITIAL_RESET_HW_OSCILLATOR_PHASE",
        }
    }
}

impl Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of play, delay and acquire start events.
///
/// After the event list is generated, the phase related fields read as follows:
/// - `phase`: the baseband phase of the pulse
/// - `oscillator_phase`: the oscillator phase for software oscillators, `None` for hardware oscillators
/// - `increment_oscillator_phase`: if present, the event should increment the hardware oscillator phase
#[derive(Debug, Clone, PartialEq)]
pub struct PulseEvent {
    pub signal: SignalUid,
    pub section: Option<SectionUid>,
    pub pulse: Option<PulseUid>,
    pub amplitude: Option<Complex64>,
    /// Acquisition handle, only on acquire events.
    pub handle: Option<HandleUid>,
    pub phase: f64,
    pub increment_oscillator_phase: Option<f64>,
    pub set_oscillator_phase: Option<f64>,
    /// Frequency of the software oscillator when the pulse starts.
    pub oscillator_frequency: Option<f64>,
    pub oscillator_phase: Option<f64>,
}

impl PulseEvent {
    pub fn new(signal: SignalUid, section: Option<SectionUid>) -> Self {
        PulseEvent {
            signal,
            section,
            pulse: None,
            amplitude: None,
            handle: None,
            phase: 0.0,
            increment_oscillator_phase: None,
            set_oscillator_phase: None,
            oscillator_frequency: None,
            oscillator_phase: None,
        }
    }
}

/// Frequency update of a single oscillator.
#[derive(Debug, Clone, PartialEq)]
pub struct OscillatorFrequencyEvent {
    pub oscillator: OscillatorUid,
    /// Signals modulated by the oscillator.
    pub signals: Vec<SignalUid>,
    pub value: f64,
    pub parameter: Option<ParameterUid>,
    pub section: Option<SectionUid>,
    pub iteration: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    SectionStart {
        section: SectionUid,
    },
    SectionEnd {
        section: SectionUid,
        chain_element_id: EventId,
    },
    LoopStart {
        section: SectionUid,
        num_repeats: u64,
    },
    LoopEnd {
        section: SectionUid,
        chain_element_id: EventId,
    },
    LoopIterationStart {
        section: SectionUid,
        iteration: u64,
        parameters: Vec<ParameterUid>,
    },
    LoopIterationEnd {
        section: SectionUid,
        iteration: u64,
        chain_element_id: EventId,
    },
    PlayStart(PulseEvent),
    PlayEnd {
        signal: SignalUid,
        chain_element_id: EventId,
    },
    DelayStart(PulseEvent),
    DelayEnd {
        signal: SignalUid,
        chain_element_id: EventId,
    },
    AcquireStart(PulseEvent),
    AcquireEnd {
        signal: SignalUid,
        chain_element_id: EventId,
    },
    SetOscillatorFrequencyStart(OscillatorFrequencyEvent),
    SetOscillatorFrequencyEnd {
        oscillator: OscillatorUid,
        signals: Vec<SignalUid>,
        chain_element_id: EventId,
    },
    InitialOscillatorFrequency(OscillatorFrequencyEvent),
    ResetSwOscillatorPhase {
        section: Option<SectionUid>,
    },
    ResetHwOscillatorPhase {
        signals: Vec<SignalUid>,
    },
    InitialResetHwOscillatorPhase {
        device: DeviceUid,
        /// Duration of the reset in seconds.
        duration: Seconds,
    },
}

impl EventKind {
    pub fn event_type(&self) -> EventType {
        match self {
            EventKind::SectionStart { .. } => EventType::SectionStart,
            EventKind::SectionEnd { .. } => EventType::SectionEnd,
            EventKind::LoopStart { .. } => EventType::LoopStart,
            EventKind::LoopEnd { .. } => EventType::LoopEnd,
            EventKind::LoopIterationStart { .. } => EventType::LoopIterationStart,
            EventKind::LoopIterationEnd { .. } => EventType::LoopIterationEnd,
            EventKind::PlayStart(_) => EventType::PlayStart,
            EventKind::PlayEnd { .. } => EventType::PlayEnd,
            EventKind::DelayStart(_) => EventType::DelayStart,
            EventKind::DelayEnd { .. } => EventType::DelayEnd,
            EventKind::AcquireStart(_) => EventType::AcquireStart,
            EventKind::AcquireEnd { .. } => EventType::AcquireEnd,
            EventKind::SetOscillatorFrequencyStart(_) => EventType::SetOscillatorFrequencyStart,
            EventKind::SetOscillatorFrequencyEnd { .. } => EventType::SetOscillatorFrequencyEnd,
            EventKind::InitialOscillatorFrequency(_) => EventType::InitialOscillatorFrequency,
            EventKind::ResetSwOscillatorPhase { .. } => EventType::ResetSwOscillatorPhase,
            EventKind::ResetHwOscillatorPhase { .. } => EventType::ResetHwOscillatorPhase,
            EventKind::InitialResetHwOscillatorPhase { .. } => {
                EventType::InitialResetHwOscillatorPhase
            }
        }
    }
}

/// An event of the flat event list.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: EventId,
    /// Absolute time in seconds.
    pub time: Seconds,
    pub kind: EventKind,
}

impl Event {
    pub fn event_type(&self) -> EventType {
        self.kind.event_type()
    }

    /// Signals targeted by the event.
    pub fn signals(&self) -> &[SignalUid] {
        match &self.kind {
            EventKind::PlayStart(pulse)
            | EventKind::DelayStart(pulse)
            | EventKind::AcquireStart(pulse) => std::slice::from_ref(&pulse.signal),
            EventKind::PlayEnd { signal, .. }
            | EventKind::DelayEnd { signal, .. }
            | EventKind::AcquireEnd { signal, .. } => std::slice::from_ref(signal),
            EventKind::SetOscillatorFrequencyStart(osc)
            | EventKind::InitialOscillatorFrequency(osc) => osc.signals.as_slice(),
            EventKind::SetOscillatorFrequencyEnd { signals, .. }
            | EventKind::ResetHwOscillatorPhase { signals } => signals.as_slice(),
            EventKind::SectionStart { .. }
            | EventKind::SectionEnd { .. }
            | EventKind::LoopStart { .. }
            | EventKind::LoopEnd { .. }
            | EventKind::LoopIterationStart { .. }
            | EventKind::LoopIterationEnd { .. }
            | EventKind::ResetSwOscillatorPhase { .. }
            | EventKind::InitialResetHwOscillatorPhase { .. } => &[],
        }
    }

    /// ID of the start event an end event belongs to.
    pub fn chain_element_id(&self) -> Option<EventId> {
        match &self.kind {
            EventKind::SectionEnd {
                chain_element_id, ..
            }
            | EventKind::LoopEnd {
                chain_element_id, ..
            }
            | EventKind::LoopIterationEnd {
                chain_element_id, ..
            }
            | EventKind::PlayEnd {
                chain_element_id, ..
            }
            | EventKind::DelayEnd {
                chain_element_id, ..
            }
            | EventKind::AcquireEnd {
                chain_element_id, ..
            }
            | EventKind::SetOscillatorFrequencyEnd {
                chain_element_id, ..
            } => Some(*chain_element_id),
            _ => None,
        }
    }

    pub fn pulse(&self) -> Option<&PulseEvent> {
        match &self.kind {
            EventKind::PlayStart(pulse)
            | EventKind::DelayStart(pulse)
            | EventKind::AcquireStart(pulse) => Some(pulse),
            _ => None,
        }
    }
}

/// Sort the events selected by `priority` by time and priority.
///
/// Returns the indices of the selected events. Events at the same time are
/// ordered by ascending priority value, remaining ties by event ID, so that the
/// order does not depend on the order of the input.
pub(crate) fn sorted_by_priority(
    events: &[Event],
    priority: impl Fn(EventType) -> Option<i32>,
) -> Vec<usize> {
    let mut selected: Vec<(usize, i32)> = events
        .iter()
        .enumerate()
        .filter_map(|(idx, event)| priority(event.event_type()).map(|p| (idx, p)))
        .collect();
    selected.sort_by(|(a, prio_a), (b, prio_b)| {
        let (a, b) = (&events[*a], &events[*b]);
        a.time
            .total_cmp(&b.time)
            .then(prio_a.cmp(prio_b))
            .then(a.id.cmp(&b.id))
    });
    selected.into_iter().map(|(idx, _)| idx).collect()
}
