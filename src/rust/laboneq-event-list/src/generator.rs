// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Lowering of the IR tree into a flat list of events.
//!
//! All time arithmetic happens on integer tiny samples. The conversion to
//! seconds is done once, after the whole tree has been lowered.

use laboneq_common::CompilerSettings;
use laboneq_common::tinysample::TinySample;
use laboneq_common::types::SectionUid;
use laboneq_ir::node::IrNode;
use laboneq_ir::{IrKind, IrTree, OscillatorFrequency};
use laboneq_log::diagnostic;

use crate::event::{Event, EventId, EventKind, OscillatorFrequencyEvent, PulseEvent};
use crate::{Error, Result};

/// An event whose time is still in tiny samples.
#[derive(Debug)]
struct PendingEvent {
    id: Option<EventId>,
    time: TinySample,
    kind: EventKind,
}

/// Hands out event IDs, shared by the whole lowering of one experiment.
#[derive(Debug, Default)]
struct IdTracker {
    next: EventId,
}

impl IdTracker {
    fn next_id(&mut self) -> EventId {
        let id = self.next;
        self.next += 1;
        id
    }
}

struct EventGenerator<'a> {
    events: Vec<PendingEvent>,
    id_tracker: &'a mut IdTracker,
    expand_loops: bool,
    max_events: usize,
}

impl<'a> EventGenerator<'a> {
    fn new(id_tracker: &'a mut IdTracker, expand_loops: bool, max_events: usize) -> Self {
        EventGenerator {
            events: Vec::new(),
            id_tracker,
            expand_loops,
            max_events,
        }
    }

    fn push(&mut self, id: Option<EventId>, time: TinySample, kind: EventKind) -> Result<()> {
        if self.events.len() >= self.max_events {
            return Err(Error::EventLimitExceeded {
                max_events: self.max_events,
            });
        }
        self.events.push(PendingEvent { id, time, kind });
        Ok(())
    }

    /// Emit a start event with an ID, so that its end event can refer to it.
    fn push_chain_start(&mut self, time: TinySample, kind: EventKind) -> Result<EventId> {
        let id = self.id_tracker.next_id();
        self.push(Some(id), time, kind)?;
        Ok(id)
    }

    fn visit_children(
        &mut self,
        node: &IrNode,
        start: TinySample,
        section: Option<SectionUid>,
    ) -> Result<()> {
        for child in node.iter_children() {
            self.visit(&child.node, start + child.offset, section)?;
        }
        Ok(())
    }

    fn visit(&mut self, node: &IrNode, start: TinySample, section: Option<SectionUid>) -> Result<()> {
        match &node.kind {
            IrKind::Root => self.visit_children(node, start, section),
            IrKind::Section(ob) => {
                let end = start + resolved_length(node, start)?;
                let chain_element_id =
                    self.push_chain_start(start, EventKind::SectionStart { section: ob.uid })?;
                self.visit_children(node, start, Some(ob.uid))?;
                self.push(
                    None,
                    end,
                    EventKind::SectionEnd {
                        section: ob.uid,
                        chain_element_id,
                    },
                )
            }
            IrKind::Loop(ob) => {
                let end = start + resolved_length(node, start)?;
                let chain_element_id = self.push_chain_start(
                    start,
                    EventKind::LoopStart {
                        section: ob.section,
                        num_repeats: ob.count,
                    },
                )?;
                // Without expansion, the first iteration stands for all of them.
                let iterations = if self.expand_loops {
                    node.children.len()
                } else {
                    1
                };
                for child in node.iter_children().take(iterations) {
                    let iteration_start = start + child.offset;
                    let IrKind::LoopIteration(iteration) = &child.node.kind else {
                        return Err(Error::new(format!(
                            "Internal error: Expected loop iteration as child of loop, got '{}'",
                            child.node.kind.name()
                        )));
                    };
                    let iteration_end = iteration_start + resolved_length(&child.node, iteration_start)?;
                    let iteration_id = self.push_chain_start(
                        iteration_start,
                        EventKind::LoopIterationStart {
                            section: iteration.section,
                            iteration: iteration.iteration,
                            parameters: iteration.parameters.clone(),
                        },
                    )?;
                    self.visit_children(&child.node, iteration_start, Some(ob.section))?;
                    self.push(
                        None,
                        iteration_end,
                        EventKind::LoopIterationEnd {
                            section: iteration.section,
                            iteration: iteration.iteration,
                            chain_element_id: iteration_id,
                        },
                    )?;
                }
                self.push(
                    None,
                    end,
                    EventKind::LoopEnd {
                        section: ob.section,
                        chain_element_id,
                    },
                )
            }
            IrKind::LoopIteration(_) => Err(Error::new(format!(
                "Internal error: Loop iteration at {start} outside of a loop"
            ))),
            IrKind::PlayPulse(ob) => {
                let end = start + resolved_length(node, start)?;
                let pulse = PulseEvent {
                    pulse: ob.pulse,
                    amplitude: ob.amplitude,
                    phase: ob.phase,
                    increment_oscillator_phase: ob.increment_oscillator_phase,
                    set_oscillator_phase: ob.set_oscillator_phase,
                    ..PulseEvent::new(ob.signal, section)
                };
                let chain_element_id = self.push_chain_start(start, EventKind::PlayStart(pulse))?;
                self.push(
                    None,
                    end,
                    EventKind::PlayEnd {
                        signal: ob.signal,
                        chain_element_id,
                    },
                )
            }
            IrKind::Acquire(ob) => {
                let end = start + resolved_length(node, start)?;
                let pulse = PulseEvent {
                    pulse: ob.pulse,
                    handle: ob.handle,
                    ..PulseEvent::new(ob.signal, section)
                };
                let chain_element_id =
                    self.push_chain_start(start, EventKind::AcquireStart(pulse))?;
                self.push(
                    None,
                    end,
                    EventKind::AcquireEnd {
                        signal: ob.signal,
                        chain_element_id,
                    },
                )
            }
            IrKind::Delay(ob) => {
                let end = start + resolved_length(node, start)?;
                let pulse = PulseEvent {
                    increment_oscillator_phase: ob.increment_oscillator_phase,
                    set_oscillator_phase: ob.set_oscillator_phase,
                    ..PulseEvent::new(ob.signal, section)
                };
                let chain_element_id = self.push_chain_start(start, EventKind::DelayStart(pulse))?;
                self.push(
                    None,
                    end,
                    EventKind::DelayEnd {
                        signal: ob.signal,
                        chain_element_id,
                    },
                )
            }
            IrKind::SetOscillatorFrequency(ob) => {
                let end = start + resolved_length(node, start)?;
                for value in &ob.values {
                    let event = frequency_event(value, Some(ob.section), ob.iteration);
                    let chain_element_id = self.push_chain_start(
                        start,
                        EventKind::SetOscillatorFrequencyStart(event),
                    )?;
                    self.push(
                        None,
                        end,
                        EventKind::SetOscillatorFrequencyEnd {
                            oscillator: value.oscillator.uid,
                            signals: value.oscillator.signals.clone(),
                            chain_element_id,
                        },
                    )?;
                }
                Ok(())
            }
            IrKind::InitialOscillatorFrequency(ob) => {
                for value in &ob.values {
                    let event = frequency_event(value, section, 0);
                    self.push(None, start, EventKind::InitialOscillatorFrequency(event))?;
                }
                Ok(())
            }
            IrKind::ResetSwOscillatorPhase(ob) => self.push(
                None,
                start,
                EventKind::ResetSwOscillatorPhase {
                    section: ob.section.or(section),
                },
            ),
            IrKind::ResetHwOscillatorPhase(ob) => self.push(
                None,
                start,
                EventKind::ResetHwOscillatorPhase {
                    signals: ob.signals.clone(),
                },
            ),
        }
    }
}

fn resolved_length(node: &IrNode, start: TinySample) -> Result<TinySample> {
    node.length.ok_or_else(|| Error::UnresolvedLength {
        node: node.kind.name(),
        start,
    })
}

fn frequency_event(
    value: &OscillatorFrequency,
    section: Option<SectionUid>,
    iteration: u64,
) -> OscillatorFrequencyEvent {
    OscillatorFrequencyEvent {
        oscillator: value.oscillator.uid,
        signals: value.oscillator.signals.clone(),
        value: value.value,
        parameter: value.parameter,
        section,
        iteration,
    }
}

/// Events at the start of the program, before any node of the tree.
///
/// Every device able to reset the phase of its hardware oscillators gets an
/// initial reset.
fn start_events(ir: &IrTree) -> Vec<PendingEvent> {
    let mut events = vec![];
    for device in &ir.devices {
        let Some(traits) = device.kind.traits() else {
            diagnostic!(
                "Device '{}' of type '{}' has no oscillators to reset",
                ir.id_store.display_name(device.uid),
                device.kind
            );
            continue;
        };
        if !traits.supports_reset_osc_phase {
            continue;
        }
        events.push(PendingEvent {
            id: None,
            time: 0,
            kind: EventKind::InitialResetHwOscillatorPhase {
                device: device.uid,
                duration: traits.oscillator_reset_duration,
            },
        });
    }
    events
}

/// Flatten the IR tree into a list of events in absolute time.
///
/// Fails if the tree lowers to more than `max_events` events.
pub fn flatten_ir(
    ir: &IrTree,
    settings: &CompilerSettings,
    expand_loops: bool,
    max_events: usize,
) -> Result<Vec<Event>> {
    let mut pending = start_events(ir);
    let mut id_tracker = IdTracker::default();
    if let Some(root) = &ir.root {
        let mut generator = EventGenerator::new(&mut id_tracker, expand_loops, max_events);
        generator.visit(root, 0, None)?;
        pending.extend(generator.events);
    }
    let tinysample = settings.tinysample;
    let events = pending
        .into_iter()
        .map(|event| Event {
            id: event.id.unwrap_or_else(|| id_tracker.next_id()),
            time: event.time as f64 * tinysample,
            kind: event.kind,
        })
        .collect();
    Ok(events)
}
