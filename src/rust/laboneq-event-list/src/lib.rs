// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Lowering of the scheduled IR tree into the event list consumed by the
//! code generator.
//!
//! The event list is produced in three steps:
//! - [`flatten_ir`] lowers the tree into events in absolute time.
//! - [`resolve_oscillator_frequencies`] stamps the software oscillator
//!   frequency on pulses and drops the frequency events it has consumed.
//! - [`resolve_oscillator_phases`] computes the software oscillator phase of
//!   every pulse.
//!
//! [`calculate_oscillator_parameters`] is independent of the event list.

mod error;
pub mod event;
pub mod filter;
mod generator;
mod oscillator_frequency;
mod oscillator_parameters;
mod oscillator_phase;
mod signal_map;


use laboneq_common::CompilerSettings;
use laboneq_ir::IrTree;
use laboneq_log::debug;

pub use error::{Error, Result};
pub use event::{Event, EventKind, EventType};
pub use generator::flatten_ir;
pub use oscillator_frequency::resolve_oscillator_frequencies;
pub use oscillator_parameters::{OscillatorParameters, calculate_oscillator_parameters};
pub use oscillator_phase::resolve_oscillator_phases;
pub use signal_map::SignalMap;

/// Generate the event list of the experiment.
///
/// Fails without returning a partial list, most notably when the tree lowers
/// to more than `max_events` events.
pub fn generate_event_list_from_ir(
    ir: &IrTree,
    settings: &CompilerSettings,
    expand_loops: bool,
    max_events: usize,
) -> Result<Vec<Event>> {
    let events = flatten_ir(ir, settings, expand_loops, max_events)?;
    debug!("Flattened IR tree into {} events", events.len());
    let signals = SignalMap::new(ir);
    let mut events = resolve_oscillator_frequencies(events, &signals)?;
    resolve_oscillator_phases(&mut events, &signals)?;
    Ok(events)
}

/// Generate the event list with the loop expansion and event limit of the settings.
pub fn generate_event_list(ir: &IrTree, settings: &CompilerSettings) -> Result<Vec<Event>> {
    generate_event_list_from_ir(
        ir,
        settings,
        settings.expand_loops_for_schedule,
        settings.max_events_to_publish,
    )
}
