// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Schedules of oscillator frequency updates.
//!
//! Frequency updates have no children to place. Their length is the settle
//! time of the update and is always set by a parameter before timing is
//! calculated.

use std::sync::Arc;

use laboneq_common::tinysample::TinySample;
use laboneq_common::types::{ParameterUid, SectionUid};
use laboneq_ir::node::IrNode;
use laboneq_ir::{
    InitialOscillatorFrequency, IrKind, Oscillator, OscillatorFrequency, SetOscillatorFrequency,
};

use crate::{Error, Result};

fn oscillator_frequencies(
    oscillators: &[Arc<Oscillator>],
    values: &[f64],
    params: &[ParameterUid],
) -> Result<Vec<OscillatorFrequency>> {
    if oscillators.len() != values.len() {
        return Err(Error::new(format!(
            "Internal error: Got {} frequencies for {} oscillators",
            values.len(),
            oscillators.len()
        )));
    }
    let frequencies = oscillators
        .iter()
        .zip(values)
        .enumerate()
        .map(|(idx, (oscillator, value))| OscillatorFrequency {
            oscillator: Arc::clone(oscillator),
            value: *value,
            parameter: params.get(idx).copied(),
        })
        .collect();
    Ok(frequencies)
}

fn resolved_length(
    length: Option<TinySample>,
    schedule: &'static str,
    start: TinySample,
) -> Result<TinySample> {
    length.ok_or(Error::UnresolvedLength { schedule, start })
}

/// Frequency update of swept oscillators in one step of a sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct OscillatorFrequencyStepSchedule {
    pub section: SectionUid,
    pub oscillators: Vec<Arc<Oscillator>>,
    /// Sweep parameters of the oscillators, in the same order.
    pub params: Vec<ParameterUid>,
    pub values: Vec<f64>,
    pub iteration: u64,
    pub length: Option<TinySample>,
}

impl OscillatorFrequencyStepSchedule {
    const NAME: &'static str = "OscillatorFrequencyStepSchedule";

    /// Returns the start of the schedule, there are no children to place.
    pub fn calculate_timing(&self, start: TinySample) -> Result<TinySample> {
        resolved_length(self.length, Self::NAME, start)?;
        Ok(start)
    }

    pub fn into_ir(self) -> Result<IrNode> {
        let values = oscillator_frequencies(&self.oscillators, &self.values, &self.params)?;
        let kind = IrKind::SetOscillatorFrequency(SetOscillatorFrequency {
            section: self.section,
            values,
            iteration: self.iteration,
        });
        Ok(match self.length {
            Some(length) => IrNode::new(kind, length),
            None => IrNode::with_deferred_length(kind),
        })
    }
}

/// Frequency of the oscillators at the start of the experiment.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialOscillatorFrequencySchedule {
    pub section: SectionUid,
    pub oscillators: Vec<Arc<Oscillator>>,
    pub values: Vec<f64>,
    pub length: Option<TinySample>,
}

impl InitialOscillatorFrequencySchedule {
    const NAME: &'static str = "InitialOscillatorFrequencySchedule";

    pub fn calculate_timing(&self, start: TinySample) -> Result<TinySample> {
        resolved_length(self.length, Self::NAME, start)?;
        Ok(start)
    }

    pub fn into_ir(self) -> Result<IrNode> {
        let values = oscillator_frequencies(&self.oscillators, &self.values, &[])?;
        let kind = IrKind::InitialOscillatorFrequency(InitialOscillatorFrequency { values });
        Ok(match self.length {
            Some(length) => IrNode::new(kind, length),
            None => IrNode::with_deferred_length(kind),
        })
    }
}
