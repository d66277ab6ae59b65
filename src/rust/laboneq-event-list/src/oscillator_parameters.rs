// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Frequency history of software oscillators, per signal.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use laboneq_common::tinysample::TinySample;
use laboneq_common::types::SignalUid;
use laboneq_ir::node::IrNode;
use laboneq_ir::{IrKind, IrTree, OscillatorFrequency};

/// Software oscillator frequencies over time, per signal.
///
/// The frequency at a given time is the one set last at or before that time.
/// Before the first recorded time, the frequency is unknown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OscillatorParameters {
    freq_by_signal: IndexMap<SignalUid, BTreeMap<TinySample, f64>>,
}

impl OscillatorParameters {
    /// Build from the `(time, frequency)` observations of each signal.
    ///
    /// Of several observations at the same time, the last one wins.
    pub fn new(values: IndexMap<SignalUid, Vec<(TinySample, f64)>>) -> Self {
        let freq_by_signal = values
            .into_iter()
            .filter(|(_, observations)| !observations.is_empty())
            .map(|(signal, observations)| (signal, observations.into_iter().collect()))
            .collect();
        OscillatorParameters { freq_by_signal }
    }

    /// Signals with a frequency history.
    pub fn signals(&self) -> impl Iterator<Item = &SignalUid> {
        self.freq_by_signal.keys()
    }

    /// Time of the first frequency observation of the signal.
    pub fn earliest(&self, signal: SignalUid) -> Option<TinySample> {
        self.freq_by_signal
            .get(&signal)
            .and_then(|series| series.keys().next().copied())
    }

    /// Oscillator frequency of the signal at the given time.
    pub fn freq_at(&self, signal: SignalUid, time: TinySample) -> Option<f64> {
        self.freq_by_signal
            .get(&signal)?
            .range(..=time)
            .next_back()
            .map(|(_, freq)| *freq)
    }
}

#[derive(Default)]
struct PickOscillatorParameters {
    sw_osc_times: IndexMap<SignalUid, Vec<(TinySample, f64)>>,
}

impl PickOscillatorParameters {
    fn record(&mut self, values: &[OscillatorFrequency], start: TinySample) {
        for value in values.iter().filter(|v| !v.oscillator.is_hardware()) {
            for signal in &value.oscillator.signals {
                self.sw_osc_times
                    .entry(*signal)
                    .or_default()
                    .push((start, value.value));
            }
        }
    }

    fn visit(&mut self, node: &IrNode, start: TinySample) {
        match &node.kind {
            IrKind::SetOscillatorFrequency(ob) => self.record(&ob.values, start),
            IrKind::InitialOscillatorFrequency(ob) => self.record(&ob.values, start),
            IrKind::Root | IrKind::Section(_) | IrKind::Loop(_) | IrKind::LoopIteration(_) => {
                for child in node.iter_children() {
                    self.visit(&child.node, start + child.offset);
                }
            }
            IrKind::PlayPulse(_)
            | IrKind::Acquire(_)
            | IrKind::Delay(_)
            | IrKind::ResetSwOscillatorPhase(_)
            | IrKind::ResetHwOscillatorPhase(_) => {}
        }
    }
}

/// Collect the software oscillator frequencies of the experiment.
pub fn calculate_oscillator_parameters(ir: &IrTree) -> OscillatorParameters {
    let mut picker = PickOscillatorParameters::default();
    if let Some(root) = &ir.root {
        picker.visit(root, 0);
    }
    OscillatorParameters::new(picker.sw_osc_times)
}
