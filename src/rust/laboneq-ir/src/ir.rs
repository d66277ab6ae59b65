// Copyright 2026 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use laboneq_common::types::{
    DeviceKind, DeviceUid, HandleUid, OscillatorUid, ParameterUid, PulseUid, SectionUid, SignalUid,
};
use num_complex::Complex64;

// Information living outside the tree

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OscillatorKind {
    Hardware,
    Software,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Oscillator {
    pub uid: OscillatorUid,
    pub kind: OscillatorKind,
    /// Signals modulated by this oscillator.
    pub signals: Vec<SignalUid>,
}

impl Oscillator {
    pub fn is_hardware(&self) -> bool {
        self.kind == OscillatorKind::Hardware
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub uid: SignalUid,
    pub device: DeviceUid,
    pub oscillator: Option<Arc<Oscillator>>,
}

impl Signal {
    pub fn is_hw_modulated(&self) -> bool {
        self.oscillator.as_ref().is_some_and(|osc| osc.is_hardware())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub uid: DeviceUid,
    pub kind: DeviceKind,
}

// IR definition

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub uid: SectionUid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Loop {
    pub section: SectionUid,
    /// Number of iterations. The children of the loop node are its iterations.
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoopIteration {
    pub section: SectionUid,
    pub iteration: u64,
    /// Sweep parameters stepped in this iteration.
    pub parameters: Vec<ParameterUid>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayPulse {
    pub signal: SignalUid,
    pub pulse: Option<PulseUid>,
    pub amplitude: Option<Complex64>,
    /// Baseband phase of the pulse.
    pub phase: f64,
    pub increment_oscillator_phase: Option<f64>,
    pub set_oscillator_phase: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Acquire {
    pub signal: SignalUid,
    pub handle: Option<HandleUid>,
    /// Integration kernel.
    pub pulse: Option<PulseUid>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delay {
    pub signal: SignalUid,
    pub increment_oscillator_phase: Option<f64>,
    pub set_oscillator_phase: Option<f64>,
}

/// Frequency of a single oscillator in a frequency update.
#[derive(Debug, Clone, PartialEq)]
pub struct OscillatorFrequency {
    pub oscillator: Arc<Oscillator>,
    pub value: f64,
    /// Sweep parameter the value originates from.
    pub parameter: Option<ParameterUid>,
}

/// Frequency update of one or more oscillators in a sweep step.
///
/// The node is an instantaneous marker. Its length is the settle time of the
/// update, which is set by the scheduler from the device.
#[derive(Debug, Clone, PartialEq)]
pub struct SetOscillatorFrequency {
    pub section: SectionUid,
    pub values: Vec<OscillatorFrequency>,
    pub iteration: u64,
}

/// Frequency of the oscillators at the start of the experiment.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialOscillatorFrequency {
    pub values: Vec<OscillatorFrequency>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResetSwOscillatorPhase {
    pub section: Option<SectionUid>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResetHwOscillatorPhase {
    pub signals: Vec<SignalUid>,
}

/// Nodes that can live in the IR tree.
#[derive(Debug, Clone, PartialEq)]
pub enum IrKind {
    Root,
    Section(Section),
    Loop(Loop),
    LoopIteration(LoopIteration),
    PlayPulse(PlayPulse),
    Acquire(Acquire),
    Delay(Delay),
    SetOscillatorFrequency(SetOscillatorFrequency),
    InitialOscillatorFrequency(InitialOscillatorFrequency),
    ResetSwOscillatorPhase(ResetSwOscillatorPhase),
    ResetHwOscillatorPhase(ResetHwOscillatorPhase),
}

impl IrKind {
    pub fn name(&self) -> &'static str {
        match self {
            IrKind::Root => "Root",
            IrKind::Section(_) => "Section",
            IrKind::Loop(_) => "Loop",
            IrKind::LoopIteration(_) => "LoopIteration",
            IrKind::PlayPulse(_) => "PlayPulse",
            IrKind::Acquire(_) => "Acquire",
            IrKind::Delay(_) => "Delay",
            IrKind::SetOscillatorFrequency(_) => "SetOscillatorFrequency",
            IrKind::InitialOscillatorFrequency(_) => "InitialOscillatorFrequency",
            IrKind::ResetSwOscillatorPhase(_) => "ResetSwOscillatorPhase",
            IrKind::ResetHwOscillatorPhase(_) => "ResetHwOscillatorPhase",
        }
    }
}
