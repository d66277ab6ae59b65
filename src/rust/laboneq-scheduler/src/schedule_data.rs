// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! State of the scheduler that lives across scheduling runs.
//!
//! An experiment is scheduled repeatedly, e.g. when a near-time sweep
//! changes a parameter. Between runs, [`ScheduleData::reset`] drops the
//! state that belongs to a single run and keeps the rest.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use laboneq_common::types::SignalUid;
use laboneq_ir::{IrTree, Signal};
use laboneq_log::debug;

use crate::pulse_schedule::PulseSchedule;
use crate::sampling_rate_tracker::SamplingRateTracker;
use crate::{Error, Result};

pub type WarningCallback = Box<dyn Fn(&[String])>;

/// A warning collected over the whole experiment and emitted once per signal.
pub struct CombinedWarning {
    callback: WarningCallback,
    args: Vec<String>,
}

impl CombinedWarning {
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// State valid for a single scheduling run.
#[derive(Default)]
struct RunState {
    acquire_pulses: HashMap<SignalUid, Vec<PulseSchedule>>,
}

pub struct ScheduleData {
    // Valid as long as the experiment does not change
    signal_objects: HashMap<SignalUid, Arc<Signal>>,
    sampling_rate_tracker: SamplingRateTracker,
    combined_warnings: IndexMap<SignalUid, CombinedWarning>,

    run: RunState,
}

impl ScheduleData {
    pub fn new(ir: &IrTree) -> Self {
        ScheduleData {
            signal_objects: ir
                .signals
                .iter()
                .map(|signal| (signal.uid, Arc::new(signal.clone())))
                .collect(),
            sampling_rate_tracker: SamplingRateTracker::new(&ir.devices),
            combined_warnings: IndexMap::new(),
            run: RunState::default(),
        }
    }

    /// Prepare for a new scheduling run of the same experiment.
    ///
    /// Only the acquire pulses of the previous run are dropped.
    pub fn reset(&mut self) {
        self.run = RunState::default();
    }

    pub fn signal(&self, uid: SignalUid) -> Option<&Arc<Signal>> {
        self.signal_objects.get(&uid)
    }

    /// Sampling rate of the device the signal is on.
    pub fn sampling_rate_for_signal(&self, uid: SignalUid) -> Result<f64> {
        let signal = self
            .signal(uid)
            .ok_or_else(|| Error::new(format!("Unknown signal {uid:?}")))?;
        self.sampling_rate_tracker
            .sampling_rate_for_device(signal.device)
    }

    pub fn add_acquire_pulse(&mut self, pulse: PulseSchedule) -> Result<()> {
        if !pulse.is_acquire() {
            return Err(Error::new(format!(
                "Internal error: Pulse on signal {:?} is not an acquisition",
                pulse.signal
            )));
        }
        self.run
            .acquire_pulses
            .entry(pulse.signal)
            .or_default()
            .push(pulse);
        Ok(())
    }

    /// Acquire pulses scheduled on the signal in this run.
    pub fn acquire_pulses(&self, signal: SignalUid) -> &[PulseSchedule] {
        self.run
            .acquire_pulses
            .get(&signal)
            .map_or(&[], |pulses| pulses.as_slice())
    }

    /// Record a warning for the signal.
    ///
    /// Warnings for the same signal are combined: the callback of the first
    /// report is kept and the arguments of all reports are collected.
    pub fn add_combined_warning(
        &mut self,
        signal: SignalUid,
        callback: impl Fn(&[String]) + 'static,
        arg: String,
    ) {
        self.combined_warnings
            .entry(signal)
            .or_insert_with(|| CombinedWarning {
                callback: Box::new(callback),
                args: vec![],
            })
            .args
            .push(arg);
    }

    pub fn combined_warning(&self, signal: SignalUid) -> Option<&CombinedWarning> {
        self.combined_warnings.get(&signal)
    }

    /// Invoke the callback of every combined warning, in the order they were first reported.
    pub fn emit_combined_warnings(&self) {
        debug!("Emitting {} combined warnings", self.combined_warnings.len());
        for warning in self.combined_warnings.values() {
            (warning.callback)(&warning.args);
        }
    }
}
