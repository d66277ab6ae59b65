// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use laboneq_common::tinysample::TinySample;
use laboneq_common::types::{HandleUid, PulseUid, SectionUid, SignalUid};

/// A scheduled pulse on a single signal.
///
/// Times are relative to the start of the enclosing section.
#[derive(Debug, Clone, PartialEq)]
pub struct PulseSchedule {
    pub signal: SignalUid,
    pub section: SectionUid,
    pub pulse: Option<PulseUid>,
    /// Acquisition handle, set for acquire pulses.
    pub handle: Option<HandleUid>,
    pub start: TinySample,
    pub length: TinySample,
}

impl PulseSchedule {
    pub fn end(&self) -> TinySample {
        self.start + self.length
    }

    pub fn is_acquire(&self) -> bool {
        self.handle.is_some()
    }
}
