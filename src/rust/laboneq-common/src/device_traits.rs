// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

/// Device traits relevant for building the event list.
///
/// NOTE: Mirror from `laboneq` Python package:
///     src/python/laboneq/compiler/common/device_type.py
///     Ensure that the values do match when changing.
#[derive(Debug)]
pub struct DeviceTraits {
    /// Nominal sampling rate in samples per second.
    pub sampling_rate: f64,
    /// Sampling rate when operated together with SHF instruments, if it differs.
    pub sampling_rate_with_shf: Option<f64>,
    /// QA devices do not keep a running baseband phase for software oscillators.
    pub is_qa_device: bool,
    pub supports_reset_osc_phase: bool,
    /// Time in seconds the sequencer needs to reset the hardware oscillator phase.
    pub oscillator_reset_duration: f64,
}

pub const HDAWG_TRAITS: DeviceTraits = DeviceTraits {
    sampling_rate: 2.4e9,
    sampling_rate_with_shf: Some(2.0e9),
    is_qa_device: false,
    supports_reset_osc_phase: true,
    oscillator_reset_duration: 80e-9,
};

pub const UHFQA_TRAITS: DeviceTraits = DeviceTraits {
    sampling_rate: 1.8e9,
    sampling_rate_with_shf: None,
    is_qa_device: true,
    supports_reset_osc_phase: true,
    oscillator_reset_duration: 40e-9,
};

pub const SHFSG_TRAITS: DeviceTraits = DeviceTraits {
    sampling_rate: 2.0e9,
    sampling_rate_with_shf: None,
    is_qa_device: false,
    supports_reset_osc_phase: true,
    oscillator_reset_duration: 56e-9,
};

pub const SHFQA_TRAITS: DeviceTraits = DeviceTraits {
    sampling_rate: 2.0e9,
    sampling_rate_with_shf: None,
    is_qa_device: true,
    supports_reset_osc_phase: true,
    oscillator_reset_duration: 56e-9,
};
