// Copyright 2024 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

pub mod error;
pub mod oscillator_schedule;
pub mod pulse_schedule;
pub mod sampling_rate_tracker;
pub mod schedule_data;

pub use error::{Error, Result};
pub use oscillator_schedule::{InitialOscillatorFrequencySchedule, OscillatorFrequencyStepSchedule};
pub use pulse_schedule::PulseSchedule;
pub use sampling_rate_tracker::SamplingRateTracker;
pub use schedule_data::ScheduleData;
