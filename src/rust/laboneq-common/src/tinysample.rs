// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

/// Integer time unit of the scheduler.
pub type TinySample = i64;

/// The smallest time unit used in the compiler, in seconds.
///
/// Example conversion:
///
/// At 2.0 GS/s 1 sample = 1800 x TINYSAMPLE_DURATION
pub const TINYSAMPLE_DURATION: f64 = 1.0 / 3600000e6;

pub fn seconds_to_tinysamples(seconds: f64) -> TinySample {
    (seconds / TINYSAMPLE_DURATION).round() as TinySample
}
