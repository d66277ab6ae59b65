// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Display;

use laboneq_common::tinysample::TinySample;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(
        "Exceeded the maximum number of events ({max_events}) while generating the event list"
    )]
    EventLimitExceeded { max_events: usize },

    #[error(
        "Internal error: Cannot set phase of hardware oscillator on signal '{signal}' (should have been caught earlier)"
    )]
    HardwareOscillatorPhaseSet { signal: String },

    #[error("Internal error: Length of '{node}' node starting at {start} is not resolved")]
    UnresolvedLength {
        node: &'static str,
        start: TinySample,
    },

    #[error("Internal error: Unknown signal '{signal}'")]
    UnknownSignal { signal: String },

    #[error("Internal error: Unknown device '{device}' of signal '{signal}'")]
    UnknownDevice { device: String, signal: String },

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    pub fn new<T>(msg: T) -> Self
    where
        T: Display,
    {
        Error::Anyhow(anyhow::anyhow!(msg.to_string()))
    }
}
