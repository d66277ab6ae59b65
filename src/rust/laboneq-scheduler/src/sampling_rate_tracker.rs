// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use laboneq_common::types::{DeviceKind, DeviceUid};
use laboneq_ir::Device;

use crate::{Error, Result};

/// Sampling rate of the devices of an experiment.
///
/// Some instruments run at a lower rate when the setup also contains SHF
/// instruments, so the rate depends on the whole device set.
#[derive(Debug, Clone)]
pub struct SamplingRateTracker {
    devices: HashMap<DeviceUid, DeviceKind>,
    has_shf: bool,
}

impl SamplingRateTracker {
    pub fn new(devices: &[Device]) -> Self {
        SamplingRateTracker {
            devices: devices.iter().map(|d| (d.uid, d.kind)).collect(),
            has_shf: devices.iter().any(|d| d.kind.is_shf()),
        }
    }

    pub fn sampling_rate_for_device(&self, device: DeviceUid) -> Result<f64> {
        let kind = self
            .devices
            .get(&device)
            .ok_or_else(|| Error::new(format!("Unknown device {device:?}")))?;
        let traits = kind
            .traits()
            .ok_or_else(|| Error::new(format!("Device of type '{kind}' has no sampling rate")))?;
        let rate = match traits.sampling_rate_with_shf {
            Some(rate) if self.has_shf => rate,
            _ => traits.sampling_rate,
        };
        Ok(rate)
    }
}
