// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::device_traits::{DeviceTraits, HDAWG_TRAITS, SHFQA_TRAITS, SHFSG_TRAITS, UHFQA_TRAITS};
use crate::named_uid;

named_uid!(
    /// UID of a logical signal line.
    SignalUid
);
named_uid!(DeviceUid);
named_uid!(OscillatorUid);
named_uid!(SectionUid);
named_uid!(PulseUid);
named_uid!(ParameterUid);
named_uid!(
    /// Acquisition handle under which results are stored.
    HandleUid
);

/// Instrument families known to the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Hdawg,
    Shfqa,
    Shfsg,
    Uhfqa,
    Shfppc,
    Pqsc,
}

impl DeviceKind {
    /// Code generation traits of the device.
    ///
    /// Control instruments (PQSC) and peripherals (SHFPPC) do not run a
    /// waveform sequencer and have no traits.
    pub fn traits(&self) -> Option<&'static DeviceTraits> {
        match self {
            DeviceKind::Hdawg => Some(&HDAWG_TRAITS),
            DeviceKind::Uhfqa => Some(&UHFQA_TRAITS),
            DeviceKind::Shfsg => Some(&SHFSG_TRAITS),
            DeviceKind::Shfqa => Some(&SHFQA_TRAITS),
            DeviceKind::Shfppc | DeviceKind::Pqsc => None,
        }
    }

    pub fn is_shf(&self) -> bool {
        matches!(
            self,
            DeviceKind::Shfqa | DeviceKind::Shfsg | DeviceKind::Shfppc
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::Hdawg => "hdawg",
            DeviceKind::Shfqa => "shfqa",
            DeviceKind::Shfsg => "shfsg",
            DeviceKind::Uhfqa => "uhfqa",
            DeviceKind::Shfppc => "shfppc",
            DeviceKind::Pqsc => "pqsc",
        }
    }
}

impl Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hdawg" => Ok(DeviceKind::Hdawg),
            "shfqa" => Ok(DeviceKind::Shfqa),
            "shfsg" => Ok(DeviceKind::Shfsg),
            "uhfqa" => Ok(DeviceKind::Uhfqa),
            "shfppc" => Ok(DeviceKind::Shfppc),
            "pqsc" => Ok(DeviceKind::Pqsc),
            _ => Err(crate::Error::new(format!("Unknown device type: '{s}'"))),
        }
    }
}
