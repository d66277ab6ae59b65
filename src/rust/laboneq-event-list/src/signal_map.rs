// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use laboneq_common::named_id::NamedIdStore;
use laboneq_common::types::{DeviceKind, DeviceUid, SignalUid};
use laboneq_ir::{IrTree, Oscillator, Signal};

use crate::{Error, Result};

/// Signal to oscillator and signal to device lookups of an experiment.
///
/// Every signal referenced by an event must be known, a missing entry means
/// that the event list and the signals belong to different experiments.
pub struct SignalMap<'a> {
    signals: HashMap<SignalUid, &'a Signal>,
    devices: HashMap<DeviceUid, DeviceKind>,
    id_store: &'a NamedIdStore,
}

impl<'a> SignalMap<'a> {
    pub fn new(ir: &'a IrTree) -> Self {
        SignalMap {
            signals: ir.signals.iter().map(|s| (s.uid, s)).collect(),
            devices: ir.devices.iter().map(|d| (d.uid, d.kind)).collect(),
            id_store: &ir.id_store,
        }
    }

    fn signal(&self, uid: SignalUid) -> Result<&'a Signal> {
        self.signals
            .get(&uid)
            .copied()
            .ok_or_else(|| Error::UnknownSignal {
                signal: self.id_store.display_name(uid),
            })
    }

    pub fn oscillator(&self, uid: SignalUid) -> Result<Option<&'a Oscillator>> {
        Ok(self.signal(uid)?.oscillator.as_deref())
    }

    /// Whether the signal is modulated by a hardware oscillator.
    ///
    /// Signals without an oscillator count as software modulated.
    pub fn is_hw_oscillator(&self, uid: SignalUid) -> Result<bool> {
        Ok(self.signal(uid)?.is_hw_modulated())
    }

    pub fn device_kind(&self, uid: SignalUid) -> Result<DeviceKind> {
        let signal = self.signal(uid)?;
        self.devices
            .get(&signal.device)
            .copied()
            .ok_or_else(|| Error::UnknownDevice {
                device: self.id_store.display_name(signal.device),
                signal: self.id_store.display_name(uid),
            })
    }

    /// Whether the signal is played or acquired by a QA instrument.
    pub fn is_qa_device(&self, uid: SignalUid) -> Result<bool> {
        Ok(self
            .device_kind(uid)?
            .traits()
            .is_some_and(|traits| traits.is_qa_device))
    }

    pub fn display_name(&self, uid: SignalUid) -> String {
        self.id_store.display_name(uid)
    }
}
