// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use laboneq_common::named_id::NamedIdStore;
use laboneq_common::types::{DeviceUid, SignalUid};

use crate::node::IrNode;
use crate::{Device, Signal};

/// The scheduled experiment handed over to the event list generation.
///
/// The tree is read only for all consumers.
#[derive(Debug)]
pub struct IrTree {
    pub root: Option<IrNode>,
    pub signals: Vec<Signal>,
    pub devices: Vec<Device>,
    pub id_store: NamedIdStore,
}

impl IrTree {
    pub fn signal(&self, uid: SignalUid) -> Option<&Signal> {
        self.signals.iter().find(|s| s.uid == uid)
    }

    pub fn device(&self, uid: DeviceUid) -> Option<&Device> {
        self.devices.iter().find(|d| d.uid == uid)
    }
}
