// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use laboneq_common::named_id::{NamedId, NamedIdStore};
use laboneq_common::types::{DeviceKind, DeviceUid, PulseUid, SectionUid, SignalUid};
use num_complex::Complex64;

use crate::node::IrNode;
use crate::{Device, IrTree, Oscillator, OscillatorKind, PlayPulse, Signal};

/// Collects the signals, oscillators and devices of an experiment and
/// interns their names.
pub struct IrTreeBuilder {
    id_store: NamedIdStore,
    signals: Vec<Signal>,
    devices: Vec<Device>,
}

impl IrTreeBuilder {
    pub fn new() -> Self {
        Self {
            id_store: NamedIdStore::new(),
            signals: Vec::new(),
            devices: Vec::new(),
        }
    }

    pub fn uid(&mut self, name: &str) -> NamedId {
        self.id_store.get_or_insert(name)
    }

    pub fn section(&mut self, name: &str) -> SectionUid {
        SectionUid(self.uid(name))
    }

    pub fn pulse(&mut self, name: &str) -> PulseUid {
        PulseUid(self.uid(name))
    }

    pub fn device(&mut self, name: &str, kind: DeviceKind) -> DeviceUid {
        let uid = DeviceUid(self.uid(name));
        self.devices.push(Device { uid, kind });
        uid
    }

    pub fn signal(&mut self, name: &str, device: DeviceUid) -> SignalUid {
        assert!(
            self.devices.iter().any(|d| d.uid == device),
            "Device of signal '{name}' must be added first"
        );
        let uid = SignalUid(self.uid(name));
        self.signals.push(Signal {
            uid,
            device,
            oscillator: None,
        });
        uid
    }

    /// Add an oscillator and attach it to the given signals.
    pub fn oscillator(
        &mut self,
        name: &str,
        kind: OscillatorKind,
        signals: &[SignalUid],
    ) -> Arc<Oscillator> {
        let oscillator = Arc::new(Oscillator {
            uid: self.uid(name).into(),
            kind,
            signals: signals.to_vec(),
        });
        for uid in signals {
            let signal = self
                .signals
                .iter_mut()
                .find(|s| s.uid == *uid)
                .expect("Signal of oscillator must be added first");
            signal.oscillator = Some(Arc::clone(&oscillator));
        }
        oscillator
    }

    pub fn build(self, root: Option<IrNode>) -> IrTree {
        IrTree {
            root,
            signals: self.signals,
            devices: self.devices,
            id_store: self.id_store,
        }
    }
}

impl Default for IrTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct PlayPulseBuilder {
    inner: PlayPulse,
}

impl PlayPulseBuilder {
    pub fn new(signal: SignalUid) -> Self {
        Self {
            inner: PlayPulse {
                signal,
                pulse: None,
                amplitude: None,
                phase: 0.0,
                increment_oscillator_phase: None,
                set_oscillator_phase: None,
            },
        }
    }

    pub fn pulse(mut self, pulse: PulseUid) -> Self {
        self.inner.pulse = Some(pulse);
        self
    }

    pub fn amplitude(mut self, amplitude: Complex64) -> Self {
        self.inner.amplitude = Some(amplitude);
        self
    }

    pub fn phase(mut self, phase: f64) -> Self {
        self.inner.phase = phase;
        self
    }

    pub fn increment_oscillator_phase(mut self, value: f64) -> Self {
        self.inner.increment_oscillator_phase = Some(value);
        self
    }

    pub fn set_oscillator_phase(mut self, value: f64) -> Self {
        self.inner.set_oscillator_phase = Some(value);
        self
    }

    pub fn build(self) -> PlayPulse {
        self.inner
    }
}
