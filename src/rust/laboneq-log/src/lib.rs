// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Logging facade for the compiler crates.
//!
//! All messages go through the [`log`] crate with a target of the form
//! `laboneq.rust::<module path>`, so that the host can route them with a
//! single logger configuration.

use std::sync::{atomic::AtomicBool, atomic::Ordering};

#[doc(hidden)]
pub use log as _log;

#[doc(hidden)]
#[macro_export]
macro_rules! __log_with_target {
    ($level:ident, $($arg:tt)+) => {
        $crate::_log::$level!(target: concat!("laboneq.rust::", module_path!()), $($arg)+)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => {
        $crate::__log_with_target!(warn, $($arg)+)
    };
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => {
        $crate::__log_with_target!(debug, $($arg)+)
    };
}

/// Log a diagnostic message at info level if diagnostics logging is enabled.
#[macro_export]
macro_rules! diagnostic {
    ($($arg:tt)+) => {
        if $crate::is_diagnostics_enabled() {
            $crate::__log_with_target!(info, $($arg)+)
        }
    };
}

static DIAGNOSTICS_ENABLED: AtomicBool = AtomicBool::new(false);

#[inline]
pub fn is_diagnostics_enabled() -> bool {
    DIAGNOSTICS_ENABLED.load(Ordering::Acquire)
}

/// Initialize the logging.
///
/// Meant to be called once by the host before the first compilation. No
/// logger is installed here, the host decides where the records end up.
pub fn init_logging(with_diagnostics: bool) {
    DIAGNOSTICS_ENABLED.store(with_diagnostics, Ordering::Release);
}
