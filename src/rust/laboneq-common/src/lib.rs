// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

pub mod compiler_settings;
pub mod device_traits;
mod error;
pub mod named_id;
pub mod tinysample;
pub mod types;

pub use compiler_settings::CompilerSettings;
pub use error::{Error, Result};
