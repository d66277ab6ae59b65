// Copyright 2026 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

pub mod builders;
mod ir;
pub mod node;
mod tree;
pub use ir::*;

pub use tree::IrTree;
// Re-export for convenience
pub use laboneq_common::tinysample::TinySample;
