// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowdag contributors

//! Utility modules
//!
//! Terminal output helpers for the flowdag CLI.

pub mod colors;

pub use colors::*;
