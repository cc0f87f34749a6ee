// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Compile-time configuration of the chip crate.
//!
//! Options live in a `const` object rather than behind `#[cfg]` so that the
//! disabled paths are still type-checked; the compiler folds the constant
//! and removes them from the binary. The Cargo features of the same name only
//! select the values below.

/// Compile-time configuration options.
pub(crate) struct Config {
    /// Log every register word written by the DMA sequencer.
    ///
    /// Emitted at `trace` level through the `log` facade, with the stream,
    /// the register name and the value written.
    pub(crate) trace_register_writes: bool,

    /// Log stream state transitions (configured, armed) at `debug` level.
    pub(crate) trace_state_changes: bool,
}

/// A unique instance of `Config` where compile-time configuration options are
/// defined.
pub(crate) const CONFIG: Config = Config {
    trace_register_writes: cfg!(feature = "trace_register_writes"),
    trace_state_changes: cfg!(feature = "trace_state_changes"),
};
