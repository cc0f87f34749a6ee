// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Standard error enum for driver operations.

/// Errors reported by the drivers in this crate.
///
/// The numeric values match the error codes of the Tock kernel so boards can
/// forward them to userspace unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(usize)]
pub enum ErrorCode {
    /// Underlying hardware did not reach the requested state; retry
    BUSY = 1,
    /// An invalid parameter was passed, or a register held an undefined
    /// bit pattern
    INVAL = 5,
    /// Parameter passed was too large
    SIZE = 6,
}

impl From<ErrorCode> for usize {
    fn from(err: ErrorCode) -> usize {
        err as usize
    }
}
