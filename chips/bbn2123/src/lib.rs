// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Peripheral drivers for the MP-BBN2123 microcontroller.
//!
//! The crate currently covers the stream-based DMA controller: an in-memory
//! model of one stream's configuration, the pure encoders that turn it into
//! register words, and the sequencer that writes those words to the
//! controller and arms the stream.
//!
//! Register access is injected through [`dma::DmaRegisterAccess`]. Boards use
//! the memory-mapped instance at [`dma::DMA_BASE`]; host tests use
//! [`dma::sim::SimulatedDma`].

#![cfg_attr(not(test), no_std)]

mod config;
mod errorcode;
mod static_ref;

pub mod dma;

pub use crate::errorcode::ErrorCode;
pub use crate::static_ref::StaticRef;
