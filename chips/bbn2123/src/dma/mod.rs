// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Stream-based DMA controller.
//!
//! The controller has [`NUM_STREAMS`] independent streams. Configuring one
//! is a three-step affair:
//!
//! 1. Build a [`StreamConfig`] with [`StreamConfig::initialize`] and adjust
//!    its fields.
//! 2. [`Dma::apply`] it. This writes all six stream registers and leaves the
//!    stream disabled.
//! 3. [`Dma::enable`] the stream, and optionally confirm with
//!    [`Dma::await_enable_state`] that the controller latched the EN bit.
//!
//! ```rust,ignore
//! let dma = Dma::new(bbn2123::dma::DMA_BASE);
//! let config = StreamConfig::initialize(2, usart_dr, buf.as_ptr() as u32,
//!     Direction::MemoryToPeripheral, buf.len() as u32)?;
//! dma.apply(&config);
//! dma.enable(config.stream);
//! dma.await_enable_state(config.stream, true, PollLimit::Attempts(1000))?;
//! ```
//!
//! The buffers behind the addresses, and which stream serves which
//! peripheral, stay the caller's business.

use crate::StaticRef;

pub mod encode;
pub mod fields;
pub mod registers;
pub mod sim;
pub mod stream;
pub mod stream_config;

pub use self::fields::{
    Burst, Channel, CurrentTarget, DirectMode, Direction, FifoThreshold, FlowController,
    IncrementMode, PeripheralIncrementOffset, Priority, Size, StreamId,
};
pub use self::registers::{DmaRegisterAccess, DmaRegisters, FlagBank, StreamFlags, StreamRegister};
pub use self::stream::{Dma, PollLimit, StreamState};
pub use self::stream_config::{ControlConfig, FifoConfig, StreamConfig};

/// Number of streams on the controller.
pub const NUM_STREAMS: usize = 8;

/// The memory-mapped DMA controller.
pub const DMA_BASE: StaticRef<DmaRegisters> =
    unsafe { StaticRef::new(0x4002_6000 as *const DmaRegisters) };
