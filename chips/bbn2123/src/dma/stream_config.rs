// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! In-memory configuration of one DMA stream.
//!
//! A [`StreamConfig`] mirrors the stream's register block field for field.
//! It is plain data: nothing reaches the hardware until the configuration is
//! handed to [`super::Dma::apply`].

use tock_registers::fields::FieldValue;

use crate::ErrorCode;

use super::fields::{
    Burst, Channel, CurrentTarget, DirectMode, Direction, FifoThreshold, FlowController,
    IncrementMode, PeripheralIncrementOffset, Priority, Size, StreamId,
};
use super::registers::{StreamFlags, FLAGS};

/// Fields of the stream configuration register (`SxCR`), minus `EN`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlConfig {
    pub chsel: Channel,
    pub mburst: Burst,
    pub pburst: Burst,
    pub ct: CurrentTarget,
    /// Double buffer mode
    pub dbm: bool,
    pub pl: Priority,
    pub pincos: PeripheralIncrementOffset,
    pub msize: Size,
    pub psize: Size,
    pub minc: IncrementMode,
    pub pinc: IncrementMode,
    /// Circular mode
    pub circ: bool,
    pub dir: Direction,
    pub pfctrl: FlowController,
    /// Transfer complete interrupt enable
    pub tcie: bool,
    /// Half transfer interrupt enable
    pub htie: bool,
    /// Transfer error interrupt enable
    pub teie: bool,
    /// Direct mode error interrupt enable
    pub dmeie: bool,
}

impl ControlConfig {
    /// Single bursts at low priority, byte-wide items, a fixed peripheral
    /// address and an incrementing memory address. No double buffering, no
    /// circular mode, DMA flow control and every interrupt disabled.
    pub const DEFAULT: ControlConfig = ControlConfig {
        chsel: Channel::Channel0,
        mburst: Burst::Single,
        pburst: Burst::Single,
        ct: CurrentTarget::Memory0,
        dbm: false,
        pl: Priority::Low,
        pincos: PeripheralIncrementOffset::Psize,
        msize: Size::Byte,
        psize: Size::Byte,
        minc: IncrementMode::Incremented,
        pinc: IncrementMode::Fixed,
        circ: false,
        dir: Direction::PeripheralToMemory,
        pfctrl: FlowController::Dma,
        tcie: false,
        htie: false,
        teie: false,
        dmeie: false,
    };
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Fields of the FIFO control register (`SxFCR`) that software owns.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FifoConfig {
    /// FIFO error interrupt enable
    pub feie: bool,
    pub dmdis: DirectMode,
    pub fth: FifoThreshold,
}

impl FifoConfig {
    /// FIFO mode with a full-FIFO threshold, error interrupt off.
    pub const DEFAULT: FifoConfig = FifoConfig {
        feie: false,
        dmdis: DirectMode::Disabled,
        fth: FifoThreshold::Full,
    };
}

impl Default for FifoConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Everything needed to program one stream.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StreamConfig {
    /// Register block this configuration is applied to.
    pub stream: StreamId,
    pub control: ControlConfig,
    /// Number of data items to transfer. Once the stream is enabled the
    /// controller counts this down in `SxNDTR`; the value here is not
    /// updated.
    pub ndt: u16,
    /// Peripheral address
    pub pa: u32,
    /// Memory 0 address
    pub m0a: u32,
    /// Memory 1 address, only used in double buffer mode.
    pub m1a: u32,
    pub fifo: FifoConfig,
}

impl StreamConfig {
    /// Configuration of `stream` with every option at its default.
    pub const fn new(stream: StreamId, pa: u32, m0a: u32, dir: Direction, ndt: u16) -> Self {
        let mut control = ControlConfig::DEFAULT;
        control.dir = dir;
        StreamConfig {
            stream,
            control,
            ndt,
            pa,
            m0a,
            m1a: 0,
            fifo: FifoConfig::DEFAULT,
        }
    }

    /// Build a configuration from raw parameters.
    ///
    /// Fails with `INVAL` if `stream_index` does not name a stream and with
    /// `SIZE` if `count` does not fit the 16-bit item counter.
    pub fn initialize(
        stream_index: usize,
        pa: u32,
        m0a: u32,
        dir: Direction,
        count: u32,
    ) -> Result<StreamConfig, ErrorCode> {
        let stream = StreamId::try_from(stream_index)?;
        let ndt = u16::try_from(count).map_err(|_| ErrorCode::SIZE)?;
        Ok(StreamConfig::new(stream, pa, m0a, dir, ndt))
    }

    /// Alternate between `m0a` and `m1a`, starting with memory 0.
    #[must_use]
    pub fn with_double_buffer(mut self, m1a: u32) -> Self {
        self.control.dbm = true;
        self.control.ct = CurrentTarget::Memory0;
        self.m1a = m1a;
        self
    }

    /// Reload the item counter and addresses when the transfer completes.
    #[must_use]
    pub fn with_circular(mut self) -> Self {
        self.control.circ = true;
        self
    }

    /// Set the arbitration priority.
    #[must_use]
    pub fn with_priority(mut self, pl: Priority) -> Self {
        self.control.pl = pl;
        self
    }

    /// Set the data item width on both ports.
    #[must_use]
    pub fn with_item_size(mut self, size: Size) -> Self {
        self.control.msize = size;
        self.control.psize = size;
        self
    }

    /// Enable exactly the interrupts whose flags are named in `interrupts`,
    /// e.g. `FLAGS::TCIF::SET + FLAGS::TEIF::SET`.
    #[must_use]
    pub fn with_interrupts(mut self, interrupts: FieldValue<u8, FLAGS::Register>) -> Self {
        let mut enabled = StreamFlags::new(0);
        enabled.modify(interrupts);
        self.control.tcie = enabled.is_set(FLAGS::TCIF);
        self.control.htie = enabled.is_set(FLAGS::HTIF);
        self.control.teie = enabled.is_set(FLAGS::TEIF);
        self.control.dmeie = enabled.is_set(FLAGS::DMEIF);
        self.fifo.feie = enabled.is_set(FLAGS::FEIF);
        self
    }
}
