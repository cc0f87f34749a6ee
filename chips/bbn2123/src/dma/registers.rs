// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Register map of the DMA controller.
//!
//! | Offset          | Register | Description                              |
//! |-----------------|----------|------------------------------------------|
//! | 0x00            | LISR     | interrupt status, streams 0..3 (RO)      |
//! | 0x04            | HISR     | interrupt status, streams 4..7 (RO)      |
//! | 0x08            | LIFCR    | interrupt flag clear, streams 0..3 (W1C) |
//! | 0x0C            | HIFCR    | interrupt flag clear, streams 4..7 (W1C) |
//! | 0x10 + 0x18 * x | SxCR     | stream x configuration                   |
//! | 0x14 + 0x18 * x | SxNDTR   | stream x number of data items            |
//! | 0x18 + 0x18 * x | SxPAR    | stream x peripheral address              |
//! | 0x1C + 0x18 * x | SxM0AR   | stream x memory 0 address                |
//! | 0x20 + 0x18 * x | SxM1AR   | stream x memory 1 address                |
//! | 0x24 + 0x18 * x | SxFCR    | stream x FIFO control                    |

use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};
use tock_registers::{register_bitfields, register_structs, LocalRegisterCopy};

use crate::StaticRef;

use super::fields::StreamId;
use super::NUM_STREAMS;

register_structs! {
    /// Register block of a single stream.
    pub StreamRegisters {
        /// stream x configuration register
        (0x00 => cr: ReadWrite<u32, SxCR::Register>),
        /// stream x number of data register
        (0x04 => ndtr: ReadWrite<u32, SxNDTR::Register>),
        /// stream x peripheral address register
        (0x08 => par: ReadWrite<u32>),
        /// stream x memory 0 address register
        (0x0C => m0ar: ReadWrite<u32>),
        /// stream x memory 1 address register
        (0x10 => m1ar: ReadWrite<u32>),
        /// stream x FIFO control register
        (0x14 => fcr: ReadWrite<u32, SxFCR::Register>),
        (0x18 => @END),
    },

    /// DMA controller
    pub DmaRegisters {
        /// low interrupt status register
        (0x00 => lisr: ReadOnly<u32>),
        /// high interrupt status register
        (0x04 => hisr: ReadOnly<u32>),
        /// low interrupt flag clear register
        (0x08 => lifcr: WriteOnly<u32>),
        /// high interrupt flag clear register
        (0x0C => hifcr: WriteOnly<u32>),
        (0x10 => streams: [StreamRegisters; NUM_STREAMS]),
        (0xD0 => @END),
    }
}

register_bitfields![u32,
    pub SxCR [
        /// Channel selection
        CHSEL OFFSET(25) NUMBITS(3) [],
        /// Memory burst transfer configuration
        MBURST OFFSET(23) NUMBITS(2) [],
        /// Peripheral burst transfer configuration
        PBURST OFFSET(21) NUMBITS(2) [],
        /// Current target (only in double buffer mode)
        CT OFFSET(19) NUMBITS(1) [],
        /// Double buffer mode
        DBM OFFSET(18) NUMBITS(1) [],
        /// Priority level
        PL OFFSET(16) NUMBITS(2) [],
        /// Peripheral increment offset size
        PINCOS OFFSET(15) NUMBITS(1) [],
        /// Memory data size
        MSIZE OFFSET(13) NUMBITS(2) [],
        /// Peripheral data size
        PSIZE OFFSET(11) NUMBITS(2) [],
        /// Memory increment mode
        MINC OFFSET(10) NUMBITS(1) [],
        /// Peripheral increment mode
        PINC OFFSET(9) NUMBITS(1) [],
        /// Circular mode
        CIRC OFFSET(8) NUMBITS(1) [],
        /// Data transfer direction
        DIR OFFSET(6) NUMBITS(2) [],
        /// Peripheral flow controller
        PFCTRL OFFSET(5) NUMBITS(1) [],
        /// Transfer complete interrupt enable
        TCIE OFFSET(4) NUMBITS(1) [],
        /// Half transfer interrupt enable
        HTIE OFFSET(3) NUMBITS(1) [],
        /// Transfer error interrupt enable
        TEIE OFFSET(2) NUMBITS(1) [],
        /// Direct mode error interrupt enable
        DMEIE OFFSET(1) NUMBITS(1) [],
        /// Stream enable / flag stream ready when read low
        EN OFFSET(0) NUMBITS(1) []
    ],
    pub SxNDTR [
        /// Number of data items left to transfer
        NDT OFFSET(0) NUMBITS(16) []
    ],
    pub SxFCR [
        /// FIFO error interrupt enable
        FEIE OFFSET(7) NUMBITS(1) [],
        /// FIFO status (read-only)
        FS OFFSET(3) NUMBITS(3) [],
        /// Direct mode disable
        DMDIS OFFSET(2) NUMBITS(1) [],
        /// FIFO threshold selection
        FTH OFFSET(0) NUMBITS(2) []
    ]
];

register_bitfields![u8,
    /// Interrupt flags of one stream. LISR/HISR hold four of these groups
    /// each and LIFCR/HIFCR clear them with the same layout.
    pub FLAGS [
        /// FIFO error
        FEIF OFFSET(0) NUMBITS(1) [],
        /// Direct mode error
        DMEIF OFFSET(2) NUMBITS(1) [],
        /// Transfer error
        TEIF OFFSET(3) NUMBITS(1) [],
        /// Half transfer
        HTIF OFFSET(4) NUMBITS(1) [],
        /// Transfer complete
        TCIF OFFSET(5) NUMBITS(1) []
    ]
];

/// Snapshot of the interrupt flags of one stream.
pub type StreamFlags = LocalRegisterCopy<u8, FLAGS::Register>;

/// Bits of a flag group that carry a flag. Bit 1 is reserved.
const FLAG_GROUP_MASK: u32 = 0b11_1101;

/// Bit offset of each stream's flag group inside its status word.
const FLAG_GROUP_OFFSET: [usize; 4] = [0, 6, 16, 22];

/// Word of a stream register block.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StreamRegister {
    CR,
    NDTR,
    PAR,
    M0AR,
    M1AR,
    FCR,
}

/// Half of the shared interrupt status/clear register pairs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlagBank {
    /// LISR/LIFCR, streams 0 to 3
    Low,
    /// HISR/HIFCR, streams 4 to 7
    High,
}

/// Where the flag group of `stream` lives: the status/clear pair and the bit
/// offset inside it.
pub(crate) const fn flag_position(stream: StreamId) -> (FlagBank, usize) {
    let index = stream.index();
    let bank = if index < 4 {
        FlagBank::Low
    } else {
        FlagBank::High
    };
    (bank, FLAG_GROUP_OFFSET[index % 4])
}

/// Extract the flag group of a stream from its status word.
pub(crate) fn flags_from_status(status: u32, shift: usize) -> StreamFlags {
    StreamFlags::new(((status >> shift) & FLAG_GROUP_MASK) as u8)
}

/// Position a flag group inside a status or clear word.
pub(crate) fn flags_to_word(flags: StreamFlags, shift: usize) -> u32 {
    (u32::from(flags.get()) & FLAG_GROUP_MASK) << shift
}

/// Word-level access to a DMA controller's registers.
///
/// Every call is one side-effecting access: implementations must neither
/// cache, merge nor reorder them. The memory-mapped controller implements
/// this through [`StaticRef<DmaRegisters>`]; [`super::sim::SimulatedDma`]
/// implements it in software.
pub trait DmaRegisterAccess {
    /// Read one word of a stream's register block.
    fn read_stream(&self, stream: StreamId, register: StreamRegister) -> u32;

    /// Write one word of a stream's register block.
    fn write_stream(&self, stream: StreamId, register: StreamRegister, value: u32);

    /// Read the interrupt status register of `bank`.
    fn read_status(&self, bank: FlagBank) -> u32;

    /// Write the interrupt flag clear register of `bank`. Every bit set in
    /// `value` clears the matching status flag.
    fn write_flag_clear(&self, bank: FlagBank, value: u32);
}

impl DmaRegisterAccess for StaticRef<DmaRegisters> {
    fn read_stream(&self, stream: StreamId, register: StreamRegister) -> u32 {
        let regs = &self.streams[stream.index()];
        match register {
            StreamRegister::CR => regs.cr.get(),
            StreamRegister::NDTR => regs.ndtr.get(),
            StreamRegister::PAR => regs.par.get(),
            StreamRegister::M0AR => regs.m0ar.get(),
            StreamRegister::M1AR => regs.m1ar.get(),
            StreamRegister::FCR => regs.fcr.get(),
        }
    }

    fn write_stream(&self, stream: StreamId, register: StreamRegister, value: u32) {
        let regs = &self.streams[stream.index()];
        match register {
            StreamRegister::CR => regs.cr.set(value),
            StreamRegister::NDTR => regs.ndtr.set(value),
            StreamRegister::PAR => regs.par.set(value),
            StreamRegister::M0AR => regs.m0ar.set(value),
            StreamRegister::M1AR => regs.m1ar.set(value),
            StreamRegister::FCR => regs.fcr.set(value),
        }
    }

    fn read_status(&self, bank: FlagBank) -> u32 {
        match bank {
            FlagBank::Low => self.lisr.get(),
            FlagBank::High => self.hisr.get(),
        }
    }

    fn write_flag_clear(&self, bank: FlagBank, value: u32) {
        match bank {
            FlagBank::Low => self.lifcr.set(value),
            FlagBank::High => self.hifcr.set(value),
        }
    }
}

impl<T: DmaRegisterAccess + ?Sized> DmaRegisterAccess for &T {
    fn read_stream(&self, stream: StreamId, register: StreamRegister) -> u32 {
        (**self).read_stream(stream, register)
    }

    fn write_stream(&self, stream: StreamId, register: StreamRegister, value: u32) {
        (**self).write_stream(stream, register, value)
    }

    fn read_status(&self, bank: FlagBank) -> u32 {
        (**self).read_status(bank)
    }

    fn write_flag_clear(&self, bank: FlagBank, value: u32) {
        (**self).write_flag_clear(bank, value)
    }
}
