// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Software model of the DMA controller's register file.
//!
//! `SimulatedDma` stands in for [`super::DMA_BASE`] when the driver runs on
//! a host. Stream registers are plain `InMemoryRegister`s with a few pieces
//! of hardware behaviour layered on top:
//!
//! - a change of `EN` is latched only after a configurable number of `SxCR`
//!   reads, so that polling code actually has to wait;
//! - `SxNDTR` keeps only its low 16 bits and `SxFCR.FS` is read-only;
//! - `LIFCR`/`HIFCR` writes clear the matching `LISR`/`HISR` bits.
//!
//! The "hardware side" (raising flags, finishing a transfer) is driven
//! explicitly by the test through the inherent methods.

use core::cell::Cell;

use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::registers::InMemoryRegister;

use super::fields::StreamId;
use super::registers::{
    flag_position, flags_to_word, DmaRegisterAccess, FlagBank, StreamFlags, StreamRegister,
    SxCR, SxFCR, SxNDTR, FLAGS,
};
use super::NUM_STREAMS;

struct SimulatedStream {
    cr: InMemoryRegister<u32, SxCR::Register>,
    ndtr: InMemoryRegister<u32, SxNDTR::Register>,
    par: InMemoryRegister<u32>,
    m0ar: InMemoryRegister<u32>,
    m1ar: InMemoryRegister<u32>,
    fcr: InMemoryRegister<u32, SxFCR::Register>,
    enable_latency: Cell<u32>,
    /// Requested `EN` value and the number of `SxCR` reads left before the
    /// controller latches it.
    pending_enable: Cell<Option<(bool, u32)>>,
    control_reads: Cell<u32>,
}

impl SimulatedStream {
    fn new() -> SimulatedStream {
        SimulatedStream {
            cr: InMemoryRegister::new(0),
            ndtr: InMemoryRegister::new(0),
            par: InMemoryRegister::new(0),
            m0ar: InMemoryRegister::new(0),
            m1ar: InMemoryRegister::new(0),
            fcr: InMemoryRegister::new(0),
            enable_latency: Cell::new(0),
            pending_enable: Cell::new(None),
            control_reads: Cell::new(0),
        }
    }

    fn read_control(&self) -> u32 {
        self.control_reads.set(self.control_reads.get().wrapping_add(1));
        match self.pending_enable.get() {
            Some((enabled, 0)) => {
                self.cr.modify(SxCR::EN.val(enabled as u32));
                self.pending_enable.set(None);
            }
            Some((enabled, remaining)) => {
                self.pending_enable.set(Some((enabled, remaining - 1)));
            }
            None => {}
        }
        self.cr.get()
    }

    fn write_control(&self, value: u32) {
        let current = self.cr.is_set(SxCR::EN);
        let requested = value & 1 == 1;
        let latency = self.enable_latency.get();

        if requested == current || latency == 0 {
            self.pending_enable.set(None);
            self.cr.set(value);
        } else {
            self.cr.set(value);
            self.cr.modify(SxCR::EN.val(current as u32));
            self.pending_enable.set(Some((requested, latency)));
        }
    }

    fn write_fifo(&self, value: u32) {
        let status = self.fcr.read(SxFCR::FS);
        self.fcr.set(value);
        self.fcr.modify(SxFCR::FS.val(status));
    }

    fn peek(&self, register: StreamRegister) -> u32 {
        match register {
            StreamRegister::CR => self.cr.get(),
            StreamRegister::NDTR => self.ndtr.get(),
            StreamRegister::PAR => self.par.get(),
            StreamRegister::M0AR => self.m0ar.get(),
            StreamRegister::M1AR => self.m1ar.get(),
            StreamRegister::FCR => self.fcr.get(),
        }
    }
}

/// A DMA controller backed by memory instead of MMIO.
pub struct SimulatedDma {
    lisr: InMemoryRegister<u32>,
    hisr: InMemoryRegister<u32>,
    streams: [SimulatedStream; NUM_STREAMS],
}

impl Default for SimulatedDma {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedDma {
    /// A controller in its reset state with no enable latency.
    pub fn new() -> SimulatedDma {
        SimulatedDma {
            lisr: InMemoryRegister::new(0),
            hisr: InMemoryRegister::new(0),
            streams: core::array::from_fn(|_| SimulatedStream::new()),
        }
    }

    fn status(&self, bank: FlagBank) -> &InMemoryRegister<u32> {
        match bank {
            FlagBank::Low => &self.lisr,
            FlagBank::High => &self.hisr,
        }
    }

    /// Number of `SxCR` reads the controller takes to latch a change of
    /// `EN`. Zero latches on the write itself.
    pub fn set_enable_latency(&self, stream: StreamId, reads: u32) {
        self.streams[stream.index()].enable_latency.set(reads);
    }

    /// Number of `SxCR` reads issued so far on `stream`.
    pub fn control_reads(&self, stream: StreamId) -> u32 {
        self.streams[stream.index()].control_reads.get()
    }

    /// Current value of a stream register. Unlike a driver read, this
    /// neither counts as a poll nor advances a pending `EN` change.
    pub fn peek(&self, stream: StreamId, register: StreamRegister) -> u32 {
        self.streams[stream.index()].peek(register)
    }

    /// Set interrupt flags of `stream` as the controller would.
    pub fn raise_flags(&self, stream: StreamId, flags: StreamFlags) {
        let (bank, shift) = flag_position(stream);
        let status = self.status(bank);
        status.set(status.get() | flags_to_word(flags, shift));
    }

    /// Finish the transfer in flight on `stream`.
    ///
    /// Circular and double-buffer streams stay enabled, the latter switching
    /// `CT` to the other memory target. Any other stream drops `EN` and ends
    /// with `NDTR` at zero. `TCIF` is raised either way. A disabled stream
    /// has nothing in flight and is left untouched.
    pub fn complete_transfer(&self, stream: StreamId) {
        let s = &self.streams[stream.index()];
        if !s.cr.is_set(SxCR::EN) {
            return;
        }

        if s.cr.is_set(SxCR::DBM) {
            let target = s.cr.read(SxCR::CT);
            s.cr.modify(SxCR::CT.val(target ^ 1));
        } else if !s.cr.is_set(SxCR::CIRC) {
            s.pending_enable.set(None);
            s.cr.modify(SxCR::EN::CLEAR);
            s.ndtr.set(0);
        }

        let mut flags = StreamFlags::new(0);
        flags.modify(FLAGS::TCIF::SET);
        self.raise_flags(stream, flags);
    }
}

impl DmaRegisterAccess for SimulatedDma {
    fn read_stream(&self, stream: StreamId, register: StreamRegister) -> u32 {
        let s = &self.streams[stream.index()];
        match register {
            StreamRegister::CR => s.read_control(),
            _ => s.peek(register),
        }
    }

    fn write_stream(&self, stream: StreamId, register: StreamRegister, value: u32) {
        let s = &self.streams[stream.index()];
        match register {
            StreamRegister::CR => s.write_control(value),
            StreamRegister::NDTR => s.ndtr.write(SxNDTR::NDT.val(value)),
            StreamRegister::PAR => s.par.set(value),
            StreamRegister::M0AR => s.m0ar.set(value),
            StreamRegister::M1AR => s.m1ar.set(value),
            StreamRegister::FCR => s.write_fifo(value),
        }
    }

    fn read_status(&self, bank: FlagBank) -> u32 {
        self.status(bank).get()
    }

    fn write_flag_clear(&self, bank: FlagBank, value: u32) {
        let status = self.status(bank);
        status.set(status.get() & !value);
    }
}
