// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Register sequencing for DMA streams.
//!
//! Each stream moves through
//!
//! ```text
//!   Unconfigured --apply--> Configured --enable--> Armed
//!                               ^                    |
//!                               |       disable or transfer complete
//!                             apply                  |
//!                               |                    v
//!                               +---------------- Disabled
//! ```
//!
//! `Dma` does not enforce these transitions. Applying to an armed stream is
//! left to the controller's discretion, and callers are expected to disable
//! the stream and wait for `EN` to drop first. At most one context may drive
//! a given stream at a time.

use core::cell::Cell;

use crate::config::CONFIG;
use crate::ErrorCode;

use super::encode::{
    decode_control, decode_fifo, decode_ndt, encode_register, ControlWord, StreamWords,
};
use super::fields::StreamId;
use super::registers::{
    flag_position, flags_from_status, flags_to_word, DmaRegisterAccess, StreamFlags,
    StreamRegister, SxCR,
};
use super::stream_config::StreamConfig;
use super::NUM_STREAMS;

/// Software view of a stream's lifecycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StreamState {
    /// Never applied since reset.
    Unconfigured,
    /// Registers written, `EN` not set.
    Configured,
    /// `EN` set, the controller may be transferring.
    Armed,
    /// `EN` cleared, either by software or because the transfer finished.
    Disabled,
}

/// Bound on the number of `SxCR` reads [`Dma::await_enable_state`] may
/// issue.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollLimit {
    /// Spin until the bit matches. Hangs if the controller never gets
    /// there, e.g. on a misconfigured stream.
    Unbounded,
    /// Give up with `BUSY` after this many reads.
    Attempts(u32),
}

/// Driver for the DMA controller behind `registers`.
pub struct Dma<R: DmaRegisterAccess> {
    registers: R,
    states: [Cell<StreamState>; NUM_STREAMS],
    /// `EN` has read back as set since the last `enable`.
    latched: [Cell<bool>; NUM_STREAMS],
}

impl<R: DmaRegisterAccess> Dma<R> {
    /// A driver with every stream `Unconfigured`.
    pub const fn new(registers: R) -> Dma<R> {
        #[allow(clippy::declare_interior_mutable_const)]
        const UNCONFIGURED: Cell<StreamState> = Cell::new(StreamState::Unconfigured);
        #[allow(clippy::declare_interior_mutable_const)]
        const NOT_LATCHED: Cell<bool> = Cell::new(false);
        Dma {
            registers,
            states: [UNCONFIGURED; NUM_STREAMS],
            latched: [NOT_LATCHED; NUM_STREAMS],
        }
    }

    fn read(&self, stream: StreamId, register: StreamRegister) -> u32 {
        self.registers.read_stream(stream, register)
    }

    fn write(&self, stream: StreamId, register: StreamRegister, value: u32) {
        if CONFIG.trace_register_writes {
            log::trace!("dma: {:?} {:?} <- {:#010x}", stream, register, value);
        }
        self.registers.write_stream(stream, register, value);
    }

    fn set_state(&self, stream: StreamId, state: StreamState) {
        let previous = self.states[stream.index()].replace(state);
        if CONFIG.trace_state_changes && previous != state {
            log::debug!("dma: {:?} {:?} -> {:?}", stream, previous, state);
        }
    }

    /// Read `SxCR`, noting when `EN` is seen set.
    fn control(&self, stream: StreamId) -> ControlWord {
        let cr = ControlWord::new(self.read(stream, StreamRegister::CR));
        if cr.is_set(SxCR::EN) {
            self.latched[stream.index()].set(true);
        }
        cr
    }

    /// Write every register of `config.stream`: control, item count,
    /// peripheral address, both memory addresses and FIFO control, in that
    /// order. `EN` is written as zero.
    pub fn apply(&self, config: &StreamConfig) {
        let words = StreamWords::from(config);
        for (register, value) in words.in_write_order() {
            self.write(config.stream, register, value);
        }
        self.set_state(config.stream, StreamState::Configured);
    }

    /// Set `EN`, leaving every other bit of `SxCR` as it reads back.
    ///
    /// This is a plain read-modify-write and races with anything else
    /// writing the same register.
    pub fn enable(&self, stream: StreamId) {
        let mut cr = self.control(stream);
        cr.modify(SxCR::EN::SET);
        self.latched[stream.index()].set(false);
        self.write(stream, StreamRegister::CR, cr.get());
        self.set_state(stream, StreamState::Armed);
    }

    /// Clear `EN`. The controller may finish the current burst first; use
    /// [`Dma::await_enable_state`] to know when the stream has stopped.
    pub fn disable(&self, stream: StreamId) {
        let mut cr = self.control(stream);
        cr.modify(SxCR::EN::CLEAR);
        self.write(stream, StreamRegister::CR, cr.get());
        self.set_state(stream, StreamState::Disabled);
    }

    /// Write the single register `register` of `config.stream` from
    /// `config`, leaving the other five untouched.
    ///
    /// Rewriting `SxCR` this way clears `EN` and stops an armed stream.
    /// The other registers can be updated while the stream runs where the
    /// controller allows it, e.g. the idle memory address in double buffer
    /// mode.
    pub fn write_register(&self, config: &StreamConfig, register: StreamRegister) {
        self.write(config.stream, register, encode_register(config, register));
        if register == StreamRegister::CR
            && self.states[config.stream.index()].get() == StreamState::Armed
        {
            self.set_state(config.stream, StreamState::Disabled);
        }
    }

    /// Apply `config` and enable its stream.
    pub fn configure(&self, config: &StreamConfig) {
        self.apply(config);
        self.enable(config.stream);
    }

    /// Poll `EN` of `stream` until it reads as `enabled`.
    ///
    /// Returns the number of reads it took. With `PollLimit::Attempts(n)`
    /// the wait fails with `BUSY` once `n` reads did not match, so
    /// `Attempts(0)` never touches the register.
    pub fn await_enable_state(
        &self,
        stream: StreamId,
        enabled: bool,
        limit: PollLimit,
    ) -> Result<u32, ErrorCode> {
        let mut reads: u32 = 0;
        loop {
            if let PollLimit::Attempts(max) = limit {
                if reads >= max {
                    log::warn!(
                        "dma: {:?} EN still not {} after {} reads",
                        stream,
                        enabled as u8,
                        reads
                    );
                    return Err(ErrorCode::BUSY);
                }
            }
            reads = reads.saturating_add(1);
            if self.control(stream).is_set(SxCR::EN) == enabled {
                return Ok(reads);
            }
            core::hint::spin_loop();
        }
    }

    /// Lifecycle state of `stream`, checked against the `EN` bit: a stream
    /// the controller has stopped is reported `Disabled` even if nobody
    /// called [`Dma::disable`].
    ///
    /// An armed stream whose `EN` has not latched yet stays `Armed`; it only
    /// counts as stopped once `EN` has been seen set and then clear.
    pub fn state(&self, stream: StreamId) -> StreamState {
        let tracked = self.states[stream.index()].get();
        let enabled = self.control(stream).is_set(SxCR::EN);
        let state = match (tracked, enabled) {
            (_, true) => StreamState::Armed,
            (StreamState::Armed, false) if self.latched[stream.index()].get() => {
                StreamState::Disabled
            }
            (other, false) => other,
        };
        self.set_state(stream, state);
        state
    }

    /// Data items the controller still has to transfer.
    pub fn remaining_items(&self, stream: StreamId) -> u16 {
        decode_ndt(self.read(stream, StreamRegister::NDTR))
    }

    /// Read back the configuration currently held by the controller.
    ///
    /// `ndt` is the live item count, not the programmed one. Fails with
    /// `INVAL` if a register holds a pattern no `StreamConfig` encodes to.
    pub fn snapshot(&self, stream: StreamId) -> Result<StreamConfig, ErrorCode> {
        Ok(StreamConfig {
            stream,
            control: decode_control(self.read(stream, StreamRegister::CR))?,
            ndt: self.remaining_items(stream),
            pa: self.read(stream, StreamRegister::PAR),
            m0a: self.read(stream, StreamRegister::M0AR),
            m1a: self.read(stream, StreamRegister::M1AR),
            fifo: decode_fifo(self.read(stream, StreamRegister::FCR))?,
        })
    }

    /// Interrupt flags currently raised for `stream`. The other streams
    /// sharing the status register are masked out.
    pub fn interrupt_flags(&self, stream: StreamId) -> StreamFlags {
        let (bank, shift) = flag_position(stream);
        flags_from_status(self.registers.read_status(bank), shift)
    }

    /// Clear the given interrupt flags of `stream`. Flags of other streams
    /// are never written, so they cannot be lost.
    pub fn clear_interrupt_flags(&self, stream: StreamId, flags: StreamFlags) {
        let (bank, shift) = flag_position(stream);
        self.registers.write_flag_clear(bank, flags_to_word(flags, shift));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dma::fields::{Direction, Priority};
    use crate::dma::registers::FLAGS;
    use crate::dma::sim::SimulatedDma;

    const ALL_REGISTERS: [StreamRegister; 6] = [
        StreamRegister::CR,
        StreamRegister::NDTR,
        StreamRegister::PAR,
        StreamRegister::M0AR,
        StreamRegister::M1AR,
        StreamRegister::FCR,
    ];

    fn config(index: usize) -> StreamConfig {
        StreamConfig::initialize(index, 0x4001_1004, 0x2000_0100, Direction::MemoryToPeripheral, 64)
            .unwrap()
            .with_priority(Priority::High)
            .with_double_buffer(0x2000_0200)
    }

    #[test]
    fn apply_writes_encoded_words_only_to_its_stream() {
        let sim = SimulatedDma::new();
        let dma = Dma::new(&sim);
        let config = config(5);
        dma.apply(&config);

        let words = StreamWords::from(&config);
        for (register, value) in words.in_write_order() {
            assert_eq!(sim.peek(StreamId::Stream5, register), value);
        }
        assert_eq!(sim.peek(StreamId::Stream5, StreamRegister::CR) & 1, 0);

        for stream in StreamId::ALL {
            if stream == StreamId::Stream5 {
                continue;
            }
            for register in ALL_REGISTERS {
                assert_eq!(sim.peek(stream, register), 0);
            }
            assert_eq!(dma.state(stream), StreamState::Unconfigured);
        }
        assert_eq!(dma.state(StreamId::Stream5), StreamState::Configured);
    }

    #[test]
    fn enable_only_sets_bit_zero() {
        let sim = SimulatedDma::new();
        let dma = Dma::new(&sim);
        sim.write_stream(StreamId::Stream0, StreamRegister::CR, 0xFFFF_FFFE);
        dma.enable(StreamId::Stream0);
        assert_eq!(sim.peek(StreamId::Stream0, StreamRegister::CR), 0xFFFF_FFFF);

        let config = config(1);
        dma.apply(&config);
        dma.enable(StreamId::Stream1);
        assert_eq!(
            sim.peek(StreamId::Stream1, StreamRegister::CR),
            StreamWords::from(&config).cr | 1
        );
        assert_eq!(dma.state(StreamId::Stream1), StreamState::Armed);
    }

    #[test]
    fn await_blocks_for_the_enable_latency() {
        let sim = SimulatedDma::new();
        let dma = Dma::new(&sim);
        sim.set_enable_latency(StreamId::Stream3, 5);

        dma.configure(&config(3));
        let reads_before = sim.control_reads(StreamId::Stream3);
        let polls = dma.await_enable_state(StreamId::Stream3, true, PollLimit::Unbounded);
        assert_eq!(polls, Ok(6));
        assert_eq!(Ok(sim.control_reads(StreamId::Stream3) - reads_before), polls);
        assert_eq!(sim.peek(StreamId::Stream3, StreamRegister::CR) & 1, 1);
    }

    #[test]
    fn await_gives_up_at_the_limit() {
        let sim = SimulatedDma::new();
        let dma = Dma::new(&sim);
        sim.set_enable_latency(StreamId::Stream4, 10);
        dma.configure(&config(4));

        let reads_before = sim.control_reads(StreamId::Stream4);
        assert_eq!(
            dma.await_enable_state(StreamId::Stream4, true, PollLimit::Attempts(3)),
            Err(ErrorCode::BUSY)
        );
        assert_eq!(sim.control_reads(StreamId::Stream4), reads_before + 3);

        assert_eq!(
            dma.await_enable_state(StreamId::Stream4, true, PollLimit::Attempts(0)),
            Err(ErrorCode::BUSY)
        );
        assert_eq!(sim.control_reads(StreamId::Stream4), reads_before + 3);

        // Seven reads drain the remaining latency, the eighth sees EN.
        assert_eq!(
            dma.await_enable_state(StreamId::Stream4, true, PollLimit::Attempts(8)),
            Ok(8)
        );
    }

    #[test]
    fn disable_is_confirmed_by_polling() {
        let sim = SimulatedDma::new();
        let dma = Dma::new(&sim);
        dma.configure(&config(6));
        sim.set_enable_latency(StreamId::Stream6, 2);

        dma.disable(StreamId::Stream6);
        assert_eq!(
            dma.await_enable_state(StreamId::Stream6, false, PollLimit::Attempts(10)),
            Ok(3)
        );
        assert_eq!(dma.state(StreamId::Stream6), StreamState::Disabled);

        dma.apply(&config(6));
        assert_eq!(dma.state(StreamId::Stream6), StreamState::Configured);
    }

    #[test]
    fn stream_stays_armed_until_enable_latches() {
        let sim = SimulatedDma::new();
        let dma = Dma::new(&sim);
        sim.set_enable_latency(StreamId::Stream1, 3);
        dma.configure(&config(1));

        // enable() used one read, so three more see EN clear.
        assert_eq!(dma.state(StreamId::Stream1), StreamState::Armed);
        assert_eq!(dma.state(StreamId::Stream1), StreamState::Armed);
        assert_eq!(dma.state(StreamId::Stream1), StreamState::Armed);
        assert_eq!(sim.peek(StreamId::Stream1, StreamRegister::CR) & 1, 0);
        assert_eq!(dma.state(StreamId::Stream1), StreamState::Armed);
        assert_eq!(sim.peek(StreamId::Stream1, StreamRegister::CR) & 1, 1);
    }

    #[test]
    fn completion_after_latch_is_disabled() {
        let sim = SimulatedDma::new();
        let dma = Dma::new(&sim);
        sim.set_enable_latency(StreamId::Stream0, 1);
        let config = StreamConfig::initialize(0, 0x100, 0x200, Direction::MemoryToMemory, 8).unwrap();
        dma.configure(&config);
        assert_eq!(
            dma.await_enable_state(StreamId::Stream0, true, PollLimit::Attempts(4)),
            Ok(2)
        );

        sim.complete_transfer(StreamId::Stream0);
        assert_eq!(dma.state(StreamId::Stream0), StreamState::Disabled);
    }

    #[test]
    fn write_register_touches_one_word() {
        let sim = SimulatedDma::new();
        let dma = Dma::new(&sim);
        let mut config = config(3);
        dma.configure(&config);
        let before: Vec<u32> = ALL_REGISTERS
            .iter()
            .map(|register| sim.peek(StreamId::Stream3, *register))
            .collect();

        config.m1a = 0x2000_0300;
        dma.write_register(&config, StreamRegister::M1AR);

        for (register, old) in ALL_REGISTERS.iter().zip(before) {
            let now = sim.peek(StreamId::Stream3, *register);
            if *register == StreamRegister::M1AR {
                assert_eq!(now, 0x2000_0300);
            } else {
                assert_eq!(now, old);
            }
        }
        assert_eq!(dma.state(StreamId::Stream3), StreamState::Armed);

        dma.write_register(&config, StreamRegister::CR);
        assert_eq!(sim.peek(StreamId::Stream3, StreamRegister::CR) & 1, 0);
        assert_eq!(dma.state(StreamId::Stream3), StreamState::Disabled);
    }

    #[test]
    fn completed_transfer_is_reported_disabled() {
        let sim = SimulatedDma::new();
        let dma = Dma::new(&sim);
        let config = StreamConfig::initialize(2, 0x100, 0x200, Direction::MemoryToMemory, 32).unwrap();
        dma.configure(&config);
        assert_eq!(dma.state(StreamId::Stream2), StreamState::Armed);
        assert_eq!(dma.remaining_items(StreamId::Stream2), 32);

        sim.complete_transfer(StreamId::Stream2);
        assert_eq!(dma.state(StreamId::Stream2), StreamState::Disabled);
        assert_eq!(dma.remaining_items(StreamId::Stream2), 0);
        assert!(dma.interrupt_flags(StreamId::Stream2).is_set(FLAGS::TCIF));
    }

    #[test]
    fn snapshot_reads_back_the_applied_configuration() {
        let sim = SimulatedDma::new();
        let dma = Dma::new(&sim);
        let config = config(7);
        dma.configure(&config);
        assert_eq!(dma.snapshot(StreamId::Stream7), Ok(config));

        sim.write_stream(StreamId::Stream0, StreamRegister::CR, 0b11 << 6);
        assert_eq!(dma.snapshot(StreamId::Stream0), Err(ErrorCode::INVAL));
    }

    #[test]
    fn interrupt_flags_are_per_stream() {
        let sim = SimulatedDma::new();
        let dma = Dma::new(&sim);

        let mut complete = StreamFlags::new(0);
        complete.modify(FLAGS::TCIF::SET + FLAGS::HTIF::SET);
        let mut error = StreamFlags::new(0);
        error.modify(FLAGS::TEIF::SET);
        sim.raise_flags(StreamId::Stream6, complete);
        sim.raise_flags(StreamId::Stream7, error);

        assert_eq!(dma.interrupt_flags(StreamId::Stream6).get(), complete.get());
        assert_eq!(dma.interrupt_flags(StreamId::Stream7).get(), error.get());
        assert_eq!(dma.interrupt_flags(StreamId::Stream2).get(), 0);

        let mut half = StreamFlags::new(0);
        half.modify(FLAGS::HTIF::SET);
        dma.clear_interrupt_flags(StreamId::Stream6, half);
        assert!(dma.interrupt_flags(StreamId::Stream6).is_set(FLAGS::TCIF));
        assert!(!dma.interrupt_flags(StreamId::Stream6).is_set(FLAGS::HTIF));
        assert_eq!(dma.interrupt_flags(StreamId::Stream7).get(), error.get());
    }
}
