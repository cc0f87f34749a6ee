// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Conversion between a [`StreamConfig`] and register words.
//!
//! Encoding is total: any `StreamConfig` maps to exactly one set of six
//! words. `EN` is never part of the control word, the stream is enabled by a
//! separate read-modify-write once every other field is in place. Decoding
//! is the inverse bit extraction and rejects patterns with no defined
//! meaning.

use tock_registers::LocalRegisterCopy;

use crate::ErrorCode;

use super::fields::{
    Burst, Channel, CurrentTarget, DirectMode, Direction, FifoThreshold, FlowController,
    IncrementMode, PeripheralIncrementOffset, Priority, Size,
};
use super::registers::{StreamRegister, SxCR, SxFCR, SxNDTR};
use super::stream_config::{ControlConfig, FifoConfig, StreamConfig};

/// Local copy of a `SxCR` value.
pub type ControlWord = LocalRegisterCopy<u32, SxCR::Register>;
/// Local copy of a `SxFCR` value.
pub type FifoWord = LocalRegisterCopy<u32, SxFCR::Register>;
/// Local copy of a `SxNDTR` value.
pub type CountWord = LocalRegisterCopy<u32, SxNDTR::Register>;

/// Control word, `EN` clear.
pub fn encode_control(config: &StreamConfig) -> u32 {
    let c = &config.control;
    let mut word = ControlWord::new(0);
    word.modify(
        SxCR::CHSEL.val(c.chsel.bits())
            + SxCR::MBURST.val(c.mburst.bits())
            + SxCR::PBURST.val(c.pburst.bits())
            + SxCR::CT.val(c.ct.bits())
            + SxCR::DBM.val(c.dbm as u32)
            + SxCR::PL.val(c.pl.bits())
            + SxCR::PINCOS.val(c.pincos.bits())
            + SxCR::MSIZE.val(c.msize.bits())
            + SxCR::PSIZE.val(c.psize.bits())
            + SxCR::MINC.val(c.minc.bits())
            + SxCR::PINC.val(c.pinc.bits())
            + SxCR::CIRC.val(c.circ as u32)
            + SxCR::DIR.val(c.dir.bits())
            + SxCR::PFCTRL.val(c.pfctrl.bits())
            + SxCR::TCIE.val(c.tcie as u32)
            + SxCR::HTIE.val(c.htie as u32)
            + SxCR::TEIE.val(c.teie as u32)
            + SxCR::DMEIE.val(c.dmeie as u32),
    );
    word.get()
}

/// Item count word, zero-extended.
pub fn encode_ndt(config: &StreamConfig) -> u32 {
    let mut word = CountWord::new(0);
    word.modify(SxNDTR::NDT.val(u32::from(config.ndt)));
    word.get()
}

/// Peripheral address word.
pub fn encode_pa(config: &StreamConfig) -> u32 {
    config.pa
}

/// Memory 0 address word.
pub fn encode_m0a(config: &StreamConfig) -> u32 {
    config.m0a
}

/// Memory 1 address word.
pub fn encode_m1a(config: &StreamConfig) -> u32 {
    config.m1a
}

/// FIFO control word. `FS` is read-only and bit 6 reserved, both are
/// written as zero.
pub fn encode_fifo(config: &StreamConfig) -> u32 {
    let f = &config.fifo;
    let mut word = FifoWord::new(0);
    word.modify(
        SxFCR::FEIE.val(f.feie as u32)
            + SxFCR::DMDIS.val(f.dmdis.bits())
            + SxFCR::FTH.val(f.fth.bits()),
    );
    word.get()
}

/// The word `config` encodes for a single `register`.
pub fn encode_register(config: &StreamConfig, register: StreamRegister) -> u32 {
    match register {
        StreamRegister::CR => encode_control(config),
        StreamRegister::NDTR => encode_ndt(config),
        StreamRegister::PAR => encode_pa(config),
        StreamRegister::M0AR => encode_m0a(config),
        StreamRegister::M1AR => encode_m1a(config),
        StreamRegister::FCR => encode_fifo(config),
    }
}

/// The six register words of one stream.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StreamWords {
    pub cr: u32,
    pub ndtr: u32,
    pub par: u32,
    pub m0ar: u32,
    pub m1ar: u32,
    pub fcr: u32,
}

impl StreamWords {
    /// The words paired with their register, in the order they must be
    /// written: control first, FIFO control last.
    pub fn in_write_order(&self) -> [(StreamRegister, u32); 6] {
        [
            (StreamRegister::CR, self.cr),
            (StreamRegister::NDTR, self.ndtr),
            (StreamRegister::PAR, self.par),
            (StreamRegister::M0AR, self.m0ar),
            (StreamRegister::M1AR, self.m1ar),
            (StreamRegister::FCR, self.fcr),
        ]
    }
}

impl From<&StreamConfig> for StreamWords {
    fn from(config: &StreamConfig) -> Self {
        StreamWords {
            cr: encode_control(config),
            ndtr: encode_ndt(config),
            par: encode_pa(config),
            m0ar: encode_m0a(config),
            m1ar: encode_m1a(config),
            fcr: encode_fifo(config),
        }
    }
}

fn field<T>(from_bits: fn(u32) -> Option<T>, bits: u32) -> Result<T, ErrorCode> {
    from_bits(bits).ok_or(ErrorCode::INVAL)
}

/// Recover the control fields from a `SxCR` value. `EN` is ignored.
pub fn decode_control(value: u32) -> Result<ControlConfig, ErrorCode> {
    let word = ControlWord::new(value);
    Ok(ControlConfig {
        chsel: field(Channel::from_bits, word.read(SxCR::CHSEL))?,
        mburst: field(Burst::from_bits, word.read(SxCR::MBURST))?,
        pburst: field(Burst::from_bits, word.read(SxCR::PBURST))?,
        ct: field(CurrentTarget::from_bits, word.read(SxCR::CT))?,
        dbm: word.is_set(SxCR::DBM),
        pl: field(Priority::from_bits, word.read(SxCR::PL))?,
        pincos: field(PeripheralIncrementOffset::from_bits, word.read(SxCR::PINCOS))?,
        msize: field(Size::from_bits, word.read(SxCR::MSIZE))?,
        psize: field(Size::from_bits, word.read(SxCR::PSIZE))?,
        minc: field(IncrementMode::from_bits, word.read(SxCR::MINC))?,
        pinc: field(IncrementMode::from_bits, word.read(SxCR::PINC))?,
        circ: word.is_set(SxCR::CIRC),
        dir: field(Direction::from_bits, word.read(SxCR::DIR))?,
        pfctrl: field(FlowController::from_bits, word.read(SxCR::PFCTRL))?,
        tcie: word.is_set(SxCR::TCIE),
        htie: word.is_set(SxCR::HTIE),
        teie: word.is_set(SxCR::TEIE),
        dmeie: word.is_set(SxCR::DMEIE),
    })
}

/// Recover the FIFO fields from a `SxFCR` value. `FS` is ignored.
pub fn decode_fifo(value: u32) -> Result<FifoConfig, ErrorCode> {
    let word = FifoWord::new(value);
    Ok(FifoConfig {
        feie: word.is_set(SxFCR::FEIE),
        dmdis: field(DirectMode::from_bits, word.read(SxFCR::DMDIS))?,
        fth: field(FifoThreshold::from_bits, word.read(SxFCR::FTH))?,
    })
}

/// Items left in a `SxNDTR` value.
pub fn decode_ndt(value: u32) -> u16 {
    CountWord::new(value).read(SxNDTR::NDT) as u16
}
