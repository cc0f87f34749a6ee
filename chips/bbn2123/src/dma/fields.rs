// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Discrete option values of the stream registers.
//!
//! Every multi-bit field of `SxCR` and `SxFCR` gets a closed enum whose
//! discriminant is the bit pattern written into the field. Raw patterns are
//! only ever turned back into values through `from_bits`, which rejects the
//! patterns the controller leaves undefined (e.g. `DIR = 0b11`).

use crate::ErrorCode;

use super::NUM_STREAMS;

/// Declares a register option enum together with its bit conversions.
macro_rules! field_enum {
    {
        $(#[$attr:meta])*
        pub enum $name:ident {
            $( $(#[$variant_attr:meta])* $variant:ident = $bits:expr ),+ $(,)?
        }
    } => {
        $(#[$attr])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        #[repr(u32)]
        pub enum $name {
            $( $(#[$variant_attr])* $variant = $bits ),+
        }

        impl $name {
            /// Every value of this field, in ascending bit order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Bit pattern of this value inside its register field.
            pub const fn bits(self) -> u32 {
                self as u32
            }

            /// Value for a raw field pattern, `None` if the pattern is
            /// undefined for this field.
            pub const fn from_bits(bits: u32) -> Option<$name> {
                $(
                    if bits == $bits {
                        return Some($name::$variant);
                    }
                )+
                None
            }
        }
    };
}

/// The DMA stream number. The controller has eight independent streams, each
/// with its own register block.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StreamId {
    Stream0 = 0,
    Stream1 = 1,
    Stream2 = 2,
    Stream3 = 3,
    Stream4 = 4,
    Stream5 = 5,
    Stream6 = 6,
    Stream7 = 7,
}

impl StreamId {
    pub const ALL: [StreamId; NUM_STREAMS] = [
        StreamId::Stream0,
        StreamId::Stream1,
        StreamId::Stream2,
        StreamId::Stream3,
        StreamId::Stream4,
        StreamId::Stream5,
        StreamId::Stream6,
        StreamId::Stream7,
    ];

    /// Position of this stream's block in the register map.
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<usize> for StreamId {
    type Error = ErrorCode;

    fn try_from(index: usize) -> Result<StreamId, ErrorCode> {
        StreamId::ALL.get(index).copied().ok_or(ErrorCode::INVAL)
    }
}

field_enum! {
    /// Request line routed to the stream (`CHSEL`). Which peripheral sits
    /// behind each channel is fixed per stream by the chip's request map.
    pub enum Channel {
        Channel0 = 0b000,
        Channel1 = 0b001,
        Channel2 = 0b010,
        Channel3 = 0b011,
        Channel4 = 0b100,
        Channel5 = 0b101,
        Channel6 = 0b110,
        Channel7 = 0b111,
    }
}

field_enum! {
    /// Beats per burst on the memory (`MBURST`) or peripheral (`PBURST`) port.
    pub enum Burst {
        Single = 0b00,
        Incr4 = 0b01,
        Incr8 = 0b10,
        Incr16 = 0b11,
    }
}

field_enum! {
    /// Memory address targeted by the current transfer in double-buffer mode
    /// (`CT`).
    pub enum CurrentTarget {
        Memory0 = 0,
        Memory1 = 1,
    }
}

field_enum! {
    /// Software priority used for arbitration between streams (`PL`).
    pub enum Priority {
        Low = 0b00,
        Medium = 0b01,
        High = 0b10,
        VeryHigh = 0b11,
    }
}

field_enum! {
    /// Peripheral increment offset size (`PINCOS`): follow `PSIZE`, or always
    /// step the peripheral address by four bytes.
    pub enum PeripheralIncrementOffset {
        Psize = 0,
        Fixed4 = 1,
    }
}

field_enum! {
    /// Data item width on the memory (`MSIZE`) or peripheral (`PSIZE`) side.
    pub enum Size {
        Byte = 0b00,
        HalfWord = 0b01,
        Word = 0b10,
    }
}

field_enum! {
    /// Address increment after each data item (`MINC`, `PINC`).
    pub enum IncrementMode {
        Fixed = 0,
        Incremented = 1,
    }
}

field_enum! {
    /// Transfer direction (`DIR`).
    pub enum Direction {
        PeripheralToMemory = 0b00,
        MemoryToPeripheral = 0b01,
        MemoryToMemory = 0b10,
    }
}

field_enum! {
    /// Which side decides the end of the transfer (`PFCTRL`).
    pub enum FlowController {
        Dma = 0,
        Peripheral = 1,
    }
}

field_enum! {
    /// FIFO fill level that triggers a flush to the destination (`FTH`).
    pub enum FifoThreshold {
        Quarter = 0b00,
        Half = 0b01,
        ThreeQuarters = 0b10,
        Full = 0b11,
    }
}

field_enum! {
    /// Direct mode selection. The discriminant is the value of the `DMDIS`
    /// bit, so `Disabled` (FIFO mode) encodes as 1.
    pub enum DirectMode {
        Enabled = 0,
        Disabled = 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_patterns_are_rejected() {
        assert_eq!(Direction::from_bits(0b11), None);
        assert_eq!(Size::from_bits(0b11), None);
        assert_eq!(Channel::from_bits(8), None);
        assert_eq!(Burst::from_bits(4), None);
    }

    #[test]
    fn bits_match_discriminants() {
        for dir in Direction::ALL {
            assert_eq!(Direction::from_bits(dir.bits()), Some(*dir));
        }
        assert_eq!(DirectMode::Disabled.bits(), 1);
        assert_eq!(FifoThreshold::Full.bits(), 0b11);
        assert_eq!(Channel::ALL.len(), 8);
    }

    #[test]
    fn stream_index_range() {
        assert_eq!(StreamId::try_from(0), Ok(StreamId::Stream0));
        assert_eq!(StreamId::try_from(7), Ok(StreamId::Stream7));
        assert_eq!(StreamId::try_from(8), Err(ErrorCode::INVAL));
        for (i, stream) in StreamId::ALL.iter().enumerate() {
            assert_eq!(stream.index(), i);
        }
    }
}
