// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Bring-up sequence of the board smoke test: every stream configured for a
//! 16-item memory-to-memory copy, then checked register by register.

use bbn2123::dma::sim::SimulatedDma;
use bbn2123::dma::{
    Direction, Dma, PollLimit, StreamConfig, StreamId, StreamRegister, StreamState, NUM_STREAMS,
};
use bbn2123::ErrorCode;

fn smoke_configs() -> Vec<StreamConfig> {
    (0..NUM_STREAMS)
        .map(|i| {
            let n = i as u32;
            StreamConfig::initialize(i, 0x1000_0000 * n, 0x10 * n, Direction::MemoryToMemory, 16)
                .unwrap()
        })
        .collect()
}

#[test]
fn all_streams_configure_independently() {
    let sim = SimulatedDma::new();
    let dma = Dma::new(&sim);

    for config in smoke_configs() {
        dma.configure(&config);
    }

    for (i, stream) in StreamId::ALL.into_iter().enumerate() {
        let n = i as u32;
        assert_eq!(sim.peek(stream, StreamRegister::NDTR), 16);
        assert_eq!(sim.peek(stream, StreamRegister::PAR), 0x1000_0000 * n);
        assert_eq!(sim.peek(stream, StreamRegister::M0AR), 0x10 * n);
        assert_eq!(sim.peek(stream, StreamRegister::M1AR), 0);
        assert_eq!(sim.peek(stream, StreamRegister::CR), 0x0000_0481);
        assert_eq!(sim.peek(stream, StreamRegister::FCR), 0x0000_0007);
        assert_eq!(dma.state(stream), StreamState::Armed);
        assert_eq!(dma.remaining_items(stream), 16);
    }
}

#[test]
fn slow_streams_do_not_hold_up_the_others() {
    let sim = SimulatedDma::new();
    let dma = Dma::new(&sim);
    for stream in StreamId::ALL {
        sim.set_enable_latency(stream, stream.index() as u32);
    }

    for config in smoke_configs() {
        dma.configure(&config);
    }

    for stream in StreamId::ALL.into_iter().rev() {
        let latency = stream.index() as u32;
        assert_eq!(
            dma.await_enable_state(stream, true, PollLimit::Attempts(latency + 1)),
            Ok(latency + 1)
        );
    }
}

#[test]
fn bounded_wait_reports_a_stream_that_never_arms() {
    let sim = SimulatedDma::new();
    let dma = Dma::new(&sim);
    let config = StreamConfig::initialize(0, 0, 0x10, Direction::MemoryToMemory, 16).unwrap();

    dma.apply(&config);
    assert_eq!(
        dma.await_enable_state(config.stream, true, PollLimit::Attempts(100)),
        Err(ErrorCode::BUSY)
    );
    assert_eq!(dma.state(config.stream), StreamState::Configured);
}

#[test]
fn out_of_range_parameters_are_rejected() {
    assert_eq!(
        StreamConfig::initialize(NUM_STREAMS, 0, 0, Direction::MemoryToMemory, 16),
        Err(ErrorCode::INVAL)
    );
    assert_eq!(
        StreamConfig::initialize(0, 0, 0, Direction::MemoryToMemory, 0x1_0000),
        Err(ErrorCode::SIZE)
    );
}
