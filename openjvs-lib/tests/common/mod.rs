// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright OXIDOS AUTOMOTIVE 2024.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use openjvs_lib::errors::{FrameError, JvsError};
use openjvs_lib::framing::encode_frame;
use openjvs_lib::link::BusLink;
use openjvs_lib::protocol::BUS_MASTER;

/// Scripted stand-in for the RS-485 adapter: reads come from a queue,
/// writes are captured, and the sense line plays back a fixed script (and
/// reads deasserted once the script runs out).
#[derive(Default)]
pub struct MockLink {
    pub reads: VecDeque<u8>,
    pub written: Vec<u8>,
    pub sense_script: VecDeque<bool>,
}

impl MockLink {
    pub fn new() -> MockLink {
        MockLink::default()
    }

    pub fn queue_bytes(&mut self, bytes: &[u8]) {
        self.reads.extend(bytes.iter().copied());
    }

    /// Queues a well-formed reply frame addressed to the bus master.
    pub fn queue_reply(&mut self, payload: &[u8]) {
        let frame = encode_frame(BUS_MASTER, payload).unwrap();
        self.reads.extend(frame.iter().copied());
    }

    pub fn queue_sense(&mut self, script: &[bool]) {
        self.sense_script.extend(script.iter().copied());
    }
}

#[async_trait]
impl BusLink for MockLink {
    async fn read_byte(&mut self, _timeout: Duration) -> Result<u8, JvsError> {
        self.reads.pop_front().ok_or(FrameError::Timeout.into())
    }

    async fn write_all(&mut self, bytes: &[u8], _timeout: Duration) -> Result<(), JvsError> {
        self.written.extend_from_slice(bytes);
        Ok(())
    }

    fn sense(&mut self) -> Result<bool, JvsError> {
        Ok(self.sense_script.pop_front().unwrap_or(false))
    }
}
