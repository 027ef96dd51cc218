// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright OXIDOS AUTOMOTIVE 2024.

use std::io;
use thiserror::Error;

// Rule of thumb: public-facing functions return `JvsError`. Crate-private
// helpers may use the more specific enums directly.

#[derive(Debug, Error)]
pub enum JvsError {
    #[error("Serial connection error: {0}")]
    Serial(#[from] SerialError),

    #[error("Bus framing error: {0}")]
    Frame(#[from] FrameError),

    #[error("JVS protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Internal openjvs error: {0}")]
    Internal(#[from] InternalError),
}

impl JvsError {
    /// Transient bus faults. The poller drops the affected cycle and carries
    /// on; everything else is surfaced to the caller.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            JvsError::Frame(FrameError::Timeout)
                | JvsError::Frame(FrameError::Checksum { .. })
                | JvsError::Frame(FrameError::StrayPacket(_))
        )
    }
}

#[derive(Debug, Error)]
pub enum SerialError {
    #[error("Failed to interface in serial using tokio_serial: {0}")]
    TokioSerial(#[from] tokio_serial::Error),

    #[error("Failed to perform read/write operations on serial port: {0}")]
    IO(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("Timed out waiting for a byte on the bus")]
    Timeout,

    #[error("Packet checksum mismatch: received {received:#04x}, computed {computed:#04x}")]
    Checksum { received: u8, computed: u8 },

    #[error("Received a packet addressed to {0:#04x} when expecting one for the bus master")]
    StrayPacket(u8),

    #[error("Command payload of {0} bytes does not fit in a single packet")]
    Oversize(usize),
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Device signaled status {status:#04x} while processing command {opcode:#04x}")]
    Status { opcode: u8, status: u8 },

    #[error("Device signaled report {report:#04x} for command {opcode:#04x}")]
    Report { opcode: u8, report: u8 },

    #[error("Reply to command {opcode:#04x} was {got} bytes, expected at least {expected}")]
    ShortReply {
        opcode: u8,
        expected: usize,
        got: usize,
    },

    #[error("Identification string is not valid text: {0}")]
    InvalidId(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Error)]
pub enum InternalError {
    #[error("No device survived enumeration.")]
    NoDevices,

    #[error("Sense line still asserted after assigning all {0} addresses.")]
    TooManyDevices(u8),
}

impl From<tokio_serial::Error> for JvsError {
    fn from(value: tokio_serial::Error) -> Self {
        JvsError::Serial(value.into())
    }
}

impl From<io::Error> for JvsError {
    fn from(value: io::Error) -> Self {
        JvsError::Serial(value.into())
    }
}
