// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright OXIDOS AUTOMOTIVE 2024.

use std::time::Duration;

/// Address every reply is directed to. The bus has exactly one master.
pub const BUS_MASTER: u8 = 0x00;

/// Destination that addresses every device at once.
pub const BROADCAST: u8 = 0xFF;

/// First address handed out during enumeration; 0x00 is the master.
pub const DEVICE_ADDR_START: u8 = 0x01;

/// A JVS chain tops out at 31 addressable devices.
pub const MAX_DEVICES: u8 = 31;

/// Fixed argument carried by the Reset broadcast.
pub const RESET_ARG: u8 = 0xD9;

// Opcodes 0x60..=0x7F are manufacturer-specific and treated as opaque.
pub const MANUFACTURER_START: u8 = 0x60;
pub const MANUFACTURER_END: u8 = 0x7F;

// Bus timing: devices get a full second to come back up after a reset, and
// consecutive commands are paced 10ms apart.
pub const INIT_DELAY: Duration = Duration::from_secs(1);
pub const CMD_DELAY: Duration = Duration::from_millis(10);

#[allow(dead_code)]
#[derive(Clone, Copy, Debug)]
pub enum Command {
    // Broadcast commands
    Reset = 0xF0,
    AssignAddress = 0xF1,
    SetCommsMode = 0xF2,

    // Initialization commands
    RequestId = 0x10,
    CommandVersion = 0x11,
    JvsVersion = 0x12,
    CommsVersion = 0x13,
    Capabilities = 0x14,
    ConveyId = 0x15,

    // I/O commands
    ReadSwitches = 0x20,
    ReadCoins = 0x21,
    ReadAnalogs = 0x22,
    ReadRotary = 0x23,
    ReadKeypad = 0x24,
    ReadLightgun = 0x25,
    ReadGpi = 0x26,
    Retransmit = 0x2F,
    DecreaseCoins = 0x30,
    WriteGpo = 0x32,
    WriteAnalog = 0x33,
    WriteDisplay = 0x34,
}

/// The one status byte at the head of every reply; it covers the whole
/// request regardless of how many commands were packed into it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Success = 0x01,
    UnsupportedCommand = 0x02,
    ChecksumFailure = 0x03,
    Overflow = 0x04,
    Unknown,
}

impl From<u8> for Status {
    fn from(value: u8) -> Self {
        match value {
            0x01 => Status::Success,
            0x02 => Status::UnsupportedCommand,
            0x03 => Status::ChecksumFailure,
            0x04 => Status::Overflow,
            _ => Status::Unknown,
        }
    }
}

/// One report byte per command record in the request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Report {
    Success = 0x01,
    ParameterError1 = 0x02,
    ParameterError2 = 0x03,
    Busy = 0x04,
    Unknown,
}

impl From<u8> for Report {
    fn from(value: u8) -> Self {
        match value {
            0x01 => Report::Success,
            0x02 => Report::ParameterError1,
            0x03 => Report::ParameterError2,
            0x04 => Report::Busy,
            _ => Report::Unknown,
        }
    }
}
