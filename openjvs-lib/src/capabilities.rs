// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright OXIDOS AUTOMOTIVE 2024.

use std::fmt;

use byteorder::{BigEndian, ByteOrder};

// Capability block tags. Each record is exactly four bytes: the tag plus
// three parameter bytes, unused ones zero. Tag 0x00 ends the block.
const CAP_END: u8 = 0x00;
const CAP_PLAYERS: u8 = 0x01;
const CAP_COINS: u8 = 0x02;
const CAP_ANALOG_IN: u8 = 0x03;
const CAP_ROTARY: u8 = 0x04;
const CAP_KEYPAD: u8 = 0x05;
const CAP_LIGHTGUN: u8 = 0x06;
const CAP_GPI: u8 = 0x07;
const CAP_CARD: u8 = 0x10;
const CAP_HOPPER: u8 = 0x11;
const CAP_GPO: u8 = 0x12;
const CAP_ANALOG_OUT: u8 = 0x13;
const CAP_DISPLAY: u8 = 0x14;
const CAP_BACKUP: u8 = 0x15;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwitchInfo {
    pub players: u8,
    pub switches_per_player: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnalogInInfo {
    pub channels: u8,
    /// Effective resolution in bits; 0 when the device does not say.
    pub effective_bits: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LightgunInfo {
    pub x_bits: u8,
    pub y_bits: u8,
    pub channels: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayInfo {
    pub columns: u8,
    pub rows: u8,
    pub encoding: DisplayEncoding,
}

/// Character sets an alphanumeric display can declare.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DisplayEncoding {
    #[default]
    Unknown,
    AsciiNumeric,
    AsciiAlphanumeric,
    AlphanumericKatakana,
    AlphanumericShiftJis,
}

impl DisplayEncoding {
    /// Out-of-range indices map to `Unknown`.
    pub fn from_index(index: u8) -> DisplayEncoding {
        match index {
            1 => DisplayEncoding::AsciiNumeric,
            2 => DisplayEncoding::AsciiAlphanumeric,
            3 => DisplayEncoding::AlphanumericKatakana,
            4 => DisplayEncoding::AlphanumericShiftJis,
            _ => DisplayEncoding::Unknown,
        }
    }
}

impl fmt::Display for DisplayEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DisplayEncoding::Unknown => "unknown",
            DisplayEncoding::AsciiNumeric => "ascii numeric",
            DisplayEncoding::AsciiAlphanumeric => "ascii alphanumeric",
            DisplayEncoding::AlphanumericKatakana => "alphanumeric/katakana",
            DisplayEncoding::AlphanumericShiftJis => "alphanumeric/SHIFT-JIS",
        };
        f.write_str(name)
    }
}

/// What one device told us it can do. Records the device did not send leave
/// the matching field `None` (or `false`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub switches: Option<SwitchInfo>,
    pub coin_slots: Option<u8>,
    pub analog_in: Option<AnalogInInfo>,
    pub rotary_channels: Option<u8>,
    pub keypad: bool,
    pub lightgun: Option<LightgunInfo>,
    pub gpi_count: Option<u16>,
    pub card_slots: Option<u8>,
    pub hopper_channels: Option<u8>,
    pub gpo_banks: Option<u8>,
    pub analog_out_channels: Option<u8>,
    pub display: Option<DisplayInfo>,
    pub backup: bool,
}

/// Walks the capability block four bytes at a time. Unknown tags are
/// skipped whole so newer devices still decode; a block that runs out
/// without the end tag is accepted as truncated.
pub fn decode_capabilities(data: &[u8]) -> Capabilities {
    let mut caps = Capabilities::default();
    let mut position = 0;
    let mut terminated = false;

    while position < data.len() {
        if data[position] == CAP_END {
            terminated = true;
            break;
        }
        if position + 4 > data.len() {
            break;
        }

        let record = &data[position..position + 4];
        match record[0] {
            CAP_PLAYERS => {
                caps.switches = Some(SwitchInfo {
                    players: record[1],
                    switches_per_player: record[2],
                })
            }
            CAP_COINS => caps.coin_slots = Some(record[1]),
            CAP_ANALOG_IN => {
                caps.analog_in = Some(AnalogInInfo {
                    channels: record[1],
                    effective_bits: record[2],
                })
            }
            CAP_ROTARY => caps.rotary_channels = Some(record[1]),
            CAP_KEYPAD => caps.keypad = true,
            CAP_LIGHTGUN => {
                caps.lightgun = Some(LightgunInfo {
                    x_bits: record[1],
                    y_bits: record[2],
                    channels: record[3],
                })
            }
            // The GPI count is the one 16-bit parameter, high byte first.
            CAP_GPI => caps.gpi_count = Some(BigEndian::read_u16(&record[1..3])),
            CAP_CARD => caps.card_slots = Some(record[1]),
            CAP_HOPPER => caps.hopper_channels = Some(record[1]),
            CAP_GPO => caps.gpo_banks = Some(record[1]),
            CAP_ANALOG_OUT => caps.analog_out_channels = Some(record[1]),
            CAP_DISPLAY => {
                caps.display = Some(DisplayInfo {
                    columns: record[1],
                    rows: record[2],
                    encoding: DisplayEncoding::from_index(record[3]),
                })
            }
            CAP_BACKUP => caps.backup = true,
            unknown => log::debug!("skipping unknown capability tag {:#04x}", unknown),
        }

        position += 4;
    }

    if !terminated {
        log::warn!("capability block ended without a terminator; keeping what was read");
    }

    caps
}
