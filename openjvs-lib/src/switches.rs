// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright OXIDOS AUTOMOTIVE 2024.

use crate::errors::{JvsError, ProtocolError};
use crate::protocol::Command;

// Bit masks for the system byte of a switch reply.
const BTN_GENERAL_TEST: u8 = 1 << 7;
const BTN_GENERAL_TILT1: u8 = 1 << 6;
const BTN_GENERAL_TILT2: u8 = 1 << 5;
const BTN_GENERAL_TILT3: u8 = 1 << 4;

// First byte of each player pair.
const BTN_PLAYER_START: u8 = 1 << 7;
const BTN_PLAYER_SERVICE: u8 = 1 << 6;
const BTN_PLAYER_UP: u8 = 1 << 5;
const BTN_PLAYER_DOWN: u8 = 1 << 4;
const BTN_PLAYER_LEFT: u8 = 1 << 3;
const BTN_PLAYER_RIGHT: u8 = 1 << 2;
const BTN_PLAYER_PUSH1: u8 = 1 << 1;
const BTN_PLAYER_PUSH2: u8 = 1 << 0;

// Second byte of each player pair.
const BTN_PLAYER_PUSH3: u8 = 1 << 7;
const BTN_PLAYER_PUSH4: u8 = 1 << 6;
const BTN_PLAYER_PUSH5: u8 = 1 << 5;
const BTN_PLAYER_PUSH6: u8 = 1 << 4;
const BTN_PLAYER_PUSH7: u8 = 1 << 3;
const BTN_PLAYER_PUSH8: u8 = 1 << 2;
const BTN_PLAYER_PUSH9: u8 = 1 << 1;

/// The cabinet-wide switches carried in the first byte of every switch
/// reply.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SystemSwitches {
    pub test: bool,
    pub tilt1: bool,
    pub tilt2: bool,
    pub tilt3: bool,
}

impl SystemSwitches {
    pub fn switches(&self) -> [(&'static str, bool); 4] {
        [
            ("test", self.test),
            ("tilt1", self.tilt1),
            ("tilt2", self.tilt2),
            ("tilt3", self.tilt3),
        ]
    }
}

/// One player's panel. `push9` is only meaningful on devices that declared
/// nine or more switches per player; everything else always decodes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayerSwitches {
    pub start: bool,
    pub service: bool,
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub push1: bool,
    pub push2: bool,
    pub push3: bool,
    pub push4: bool,
    pub push5: bool,
    pub push6: bool,
    pub push7: bool,
    pub push8: bool,
    pub push9: Option<bool>,
}

impl PlayerSwitches {
    /// Named view of every declared button, for consumers that iterate
    /// rather than match fields.
    pub fn buttons(&self) -> Vec<(&'static str, bool)> {
        let mut buttons = vec![
            ("start", self.start),
            ("service", self.service),
            ("up", self.up),
            ("down", self.down),
            ("left", self.left),
            ("right", self.right),
            ("push1", self.push1),
            ("push2", self.push2),
            ("push3", self.push3),
            ("push4", self.push4),
            ("push5", self.push5),
            ("push6", self.push6),
            ("push7", self.push7),
            ("push8", self.push8),
        ];
        if let Some(push9) = self.push9 {
            buttons.push(("push9", push9));
        }
        buttons
    }
}

/// Decoded result of one switch read: the system byte plus one entry per
/// player. Superseded wholesale by the next poll cycle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SwitchSnapshot {
    pub system: SystemSwitches,
    pub players: Vec<PlayerSwitches>,
}

/// Decodes a switch reply read with two bytes per player.
pub fn decode_switches(
    data: &[u8],
    players: u8,
    switches_per_player: u8,
) -> Result<SwitchSnapshot, JvsError> {
    let needed = 1 + players as usize * 2;
    if data.len() < needed {
        return Err(ProtocolError::ShortReply {
            opcode: Command::ReadSwitches as u8,
            expected: needed,
            got: data.len(),
        }
        .into());
    }

    let system = SystemSwitches {
        test: data[0] & BTN_GENERAL_TEST != 0,
        tilt1: data[0] & BTN_GENERAL_TILT1 != 0,
        tilt2: data[0] & BTN_GENERAL_TILT2 != 0,
        tilt3: data[0] & BTN_GENERAL_TILT3 != 0,
    };

    let mut decoded = Vec::with_capacity(players as usize);
    for player in 0..players as usize {
        let first = data[1 + player * 2];
        let second = data[2 + player * 2];

        decoded.push(PlayerSwitches {
            start: first & BTN_PLAYER_START != 0,
            service: first & BTN_PLAYER_SERVICE != 0,
            up: first & BTN_PLAYER_UP != 0,
            down: first & BTN_PLAYER_DOWN != 0,
            left: first & BTN_PLAYER_LEFT != 0,
            right: first & BTN_PLAYER_RIGHT != 0,
            push1: first & BTN_PLAYER_PUSH1 != 0,
            push2: first & BTN_PLAYER_PUSH2 != 0,
            push3: second & BTN_PLAYER_PUSH3 != 0,
            push4: second & BTN_PLAYER_PUSH4 != 0,
            push5: second & BTN_PLAYER_PUSH5 != 0,
            push6: second & BTN_PLAYER_PUSH6 != 0,
            push7: second & BTN_PLAYER_PUSH7 != 0,
            push8: second & BTN_PLAYER_PUSH8 != 0,
            push9: (switches_per_player >= 9).then(|| second & BTN_PLAYER_PUSH9 != 0),
        });
    }

    Ok(SwitchSnapshot {
        system,
        players: decoded,
    })
}
