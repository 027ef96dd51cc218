// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright OXIDOS AUTOMOTIVE 2024.

use openjvs_lib::errors::{JvsError, ProtocolError};
use openjvs_lib::switches::decode_switches;

#[test]
fn decodes_one_player_panel() {
    // Test switch held, player 1 service and push3 held.
    let snapshot = decode_switches(&[0x80, 0x40, 0x80], 1, 8).unwrap();

    assert!(snapshot.system.test);
    assert!(!snapshot.system.tilt1);
    assert!(!snapshot.system.tilt2);
    assert!(!snapshot.system.tilt3);

    let player = &snapshot.players[0];
    assert!(player.service);
    assert!(player.push3);
    assert!(!player.start);
    assert!(!player.up);
    assert!(!player.down);
    assert!(!player.left);
    assert!(!player.right);
    assert!(!player.push1);
    assert!(!player.push2);
    assert!(!player.push4);
    assert!(!player.push5);
    assert!(!player.push6);
    assert!(!player.push7);
    assert!(!player.push8);
    assert_eq!(player.push9, None);
}

#[test]
fn snapshot_shape_matches_player_count() {
    let data = [0x00, 0x00, 0x00, 0x00, 0x00];
    let snapshot = decode_switches(&data, 2, 8).unwrap();

    assert_eq!(snapshot.players.len(), 2);
    assert_eq!(snapshot.system.switches().len(), 4);
    for player in &snapshot.players {
        assert_eq!(player.buttons().len(), 14);
    }
}

#[test]
fn ninth_push_button_needs_a_declaration() {
    // Bit 1 of the second player byte set.
    let data = [0x00, 0x00, 0x02];

    let without = decode_switches(&data, 1, 8).unwrap();
    assert_eq!(without.players[0].push9, None);

    let with = decode_switches(&data, 1, 9).unwrap();
    assert_eq!(with.players[0].push9, Some(true));
    assert_eq!(with.players[0].buttons().len(), 15);
}

#[test]
fn every_bit_of_the_first_player_byte_maps() {
    let snapshot = decode_switches(&[0x00, 0xFF, 0x00], 1, 8).unwrap();
    let player = &snapshot.players[0];

    assert!(player.start);
    assert!(player.service);
    assert!(player.up);
    assert!(player.down);
    assert!(player.left);
    assert!(player.right);
    assert!(player.push1);
    assert!(player.push2);
}

#[test]
fn short_reply_is_an_error() {
    let result = decode_switches(&[0x00, 0x00], 2, 8);
    assert!(matches!(
        result,
        Err(JvsError::Protocol(ProtocolError::ShortReply {
            opcode: 0x20,
            expected: 5,
            got: 2,
        }))
    ));
}
