// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright OXIDOS AUTOMOTIVE 2024.

mod common;

use std::time::Duration;

use common::MockLink;
use openjvs_lib::errors::{FrameError, JvsError, ProtocolError};
use openjvs_lib::framing::encode_frame;
use openjvs_lib::protocol::Report;
use openjvs_lib::transact::{broadcast, transact, transact_multi, CommandRecord};

const TIMEOUT: Duration = Duration::from_millis(100);

#[tokio::test]
async fn single_command_round_trip() {
    let mut link = MockLink::new();
    link.queue_reply(&[0x01, 0x01, 0xAA, 0xBB]);

    let data = transact(&mut link, 0x01, &[0x10], TIMEOUT).await.unwrap();
    assert_eq!(data, vec![0xAA, 0xBB]);

    // The request went out as one well-formed frame.
    let expected = encode_frame(0x01, &[0x10]).unwrap();
    assert_eq!(link.written, expected.to_vec());
}

#[tokio::test]
async fn status_error_fails_the_transaction() {
    let mut link = MockLink::new();
    link.queue_reply(&[0x02, 0x01]);

    let result = transact(&mut link, 0x01, &[0x10], TIMEOUT).await;
    assert!(matches!(
        result,
        Err(JvsError::Protocol(ProtocolError::Status {
            opcode: 0x10,
            status: 0x02,
        }))
    ));
}

#[tokio::test]
async fn report_error_fails_the_transaction() {
    let mut link = MockLink::new();
    link.queue_reply(&[0x01, 0x04]);

    let result = transact(&mut link, 0x01, &[0x20, 0x01, 0x02], TIMEOUT).await;
    assert!(matches!(
        result,
        Err(JvsError::Protocol(ProtocolError::Report {
            opcode: 0x20,
            report: 0x04,
        }))
    ));
}

#[tokio::test]
async fn stray_packet_is_dropped_once() {
    let mut link = MockLink::new();
    let stray = encode_frame(0x05, &[0x01, 0x01]).unwrap();
    link.queue_bytes(&stray);
    link.queue_reply(&[0x01, 0x01, 0x33]);

    let data = transact(&mut link, 0x01, &[0x10], TIMEOUT).await.unwrap();
    assert_eq!(data, vec![0x33]);
}

#[tokio::test]
async fn second_stray_packet_escalates() {
    let mut link = MockLink::new();
    let stray = encode_frame(0x05, &[0x01, 0x01]).unwrap();
    link.queue_bytes(&stray);
    link.queue_bytes(&stray);

    let result = transact(&mut link, 0x01, &[0x10], TIMEOUT).await;
    assert!(matches!(
        result,
        Err(JvsError::Frame(FrameError::StrayPacket(0x05)))
    ));
}

#[tokio::test]
async fn checksum_failure_triggers_one_retransmit() {
    let mut link = MockLink::new();

    let mut corrupted = encode_frame(0x00, &[0x01, 0x01, 0x77]).unwrap().to_vec();
    let last = corrupted.len() - 1;
    corrupted[last] = corrupted[last].wrapping_add(1);
    link.queue_bytes(&corrupted);
    link.queue_reply(&[0x01, 0x01, 0x77]);

    let data = transact(&mut link, 0x01, &[0x10], TIMEOUT).await.unwrap();
    assert_eq!(data, vec![0x77]);

    // Original request, then the retransmit request.
    let mut expected = encode_frame(0x01, &[0x10]).unwrap().to_vec();
    expected.extend_from_slice(&encode_frame(0x01, &[0x2F]).unwrap());
    assert_eq!(link.written, expected);
}

#[tokio::test]
async fn silent_bus_times_out() {
    let mut link = MockLink::new();

    let result = transact(&mut link, 0x01, &[0x10], TIMEOUT).await;
    assert!(matches!(result, Err(JvsError::Frame(FrameError::Timeout))));
}

#[tokio::test]
async fn broadcast_reads_nothing_back() {
    let mut link = MockLink::new();

    broadcast(&mut link, &[0xF0, 0xD9], TIMEOUT).await.unwrap();
    assert_eq!(
        link.written,
        encode_frame(0xFF, &[0xF0, 0xD9]).unwrap().to_vec()
    );
    assert!(link.reads.is_empty());
}

#[tokio::test]
async fn multi_command_reply_splits_per_record() {
    let mut link = MockLink::new();
    link.queue_reply(&[0x01, 0x01, 0x13, 0x01, 0x30, 0x01, 0x10]);

    let records = [
        CommandRecord {
            bytes: &[0x11],
            reply_len: 1,
        },
        CommandRecord {
            bytes: &[0x12],
            reply_len: 1,
        },
        CommandRecord {
            bytes: &[0x13],
            reply_len: 1,
        },
    ];
    let replies = transact_multi(&mut link, 0x01, &records, TIMEOUT)
        .await
        .unwrap();

    assert_eq!(replies.len(), 3);
    assert_eq!(replies[0], (Report::Success, vec![0x13]));
    assert_eq!(replies[1], (Report::Success, vec![0x30]));
    assert_eq!(replies[2], (Report::Success, vec![0x10]));
}

#[tokio::test]
async fn failed_record_stops_the_split() {
    let mut link = MockLink::new();
    // First record answers, the second reports a parameter error and
    // carries no data, so the third is unparseable.
    link.queue_reply(&[0x01, 0x01, 0x13, 0x02]);

    let records = [
        CommandRecord {
            bytes: &[0x11],
            reply_len: 1,
        },
        CommandRecord {
            bytes: &[0x12],
            reply_len: 1,
        },
        CommandRecord {
            bytes: &[0x13],
            reply_len: 1,
        },
    ];
    let replies = transact_multi(&mut link, 0x01, &records, TIMEOUT)
        .await
        .unwrap();

    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0], (Report::Success, vec![0x13]));
    assert_eq!(replies[1], (Report::ParameterError1, vec![]));
}

#[tokio::test]
async fn multi_command_bad_status_raises() {
    let mut link = MockLink::new();
    link.queue_reply(&[0x03]);

    let records = [CommandRecord {
        bytes: &[0x11],
        reply_len: 1,
    }];
    let result = transact_multi(&mut link, 0x01, &records, TIMEOUT).await;
    assert!(matches!(
        result,
        Err(JvsError::Protocol(ProtocolError::Status {
            opcode: 0x11,
            status: 0x03,
        }))
    ));
}
