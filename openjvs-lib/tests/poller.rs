// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright OXIDOS AUTOMOTIVE 2024.

mod common;

use std::time::Duration;

use common::MockLink;
use openjvs_lib::framing::encode_frame;
use openjvs_lib::poller::{self, BusState, MAX_CONSECUTIVE_FAILURES};
use openjvs_lib::{BusSettings, JvsBus};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn poller_publishes_then_recovers_from_a_dead_bus() {
    let mut link = MockLink::new();

    // Enumeration: one single-player device with switches.
    link.queue_sense(&[true, false]);
    link.queue_reply(&[0x01, 0x01]);
    link.queue_reply(&[
        0x01, 0x01, b'S', b'E', b'G', b'A', b';', b'8', b'3', b'7', 0x00,
    ]);
    link.queue_reply(&[0x01, 0x01, 0x13, 0x01, 0x30, 0x01, 0x10]);
    link.queue_reply(&[0x01, 0x01, 0x01, 0x01, 0x08, 0x00, 0x00]);

    // Exactly one good poll cycle; after this the bus goes silent, every
    // read times out, and the eighth dropped cycle forces a re-reset that
    // finds an empty chain.
    link.queue_reply(&[0x01, 0x01, 0x80, 0x80, 0x00]);

    let mut bus = JvsBus::new(Box::new(link), BusSettings::default());
    bus.enumerate().await.unwrap();

    let (updates, mut events) = watch::channel(BusState::default());
    let shutdown = CancellationToken::new();

    let guard = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(3)).await;
        guard.cancel();
    });

    let observer = tokio::spawn(async move {
        let mut seen: Vec<BusState> = Vec::new();
        while events.changed().await.is_ok() {
            seen.push(events.borrow_and_update().clone());
        }
        seen
    });

    poller::poll(&mut bus, &updates, shutdown).await.unwrap();
    drop(updates);

    let seen = observer.await.unwrap();
    assert!(!seen.is_empty());

    // Some published state carried the good snapshot -- the dropped cycles
    // in between must not have wiped it.
    let good = seen
        .iter()
        .find(|state| state.switches.contains_key(&1))
        .expect("the good poll cycle was never published");
    assert!(good.switches[&1].system.test);
    assert!(good.switches[&1].players[0].start);

    // The re-reset found nothing, so the final state is empty again.
    assert!(seen.last().unwrap().switches.is_empty());
}

#[tokio::test]
async fn healthy_device_does_not_mask_a_dead_one() {
    let mut link = MockLink::new();

    // Enumeration: two single-player devices with switches.
    link.queue_sense(&[true, true, false]);
    link.queue_reply(&[0x01, 0x01]);
    link.queue_reply(&[0x01, 0x01]);
    for _ in 0..2 {
        link.queue_reply(&[
            0x01, 0x01, b'S', b'E', b'G', b'A', b';', b'8', b'3', b'7', 0x00,
        ]);
        link.queue_reply(&[0x01, 0x01, 0x13, 0x01, 0x30, 0x01, 0x10]);
        link.queue_reply(&[0x01, 0x01, 0x01, 0x01, 0x08, 0x00, 0x00]);
    }

    // Device 1 answers every cycle; device 2 only ever produces stray
    // packets, a transient fault. Device 1's successes must not stop the
    // strays from accumulating to the re-reset threshold.
    let stray = encode_frame(0x05, &[0x01, 0x01]).unwrap();
    for _ in 0..MAX_CONSECUTIVE_FAILURES {
        link.queue_reply(&[0x01, 0x01, 0x80, 0x80, 0x00]);
        link.queue_bytes(&stray);
        link.queue_bytes(&stray);
    }

    let mut bus = JvsBus::new(Box::new(link), BusSettings::default());
    bus.enumerate().await.unwrap();
    assert_eq!(bus.devices().len(), 2);

    let (updates, mut events) = watch::channel(BusState::default());
    let shutdown = CancellationToken::new();

    let guard = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(3)).await;
        guard.cancel();
    });

    let observer = tokio::spawn(async move {
        let mut seen: Vec<BusState> = Vec::new();
        while events.changed().await.is_ok() {
            seen.push(events.borrow_and_update().clone());
        }
        seen
    });

    poller::poll(&mut bus, &updates, shutdown).await.unwrap();
    drop(updates);

    let seen = observer.await.unwrap();

    // The healthy device was published; the dead one never was.
    let good = seen
        .iter()
        .find(|state| state.switches.contains_key(&1))
        .expect("the healthy device was never published");
    assert!(good.switches[&1].system.test);
    assert!(!good.switches.contains_key(&2));

    // The dead device still tripped the re-reset, which found an empty
    // chain, so the final published state carries no devices at all.
    assert!(seen.last().unwrap().switches.is_empty());
}
