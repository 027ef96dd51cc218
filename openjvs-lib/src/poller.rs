// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright OXIDOS AUTOMOTIVE 2024.

use std::collections::HashMap;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::bus::JvsBus;
use crate::errors::JvsError;
use crate::protocol::CMD_DELAY;
use crate::switches::SwitchSnapshot;

/// Consecutive transient faults tolerated on one device before the whole
/// bus is assumed wedged and re-enumerated.
pub const MAX_CONSECUTIVE_FAILURES: u32 = 8;

/// The poller's published view of the bus: the latest good switch snapshot
/// per device address. Immutable once published; replaced wholesale.
#[derive(Clone, Debug, Default)]
pub struct BusState {
    pub switches: HashMap<u8, SwitchSnapshot>,
}

/// Runs the main polling loop until `shutdown` fires, publishing a fresh
/// `BusState` through `updates` after every cycle.
///
/// There is no fixed tick; the pace comes from the inter-command delay and
/// transport latency alone. A transient fault drops that device's cycle --
/// its previous snapshot stays current, so edge detection downstream stays
/// consistent. Faults are counted per device, so one healthy device cannot
/// mask a dead one. Cancellation is observed at cycle boundaries only,
/// never in the middle of a transaction.
pub async fn poll(
    bus: &mut JvsBus,
    updates: &watch::Sender<BusState>,
    shutdown: CancellationToken,
) -> Result<(), JvsError> {
    let mut state = BusState::default();
    let mut failures: HashMap<u8, u32> = HashMap::new();

    while !shutdown.is_cancelled() {
        let targets: Vec<(u8, u8)> = bus
            .devices()
            .iter()
            .filter_map(|device| {
                device
                    .capabilities
                    .switches
                    .map(|info| (device.address, info.players))
            })
            .collect();

        if targets.is_empty() {
            tokio::time::sleep(CMD_DELAY).await;
            continue;
        }

        for (address, players) in targets {
            if shutdown.is_cancelled() {
                break;
            }

            match bus.read_switches(address, players).await {
                Ok(snapshot) => {
                    failures.remove(&address);
                    state.switches.insert(address, snapshot);
                }
                Err(error) if error.is_transient() => {
                    *failures.entry(address).or_insert(0) += 1;
                    log::debug!("poll cycle dropped for device {:#04x}: {}", address, error);
                }
                Err(error) => return Err(error),
            }
        }

        let wedged = failures
            .iter()
            .find(|(_, &count)| count >= MAX_CONSECUTIVE_FAILURES)
            .map(|(&address, _)| address);
        if let Some(address) = wedged {
            log::warn!(
                "device {:#04x} failed {} consecutive polls, resetting the bus",
                address,
                MAX_CONSECUTIVE_FAILURES
            );
            bus.enumerate().await?;
            state = BusState::default();
            failures.clear();
        }

        updates.send_replace(state.clone());
    }

    log::info!("poller shut down");
    Ok(())
}
