// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright OXIDOS AUTOMOTIVE 2024.

use crate::capabilities::decode_capabilities;
use crate::device::{BcdVersion, Device, DeviceId, Versions};
use crate::errors::{InternalError, JvsError, ProtocolError};
use crate::link::BusLink;
use crate::protocol::{
    Command, Report, BROADCAST, DEVICE_ADDR_START, INIT_DELAY, MAX_DEVICES, RESET_ARG,
};
use crate::settings::BusSettings;
use crate::transact::{broadcast, transact, transact_multi, CommandRecord};

/// Resets the bus, hands out addresses and identifies whatever claimed
/// them. A device that fails identification is logged and left out; the
/// survivors come back with dense addresses 1..N.
pub(crate) async fn enumerate(
    link: &mut dyn BusLink,
    settings: &BusSettings,
) -> Result<Vec<Device>, JvsError> {
    reset_bus(link, settings).await?;

    let addresses = assign_addresses(link, settings).await?;
    log::info!("assigned {} bus address(es)", addresses.len());

    let mut devices = Vec::with_capacity(addresses.len());
    for &address in &addresses {
        match identify_device(link, settings, address).await {
            Ok(device) => devices.push(device),
            Err(error) => {
                log::warn!("dropping device {:#04x} from the bus: {}", address, error);
            }
        }
    }

    if devices.is_empty() && !addresses.is_empty() {
        return Err(InternalError::NoDevices.into());
    }

    Ok(devices)
}

/// The reset broadcast goes out twice, per the JVS spec, then the chain
/// gets a full second to come back up.
async fn reset_bus(link: &mut dyn BusLink, settings: &BusSettings) -> Result<(), JvsError> {
    let reset = [Command::Reset as u8, RESET_ARG];
    broadcast(link, &reset, settings.read_timeout).await?;
    broadcast(link, &reset, settings.read_timeout).await?;
    tokio::time::sleep(INIT_DELAY).await;
    Ok(())
}

/// Hands out addresses starting at 1. Normally the sense line says when the
/// last device in the chain has been addressed; with `assume_devices` set
/// the line is ignored and exactly that many addresses go out.
async fn assign_addresses(
    link: &mut dyn BusLink,
    settings: &BusSettings,
) -> Result<Vec<u8>, JvsError> {
    let mut addresses = Vec::new();

    if let Some(count) = settings.assume_devices {
        for offset in 0..count.min(MAX_DEVICES) {
            let address = DEVICE_ADDR_START + offset;
            assign_address(link, settings, address).await?;
            addresses.push(address);
        }
        return Ok(addresses);
    }

    while link.sense()? {
        if addresses.len() as u8 == MAX_DEVICES {
            return Err(InternalError::TooManyDevices(MAX_DEVICES).into());
        }
        let address = DEVICE_ADDR_START + addresses.len() as u8;
        assign_address(link, settings, address).await?;
        addresses.push(address);
    }

    Ok(addresses)
}

async fn assign_address(
    link: &mut dyn BusLink,
    settings: &BusSettings,
    address: u8,
) -> Result<(), JvsError> {
    transact(
        link,
        BROADCAST,
        &[Command::AssignAddress as u8, address],
        settings.read_timeout,
    )
    .await?;
    log::debug!("a device claimed address {:#04x}", address);
    Ok(())
}

async fn identify_device(
    link: &mut dyn BusLink,
    settings: &BusSettings,
    address: u8,
) -> Result<Device, JvsError> {
    let raw = transact(
        link,
        address,
        &[Command::RequestId as u8],
        settings.read_timeout,
    )
    .await?;

    // The identification string is ASCII up to a terminating NUL.
    let text_end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    let text = String::from_utf8(raw[..text_end].to_vec()).map_err(ProtocolError::InvalidId)?;
    let id = DeviceId::parse(&text);

    let versions = read_versions(link, settings, address).await?;

    let capability_block = transact(
        link,
        address,
        &[Command::Capabilities as u8],
        settings.read_timeout,
    )
    .await?;
    let capabilities = decode_capabilities(&capability_block);

    log::info!(
        "device {:#04x}: \"{}\" (jvs {})",
        address,
        id.manufacturer,
        versions.jvs
    );

    Ok(Device {
        address,
        id,
        versions,
        capabilities,
    })
}

/// The three version queries ride in one packet. A record that comes back
/// with a bad report leaves its version at 0.0 rather than failing the
/// whole device.
async fn read_versions(
    link: &mut dyn BusLink,
    settings: &BusSettings,
    address: u8,
) -> Result<Versions, JvsError> {
    let records = [
        CommandRecord {
            bytes: &[Command::CommandVersion as u8],
            reply_len: 1,
        },
        CommandRecord {
            bytes: &[Command::JvsVersion as u8],
            reply_len: 1,
        },
        CommandRecord {
            bytes: &[Command::CommsVersion as u8],
            reply_len: 1,
        },
    ];
    let replies = transact_multi(link, address, &records, settings.read_timeout).await?;

    let mut versions = Versions::default();
    let slots: [(&str, &mut BcdVersion); 3] = [
        ("command", &mut versions.command),
        ("jvs", &mut versions.jvs),
        ("comms", &mut versions.comms),
    ];

    for (index, (name, slot)) in slots.into_iter().enumerate() {
        match replies.get(index) {
            Some((Report::Success, bytes)) if bytes.len() == 1 => {
                *slot = BcdVersion::from_bcd(bytes[0]);
            }
            Some((report, _)) => log::warn!(
                "device {:#04x} failed the {} version query: {:?}",
                address,
                name,
                report
            ),
            None => log::warn!(
                "device {:#04x} did not answer the {} version query",
                address,
                name
            ),
        }
    }

    Ok(versions)
}
