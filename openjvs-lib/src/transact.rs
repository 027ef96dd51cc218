// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright OXIDOS AUTOMOTIVE 2024.

use std::time::Duration;

use crate::errors::{FrameError, JvsError, ProtocolError};
use crate::framing::{encode_frame, read_frame};
use crate::link::BusLink;
use crate::protocol::{Command, Report, Status, BROADCAST, BUS_MASTER, CMD_DELAY};

/// One record of a multi-command request: the opcode with its argument
/// bytes, plus the fixed size of the data the device answers it with.
pub struct CommandRecord<'a> {
    pub bytes: &'a [u8],
    pub reply_len: usize,
}

/// Fire-and-forget broadcast; nothing on the bus answers it. Reset is the
/// only such command -- AssignAddress uses the broadcast destination but is
/// answered by the device taking the address, so it goes through `transact`.
pub async fn broadcast(
    link: &mut dyn BusLink,
    payload: &[u8],
    timeout: Duration,
) -> Result<(), JvsError> {
    let frame = encode_frame(BROADCAST, payload)?;
    link.write_all(&frame, timeout).await
}

/// Sends one command packet and validates the reply's status and report
/// bytes. Returns the bytes after them.
pub async fn transact(
    link: &mut dyn BusLink,
    address: u8,
    command: &[u8],
    timeout: Duration,
) -> Result<Vec<u8>, JvsError> {
    let opcode = command.first().copied().unwrap_or(0);

    let frame = encode_frame(address, command)?;
    link.write_all(&frame, timeout).await?;

    let reply = read_reply(link, address, timeout).await?;
    if reply.len() < 2 {
        return Err(ProtocolError::ShortReply {
            opcode,
            expected: 2,
            got: reply.len(),
        }
        .into());
    }

    if Status::from(reply[0]) != Status::Success {
        return Err(ProtocolError::Status {
            opcode,
            status: reply[0],
        }
        .into());
    }
    if Report::from(reply[1]) != Report::Success {
        return Err(ProtocolError::Report {
            opcode,
            report: reply[1],
        }
        .into());
    }

    tokio::time::sleep(CMD_DELAY).await;
    Ok(reply[2..].to_vec())
}

/// Packs several command records into one request packet. A bad status
/// fails the whole call; a bad report only marks its own record, and the
/// caller decides what to make of it.
pub async fn transact_multi(
    link: &mut dyn BusLink,
    address: u8,
    records: &[CommandRecord<'_>],
    timeout: Duration,
) -> Result<Vec<(Report, Vec<u8>)>, JvsError> {
    let mut request = Vec::new();
    for record in records {
        request.extend_from_slice(record.bytes);
    }
    let opcode = request.first().copied().unwrap_or(0);

    let frame = encode_frame(address, &request)?;
    link.write_all(&frame, timeout).await?;

    let reply = read_reply(link, address, timeout).await?;
    if reply.is_empty() {
        return Err(ProtocolError::ShortReply {
            opcode,
            expected: 1,
            got: 0,
        }
        .into());
    }
    if Status::from(reply[0]) != Status::Success {
        return Err(ProtocolError::Status {
            opcode,
            status: reply[0],
        }
        .into());
    }

    let mut results = Vec::with_capacity(records.len());
    let mut position = 1;
    for record in records {
        if position >= reply.len() {
            break;
        }

        let report = Report::from(reply[position]);
        position += 1;

        if report != Report::Success {
            // A failed record carries no data, so the offsets of everything
            // after it are unknowable.
            results.push((report, Vec::new()));
            break;
        }

        let end = position + record.reply_len;
        if end > reply.len() {
            return Err(ProtocolError::ShortReply {
                opcode: record.bytes.first().copied().unwrap_or(0),
                expected: end,
                got: reply.len(),
            }
            .into());
        }
        results.push((report, reply[position..end].to_vec()));
        position = end;
    }

    tokio::time::sleep(CMD_DELAY).await;
    Ok(results)
}

/// Reads the reply to a command just written. A stray packet (addressed to
/// anything but the master) is dropped once; a checksum-failed reply is
/// answered with a Retransmit request once. Either fault twice escalates.
async fn read_reply(
    link: &mut dyn BusLink,
    address: u8,
    timeout: Duration,
) -> Result<Vec<u8>, JvsError> {
    let mut stray_seen = false;
    let mut retransmit_sent = false;

    loop {
        match read_frame(link, timeout).await {
            Ok((destination, payload)) if destination == BUS_MASTER => return Ok(payload),
            Ok((destination, _)) => {
                if stray_seen {
                    return Err(FrameError::StrayPacket(destination).into());
                }
                stray_seen = true;
                log::warn!("dropped a stray packet addressed to {:#04x}", destination);
            }
            Err(JvsError::Frame(FrameError::Checksum { received, computed }))
                if !retransmit_sent && address != BROADCAST =>
            {
                retransmit_sent = true;
                log::debug!(
                    "reply checksum mismatch (received {:#04x}, computed {:#04x}), asking {:#04x} to retransmit",
                    received,
                    computed,
                    address
                );
                let frame = encode_frame(address, &[Command::Retransmit as u8])?;
                link.write_all(&frame, timeout).await?;
            }
            Err(error) => return Err(error),
        }
    }
}
