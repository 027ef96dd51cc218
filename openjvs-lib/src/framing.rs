// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright OXIDOS AUTOMOTIVE 2024.

use std::time::Duration;

use bytes::{BufMut, BytesMut};

use crate::errors::{FrameError, JvsError};
use crate::link::BusLink;

/// Marks the first byte of every packet on the wire.
pub const SYNC: u8 = 0xE0;

/// In-band escape: the pair (ESCAPE, b - 1) stands for payload byte b.
pub const ESCAPE: u8 = 0xD0;

/// Longest payload a single packet can carry. The length field is one byte
/// and also covers the checksum.
pub const MAX_PAYLOAD: usize = 254;

/// Materializes one packet: sync, destination, length, escaped payload,
/// checksum. The checksum covers the logical bytes, not their escaped form.
pub fn encode_frame(destination: u8, payload: &[u8]) -> Result<BytesMut, FrameError> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::Oversize(payload.len()));
    }

    let length = payload.len() as u8 + 1;

    let mut frame = BytesMut::with_capacity(payload.len() + 4);
    frame.put_u8(SYNC);
    frame.put_u8(destination);
    frame.put_u8(length);

    let mut checksum = destination.wrapping_add(length);
    for &byte in payload {
        if byte == SYNC || byte == ESCAPE {
            frame.put_u8(ESCAPE);
            frame.put_u8(byte - 1);
        } else {
            frame.put_u8(byte);
        }
        checksum = checksum.wrapping_add(byte);
    }
    frame.put_u8(checksum);

    Ok(frame)
}

/// Reads one packet off the bus, discarding anything in front of the sync
/// byte. A bare sync observed in the payload position can only be the
/// start of a newer packet (payload bytes are escape-encoded on a healthy
/// line), so decoding restarts from it. The destination, length and
/// checksum bytes travel raw and are read unconditionally.
pub async fn read_frame(
    link: &mut dyn BusLink,
    timeout: Duration,
) -> Result<(u8, Vec<u8>), JvsError> {
    let mut byte = link.read_byte(timeout).await?;

    'frame: loop {
        while byte != SYNC {
            byte = link.read_byte(timeout).await?;
        }

        let destination = link.read_byte(timeout).await?;
        let length = link.read_byte(timeout).await?;
        let count = length.saturating_sub(1) as usize;

        let mut checksum = destination.wrapping_add(length);
        let mut payload = Vec::with_capacity(count);

        while payload.len() < count {
            let mut data = link.read_byte(timeout).await?;
            if data == SYNC {
                byte = data;
                continue 'frame;
            }
            if data == ESCAPE {
                data = link.read_byte(timeout).await?;
                if data == SYNC {
                    byte = data;
                    continue 'frame;
                }
                data = data.wrapping_add(1);
            }
            payload.push(data);
            checksum = checksum.wrapping_add(data);
        }

        let received = link.read_byte(timeout).await?;
        if received != checksum {
            return Err(FrameError::Checksum {
                received,
                computed: checksum,
            }
            .into());
        }

        return Ok((destination, payload));
    }
}
