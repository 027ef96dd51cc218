// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright OXIDOS AUTOMOTIVE 2024.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::{DataBits, Parity, SerialPort, SerialStream, StopBits};

use crate::errors::{FrameError, JvsError, SerialError};
use crate::settings::BusSettings;

/// Byte-level contract the frame codec runs against.
///
/// `sense` reflects the JVS daisy-chain sense line, which the usual
/// USB-RS485 adapters expose as the carrier-detect modem-status bit. A mock
/// implementation stands in for the adapter in tests.
#[async_trait]
pub trait BusLink {
    async fn read_byte(&mut self, timeout: Duration) -> Result<u8, JvsError>;
    async fn write_all(&mut self, bytes: &[u8], timeout: Duration) -> Result<(), JvsError>;
    fn sense(&mut self) -> Result<bool, JvsError>;
}

/// The real thing: a half-duplex RS-485 adapter behind a serial port.
pub struct SerialLink {
    stream: SerialStream,
}

impl SerialLink {
    pub fn open(path: &str, settings: &BusSettings) -> Result<SerialLink, JvsError> {
        let builder = tokio_serial::new(path, settings.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One);

        let stream = SerialStream::open(&builder)?;
        Ok(SerialLink { stream })
    }
}

#[async_trait]
impl BusLink for SerialLink {
    async fn read_byte(&mut self, timeout: Duration) -> Result<u8, JvsError> {
        match tokio::time::timeout(timeout, self.stream.read_u8()).await {
            Ok(result) => result.map_err(|e| SerialError::IO(e).into()),
            Err(_) => Err(FrameError::Timeout.into()),
        }
    }

    async fn write_all(&mut self, bytes: &[u8], timeout: Duration) -> Result<(), JvsError> {
        match tokio::time::timeout(timeout, self.stream.write_all(bytes)).await {
            Ok(result) => result.map_err(|e| SerialError::IO(e).into()),
            Err(_) => Err(FrameError::Timeout.into()),
        }
    }

    fn sense(&mut self) -> Result<bool, JvsError> {
        Ok(self.stream.read_carrier_detect()?)
    }
}
