// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright OXIDOS AUTOMOTIVE 2024.

use byteorder::{BigEndian, ByteOrder};

use crate::device::Device;
use crate::enumeration;
use crate::errors::JvsError;
use crate::link::{BusLink, SerialLink};
use crate::protocol::Command;
use crate::settings::BusSettings;
use crate::switches::{decode_switches, SwitchSnapshot};
use crate::transact::transact;

/// The structurally identical input reads of the 0x21..0x26 range.
/// Switches have their own decoded path; these return the raw reply bytes
/// for higher layers to interpret.
#[derive(Clone, Copy, Debug)]
pub enum InputRead {
    Coins { slots: u8 },
    Analog { channels: u8 },
    Rotary { channels: u8 },
    Keypad,
    Lightgun { channel: u8 },
    Gpi { ports: u8 },
}

impl InputRead {
    fn request(self) -> Vec<u8> {
        match self {
            InputRead::Coins { slots } => vec![Command::ReadCoins as u8, slots],
            InputRead::Analog { channels } => vec![Command::ReadAnalogs as u8, channels],
            InputRead::Rotary { channels } => vec![Command::ReadRotary as u8, channels],
            InputRead::Keypad => vec![Command::ReadKeypad as u8],
            InputRead::Lightgun { channel } => vec![Command::ReadLightgun as u8, channel],
            InputRead::Gpi { ports } => vec![Command::ReadGpi as u8, ports],
        }
    }
}

/// One bus session: the exclusive owner of the serial link plus the device
/// registry produced by enumeration.
///
/// The registry is only written during `enumerate`; every other operation
/// reads it. There is no pipelining -- the next command goes out only after
/// the previous reply was read and validated.
pub struct JvsBus {
    link: Box<dyn BusLink + Send>,
    settings: BusSettings,
    devices: Vec<Device>,
}

impl JvsBus {
    pub fn new(link: Box<dyn BusLink + Send>, settings: BusSettings) -> JvsBus {
        JvsBus {
            link,
            settings,
            devices: Vec::new(),
        }
    }

    /// Opens the serial adapter at `path` and wraps it in a session.
    pub fn open(path: &str, settings: BusSettings) -> Result<JvsBus, JvsError> {
        let link = SerialLink::open(path, &settings)?;
        Ok(JvsBus::new(Box::new(link), settings))
    }

    /// Resets and walks the chain; afterwards `devices` holds the registry.
    /// Safe to call again later to recover a wedged bus.
    pub async fn enumerate(&mut self) -> Result<&[Device], JvsError> {
        self.devices = enumeration::enumerate(self.link.as_mut(), &self.settings).await?;
        Ok(&self.devices)
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn settings(&self) -> &BusSettings {
        &self.settings
    }

    /// Reads and decodes the switch state of one device, always two bytes
    /// per player.
    pub async fn read_switches(
        &mut self,
        address: u8,
        players: u8,
    ) -> Result<SwitchSnapshot, JvsError> {
        let switches_per_player = self
            .devices
            .iter()
            .find(|device| device.address == address)
            .and_then(|device| device.capabilities.switches)
            .map(|info| info.switches_per_player)
            .unwrap_or(8);

        let data = transact(
            self.link.as_mut(),
            address,
            &[Command::ReadSwitches as u8, players, 2],
            self.settings.read_timeout,
        )
        .await?;

        decode_switches(&data, players, switches_per_player)
    }

    /// Issues any of the other input reads and hands back the raw bytes
    /// after the status and report.
    pub async fn read_input(&mut self, address: u8, read: InputRead) -> Result<Vec<u8>, JvsError> {
        transact(
            self.link.as_mut(),
            address,
            &read.request(),
            self.settings.read_timeout,
        )
        .await
    }

    /// Drives the general-purpose outputs, one byte per bank.
    pub async fn write_gpo(&mut self, address: u8, banks: &[u8]) -> Result<(), JvsError> {
        let mut command = vec![Command::WriteGpo as u8, banks.len() as u8];
        command.extend_from_slice(banks);
        transact(
            self.link.as_mut(),
            address,
            &command,
            self.settings.read_timeout,
        )
        .await?;
        Ok(())
    }

    /// Drives the analog outputs; each channel value travels high byte
    /// first.
    pub async fn write_analog(&mut self, address: u8, values: &[u16]) -> Result<(), JvsError> {
        let mut command = vec![Command::WriteAnalog as u8, values.len() as u8];
        for &value in values {
            let mut encoded = [0u8; 2];
            BigEndian::write_u16(&mut encoded, value);
            command.extend_from_slice(&encoded);
        }
        transact(
            self.link.as_mut(),
            address,
            &command,
            self.settings.read_timeout,
        )
        .await?;
        Ok(())
    }

    /// Sends raw character data to an alphanumeric display. The bytes are
    /// passed through in whatever encoding the display declared.
    pub async fn write_display(&mut self, address: u8, text: &[u8]) -> Result<(), JvsError> {
        let mut command = vec![Command::WriteDisplay as u8, text.len() as u8];
        command.extend_from_slice(text);
        transact(
            self.link.as_mut(),
            address,
            &command,
            self.settings.read_timeout,
        )
        .await?;
        Ok(())
    }
}
