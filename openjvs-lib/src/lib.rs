// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright OXIDOS AUTOMOTIVE 2024.

//! Bus-master implementation of the JVS (JAMMA Video Standard) arcade I/O
//! protocol, driven over a commodity USB-RS485 serial adapter.
//!
//! A session starts by opening a [`bus::JvsBus`] on a serial port,
//! enumerating the chain (reset, address assignment over the sense line,
//! identification) and then either issuing individual reads and writes or
//! handing the bus to [`poller::poll`] for continuous input polling.

pub mod bus;
pub mod capabilities;
pub mod device;
mod enumeration;
pub mod errors;
pub mod framing;
pub mod link;
pub mod poller;
pub mod protocol;
pub mod settings;
pub mod switches;
pub mod transact;

use tokio_serial::SerialPortInfo;

pub use bus::{InputRead, JvsBus};
pub use device::Device;
pub use errors::JvsError;
pub use link::{BusLink, SerialLink};
pub use settings::BusSettings;

pub fn list_serial_ports() -> Result<Vec<SerialPortInfo>, JvsError> {
    tokio_serial::available_ports().map_err(JvsError::from)
}
