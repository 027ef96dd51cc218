// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright OXIDOS AUTOMOTIVE 2024.

mod cli;
mod display;

use anyhow::{bail, Context, Result};
use clap::ArgMatches;
use openjvs_lib::poller::{self, BusState};
use openjvs_lib::{list_serial_ports, BusSettings, JvsBus};
use tokio::signal;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

fn get_bus_settings(user_options: &ArgMatches) -> BusSettings {
    let mut result = BusSettings::default();

    if let Some(baud_rate) = user_options.get_one::<u32>("baud-rate") {
        result.baud_rate = *baud_rate;
    }
    if let Some(count) = user_options.get_one::<u8>("assume-devices") {
        result.assume_devices = Some(*count);
    }

    result
}

fn open_bus(user_options: &ArgMatches) -> Result<JvsBus> {
    let path = if let Some(path) = user_options.get_one::<String>("port") {
        path.clone()
    } else {
        let serial_ports = list_serial_ports().context("Failed to list serial ports.")?;
        let port_names: Vec<_> = serial_ports.iter().map(|p| p.port_name.clone()).collect();
        inquire::Select::new("Which serial port is the JVS adapter on?", port_names)
            .prompt()
            .context("No serial port selected.")?
    };

    JvsBus::open(&path, get_bus_settings(user_options))
        .with_context(|| format!("Failed to open serial connection on {path}."))
}

async fn enumerate_or_bail(bus: &mut JvsBus) -> Result<()> {
    bus.enumerate().await.context("Failed to enumerate the bus.")?;
    if bus.devices().is_empty() {
        bail!("No devices found on the bus.");
    }
    Ok(())
}

async fn run_poll(bus: &mut JvsBus) -> Result<()> {
    let (updates, mut events) = watch::channel(BusState::default());
    let shutdown = CancellationToken::new();

    let signal_guard = shutdown.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            signal_guard.cancel();
        }
    });

    let printer = tokio::spawn(async move {
        let mut previous = BusState::default();
        while events.changed().await.is_ok() {
            let current = events.borrow_and_update().clone();
            display::print_edges(&previous, &current);
            previous = current;
        }
    });

    let result = poller::poll(bus, &updates, shutdown).await;

    drop(updates);
    let _ = printer.await;

    result.context("Polling failed.")
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let mut cmd = cli::make_cli();
    let matches = cmd.get_matches_mut();

    match matches.subcommand() {
        Some(("ports", _)) => {
            for port in list_serial_ports().context("Failed to list serial ports.")? {
                println!("{}", port.port_name);
            }
        }
        Some(("info", sub_matches)) => {
            let mut bus = open_bus(sub_matches)?;
            enumerate_or_bail(&mut bus).await?;
            display::print_devices(bus.devices());
        }
        Some(("poll", sub_matches)) => {
            let mut bus = open_bus(sub_matches)?;
            enumerate_or_bail(&mut bus).await?;
            display::print_devices(bus.devices());
            run_poll(&mut bus).await?;
        }
        _ => {
            println!("Could not run the provided subcommand.");
            _ = cli::make_cli().print_help();
        }
    }

    Ok(())
}
