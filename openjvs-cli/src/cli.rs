// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright OXIDOS AUTOMOTIVE 2024.

use clap::{arg, crate_version, value_parser, Arg, Command};

pub fn make_cli() -> Command {
    Command::new("openjvs")
        .version(crate_version!())
        .about("JVS bus master for commodity USB-RS485 adapters")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(Command::new("ports").about("List the serial ports on this host"))
        .subcommand(
            Command::new("info")
                .about("Reset the bus, enumerate every device and print what was found")
                .args(connection_args()),
        )
        .subcommand(
            Command::new("poll")
                .about("Enumerate the bus, then poll switches and print press/release events")
                .args(connection_args()),
        )
}

fn connection_args() -> Vec<Arg> {
    vec![
        arg!(-p --port <PATH> "Serial device of the RS-485 adapter"),
        arg!(-b --"baud-rate" <BAUD> "Baud rate of the bus")
            .value_parser(value_parser!(u32))
            .default_value("115200"),
        arg!(--"assume-devices" <N> "Skip the sense-line procedure and assume N chained devices")
            .value_parser(value_parser!(u8)),
    ]
}
