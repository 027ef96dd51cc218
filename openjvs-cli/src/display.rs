// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright OXIDOS AUTOMOTIVE 2024.

use openjvs_lib::device::Device;
use openjvs_lib::poller::BusState;

// ANSI escape codes for colors
const RESET: &str = "\x1b[0m";
const BOLD_MAGENTA: &str = "\x1b[1;35m";
const BOLD_GREEN: &str = "\x1b[1;32m";
const BOLD_YELLOW: &str = "\x1b[1;33m";

pub fn print_devices(devices: &[Device]) {
    for device in devices {
        println!("\n{}{}{}", RESET, BOLD_MAGENTA, " ┏━━━━━━━━━━━━━━━━┓");
        println!(
            " ┃ {}{:<14}{} ┃",
            BOLD_GREEN,
            format!("Device {:#04x}", device.address),
            RESET
        );
        println!("{}{}{}", RESET, BOLD_YELLOW, " ┗━━━━━━━━━━━━━━━━┛");

        println!(
            "\n {} Manufacturer:     {}{}",
            BOLD_GREEN, device.id.manufacturer, RESET
        );

        if let Some(product) = &device.id.product {
            println!(" {} Product:          {}{}", BOLD_GREEN, product, RESET);
        }
        if let Some(serial) = &device.id.serial {
            println!(" {} Serial:           {}{}", BOLD_GREEN, serial, RESET);
        }
        if let Some(version) = &device.id.version {
            println!(" {} Firmware:         {}{}", BOLD_GREEN, version, RESET);
        }
        if let Some(comment) = &device.id.comment {
            println!(" {} Comment:          {}{}", BOLD_GREEN, comment, RESET);
        }

        println!(
            " {} Versions:         command {}, jvs {}, comms {}{}",
            BOLD_GREEN,
            device.versions.command,
            device.versions.jvs,
            device.versions.comms,
            RESET
        );

        let caps = &device.capabilities;
        if let Some(switches) = caps.switches {
            println!(
                " {} Switches:         {} player(s), {} switch(es) each{}",
                BOLD_GREEN, switches.players, switches.switches_per_player, RESET
            );
        }
        if let Some(slots) = caps.coin_slots {
            println!(" {} Coin slots:       {}{}", BOLD_GREEN, slots, RESET);
        }
        if let Some(analog) = caps.analog_in {
            println!(
                " {} Analog inputs:    {} channel(s), {} bit(s){}",
                BOLD_GREEN, analog.channels, analog.effective_bits, RESET
            );
        }
        if let Some(channels) = caps.rotary_channels {
            println!(" {} Rotary encoders:  {}{}", BOLD_GREEN, channels, RESET);
        }
        if caps.keypad {
            println!(" {} Keypad:           present{}", BOLD_GREEN, RESET);
        }
        if let Some(lightgun) = caps.lightgun {
            println!(
                " {} Light gun:        {}x{} bit(s), {} channel(s){}",
                BOLD_GREEN, lightgun.x_bits, lightgun.y_bits, lightgun.channels, RESET
            );
        }
        if let Some(count) = caps.gpi_count {
            println!(" {} GP inputs:        {}{}", BOLD_GREEN, count, RESET);
        }
        if let Some(slots) = caps.card_slots {
            println!(" {} Card slots:       {}{}", BOLD_GREEN, slots, RESET);
        }
        if let Some(channels) = caps.hopper_channels {
            println!(" {} Token hoppers:    {}{}", BOLD_GREEN, channels, RESET);
        }
        if let Some(banks) = caps.gpo_banks {
            println!(" {} GP output banks:  {}{}", BOLD_GREEN, banks, RESET);
        }
        if let Some(channels) = caps.analog_out_channels {
            println!(" {} Analog outputs:   {}{}", BOLD_GREEN, channels, RESET);
        }
        if let Some(display) = caps.display {
            println!(
                " {} Display:          {}x{}, {}{}",
                BOLD_GREEN, display.columns, display.rows, display.encoding, RESET
            );
        }
        if caps.backup {
            println!(" {} Backup memory:    present{}", BOLD_GREEN, RESET);
        }
        println!();
    }
}

/// Prints the press/release edges between two published bus states.
pub fn print_edges(previous: &BusState, current: &BusState) {
    let mut addresses: Vec<u8> = current.switches.keys().copied().collect();
    addresses.sort_unstable();

    for address in addresses {
        let now = &current.switches[&address];
        let Some(before) = previous.switches.get(&address) else {
            continue;
        };

        for ((name, was), (_, is)) in before
            .system
            .switches()
            .into_iter()
            .zip(now.system.switches())
        {
            report_edge(address, None, name, was, is);
        }

        for (player, (old, new)) in before.players.iter().zip(now.players.iter()).enumerate() {
            for ((name, was), (_, is)) in old.buttons().into_iter().zip(new.buttons()) {
                report_edge(address, Some(player + 1), name, was, is);
            }
        }
    }
}

fn report_edge(address: u8, player: Option<usize>, name: &str, was: bool, is: bool) {
    if was == is {
        return;
    }

    let action = if is { "pressed" } else { "released" };
    match player {
        Some(player) => println!(
            " {}device {:#04x} player {} {} {}{}",
            BOLD_GREEN, address, player, name, action, RESET
        ),
        None => println!(
            " {}device {:#04x} system {} {}{}",
            BOLD_GREEN, address, name, action, RESET
        ),
    }
}
