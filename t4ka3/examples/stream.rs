// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
use std::env;
use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

use anyhow::{anyhow, Context};
use linux_embedded_hal::sysfs_gpio::Direction;
use linux_embedded_hal::{Delay, I2cdev, Pin};
use log::info;

use t4ka3::{ControlId, PowerControl, SensorConfig, T4ka3, DEFAULT_ADDRESS};

fn parse_u32(text: &str) -> anyhow::Result<u32> {
    let parsed = match text.strip_prefix("0x") {
        Some(hex_digits) => u32::from_str_radix(hex_digits, 16)?,
        None => text.parse()?,
    };
    Ok(parsed)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args: Vec<String> = env::args().collect();
    if args.len() < 4 || args.len() > 6 {
        return Err(anyhow!(
            "Usage: stream <I2C bus> <power-down GPIO> <WIDTHxHEIGHT> [sensor address] [properties]"
        ));
    }
    let bus = I2cdev::new(Path::new(&args[1])).context("opening the I2C bus")?;

    let powerdown = Pin::new(u64::from(parse_u32(&args[2])?));
    powerdown.export().context("exporting the power-down GPIO")?;
    powerdown.set_direction(Direction::Out)?;
    let mut power = PowerControl::new(powerdown, Delay);
    power.power_up()?;

    let (width, height) = args[3]
        .split_once('x')
        .ok_or_else(|| anyhow!("The format must be given as WIDTHxHEIGHT"))?;
    let address = match args.get(4) {
        Some(address) => u8::try_from(parse_u32(address)?)?,
        None => DEFAULT_ADDRESS,
    };
    let config: SensorConfig = args.get(5).map(String::as_str).unwrap_or("").parse()?;

    let mut sensor = T4ka3::attach(bus, address, config)?;
    let mode = sensor.set_format(parse_u32(width)?, parse_u32(height)?)?;
    let format = sensor.get_active_format();
    println!(
        "Streaming {}x{} ({:?}, media bus code {:#06X})",
        format.width,
        format.height,
        format.bayer_order,
        format.bayer_order.media_bus_code()
    );
    for control in ControlId::ALL {
        let range = sensor.control_range(control);
        println!(
            "{:>16?}: {} [{}, {}]",
            control,
            sensor.control(control),
            range.min,
            range.max
        );
    }

    sensor.start_stream()?;
    info!("Skip the first {} frames", mode.skip_frames());
    sleep(Duration::from_secs(5));
    // Halve the frame rate for the rest of the run
    let frame_length = mode.height() + u32::from(sensor.controls().vblank());
    let vblank = 2 * frame_length - mode.height();
    sensor.set_control(ControlId::VerticalBlank, i64::from(vblank))?;
    sleep(Duration::from_secs(5));
    sensor.stop_stream()?;

    sensor.suspend(&mut power)?;
    let (_bus, result) = sensor.detach();
    result?;
    Ok(())
}
