// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Hardware smoke test for a paired Phiro robot.
//!
//! Opens the configured serial device, initialises the robot, runs a short
//! motor/light/tone/sensor sequence and disconnects.

use std::collections::HashMap;
use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use phiro::config::{load_config, validate_config};
use phiro::device::{DeviceConfig, DeviceController, Sensor};
use phiro::hal::StreamConnection;
use phiro::observability::{debug_flags_help, init_logging, parse_debug_flags};
use tracing::{info, warn};

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: phiro-probe [--config <path>] [--port <device>] [--log-dir <path>] [--debug-<crate>]\n\n\
         Defaults:\n\
         - config: $PHIRO_CONFIG_PATH or phiro_configuration.toml in the working directory\n\
         - port: connection.serial_port from the config\n\n{}",
        debug_flags_help()
    );
    process::exit(2);
}

fn parse_args() -> (Option<PathBuf>, HashMap<String, String>) {
    let mut config_path = None;
    let mut overrides = HashMap::new();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                config_path = Some(PathBuf::from(v));
            }
            "--port" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                overrides.insert("serial_port".to_string(), v);
            }
            "--log-dir" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                overrides.insert("log_dir".to_string(), v);
            }
            "-h" | "--help" => usage_and_exit(),
            other if other.starts_with("--debug-") => {}
            other => {
                eprintln!("Unknown argument: {other}");
                usage_and_exit();
            }
        }
    }

    (config_path, overrides)
}

fn main() -> Result<()> {
    let (config_path, overrides) = parse_args();

    let config = load_config(config_path.as_deref(), Some(&overrides))
        .context("Failed to load configuration")?;
    validate_config(&config).context("Invalid configuration")?;

    let _log_guard = init_logging(
        &parse_debug_flags(),
        &config.logging.level,
        config.logging.log_dir.clone(),
        None,
    )?;

    let port = &config.connection.serial_port;
    let serial = OpenOptions::new()
        .read(true)
        .write(true)
        .open(port)
        .with_context(|| format!("Failed to open serial device {}", port))?;
    info!("[PROBE] Opened {}", port);

    let device_config = DeviceConfig::from_config(&config)?;
    let connection = StreamConnection::duplex(port.clone(), serial)
        .with_context(|| format!("Failed to clone a read handle for {}", port))?;
    let mut phiro = DeviceController::new(connection, device_config);

    phiro.initialise().context("Initialisation failed")?;

    phiro.set_left_rgb_light_color(0, 0, 255)?;
    phiro.set_right_rgb_light_color(0, 0, 255)?;
    phiro.move_left_motor_forward(40)?;
    phiro.move_right_motor_forward(40)?;
    thread::sleep(Duration::from_millis(500));
    phiro.stop_all_movements()?;

    phiro.play_tone(440, 1)?;
    thread::sleep(Duration::from_millis(1200));

    if let Err(e) = phiro.poll_sensors() {
        warn!("[PROBE] Sensor poll failed: {}", e);
    }
    for sensor in Sensor::ALL {
        match phiro.sensor_value(sensor) {
            Some(value) => info!("[PROBE] {:?}: {}", sensor, value),
            None => info!("[PROBE] {:?}: no reading yet", sensor),
        }
    }

    phiro.reset()?;
    phiro.disconnect()?;
    info!("[PROBE] Done");
    Ok(())
}
