// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Device-level API of the Phiro robot
//!
//! Every operation resolves pins through the [`PinMap`], encodes Firmata
//! frames and writes them through the shared link before returning. The only
//! deferred write is the stop frame of a tone.

use std::sync::Arc;
use std::time::Duration;

use phiro_firmata::{
    encode_analog_message, encode_report_analog_pin, encode_set_pin_mode, Command, FrameDecoder,
};
use phiro_hal::{Connection, ConnectionReader, ConnectionState};
use tracing::{debug, info, warn};

use crate::error::{DeviceError, Result};
use crate::link::{Link, SharedLink};
use crate::pins::{percent_to_speed, DeviceConfig, PinMap, Sensor, Side};
use crate::sensors::{SensorReading, SensorReadings};
use crate::tone::{ToneScheduler, ToneState};

/// Controller for one connected Phiro robot
pub struct DeviceController {
    config: DeviceConfig,
    link: SharedLink,
    /// Read half used without the link lock, when the backend has one
    reader: Option<Box<dyn ConnectionReader>>,
    tone: ToneScheduler,
    decoder: FrameDecoder,
    sensors: SensorReadings,
    initialised: bool,
    reporting_sensors: bool,
}

impl DeviceController {
    /// Create a controller over an already open connection
    ///
    /// # Arguments
    /// * `connection` - Open, ordered byte channel to the robot
    /// * `config` - Pin layout and modes
    ///
    /// # Panics
    /// If a configured pin does not fit in a Firmata channel nibble.
    pub fn new(mut connection: impl Connection + 'static, config: DeviceConfig) -> Self {
        if let Some((role, pin)) = config.pin_map.first_out_of_channel() {
            panic!("pin {} for {} does not fit in a channel nibble", pin, role);
        }

        debug!(
            "[PHIRO] Controller created on {} backend",
            connection.backend_name()
        );
        let reader = connection.take_reader();
        Self {
            config,
            reader,
            link: Link::shared(Box::new(connection)),
            tone: ToneScheduler::new(),
            decoder: FrameDecoder::new(),
            sensors: SensorReadings::default(),
            initialised: false,
            reporting_sensors: false,
        }
    }

    /// Controller with the stock Phiro pin layout
    pub fn with_defaults(connection: impl Connection + 'static) -> Self {
        Self::new(connection, DeviceConfig::default())
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn pin_map(&self) -> &PinMap {
        &self.config.pin_map
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.link.lock().state()
    }

    pub fn is_initialised(&self) -> bool {
        self.initialised
    }

    pub fn is_reporting_sensors(&self) -> bool {
        self.reporting_sensors
    }

    /// State of the most recent tone request
    pub fn tone_state(&self) -> ToneState {
        self.tone.state()
    }

    /// Configure PWM pins and enable sensor reporting
    ///
    /// Writes SET_PIN_MODE for every PWM pin in ascending order, then
    /// REPORT_ANALOG_PIN(enable) for every sensor pin in ascending order.
    ///
    /// On a transport failure the sequence stops at the failing frame and the
    /// error is returned. Frames already written are not undone and the
    /// controller stays uninitialised; calling `initialise()` again replays
    /// the whole sequence.
    pub fn initialise(&mut self) -> Result<()> {
        self.initialised = false;
        let map = &self.config.pin_map;
        let mut link = self.link.lock();

        for pin in map.pwm_pins() {
            link.send_frame(&encode_set_pin_mode(pin, self.config.pwm_mode))?;
        }
        for pin in map.sensor_pins() {
            link.send_frame(&encode_report_analog_pin(pin, true))?;
        }
        drop(link);

        self.reporting_sensors = true;
        self.initialised = true;
        info!(
            "[PHIRO] Initialised: PWM pins {:?}, sensor reporting on",
            map.pwm_pins()
        );
        Ok(())
    }

    /// Turn analog reporting of all sensor pins on or off
    ///
    /// Writes nothing if reporting is already in the requested state.
    pub fn report_sensor_data(&mut self, enable: bool) -> Result<()> {
        if self.reporting_sensors == enable {
            return Ok(());
        }
        let mut link = self.link.lock();
        for pin in self.config.pin_map.sensor_pins() {
            link.send_frame(&encode_report_analog_pin(pin, enable))?;
        }
        drop(link);

        self.reporting_sensors = enable;
        debug!("[PHIRO] Sensor reporting {}", if enable { "on" } else { "off" });
        Ok(())
    }

    pub fn move_left_motor_forward(&mut self, percent: i32) -> Result<()> {
        let pin = self.config.pin_map.left_motor.forward;
        self.set_speed(pin, percent)
    }

    pub fn move_left_motor_backward(&mut self, percent: i32) -> Result<()> {
        let pin = self.config.pin_map.left_motor.backward;
        self.set_speed(pin, percent)
    }

    pub fn move_right_motor_forward(&mut self, percent: i32) -> Result<()> {
        let pin = self.config.pin_map.right_motor.forward;
        self.set_speed(pin, percent)
    }

    pub fn move_right_motor_backward(&mut self, percent: i32) -> Result<()> {
        let pin = self.config.pin_map.right_motor.backward;
        self.set_speed(pin, percent)
    }

    /// Zero the forward then the backward pin of the left motor
    pub fn stop_left_motor(&mut self) -> Result<()> {
        self.stop_motors(&[Side::Left])
    }

    /// Zero the forward then the backward pin of the right motor
    pub fn stop_right_motor(&mut self) -> Result<()> {
        self.stop_motors(&[Side::Right])
    }

    /// Stop the left motor, then the right motor
    pub fn stop_all_movements(&mut self) -> Result<()> {
        self.stop_motors(&[Side::Left, Side::Right])
    }

    /// Raw 0-255 channel values, written red, green, blue
    pub fn set_left_rgb_light_color(&mut self, red: u8, green: u8, blue: u8) -> Result<()> {
        self.set_light(Side::Left, red, green, blue)
    }

    /// Raw 0-255 channel values, written red, green, blue
    pub fn set_right_rgb_light_color(&mut self, red: u8, green: u8, blue: u8) -> Result<()> {
        self.set_light(Side::Right, red, green, blue)
    }

    /// Play a tone for `duration_seconds`
    ///
    /// Returns right after writing the start frame; the stop frame is written
    /// from a timer thread once the duration elapses. A tone still pending
    /// from an earlier call is replaced and its stop frame dropped.
    ///
    /// # Panics
    /// If `frequency` exceeds the 14-bit analog range.
    pub fn play_tone(&mut self, frequency: u16, duration_seconds: u64) -> Result<()> {
        self.play_tone_for(frequency, Duration::from_secs(duration_seconds))
    }

    /// [`Self::play_tone`] with sub-second precision
    pub fn play_tone_for(&mut self, frequency: u16, duration: Duration) -> Result<()> {
        let speaker = self.config.pin_map.speaker;
        let start_frame = encode_analog_message(speaker, frequency);

        let mut link = self.link.lock();
        link.send_frame(&start_frame)?;
        let replaced = self.tone.cancel();
        let armed = self.tone.arm(
            Arc::clone(&self.link),
            duration,
            encode_analog_message(speaker, 0),
        );
        drop(link);

        if let Some(task) = replaced {
            debug!("[TONE] Replacing pending tone");
            task.join();
        }
        armed?;
        debug!("[PHIRO] Tone {} Hz for {:?}", frequency, duration);
        Ok(())
    }

    /// Stop motors, turn both lights off and silence the speaker
    ///
    /// A pending tone stop is cancelled; the speaker is zeroed right away.
    pub fn reset(&mut self) -> Result<()> {
        let mut link = self.link.lock();
        let pending = self.tone.cancel();
        let result = write_idle_outputs(&mut link, &self.config.pin_map);
        drop(link);

        if let Some(task) = pending {
            task.join();
        }
        result?;
        debug!("[PHIRO] Reset outputs");
        Ok(())
    }

    /// Stop all movements and stop sensor reporting
    pub fn pause(&mut self) -> Result<()> {
        self.stop_all_movements()?;
        self.report_sensor_data(false)
    }

    /// Initialise if that never completed, otherwise resume sensor reporting
    pub fn resume(&mut self) -> Result<()> {
        if !self.initialised {
            return self.initialise();
        }
        self.report_sensor_data(true)
    }

    /// Read what the device sent since the last poll and update sensor values
    ///
    /// Performs a single read on the connection. With a detached read half
    /// the read runs outside the link lock, so a blocking read does not delay
    /// writes such as a tone stop. Non-sensor traffic and malformed bytes are
    /// skipped.
    ///
    /// # Returns
    /// Number of sensor readings updated
    pub fn poll_sensors(&mut self) -> Result<usize> {
        let mut buffer = vec![0u8; self.config.receive_buffer_size];
        let read = match self.reader.as_mut() {
            Some(reader) => {
                if !self.link.lock().is_connected() {
                    return Err(DeviceError::NotConnected);
                }
                reader.receive(&mut buffer)?
            }
            None => self.link.lock().receive(&mut buffer)?,
        };
        self.decoder.extend(&buffer[..read]);

        let mut updated = 0;
        while let Some(decoded) = self.decoder.next_command() {
            match decoded {
                Ok(Command::AnalogMessage { pin, value }) => {
                    match self.config.pin_map.sensor_for_pin(pin) {
                        Some(sensor) => {
                            self.sensors.update(sensor, value);
                            updated += 1;
                        }
                        None => debug!("[PHIRO] Analog value {} on non-sensor pin {}", value, pin),
                    }
                }
                Ok(other) => debug!("[PHIRO] Ignoring {:?}", other),
                Err(e) => debug!("[PHIRO] Skipping malformed input: {}", e),
            }
        }
        Ok(updated)
    }

    /// Last value reported for a sensor
    pub fn sensor_value(&self, sensor: Sensor) -> Option<u16> {
        self.sensors.value(sensor)
    }

    /// Last reading, with its arrival time
    pub fn sensor_reading(&self, sensor: Sensor) -> Option<SensorReading> {
        self.sensors.get(sensor)
    }

    /// Tear down the connection
    ///
    /// Cancels a pending tone stop without writing it. Once this returns no
    /// further frame reaches the transport. Disconnecting twice is a no-op.
    pub fn disconnect(&mut self) -> Result<()> {
        let mut link = self.link.lock();
        if !link.is_open() {
            return Ok(());
        }
        let pending = self.tone.cancel();
        let result = link.disconnect();
        drop(link);
        self.reader = None;

        if let Some(task) = pending {
            task.join();
        }
        self.initialised = false;
        self.reporting_sensors = false;
        info!("[PHIRO] Disconnected");
        result
    }

    fn set_speed(&mut self, pin: u8, percent: i32) -> Result<()> {
        let speed = percent_to_speed(percent);
        self.link
            .lock()
            .send_frame(&encode_analog_message(pin, u16::from(speed)))?;
        debug!("[PHIRO] Pin {} speed {} ({}%)", pin, speed, percent);
        Ok(())
    }

    fn stop_motors(&mut self, sides: &[Side]) -> Result<()> {
        let mut link = self.link.lock();
        for side in sides {
            let motor = self.config.pin_map.motor(*side);
            link.send_frame(&encode_analog_message(motor.forward, 0))?;
            link.send_frame(&encode_analog_message(motor.backward, 0))?;
        }
        Ok(())
    }

    fn set_light(&mut self, side: Side, red: u8, green: u8, blue: u8) -> Result<()> {
        let light = self.config.pin_map.light(side);
        let mut link = self.link.lock();
        link.send_frame(&encode_analog_message(light.red, u16::from(red)))?;
        link.send_frame(&encode_analog_message(light.green, u16::from(green)))?;
        link.send_frame(&encode_analog_message(light.blue, u16::from(blue)))?;
        drop(link);
        debug!("[PHIRO] {:?} light set to ({}, {}, {})", side, red, green, blue);
        Ok(())
    }
}

impl Drop for DeviceController {
    fn drop(&mut self) {
        if let Err(e) = self.disconnect() {
            warn!("[PHIRO] Disconnect on drop failed: {}", e);
        }
    }
}

/// Zero both motors, both lights and the speaker
fn write_idle_outputs(link: &mut Link, map: &PinMap) -> Result<()> {
    for side in [Side::Left, Side::Right] {
        let motor = map.motor(side);
        link.send_frame(&encode_analog_message(motor.forward, 0))?;
        link.send_frame(&encode_analog_message(motor.backward, 0))?;
    }
    for side in [Side::Left, Side::Right] {
        let light = map.light(side);
        for pin in [light.red, light.green, light.blue] {
            link.send_frame(&encode_analog_message(pin, 0))?;
        }
    }
    link.send_frame(&encode_analog_message(map.speaker, 0))
}
