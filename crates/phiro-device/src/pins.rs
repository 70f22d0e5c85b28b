// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Pin assignment and speed mapping

use std::ops::RangeInclusive;

use phiro_config::{ConfigResult, PhiroConfig};

/// Firmata pin mode for PWM outputs
pub const PWM_MODE: u8 = 3;

/// Maximum speed value written to a motor pin
pub const MAX_SPEED: u8 = 255;

/// Map a speed percentage to a PWM duty value
///
/// Values at or below 0 give 0, values at or above 100 give 255. Everything
/// in between is `percent * 2.55` truncated toward zero (42 → 107).
pub fn percent_to_speed(percent: i32) -> u8 {
    if percent <= 0 {
        return 0;
    }
    if percent >= 100 {
        return MAX_SPEED;
    }
    // exact integer form of floor(percent * 2.55)
    (percent * i32::from(MAX_SPEED) / 100) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

/// The six infrared sensors, in sensor-pin order of the stock firmware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sensor {
    SideRight,
    FrontRight,
    BottomRight,
    BottomLeft,
    FrontLeft,
    SideLeft,
}

impl Sensor {
    pub const ALL: [Sensor; 6] = [
        Sensor::SideRight,
        Sensor::FrontRight,
        Sensor::BottomRight,
        Sensor::BottomLeft,
        Sensor::FrontLeft,
        Sensor::SideLeft,
    ];

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

/// Red, green and blue pins of one light
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbPins {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

/// Forward and backward pins of one motor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorPins {
    pub forward: u8,
    pub backward: u8,
}

/// Pin roles of the robot
///
/// Fixed for the lifetime of a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinMap {
    pub speaker: u8,
    pub left_light: RgbPins,
    pub right_light: RgbPins,
    pub left_motor: MotorPins,
    pub right_motor: MotorPins,
    /// Indexed by [`Sensor`]
    pub sensors: [u8; 6],
    pub pwm_pin_min: u8,
    pub pwm_pin_max: u8,
}

impl Default for PinMap {
    fn default() -> Self {
        Self::phiro()
    }
}

impl PinMap {
    /// Layout of the stock Phiro firmware
    pub const fn phiro() -> Self {
        Self {
            speaker: 3,
            left_light: RgbPins {
                red: 4,
                green: 5,
                blue: 6,
            },
            right_light: RgbPins {
                red: 7,
                green: 8,
                blue: 9,
            },
            left_motor: MotorPins {
                forward: 11,
                backward: 10,
            },
            right_motor: MotorPins {
                forward: 12,
                backward: 13,
            },
            sensors: [0, 1, 2, 3, 4, 5],
            pwm_pin_min: 3,
            pwm_pin_max: 13,
        }
    }

    pub fn pwm_pins(&self) -> RangeInclusive<u8> {
        self.pwm_pin_min..=self.pwm_pin_max
    }

    pub fn light(&self, side: Side) -> RgbPins {
        match side {
            Side::Left => self.left_light,
            Side::Right => self.right_light,
        }
    }

    pub fn motor(&self, side: Side) -> MotorPins {
        match side {
            Side::Left => self.left_motor,
            Side::Right => self.right_motor,
        }
    }

    pub fn sensor_pin(&self, sensor: Sensor) -> u8 {
        self.sensors[sensor.index()]
    }

    /// Sensor wired to an analog input pin
    pub fn sensor_for_pin(&self, pin: u8) -> Option<Sensor> {
        Sensor::ALL
            .into_iter()
            .find(|sensor| self.sensor_pin(*sensor) == pin)
    }

    /// Every output role with its pin, in wire order of the operations
    pub fn output_pins(&self) -> [(&'static str, u8); 11] {
        [
            ("speaker", self.speaker),
            ("left_light.red", self.left_light.red),
            ("left_light.green", self.left_light.green),
            ("left_light.blue", self.left_light.blue),
            ("right_light.red", self.right_light.red),
            ("right_light.green", self.right_light.green),
            ("right_light.blue", self.right_light.blue),
            ("left_motor.forward", self.left_motor.forward),
            ("left_motor.backward", self.left_motor.backward),
            ("right_motor.forward", self.right_motor.forward),
            ("right_motor.backward", self.right_motor.backward),
        ]
    }

    /// First pin that does not fit in a Firmata channel nibble
    pub fn first_out_of_channel(&self) -> Option<(&'static str, u8)> {
        let fixed = [("pwm_pin_max", self.pwm_pin_max)];
        let sensors = Sensor::ALL.map(|sensor| ("sensor", self.sensor_pin(sensor)));
        fixed
            .into_iter()
            .chain(self.output_pins())
            .chain(sensors)
            .find(|(_, pin)| *pin > phiro_firmata::MAX_CHANNEL)
    }

    /// Sensor pins in ascending pin order
    pub fn sensor_pins(&self) -> Vec<u8> {
        let mut pins = self.sensors.to_vec();
        pins.sort_unstable();
        pins
    }
}

/// Settings injected into [`crate::DeviceController`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    pub pin_map: PinMap,
    /// Mode byte written for every PWM pin during initialization
    pub pwm_mode: u8,
    /// Buffer size for one sensor poll read
    pub receive_buffer_size: usize,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            pin_map: PinMap::phiro(),
            pwm_mode: PWM_MODE,
            receive_buffer_size: 64,
        }
    }
}

impl DeviceConfig {
    /// Build from a loaded configuration file
    ///
    /// # Errors
    /// Returns the validation error if the configuration is inconsistent
    pub fn from_config(config: &PhiroConfig) -> ConfigResult<Self> {
        phiro_config::validate_config(config)?;

        let device = &config.device;
        let pins = &device.pins;
        let sensors = &device.sensors;
        let mut sensor_pins = [0u8; 6];
        sensor_pins[Sensor::SideRight.index()] = sensors.side_right;
        sensor_pins[Sensor::FrontRight.index()] = sensors.front_right;
        sensor_pins[Sensor::BottomRight.index()] = sensors.bottom_right;
        sensor_pins[Sensor::BottomLeft.index()] = sensors.bottom_left;
        sensor_pins[Sensor::FrontLeft.index()] = sensors.front_left;
        sensor_pins[Sensor::SideLeft.index()] = sensors.side_left;

        Ok(Self {
            pin_map: PinMap {
                speaker: pins.speaker,
                left_light: RgbPins {
                    red: pins.rgb_red_left,
                    green: pins.rgb_green_left,
                    blue: pins.rgb_blue_left,
                },
                right_light: RgbPins {
                    red: pins.rgb_red_right,
                    green: pins.rgb_green_right,
                    blue: pins.rgb_blue_right,
                },
                left_motor: MotorPins {
                    forward: pins.motor_left_forward,
                    backward: pins.motor_left_backward,
                },
                right_motor: MotorPins {
                    forward: pins.motor_right_forward,
                    backward: pins.motor_right_backward,
                },
                sensors: sensor_pins,
                pwm_pin_min: device.pwm_pin_min,
                pwm_pin_max: device.pwm_pin_max,
            },
            pwm_mode: device.pwm_mode,
            receive_buffer_size: config.connection.receive_buffer_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_to_speed_bounds() {
        assert_eq!(percent_to_speed(0), 0);
        assert_eq!(percent_to_speed(-5), 0);
        assert_eq!(percent_to_speed(i32::MIN), 0);
        assert_eq!(percent_to_speed(100), 255);
        assert_eq!(percent_to_speed(101), 255);
        assert_eq!(percent_to_speed(i32::MAX), 255);
    }

    #[test]
    fn test_percent_to_speed_truncates() {
        assert_eq!(percent_to_speed(42), 107);
        assert_eq!(percent_to_speed(1), 2);
        assert_eq!(percent_to_speed(50), 127);
        assert_eq!(percent_to_speed(99), 252);
    }

    #[test]
    fn test_percent_to_speed_matches_float_truncation() {
        for percent in 1..100 {
            let expected = (f64::from(percent) * 2.55) as u8;
            assert_eq!(percent_to_speed(percent), expected, "percent {}", percent);
        }
    }

    #[test]
    fn test_default_map_matches_firmware() {
        let map = PinMap::phiro();
        assert_eq!(map.speaker, 3);
        assert_eq!(map.light(Side::Left), RgbPins { red: 4, green: 5, blue: 6 });
        assert_eq!(map.light(Side::Right), RgbPins { red: 7, green: 8, blue: 9 });
        assert_eq!(map.motor(Side::Left), MotorPins { forward: 11, backward: 10 });
        assert_eq!(map.motor(Side::Right), MotorPins { forward: 12, backward: 13 });
        assert_eq!(map.pwm_pins().collect::<Vec<_>>(), (3..=13).collect::<Vec<_>>());
        assert_eq!(map.sensor_pins(), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_sensor_lookup() {
        let map = PinMap::phiro();
        assert_eq!(map.sensor_pin(Sensor::FrontLeft), 4);
        assert_eq!(map.sensor_for_pin(0), Some(Sensor::SideRight));
        assert_eq!(map.sensor_for_pin(5), Some(Sensor::SideLeft));
        assert_eq!(map.sensor_for_pin(6), None);
    }

    #[test]
    fn test_from_default_config() {
        let config = DeviceConfig::from_config(&PhiroConfig::default()).unwrap();
        assert_eq!(config, DeviceConfig::default());
    }

    #[test]
    fn test_from_invalid_config_fails() {
        let mut config = PhiroConfig::default();
        config.device.pins.speaker = 20;
        assert!(DeviceConfig::from_config(&config).is_err());
    }
}
