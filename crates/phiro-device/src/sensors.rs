// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Latest values reported by the infrared sensors

use std::time::Instant;

use crate::pins::Sensor;

/// One sensor sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorReading {
    pub value: u16,
    pub received_at: Instant,
}

/// Last reading per sensor; `None` until the device reported one
#[derive(Debug, Clone, Default)]
pub struct SensorReadings {
    readings: [Option<SensorReading>; 6],
}

impl SensorReadings {
    pub fn update(&mut self, sensor: Sensor, value: u16) {
        self.readings[sensor.index()] = Some(SensorReading {
            value,
            received_at: Instant::now(),
        });
    }

    pub fn get(&self, sensor: Sensor) -> Option<SensorReading> {
        self.readings[sensor.index()]
    }

    pub fn value(&self, sensor: Sensor) -> Option<u16> {
        self.get(sensor).map(|r| r.value)
    }

    /// Forget every reading
    pub fn clear(&mut self) {
        self.readings = [None; 6];
    }
}
