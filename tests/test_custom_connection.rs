// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! The controller over a user-supplied connection backend

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use phiro::firmata::{decode_frame, Command};
use phiro::hal::{Connection, ConnectionError, ConnectionState};
use phiro::prelude::*;

/// Records each `send` call separately so frame boundaries stay visible
#[derive(Clone, Default)]
struct FrameRecorder {
    frames: Arc<Mutex<Vec<Vec<u8>>>>,
    closed: Arc<Mutex<bool>>,
}

impl FrameRecorder {
    fn commands(&self) -> Vec<Command> {
        self.frames
            .lock()
            .iter()
            .map(|frame| decode_frame(frame).unwrap())
            .collect()
    }
}

impl Connection for FrameRecorder {
    fn backend_name(&self) -> &str {
        "recorder"
    }

    fn state(&self) -> ConnectionState {
        if *self.closed.lock() {
            ConnectionState::Disconnected
        } else {
            ConnectionState::Connected
        }
    }

    fn send(&mut self, bytes: &[u8]) -> Result<(), ConnectionError> {
        if *self.closed.lock() {
            return Err(ConnectionError::Closed);
        }
        self.frames.lock().push(bytes.to_vec());
        Ok(())
    }

    fn receive(&mut self, _buffer: &mut [u8]) -> Result<usize, ConnectionError> {
        Ok(0)
    }

    fn disconnect(&mut self) -> Result<(), ConnectionError> {
        *self.closed.lock() = true;
        Ok(())
    }
}

#[test]
fn test_each_operation_sends_whole_frames() {
    let recorder = FrameRecorder::default();
    let mut phiro = DeviceController::with_defaults(recorder.clone());

    phiro.initialise().unwrap();
    phiro.set_right_rgb_light_color(1, 2, 3).unwrap();
    phiro.stop_all_movements().unwrap();

    let frames = recorder.frames.lock().clone();
    assert_eq!(frames.len(), 11 + 6 + 3 + 4);
    assert!(frames[..11].iter().all(|f| f.len() == 3));
    assert!(frames[11..17].iter().all(|f| f.len() == 2));
    assert!(frames[17..].iter().all(|f| f.len() == 3));

    let commands = recorder.commands();
    assert_eq!(commands[17], Command::AnalogMessage { pin: 7, value: 1 });
    assert_eq!(commands[19], Command::AnalogMessage { pin: 9, value: 3 });
}

#[test]
fn test_tone_stop_arrives_through_custom_backend() {
    let recorder = FrameRecorder::default();
    let mut phiro = DeviceController::with_defaults(recorder.clone());
    phiro.play_tone_for(523, Duration::from_millis(50)).unwrap();

    let deadline = Instant::now() + Duration::from_secs(2);
    while phiro.tone_state() != ToneState::Fired && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(
        recorder.commands(),
        vec![
            Command::AnalogMessage { pin: 3, value: 523 },
            Command::AnalogMessage { pin: 3, value: 0 },
        ]
    );
    assert_eq!(phiro.tone_state(), ToneState::Fired);
}

#[test]
fn test_drop_closes_custom_backend() {
    let recorder = FrameRecorder::default();
    {
        let _phiro = DeviceController::with_defaults(recorder.clone());
    }
    assert_eq!(recorder.state(), ConnectionState::Disconnected);
}
