// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Frames written through each connection backend decode back intact

use std::io::Read;
use std::net::{TcpListener, TcpStream};
use std::time::Duration;

use phiro_firmata::{
    encode_analog_message, encode_report_analog_pin, encode_set_pin_mode, Command, FrameDecoder,
};
use phiro_hal::{
    Connection, ConnectionDataLogger, ConnectionError, ConnectionReader, ConnectionState,
    StreamConnection,
};

fn sample_frames() -> Vec<Vec<u8>> {
    vec![
        encode_set_pin_mode(3, 3).to_vec(),
        encode_report_analog_pin(2, true).to_vec(),
        encode_analog_message(4, 242).to_vec(),
    ]
}

fn expected_commands() -> Vec<Command> {
    vec![
        Command::SetPinMode { pin: 3, mode: 3 },
        Command::ReportAnalogPin { pin: 2, enable: true },
        Command::AnalogMessage { pin: 4, value: 242 },
    ]
}

fn decode_all(bytes: &[u8]) -> Vec<Command> {
    let mut decoder = FrameDecoder::new();
    decoder.extend(bytes);
    decoder.map(|command| command.unwrap()).collect()
}

#[test]
fn test_logger_records_decodable_frames() {
    let logger = ConnectionDataLogger::new();
    let mut conn: Box<dyn Connection> = Box::new(logger.connection_proxy());
    assert_eq!(conn.backend_name(), "logger");

    for frame in sample_frames() {
        conn.send(&frame).unwrap();
    }
    assert_eq!(logger.frames_sent(), 3);
    assert_eq!(decode_all(&logger.take_sent_bytes()), expected_commands());
}

#[test]
fn test_tcp_stream_round_trip() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let client = TcpStream::connect(addr).unwrap();
    let (mut device_side, _) = listener.accept().unwrap();
    device_side
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();

    let mut conn = StreamConnection::new("tcp", client);
    assert!(conn.is_connected());
    for frame in sample_frames() {
        conn.send(&frame).unwrap();
    }

    let mut received = vec![0u8; 8];
    device_side.read_exact(&mut received).unwrap();
    assert_eq!(decode_all(&received), expected_commands());

    conn.disconnect().unwrap();
    assert_eq!(conn.state(), ConnectionState::Disconnected);
    assert!(matches!(conn.send(&[0xE3, 0, 0]), Err(ConnectionError::Closed)));
    // Second disconnect is a no-op
    conn.disconnect().unwrap();
}

#[test]
fn test_nonblocking_stream_without_data_reads_nothing() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
    let _device_side = listener.accept().unwrap();
    client.set_nonblocking(true).unwrap();

    let mut conn = StreamConnection::new("tcp", client);
    let mut buffer = [0u8; 16];
    assert_eq!(conn.receive(&mut buffer).unwrap(), 0);
}

#[test]
fn test_duplex_reader_reads_while_writer_sends() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
    let (mut device_side, _) = listener.accept().unwrap();

    let mut conn = StreamConnection::duplex("tcp", client).unwrap();
    let mut reader = conn.take_reader().unwrap();
    assert!(conn.take_reader().is_none());

    let device = std::thread::spawn(move || {
        let mut frame = [0u8; 3];
        device_side.read_exact(&mut frame).unwrap();
        std::io::Write::write_all(&mut device_side, &[0xE0, 0x7F, 0x01]).unwrap();
        frame
    });

    conn.send(&encode_analog_message(3, 294)).unwrap();
    let mut buffer = [0u8; 8];
    let mut read = 0;
    while read < 3 {
        read += reader.receive(&mut buffer[read..]).unwrap();
    }
    assert_eq!(decode_all(&buffer[..3]), vec![Command::AnalogMessage { pin: 0, value: 0xFF }]);
    assert_eq!(device.join().unwrap(), [0xE3, 0x26, 0x02]);
}
