// Mock serial port and simulated UV-K5 for testing without hardware

use super::comm::SerialError;
use super::frame::{build_frame, parse_checked_frame};
use super::transport::Transport;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted serial port: reads come from a queue, writes are recorded
#[derive(Clone, Default)]
pub struct MockSerialPort {
    /// Data to be read (simulates radio responses)
    read_buffer: Arc<Mutex<VecDeque<u8>>>,

    /// Data that was written (simulates commands sent to radio)
    write_buffer: Arc<Mutex<Vec<u8>>>,

    timeout: Duration,
}

impl MockSerialPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push data to be read (simulates radio sending data)
    pub fn push_read_data(&mut self, data: &[u8]) {
        self.read_buffer.lock().unwrap().extend(data.iter().copied());
    }

    /// Get data that was written
    pub fn get_written_data(&self) -> Vec<u8> {
        self.write_buffer.lock().unwrap().clone()
    }

    /// Check if a specific byte sequence was written
    pub fn was_written(&self, expected: &[u8]) -> bool {
        let buffer = self.write_buffer.lock().unwrap();
        buffer
            .windows(expected.len())
            .any(|window| window == expected)
    }

    /// Timeout most recently set through [`Transport::set_timeout`]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Transport for MockSerialPort {
    async fn write(&mut self, buf: &[u8]) -> Result<(), SerialError> {
        self.write_buffer.lock().unwrap().extend_from_slice(buf);
        Ok(())
    }

    async fn read(&mut self, len: usize) -> Result<Vec<u8>, SerialError> {
        let mut buffer = self.read_buffer.lock().unwrap();
        let n = len.min(buffer.len());
        Ok(buffer.drain(..n).collect())
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }
}

/// A request the simulated radio received, already decoded
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Hello,
    Read { offset: u16, len: u8 },
    Write { offset: u16, data: Vec<u8> },
    Reset,
    Other(Vec<u8>),
}

/// Simulated radio that answers framed commands from its own 8 KiB image.
///
/// Every incoming frame must carry a valid checksum; a bad one panics the
/// test, which is the point.
pub struct MockRadio {
    pub eeprom: Vec<u8>,
    pub firmware: String,
    pub requests: Vec<Request>,
    pending: Vec<u8>,
    replies: VecDeque<u8>,

    /// Number of hello commands to ignore before answering
    pub drop_hellos: usize,
    /// Reject the write at this offset
    pub nak_write_at: Option<u16>,
    /// Answer the read at this offset with a truncated frame
    pub short_read_at: Option<u16>,
    /// Answer hello with a corrupted head marker this many times
    pub garble_hellos: usize,
}

impl MockRadio {
    pub fn new(eeprom: Vec<u8>, firmware: &str) -> Self {
        Self {
            eeprom,
            firmware: firmware.to_string(),
            requests: Vec::new(),
            pending: Vec::new(),
            replies: VecDeque::new(),
            drop_hellos: 0,
            nak_write_at: None,
            short_read_at: None,
            garble_hellos: 0,
        }
    }

    /// Block reads in the order they were requested
    pub fn read_offsets(&self) -> Vec<u16> {
        self.requests
            .iter()
            .filter_map(|r| match r {
                Request::Read { offset, .. } => Some(*offset),
                _ => None,
            })
            .collect()
    }

    /// Block writes in the order they were requested
    pub fn write_offsets(&self) -> Vec<u16> {
        self.requests
            .iter()
            .filter_map(|r| match r {
                Request::Write { offset, .. } => Some(*offset),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, want: fn(&Request) -> bool) -> usize {
        self.requests.iter().filter(|r| want(r)).count()
    }

    fn queue(&mut self, reply: &[u8]) {
        let frame = build_frame(reply).unwrap();
        self.replies.extend(frame);
    }

    fn handle(&mut self, command: Vec<u8>) {
        let opcode = u16::from_le_bytes([command[0], command[1]]);
        match opcode {
            0x0514 => {
                self.requests.push(Request::Hello);
                if self.drop_hellos > 0 {
                    self.drop_hellos -= 1;
                    return;
                }

                let mut reply = vec![0x15, 0x05, 0x24, 0x00];
                reply.extend_from_slice(self.firmware.as_bytes());
                reply.resize(4 + 16, 0x00);
                reply.extend_from_slice(&[0u8; 16]);
                if self.garble_hellos > 0 {
                    self.garble_hellos -= 1;
                    let mut frame = build_frame(&reply).unwrap();
                    frame[0] = 0x00;
                    self.replies.extend(frame);
                    return;
                }
                self.queue(&reply);
            }
            0x051B => {
                let offset = u16::from_le_bytes([command[4], command[5]]);
                let len = command[6];
                self.requests.push(Request::Read { offset, len });

                let start = offset as usize;
                let mut reply = vec![0x1C, 0x05, len.wrapping_add(4), 0x00];
                reply.extend_from_slice(&command[4..6]);
                reply.extend_from_slice(&[len, 0x00]);
                reply.extend_from_slice(&self.eeprom[start..start + len as usize]);

                if self.short_read_at == Some(offset) {
                    let frame = build_frame(&reply).unwrap();
                    self.replies.extend(&frame[..frame.len() / 2]);
                    return;
                }
                self.queue(&reply);
            }
            0x051D => {
                let offset = u16::from_le_bytes([command[4], command[5]]);
                let len = command[6] as usize;
                let data = command[12..12 + len].to_vec();
                self.requests.push(Request::Write {
                    offset,
                    data: data.clone(),
                });

                if self.nak_write_at == Some(offset) {
                    self.queue(&[0x1E, 0x05, 0x02, 0x00, 0xFF, 0xFF]);
                    return;
                }

                let start = offset as usize;
                self.eeprom[start..start + len].copy_from_slice(&data);
                self.queue(&[0x1E, 0x05, 0x02, 0x00, command[4], command[5]]);
            }
            0x05DD => self.requests.push(Request::Reset),
            _ => self.requests.push(Request::Other(command)),
        }
    }
}

impl Transport for MockRadio {
    async fn write(&mut self, buf: &[u8]) -> Result<(), SerialError> {
        self.pending.extend_from_slice(buf);
        while !self.pending.is_empty() {
            let (command, consumed) = parse_checked_frame(&self.pending).unwrap();
            self.pending.drain(..consumed);
            self.handle(command);
        }
        Ok(())
    }

    async fn read(&mut self, len: usize) -> Result<Vec<u8>, SerialError> {
        let n = len.min(self.replies.len());
        Ok(self.replies.drain(..n).collect())
    }

    fn set_timeout(&mut self, _timeout: Duration) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_serial_basic() {
        let mut port = MockSerialPort::new();
        port.push_read_data(b"Hello");

        assert_eq!(port.read(5).await.unwrap(), b"Hello");

        port.write(b"World").await.unwrap();
        assert_eq!(port.get_written_data(), b"World");
    }

    #[tokio::test]
    async fn test_mock_serial_partial_read() {
        let mut port = MockSerialPort::new();
        port.push_read_data(b"Hi");

        assert_eq!(port.read(5).await.unwrap(), b"Hi");
        assert!(port.read(5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mock_was_written() {
        let mut port = MockSerialPort::new();
        port.write(b"COMMAND123").await.unwrap();

        assert!(port.was_written(b"COMMAND"));
        assert!(port.was_written(b"123"));
        assert!(!port.was_written(b"NOTFOUND"));
    }

    #[tokio::test]
    async fn test_mock_radio_serves_reads() {
        let mut eeprom = vec![0u8; 0x2000];
        eeprom[0x80] = 0x42;
        let mut radio = MockRadio::new(eeprom, "k5_2.01.26");

        let cmd = [
            0x1B, 0x05, 0x08, 0x00, 0x80, 0x00, 0x10, 0x00, 0x6A, 0x39, 0x57, 0x64,
        ];
        radio.write(&build_frame(&cmd).unwrap()).await.unwrap();

        let reply = radio.read(4 + 8 + 16 + 4).await.unwrap();
        let (payload, _) = parse_checked_frame(&reply).unwrap();
        assert_eq!(&payload[..4], &[0x1C, 0x05, 0x14, 0x00]);
        assert_eq!(payload[8], 0x42);
        assert_eq!(radio.read_offsets(), vec![0x80]);
    }
}
