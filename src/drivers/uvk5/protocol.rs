// UV-K5 command set on top of a framed session

use crate::drivers::{RadioError, RadioResult};
use crate::serial::{Session, Transport};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Session token the radio expects at the end of hello, read and write
const SESSION_TOKEN: [u8; 4] = [0x6A, 0x39, 0x57, 0x64];

const CMD_HELLO: [u8; 2] = [0x14, 0x05];
const CMD_READ: [u8; 2] = [0x1B, 0x05];
const CMD_WRITE: [u8; 2] = [0x1D, 0x05];
const CMD_RESET: [u8; 2] = [0xDD, 0x05];

const REPLY_HELLO: [u8; 2] = [0x15, 0x05];
const REPLY_READ: [u8; 2] = [0x1C, 0x05];
const REPLY_WRITE: u8 = 0x1E;

/// Data in a read reply starts after opcode, length, offset echo and length echo
const READ_DATA_START: usize = 8;

const FIRMWARE_START: usize = 4;

pub const IDENTIFY_ATTEMPTS: usize = 5;

/// Identify, block read/write and reset for one exclusively held port
pub struct DeviceProtocol<'a, T: Transport> {
    session: Session<'a, T>,
}

impl<'a, T: Transport> DeviceProtocol<'a, T> {
    pub fn new(port: &'a mut T, timeout: Duration) -> Self {
        Self {
            session: Session::new(port, timeout),
        }
    }

    /// Say hello and return the firmware version string.
    ///
    /// No reply or a malformed reply is retried; anything else fails at once.
    pub async fn identify(&mut self) -> RadioResult<String> {
        let mut last_err = RadioError::NoResponse;

        for attempt in 1..=IDENTIFY_ATTEMPTS {
            match self.hello().await {
                Ok(firmware) => {
                    info!("Radio identified, firmware {}", firmware);
                    return Ok(firmware);
                }
                Err(e @ (RadioError::Timeout | RadioError::Framing(_) | RadioError::Protocol(_))) => {
                    warn!("identify attempt {}/{} failed: {}", attempt, IDENTIFY_ATTEMPTS, e);
                    if !matches!(e, RadioError::Timeout) {
                        self.session.discard_input().await?;
                    }
                    last_err = e;
                }
                Err(e) => return Err(e),
            }
        }

        Err(match last_err {
            RadioError::Timeout => RadioError::NoResponse,
            other => other,
        })
    }

    async fn hello(&mut self) -> RadioResult<String> {
        let mut command = Vec::with_capacity(8);
        command.extend_from_slice(&CMD_HELLO);
        command.extend_from_slice(&[0x04, 0x00]);
        command.extend_from_slice(&SESSION_TOKEN);

        let reply = self.session.exchange(&command).await?;
        if reply.len() <= FIRMWARE_START || reply[..2] != REPLY_HELLO {
            return Err(RadioError::Protocol(format!(
                "unexpected hello reply {:02X?}",
                &reply[..reply.len().min(4)]
            )));
        }

        Ok(firmware_string(&reply[FIRMWARE_START..]))
    }

    /// Read `len` bytes of EEPROM at `offset`
    pub async fn read_block(&mut self, offset: u16, len: u8) -> RadioResult<Vec<u8>> {
        let [lo, hi] = offset.to_le_bytes();
        let mut command = Vec::with_capacity(12);
        command.extend_from_slice(&CMD_READ);
        command.extend_from_slice(&[0x08, 0x00, lo, hi, len, 0x00]);
        command.extend_from_slice(&SESSION_TOKEN);

        let reply = self.block_exchange(&command, "read", offset).await?;
        if reply.len() < 2 || reply[..2] != REPLY_READ {
            return Err(RadioError::Protocol(format!(
                "unexpected reply to read at 0x{:04X}",
                offset
            )));
        }

        let end = READ_DATA_START + len as usize;
        if reply.len() < end {
            return Err(RadioError::Protocol(format!(
                "read at 0x{:04X} returned {} of {} bytes",
                offset,
                reply.len().saturating_sub(READ_DATA_START),
                len
            )));
        }

        debug!("read 0x{:04X}+{}", offset, len);
        Ok(reply[READ_DATA_START..end].to_vec())
    }

    /// Write `data` to EEPROM at `offset`.
    ///
    /// Returns whether the radio acknowledged this offset.
    pub async fn write_block(&mut self, offset: u16, data: &[u8]) -> RadioResult<bool> {
        let dlen = u8::try_from(data.len())
            .ok()
            .filter(|n| n.checked_add(8).is_some())
            .ok_or_else(|| {
                RadioError::Protocol(format!("block of {} bytes is too long", data.len()))
            })?;

        let [lo, hi] = offset.to_le_bytes();
        let mut command = Vec::with_capacity(12 + data.len());
        command.extend_from_slice(&CMD_WRITE);
        command.extend_from_slice(&[dlen + 8, 0x00, lo, hi, dlen, 0x01]);
        command.extend_from_slice(&SESSION_TOKEN);
        command.extend_from_slice(data);

        let reply = self.block_exchange(&command, "write", offset).await?;
        let acked = reply.len() >= 6 && reply[0] == REPLY_WRITE && reply[4..6] == [lo, hi];
        if acked {
            debug!("wrote 0x{:04X}+{}", offset, dlen);
        } else {
            warn!("write at 0x{:04X} not acknowledged: {:02X?}", offset, reply);
        }
        Ok(acked)
    }

    /// Block transfers are not retried, so a missing or cut-off reply is a
    /// protocol failure rather than a timeout.
    async fn block_exchange(
        &mut self,
        command: &[u8],
        what: &str,
        offset: u16,
    ) -> RadioResult<Vec<u8>> {
        match self.session.exchange(command).await {
            Err(RadioError::Timeout) => Err(RadioError::Protocol(format!(
                "no complete reply to {} at 0x{:04X}",
                what, offset
            ))),
            other => other,
        }
    }

    /// Tell the radio to reboot. It does not answer.
    pub async fn reset(&mut self) -> RadioResult<()> {
        let mut command = Vec::with_capacity(4);
        command.extend_from_slice(&CMD_RESET);
        command.extend_from_slice(&[0x00, 0x00]);
        self.session.send(&command).await
    }
}

/// Printable ASCII prefix of the version field
fn firmware_string(field: &[u8]) -> String {
    field
        .iter()
        .take_while(|b| (0x20..=0x7E).contains(*b))
        .map(|&b| b as char)
        .collect()
}
