// Transport session: one framed command out, one framed reply back

use super::frame::{self, HEADER_LEN, TRAILER_LEN};
use super::transport::Transport;
use crate::drivers::{RadioError, RadioResult};
use std::time::Duration;
use tracing::{debug, trace};

/// An exclusively borrowed channel to the radio.
///
/// The timeout is applied once when the session is created and stays fixed
/// for its lifetime. There is no retry here; callers decide what to repeat.
pub struct Session<'a, T: Transport> {
    port: &'a mut T,
    timeout: Duration,
}

impl<'a, T: Transport> Session<'a, T> {
    pub fn new(port: &'a mut T, timeout: Duration) -> Self {
        port.set_timeout(timeout);
        Self { port, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Frame `command` and write it out
    pub async fn send(&mut self, command: &[u8]) -> RadioResult<()> {
        let frame = frame::build_frame(command)?;
        trace!("TX {:02X?}", frame);
        debug!("send: {} byte command", command.len());
        self.port.write(&frame).await?;
        Ok(())
    }

    /// Read one frame and return its de-obfuscated payload
    pub async fn receive(&mut self) -> RadioResult<Vec<u8>> {
        let header = self.read_exact(HEADER_LEN).await?;
        let len = frame::parse_header(&header)?;

        let payload = self.read_exact(len).await?;
        let trailer = self.read_exact(TRAILER_LEN).await?;
        frame::check_trailer(&trailer)?;

        let reply = frame::deobfuscate(&payload);
        trace!("RX {:02X?}", reply);
        Ok(reply)
    }

    /// Send `command` and wait for the reply frame
    pub async fn exchange(&mut self, command: &[u8]) -> RadioResult<Vec<u8>> {
        self.send(command).await?;
        self.receive().await
    }

    /// Throw away whatever is still arriving, e.g. the rest of a garbled frame
    pub async fn discard_input(&mut self) -> RadioResult<usize> {
        let mut discarded = 0;
        loop {
            let junk = self.port.read(256).await?;
            if junk.is_empty() {
                break;
            }
            discarded += junk.len();
        }
        if discarded > 0 {
            debug!("discarded {} stray bytes", discarded);
        }
        Ok(discarded)
    }

    async fn read_exact(&mut self, len: usize) -> RadioResult<Vec<u8>> {
        if len == 0 {
            return Ok(Vec::new());
        }

        let data = self.port.read(len).await?;
        if data.len() < len {
            debug!("short read: wanted {} bytes, got {}", len, data.len());
            return Err(RadioError::Timeout);
        }
        Ok(data)
    }
}
