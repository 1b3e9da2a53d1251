// Byte-stream boundary between the protocol layers and whatever carries the bytes

use super::comm::SerialError;
use std::time::Duration;

/// Duplex byte channel used by [`Session`](super::session::Session).
///
/// `read` blocks for at most the configured timeout and returns whatever
/// arrived in that window, which may be fewer than `len` bytes (or none).
/// Only hard channel failures are errors.
#[allow(async_fn_in_trait)]
pub trait Transport: Send {
    /// Write every byte of `buf`
    async fn write(&mut self, buf: &[u8]) -> Result<(), SerialError>;

    /// Read up to `len` bytes, returning early on timeout
    async fn read(&mut self, len: usize) -> Result<Vec<u8>, SerialError>;

    /// Set the per-call read/write deadline
    fn set_timeout(&mut self, timeout: Duration);
}
