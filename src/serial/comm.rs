// Serial port abstraction with async support
// Wraps the serialport crate with tokio async functionality

use super::transport::Transport;
use std::io::{self, Read, Write};
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

#[derive(Error, Debug)]
pub enum SerialError {
    #[error("Serial port error: {0}")]
    Port(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Port not open")]
    NotOpen,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, SerialError>;

/// How long a single blocking driver read may stall the task
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Serial port configuration
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Baud rate
    pub baud_rate: u32,

    /// Data bits (5, 6, 7, 8)
    pub data_bits: serialport::DataBits,

    /// Stop bits
    pub stop_bits: serialport::StopBits,

    /// Parity
    pub parity: serialport::Parity,

    /// Flow control
    pub flow_control: serialport::FlowControl,

    /// Per-call read/write timeout
    pub timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self::uvk5()
    }
}

impl SerialConfig {
    /// UV-K5 programming cable settings: 38400 8N1, no flow control, 500 ms
    pub fn uvk5() -> Self {
        Self {
            baud_rate: 38400,
            data_bits: serialport::DataBits::Eight,
            stop_bits: serialport::StopBits::One,
            parity: serialport::Parity::None,
            flow_control: serialport::FlowControl::None,
            timeout: Duration::from_millis(500),
        }
    }

    /// Create a new configuration with specified baud rate
    pub fn new(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            ..Default::default()
        }
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Async serial port wrapper
pub struct SerialPort {
    port: Option<Box<dyn serialport::SerialPort>>,
    config: SerialConfig,
    port_name: String,
}

impl SerialPort {
    /// Open a serial port with the given configuration
    pub fn open(port_name: &str, config: SerialConfig) -> Result<Self> {
        if config.timeout.is_zero() {
            return Err(SerialError::InvalidConfig("timeout must be non-zero".into()));
        }

        let port = serialport::new(port_name, config.baud_rate)
            .data_bits(config.data_bits)
            .stop_bits(config.stop_bits)
            .parity(config.parity)
            .flow_control(config.flow_control)
            .timeout(POLL_INTERVAL.min(config.timeout))
            .open()
            .map_err(|e| SerialError::Port(e.to_string()))?;

        tracing::debug!(
            "Opened {} at {} baud, timeout {:?}",
            port_name,
            config.baud_rate,
            config.timeout
        );

        Ok(Self {
            port: Some(port),
            config,
            port_name: port_name.to_string(),
        })
    }

    /// Get the port name
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Get the configuration
    pub fn config(&self) -> &SerialConfig {
        &self.config
    }

    /// Read up to `len` bytes, stopping at the configured timeout
    pub async fn read_available(&mut self, len: usize) -> Result<Vec<u8>> {
        let deadline = self.config.timeout;
        let port = self.port.as_mut().ok_or(SerialError::NotOpen)?;
        let mut buf = vec![0u8; len];
        let mut total_read = 0;

        let outcome = timeout(deadline, async {
            while total_read < len {
                match port.read(&mut buf[total_read..]) {
                    Ok(0) => {
                        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "Port closed"))
                    }
                    Ok(n) => total_read += n,
                    Err(ref e) if e.kind() == io::ErrorKind::TimedOut => {
                        tokio::task::yield_now().await;
                    }
                    Err(e) => return Err(e),
                }
            }
            Ok(())
        })
        .await;

        match outcome {
            Ok(Err(e)) => return Err(SerialError::Io(e)),
            Ok(Ok(())) => {}
            Err(_) => tracing::trace!("read timed out with {}/{} bytes", total_read, len),
        }

        buf.truncate(total_read);
        Ok(buf)
    }

    /// Write all bytes with timeout
    pub async fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        let deadline = self.config.timeout;
        let port = self.port.as_mut().ok_or(SerialError::NotOpen)?;

        timeout(deadline, async {
            port.write_all(buf)?;
            port.flush().map_err(SerialError::Io)
        })
        .await
        .map_err(|_| SerialError::Timeout(deadline))?
    }

    /// Clear both input and output buffers
    pub fn clear_all(&mut self) -> Result<()> {
        let port = self.port.as_mut().ok_or(SerialError::NotOpen)?;
        port.clear(serialport::ClearBuffer::All)
            .map_err(|e| SerialError::Port(e.to_string()))
    }

    /// Close the port
    pub fn close(mut self) -> Result<()> {
        self.port.take();
        Ok(())
    }
}

impl Transport for SerialPort {
    async fn write(&mut self, buf: &[u8]) -> Result<()> {
        self.write_all(buf).await
    }

    async fn read(&mut self, len: usize) -> Result<Vec<u8>> {
        self.read_available(len).await
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.config.timeout = timeout;
    }
}

/// List available serial ports
pub fn list_ports() -> Result<Vec<String>> {
    serialport::available_ports()
        .map_err(|e| SerialError::Port(e.to_string()))?
        .into_iter()
        .map(|p| Ok(p.port_name))
        .collect()
}
