// Radio driver traits

use crate::core::settings::SettingError;
use crate::core::{Memory, RadioFeatures, RadioSettingGroup, ValidationMessage};
use crate::memmap::{MemoryMap, MemoryMapError};
use crate::serial::{SerialError, Transport};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RadioError {
    #[error("Serial communication error: {0}")]
    Serial(String),

    #[error("Invalid memory location: {0}")]
    InvalidMemory(u32),

    #[error("Radio did not respond")]
    NoResponse,

    /// Bad head/tail marker or reserved byte on the wire
    #[error("Framing error: {0}")]
    Framing(String),

    /// Reply arrived but was short or did not answer the request
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Timeout waiting for radio")]
    Timeout,

    /// A value cannot be represented in the radio image
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Radio error: {0}")]
    Radio(String),
}

impl From<SerialError> for RadioError {
    fn from(err: SerialError) -> Self {
        match err {
            SerialError::Timeout(_) => RadioError::Timeout,
            other => RadioError::Serial(other.to_string()),
        }
    }
}

impl From<MemoryMapError> for RadioError {
    fn from(err: MemoryMapError) -> Self {
        RadioError::Radio(format!("Image access failed: {}", err))
    }
}

impl From<SettingError> for RadioError {
    fn from(err: SettingError) -> Self {
        RadioError::Encoding(err.to_string())
    }
}

pub type RadioResult<T> = std::result::Result<T, RadioError>;

/// Progress callback for download/upload operations
/// Arguments: (bytes_transferred, total_bytes, status_message)
pub type StatusCallback = Box<dyn Fn(usize, usize, &str) + Send + Sync>;

/// Base trait for all radio drivers
pub trait Radio: Send {
    /// Get the radio vendor name
    fn vendor(&self) -> &str;

    /// Get the radio model name
    fn model(&self) -> &str;

    /// Get the radio's feature set
    fn get_features(&self) -> RadioFeatures;

    /// Get a printable name for this radio
    fn get_name(&self) -> String {
        format!("{} {}", self.vendor(), self.model())
    }

    /// Check a memory against this radio's features before storing it
    fn validate_memory(&self, mem: &Memory) -> Vec<ValidationMessage> {
        self.get_features().validate_memory(mem)
    }

    /// Decode one channel. Empty channels come back with `empty` set.
    fn get_memory(&self, number: u32) -> RadioResult<Memory>;

    /// Encode one channel into the image
    fn set_memory(&mut self, memory: &Memory) -> RadioResult<()>;

    /// Delete a memory (mark as empty)
    fn delete_memory(&mut self, number: u32) -> RadioResult<()> {
        self.set_memory(&Memory::new_empty(number))
    }

    /// Get all non-empty memories
    fn get_memories(&self) -> RadioResult<Vec<Memory>> {
        let (start, end) = self.get_features().memory_bounds;
        let mut memories = Vec::new();

        for i in start..=end {
            let mem = self.get_memory(i)?;
            if !mem.empty {
                memories.push(mem);
            }
        }

        Ok(memories)
    }

    /// Device-wide settings as named groups
    fn get_settings(&self) -> RadioResult<Vec<RadioSettingGroup>>;

    /// Apply settings by name; unknown and read-only settings are ignored
    fn set_settings(&mut self, settings: &[RadioSettingGroup]) -> RadioResult<()>;
}

/// Trait for radios that support clone mode (full memory dump)
#[allow(async_fn_in_trait)]
pub trait CloneModeRadio: Radio {
    /// Get the size of the radio's memory map in bytes
    fn get_memsize(&self) -> usize;

    /// Download the radio's memory map and load it.
    ///
    /// The loaded image is only replaced once the whole download succeeded.
    async fn sync_in<T: Transport>(
        &mut self,
        port: &mut T,
        status_fn: Option<StatusCallback>,
    ) -> RadioResult<MemoryMap>;

    /// Upload a memory map to the radio
    async fn sync_out<T: Transport>(
        &mut self,
        port: &mut T,
        mmap: &MemoryMap,
        status_fn: Option<StatusCallback>,
    ) -> RadioResult<()>;

    /// Load a memory map, e.g. after reading it from a file
    fn process_mmap(&mut self, mmap: MemoryMap) -> RadioResult<()>;

    /// Check if this driver matches a given file
    fn match_model(data: &[u8], filename: &str) -> bool
    where
        Self: Sized;
}

/// Status information for progress reporting
#[derive(Debug, Clone)]
pub struct Status {
    pub current: usize,
    pub max: usize,
    pub message: String,
}

impl Status {
    pub fn new(current: usize, max: usize, message: impl Into<String>) -> Self {
        Self {
            current,
            max,
            message: message.into(),
        }
    }

    pub fn percent(&self) -> f32 {
        if self.max == 0 {
            return 100.0;
        }
        (self.current as f32 / self.max as f32) * 100.0
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}/{}  - {:.1}%)",
            self.message,
            self.current,
            self.max,
            self.percent()
        )
    }
}
