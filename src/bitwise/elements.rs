// Little-endian integer elements as laid out in the radio image

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ElementError {
    #[error("Insufficient data: expected {expected} bytes, got {actual}")]
    InsufficientData { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, ElementError>;

fn need(data: &[u8], expected: usize) -> Result<()> {
    if data.len() < expected {
        return Err(ElementError::InsufficientData {
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}

/// Read a u16 in little-endian format
pub fn read_u16_le(data: &[u8]) -> Result<u16> {
    need(data, 2)?;
    Ok(u16::from_le_bytes([data[0], data[1]]))
}

/// Read a u32 in little-endian format
pub fn read_u32_le(data: &[u8]) -> Result<u32> {
    need(data, 4)?;
    Ok(u32::from_le_bytes([data[0], data[1], data[2], data[3]]))
}

pub fn write_u16_le(value: u16) -> [u8; 2] {
    value.to_le_bytes()
}

pub fn write_u32_le(value: u32) -> [u8; 4] {
    value.to_le_bytes()
}
