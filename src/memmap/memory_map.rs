// Memory map holding the radio's raw EEPROM image

use crate::bitwise::{self, ElementError};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryMapError {
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    #[error("Element error: {0}")]
    Element(#[from] ElementError),
}

pub type Result<T> = std::result::Result<T, MemoryMapError>;

/// Flat byte image with bounds-checked access by offset
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryMap {
    data: Vec<u8>,
}

impl MemoryMap {
    /// Create a new memory map from bytes
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Create a memory map of `size` bytes, every byte set to `fill`
    pub fn filled(size: usize, fill: u8) -> Self {
        Self {
            data: vec![fill; size],
        }
    }

    /// Get the size of the memory map
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the memory map is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get a chunk of memory from @start for @length bytes
    /// If length is None, returns all data from @start to end
    pub fn get(&self, start: usize, length: Option<usize>) -> Result<&[u8]> {
        if start > self.data.len() {
            return Err(MemoryMapError::IndexOutOfBounds(start));
        }

        match length {
            Some(len) => {
                let end = start + len;
                if end > self.data.len() {
                    return Err(MemoryMapError::IndexOutOfBounds(end));
                }
                Ok(&self.data[start..end])
            }
            None => Ok(&self.data[start..]),
        }
    }

    pub fn get_byte(&self, pos: usize) -> Result<u8> {
        self.data
            .get(pos)
            .copied()
            .ok_or(MemoryMapError::IndexOutOfBounds(pos))
    }

    /// Set a byte at position @pos to @value
    pub fn set_byte(&mut self, pos: usize, value: u8) -> Result<()> {
        if pos >= self.data.len() {
            return Err(MemoryMapError::IndexOutOfBounds(pos));
        }
        self.data[pos] = value;
        Ok(())
    }

    /// Set a chunk of bytes starting at @pos
    pub fn set_bytes(&mut self, pos: usize, bytes: &[u8]) -> Result<()> {
        let end = pos + bytes.len();
        if end > self.data.len() {
            return Err(MemoryMapError::IndexOutOfBounds(end));
        }
        self.data[pos..end].copy_from_slice(bytes);
        Ok(())
    }

    pub fn read_u16_le(&self, pos: usize) -> Result<u16> {
        Ok(bitwise::read_u16_le(self.get(pos, Some(2))?)?)
    }

    pub fn read_u32_le(&self, pos: usize) -> Result<u32> {
        Ok(bitwise::read_u32_le(self.get(pos, Some(4))?)?)
    }

    pub fn write_u16_le(&mut self, pos: usize, value: u16) -> Result<()> {
        self.set_bytes(pos, &bitwise::write_u16_le(value))
    }

    pub fn write_u32_le(&mut self, pos: usize, value: u32) -> Result<()> {
        self.set_bytes(pos, &bitwise::write_u32_le(value))
    }

    /// Get the entire memory map as raw bytes
    pub fn get_packed(&self) -> &[u8] {
        &self.data
    }

    /// Get the entire memory map as owned Vec<u8>
    pub fn to_vec(&self) -> Vec<u8> {
        self.data.clone()
    }

    /// Get a printable hex representation of part of the memory map
    pub fn printable(&self, start: usize, end: usize) -> Result<String> {
        let slice = self.get(start, Some(end.saturating_sub(start)))?;
        Ok(hexdump(slice, start))
    }
}

impl From<Vec<u8>> for MemoryMap {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl From<&[u8]> for MemoryMap {
    fn from(data: &[u8]) -> Self {
        Self::new(data.to_vec())
    }
}

impl AsRef<[u8]> for MemoryMap {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Display for MemoryMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MemoryMap({} bytes)", self.data.len())
    }
}

/// Create a hex dump of bytes (similar to hexdump -C), numbering lines from `base`
fn hexdump(data: &[u8], base: usize) -> String {
    let mut output = String::new();

    for (i, chunk) in data.chunks(16).enumerate() {
        output.push_str(&format!("{:08x}  ", base + i * 16));

        for (j, byte) in chunk.iter().enumerate() {
            if j == 8 {
                output.push(' ');
            }
            output.push_str(&format!("{:02x} ", byte));
        }

        // Padding for incomplete lines
        for j in chunk.len()..16 {
            if j == 8 {
                output.push(' ');
            }
            output.push_str("   ");
        }

        output.push_str(" |");
        for byte in chunk {
            if (0x20..=0x7e).contains(byte) {
                output.push(*byte as char);
            } else {
                output.push('.');
            }
        }
        output.push_str("|\n");
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_map_creation() {
        let mmap = MemoryMap::new(vec![1, 2, 3, 4, 5]);
        assert_eq!(mmap.len(), 5);
        assert!(!mmap.is_empty());

        let blank = MemoryMap::filled(0x2000, 0xFF);
        assert_eq!(blank.len(), 0x2000);
        assert!(blank.get_packed().iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_get_set() {
        let mut mmap = MemoryMap::new(vec![0; 10]);

        mmap.set_byte(5, 0x42).unwrap();
        assert_eq!(mmap.get_byte(5).unwrap(), 0x42);

        mmap.set_bytes(0, &[1, 2, 3]).unwrap();
        assert_eq!(mmap.get(0, Some(3)).unwrap(), &[1, 2, 3]);

        // Get to end
        assert_eq!(mmap.get(8, None).unwrap(), &[0, 0]);
    }

    #[test]
    fn test_le_accessors() {
        let mut mmap = MemoryMap::filled(16, 0xFF);
        mmap.write_u32_le(0, 14_652_000).unwrap();
        assert_eq!(mmap.get(0, Some(4)).unwrap(), &[0x60, 0x92, 0xDF, 0x00]);
        assert_eq!(mmap.read_u32_le(0).unwrap(), 14_652_000);

        mmap.write_u16_le(14, 0x03F2).unwrap();
        assert_eq!(mmap.read_u16_le(14).unwrap(), 0x03F2);
        assert!(mmap.read_u16_le(15).is_err());
        assert!(mmap.write_u32_le(13, 0).is_err());
    }

    #[test]
    fn test_bounds_checking() {
        let mut mmap = MemoryMap::new(vec![1, 2, 3]);

        assert!(mmap.get(5, Some(1)).is_err());
        assert!(mmap.get(2, Some(5)).is_err());
        assert!(mmap.get_byte(3).is_err());
        assert!(mmap.set_byte(3, 0).is_err());
        assert!(mmap.set_bytes(2, &[0, 0]).is_err());
    }

    #[test]
    fn test_hexdump() {
        let data = vec![
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d,
            0x0e, 0x0f, 0x41, 0x42, 0x43,
        ];
        let dump = hexdump(&data, 0);
        assert!(dump.contains("00 01 02 03"));
        assert!(dump.contains("41 42 43"));
        assert!(dump.contains("|ABC|"));

        let mmap = MemoryMap::new(data);
        let dump = mmap.printable(16, 19).unwrap();
        assert!(dump.starts_with("00000010"));
    }
}
