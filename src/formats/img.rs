// .img file format: raw image, magic separator, base64 JSON metadata
//
// Files without the separator are accepted as a bare image.

use super::metadata::Metadata;
use crate::memmap::MemoryMap;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImgError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode metadata: {0}")]
    MetadataDecode(String),

    #[error("Failed to parse metadata JSON: {0}")]
    MetadataJson(#[from] serde_json::Error),

    #[error("Failed to decode base64 metadata: {0}")]
    Base64Decode(String),

    #[error("Image is {got} bytes, expected {expected}")]
    WrongSize { expected: usize, got: usize },
}

pub type Result<T> = std::result::Result<T, ImgError>;

/// Separator between the raw image and its metadata
pub const MAGIC: &[u8] = b"\x00\xffchirp\xeeimg\x00\x01";

/// Load a .img file and return the memory map and metadata
pub fn load_img(filename: impl AsRef<Path>) -> Result<(MemoryMap, Metadata)> {
    let mut file = File::open(filename)?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;

    match find_magic(&data) {
        Some(idx) => {
            let metadata = decode_metadata(&data[idx + MAGIC.len()..])?;
            data.truncate(idx);
            Ok((MemoryMap::new(data), metadata))
        }
        None => Ok((MemoryMap::new(data), Metadata::default())),
    }
}

/// Load a .img file whose image must be exactly `expected_size` bytes
pub fn load_img_sized(
    filename: impl AsRef<Path>,
    expected_size: usize,
) -> Result<(MemoryMap, Metadata)> {
    let (mmap, metadata) = load_img(filename)?;
    if mmap.len() != expected_size {
        return Err(ImgError::WrongSize {
            expected: expected_size,
            got: mmap.len(),
        });
    }
    Ok((mmap, metadata))
}

/// Save a memory map and metadata to a .img file
pub fn save_img(filename: impl AsRef<Path>, mmap: &MemoryMap, metadata: &Metadata) -> Result<()> {
    let mut file = File::create(filename)?;

    file.write_all(mmap.get_packed())?;
    file.write_all(MAGIC)?;

    let metadata_json = metadata.to_json()?;
    file.write_all(STANDARD.encode(metadata_json.as_bytes()).as_bytes())?;

    Ok(())
}

fn find_magic(data: &[u8]) -> Option<usize> {
    data.windows(MAGIC.len()).position(|window| window == MAGIC)
}

fn decode_metadata(encoded: &[u8]) -> Result<Metadata> {
    let decoded = STANDARD
        .decode(encoded.trim_ascii())
        .map_err(|e| ImgError::Base64Decode(e.to_string()))?;

    let json_str =
        String::from_utf8(decoded).map_err(|e| ImgError::MetadataDecode(e.to_string()))?;

    Metadata::from_json(&json_str).map_err(ImgError::MetadataJson)
}
