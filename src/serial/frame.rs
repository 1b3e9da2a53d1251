// UV-K5 wire framing: AB CD <len> 00 <obfuscated payload + crc> DC BA

use super::crc::checksum16;
use crate::drivers::{RadioError, RadioResult};
use nom::{
    bytes::complete::{tag, take},
    number::complete::u8 as byte,
    IResult,
};

/// Frame start marker
pub const FRAME_HEAD: [u8; 2] = [0xAB, 0xCD];

/// Frame end marker
pub const FRAME_TAIL: [u8; 2] = [0xDC, 0xBA];

/// Head marker, length byte, reserved byte
pub const HEADER_LEN: usize = 4;

/// Checksum (2 bytes) followed by the tail marker
pub const TRAILER_LEN: usize = 4;

/// Fixed XOR table applied to everything between header and tail
const XOR_KEY: [u8; 16] = [
    0x16, 0x6C, 0x14, 0xE6, 0x2E, 0x91, 0x0D, 0x40, 0x21, 0x35, 0xD5, 0x40, 0x13, 0x03, 0xE9,
    0x80,
];

/// XOR `data` with the repeating key table, starting at key position 0.
///
/// This is an involution, so the same call undoes it.
pub fn obfuscate(data: &[u8]) -> Vec<u8> {
    data.iter()
        .zip(XOR_KEY.iter().cycle())
        .map(|(b, k)| b ^ k)
        .collect()
}

/// Inverse of [`obfuscate`]
pub fn deobfuscate(data: &[u8]) -> Vec<u8> {
    obfuscate(data)
}

/// Wrap a command into a complete frame.
///
/// The length byte is the command length before the checksum is appended;
/// the checksum goes on little-endian and is obfuscated along with the
/// command.
pub fn build_frame(command: &[u8]) -> RadioResult<Vec<u8>> {
    let len = u8::try_from(command.len()).map_err(|_| {
        RadioError::Framing(format!(
            "command of {} bytes does not fit in a frame",
            command.len()
        ))
    })?;

    let mut payload = Vec::with_capacity(command.len() + 2);
    payload.extend_from_slice(command);
    payload.extend_from_slice(&checksum16(command).to_le_bytes());

    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len() + FRAME_TAIL.len());
    frame.extend_from_slice(&FRAME_HEAD);
    frame.push(len);
    frame.push(0x00);
    frame.extend_from_slice(&obfuscate(&payload));
    frame.extend_from_slice(&FRAME_TAIL);

    Ok(frame)
}

/// Validate a 4-byte frame header and return the declared payload length
pub fn parse_header(header: &[u8]) -> RadioResult<usize> {
    if header.len() < HEADER_LEN
        || header[0..2] != FRAME_HEAD
        || header[3] != 0x00
    {
        return Err(RadioError::Framing(format!(
            "bad frame header: {:02X?}",
            header
        )));
    }

    Ok(header[2] as usize)
}

/// Validate the 4-byte trailer. The checksum half is not checked.
pub fn check_trailer(trailer: &[u8]) -> RadioResult<()> {
    if trailer.len() < TRAILER_LEN || trailer[2..4] != FRAME_TAIL {
        return Err(RadioError::Framing(format!(
            "bad frame trailer: {:02X?}",
            trailer
        )));
    }

    Ok(())
}

/// Raw frame fields: (obfuscated payload, obfuscated checksum)
fn raw_frame(input: &[u8]) -> IResult<&[u8], (&[u8], &[u8])> {
    let (input, _) = tag(&FRAME_HEAD[..])(input)?;
    let (input, len) = byte(input)?;
    let (input, _) = tag(&[0x00u8][..])(input)?;
    let (input, payload) = take(len as usize)(input)?;
    let (input, checksum) = take(2usize)(input)?;
    let (input, _) = tag(&FRAME_TAIL[..])(input)?;
    Ok((input, (payload, checksum)))
}

/// Parse one complete frame from the front of `input`.
///
/// Returns the de-obfuscated command and the number of bytes consumed.
pub fn parse_frame(input: &[u8]) -> RadioResult<(Vec<u8>, usize)> {
    let (rest, (payload, _checksum)) = raw_frame(input).map_err(|e| {
        RadioError::Framing(format!("malformed frame {:02X?}: {}", input, e))
    })?;

    Ok((deobfuscate(payload), input.len() - rest.len()))
}

/// Parse a frame and also verify its checksum.
///
/// Frames from the radio carry no usable checksum; this is for frames we
/// built ourselves, i.e. the simulated radio in tests.
pub fn parse_checked_frame(input: &[u8]) -> RadioResult<(Vec<u8>, usize)> {
    let (rest, (payload, checksum)) = raw_frame(input).map_err(|e| {
        RadioError::Framing(format!("malformed frame {:02X?}: {}", input, e))
    })?;

    let crc_bytes = deobfuscate(&[payload, checksum].concat());
    let (command, crc) = crc_bytes.split_at(payload.len());
    let expected = checksum16(command);
    let got = u16::from_le_bytes([crc[0], crc[1]]);
    if expected != got {
        return Err(RadioError::Framing(format!(
            "checksum mismatch: expected {:04X}, got {:04X}",
            expected, got
        )));
    }

    Ok((command.to_vec(), input.len() - rest.len()))
}
