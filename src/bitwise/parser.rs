// Parser combinators using nom for fixed-layout records

use nom::{bytes::complete::take, IResult};

/// Parse a u16 little-endian
pub fn parse_u16_le(input: &[u8]) -> IResult<&[u8], u16> {
    let (input, bytes) = take(2usize)(input)?;
    Ok((input, u16::from_le_bytes([bytes[0], bytes[1]])))
}

/// Parse a u32 little-endian
pub fn parse_u32_le(input: &[u8]) -> IResult<&[u8], u32> {
    let (input, bytes) = take(4usize)(input)?;
    Ok((
        input,
        u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
    ))
}

/// Parse a single byte
pub fn parse_u8(input: &[u8]) -> IResult<&[u8], u8> {
    let (input, bytes) = take(1usize)(input)?;
    Ok((input, bytes[0]))
}

/// Parse a fixed-width text field padded with 0x00 or 0xFF.
///
/// Text ends at the first pad byte. Bytes outside printable ASCII before it
/// read as `?`.
pub fn parse_padded_text(len: usize) -> impl Fn(&[u8]) -> IResult<&[u8], String> {
    move |input: &[u8]| {
        let (input, bytes) = take(len)(input)?;
        let text = bytes
            .iter()
            .take_while(|&&b| b != 0x00 && b != 0xFF)
            .map(|&b| if (0x20..=0x7E).contains(&b) { b as char } else { '?' })
            .collect();
        Ok((input, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integers() {
        let data = [0x12, 0x34, 0x56, 0x78];
        let (rest, value) = parse_u16_le(&data).unwrap();
        assert_eq!(value, 0x3412);
        assert_eq!(rest.len(), 2);

        let (_, value) = parse_u32_le(&data).unwrap();
        assert_eq!(value, 0x78563412);

        let (_, value) = parse_u8(&data).unwrap();
        assert_eq!(value, 0x12);

        assert!(parse_u32_le(&data[..3]).is_err());
    }

    #[test]
    fn test_parse_padded_text() {
        let data = b"CALL\xff\xff\xff\xffNEXT";
        let (rest, s) = parse_padded_text(8)(data).unwrap();
        assert_eq!(s, "CALL");
        assert_eq!(rest, b"NEXT");

        let (_, s) = parse_padded_text(6)(b"AB\0CD\0").unwrap();
        assert_eq!(s, "AB");

        let (_, s) = parse_padded_text(4)(b"FULL").unwrap();
        assert_eq!(s, "FULL");

        let (_, s) = parse_padded_text(6)(b"CAF\xC9\x07\xFF").unwrap();
        assert_eq!(s, "CAF??");
    }
}
