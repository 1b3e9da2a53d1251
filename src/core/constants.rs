// Tone tables and channel character set

/// 50 standard CTCSS tones (in Hz), in the order the radio indexes them
pub const TONES: [f32; 50] = [
    67.0, 69.3, 71.9, 74.4, 77.0, 79.7, 82.5, 85.4, 88.5, 91.5, 94.8, 97.4, 100.0, 103.5, 107.2,
    110.9, 114.8, 118.8, 123.0, 127.3, 131.8, 136.5, 141.3, 146.2, 151.4, 156.7, 159.8, 162.2,
    165.5, 167.9, 171.3, 173.8, 177.3, 179.9, 183.5, 186.2, 189.9, 192.8, 196.6, 199.5, 203.5,
    206.5, 210.7, 218.1, 225.7, 229.1, 233.6, 241.8, 250.3, 254.1,
];

/// 104 standard DTCS codes, in the order the radio indexes them
pub const DTCS_CODES: [u16; 104] = [
    23, 25, 26, 31, 32, 36, 43, 47, 51, 53, 54, 65, 71, 72, 73, 74, 114, 115, 116, 122, 125, 131,
    132, 134, 143, 145, 152, 155, 156, 162, 165, 172, 174, 205, 212, 223, 225, 226, 243, 244, 245,
    246, 251, 252, 255, 261, 263, 265, 266, 271, 274, 306, 311, 315, 325, 331, 332, 343, 346, 351,
    356, 364, 365, 371, 411, 412, 413, 423, 431, 432, 445, 446, 452, 454, 455, 462, 464, 465, 466,
    503, 506, 516, 523, 526, 532, 546, 565, 606, 612, 624, 627, 631, 632, 654, 662, 664, 703, 712,
    723, 731, 732, 734, 743, 754,
];

/// Printable ASCII, the only characters channel names may use
pub const CHARSET_ASCII: &str = " !\"#$%&'()*+,-./0123456789:;<=>?@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_`abcdefghijklmnopqrstuvwxyz{|}~";

/// Position of a CTCSS tone in [`TONES`].
///
/// Tones are compared at 0.1 Hz resolution so that values which went
/// through a text round trip still match.
pub fn tone_index(tone: f32) -> Option<usize> {
    let tenths = (tone * 10.0).round() as i32;
    TONES
        .iter()
        .position(|t| (t * 10.0).round() as i32 == tenths)
}

/// Position of a DTCS code in [`DTCS_CODES`]
pub fn dtcs_index(code: u16) -> Option<usize> {
    DTCS_CODES.iter().position(|&c| c == code)
}

/// Check if a tone is valid
pub fn is_valid_tone(tone: f32) -> bool {
    tone_index(tone).is_some()
}

/// Check if a DTCS code is valid
pub fn is_valid_dtcs(code: u16) -> bool {
    dtcs_index(code).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tones() {
        assert_eq!(TONES.len(), 50);
        assert_eq!(tone_index(67.0), Some(0));
        assert_eq!(tone_index(88.5), Some(8));
        assert_eq!(tone_index(254.1), Some(49));
        assert!(is_valid_tone(100.0));
        assert!(!is_valid_tone(99.9));
    }

    #[test]
    fn test_dtcs_codes() {
        assert_eq!(DTCS_CODES.len(), 104);
        assert_eq!(dtcs_index(23), Some(0));
        assert_eq!(dtcs_index(754), Some(103));
        assert!(is_valid_dtcs(23));
        assert!(!is_valid_dtcs(24));
    }

    #[test]
    fn test_charset() {
        assert_eq!(CHARSET_ASCII.len(), 95);
        assert!(CHARSET_ASCII.chars().all(|c| (' '..='~').contains(&c)));
    }
}
