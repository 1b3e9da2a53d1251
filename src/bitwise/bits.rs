// Bit field helpers for flag bytes
//
// Every setter returns the new byte with only the masked bits changed.

/// Set or clear the bits in `mask`
pub fn set_flag(byte: u8, mask: u8, on: bool) -> u8 {
    if on {
        byte | mask
    } else {
        byte & !mask
    }
}

pub fn get_flag(byte: u8, mask: u8) -> bool {
    byte & mask != 0
}

/// Extract the field under `mask`, shifted down to bit 0
pub fn get_field(byte: u8, mask: u8) -> u8 {
    (byte & mask) >> mask.trailing_zeros()
}

/// Replace the field under `mask` with `value` (given relative to bit 0)
pub fn set_field(byte: u8, mask: u8, value: u8) -> u8 {
    (byte & !mask) | ((value << mask.trailing_zeros()) & mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags() {
        assert_eq!(set_flag(0b1000_0000, 0b0001_0000, true), 0b1001_0000);
        assert_eq!(set_flag(0b1001_0000, 0b0001_0000, false), 0b1000_0000);
        assert!(get_flag(0x10, 0x10));
        assert!(!get_flag(0xEF, 0x10));
    }

    #[test]
    fn test_fields() {
        // PTT-ID lives in bits 1-2
        assert_eq!(get_field(0b0000_0101, 0b0000_0110), 0b10);
        assert_eq!(set_field(0b1111_1001, 0b0000_0110, 0b11), 0b1111_1111);
        assert_eq!(set_field(0b1111_1111, 0b0000_0110, 0), 0b1111_1001);

        // Power lives in bits 2-3
        assert_eq!(get_field(0x08, 0x0C), 2);
        // Oversized values are masked off
        assert_eq!(set_field(0x00, 0x0C, 0xFF), 0x0C);
    }
}
