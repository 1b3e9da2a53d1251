// Binary parsing helpers for the packed radio image

pub mod bits;
pub mod elements;
pub mod parser;

pub use bits::{get_field, get_flag, set_field, set_flag};
pub use elements::{read_u16_le, read_u32_le, write_u16_le, write_u32_le, ElementError};
pub use parser::{parse_padded_text, parse_u16_le, parse_u32_le, parse_u8};
