// UVK5-RS: Quansheng UV-K5 programming library
// Copyright 2024 - Licensed under GPLv3

pub mod bitwise;
pub mod core;
pub mod drivers;
pub mod formats;
pub mod memmap;
pub mod serial;

// Re-export commonly used types
pub use core::{Duplex, Memory, Mode, PowerLevel, RadioFeatures, Tone};
pub use drivers::{CloneModeRadio, Radio, RadioError, RadioResult, UVK5Radio};
pub use formats::{load_img, save_img, Metadata};
pub use memmap::MemoryMap;
pub use serial::{BlockProtocol, SerialConfig, SerialPort};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
