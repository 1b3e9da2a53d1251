// Serial communication module for radio I/O
pub mod comm;
pub mod crc;
pub mod frame;
pub mod protocol;
pub mod session;
pub mod transport;

#[cfg(test)]
pub mod mock;

pub use comm::{list_ports, SerialConfig, SerialError, SerialPort};
pub use crc::checksum16;
pub use frame::{build_frame, deobfuscate, obfuscate, parse_frame};
pub use protocol::BlockProtocol;
pub use session::Session;
pub use transport::Transport;
