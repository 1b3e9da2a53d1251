// Memory structure representing a single radio memory channel

use super::constants::{is_valid_dtcs, is_valid_tone};
use super::options::{Mode, PowerLevel, PttId, Scrambler, TuningStep};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Offset direction. Stored implicitly: a zero offset means no duplex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Duplex {
    #[default]
    None,
    Plus,
    Minus,
}

impl Duplex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Duplex::None => "",
            Duplex::Plus => "+",
            Duplex::Minus => "-",
        }
    }
}

/// Squelch tone for one direction
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Tone {
    #[default]
    None,
    /// CTCSS frequency in Hz
    Ctcss(f32),
    /// DCS code, normal polarity
    Dcs(u16),
    /// DCS code, inverted polarity
    DcsReversed(u16),
}

impl Tone {
    pub fn is_none(&self) -> bool {
        matches!(self, Tone::None)
    }

    /// Whether the tone value exists in the radio's tables
    pub fn is_valid(&self) -> bool {
        match *self {
            Tone::None => true,
            Tone::Ctcss(hz) => is_valid_tone(hz),
            Tone::Dcs(code) | Tone::DcsReversed(code) => is_valid_dtcs(code),
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tone::None => Ok(()),
            Tone::Ctcss(hz) => write!(f, "{:.1}", hz),
            Tone::Dcs(code) => write!(f, "D{:03}N", code),
            Tone::DcsReversed(code) => write!(f, "D{:03}I", code),
        }
    }
}

/// One channel as presented to the rest of the application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    /// Channel number, 1-based
    pub number: u32,

    /// Channel name (synthetic for VFO slots)
    pub name: String,

    /// Receive frequency in Hz
    pub freq: u64,

    /// Offset frequency in Hz
    pub offset: u64,

    pub duplex: Duplex,
    pub mode: Mode,
    pub tuning_step: TuningStep,
    pub power: PowerLevel,

    pub tx_tone: Tone,
    pub rx_tone: Tone,

    /// Busy channel lockout
    pub bclo: bool,

    /// Frequency reverse
    pub reverse: bool,

    pub ptt_id: PttId,
    pub dtmf_decode: bool,
    pub scrambler: Scrambler,

    /// Whether this memory is empty
    pub empty: bool,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Memory {
    /// Create a new memory with default values
    pub fn new(number: u32) -> Self {
        Self {
            number,
            name: String::new(),
            freq: 0,
            offset: 0,
            duplex: Duplex::None,
            mode: Mode::Fm,
            tuning_step: TuningStep::Khz2_5,
            power: PowerLevel::Low,
            tx_tone: Tone::None,
            rx_tone: Tone::None,
            bclo: false,
            reverse: false,
            ptt_id: PttId::Off,
            dtmf_decode: false,
            scrambler: Scrambler::Off,
            empty: false,
        }
    }

    /// Create an empty memory
    pub fn new_empty(number: u32) -> Self {
        let mut mem = Self::new(number);
        mem.empty = true;
        mem
    }

    /// Format frequency in Hz as a string (e.g., "146.520000")
    pub fn format_freq(freq: u64) -> String {
        format!("{}.{:06}", freq / 1_000_000, freq % 1_000_000)
    }

    /// Get formatted frequency string
    pub fn freq_str(&self) -> String {
        Self::format_freq(self.freq)
    }

    /// Transmit frequency implied by duplex and offset
    pub fn tx_freq(&self) -> u64 {
        match self.duplex {
            Duplex::None => self.freq,
            Duplex::Plus => self.freq + self.offset,
            Duplex::Minus => self.freq.saturating_sub(self.offset),
        }
    }
}

impl fmt::Display for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.empty {
            return write!(f, "Memory {}: (empty)", self.number);
        }

        let dup = match self.duplex {
            Duplex::None => "/",
            other => other.as_str(),
        };

        write!(
            f,
            "Memory {}: {}{}{} {} {} ({}) tx[{}] rx[{}] [{}]",
            self.number,
            Self::format_freq(self.freq),
            dup,
            Self::format_freq(self.offset),
            self.mode,
            self.power,
            self.name,
            self.tx_tone,
            self.rx_tone,
            self.tuning_step
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_freq() {
        assert_eq!(Memory::format_freq(146_520_000), "146.520000");
        assert_eq!(Memory::format_freq(146_000_000), "146.000000");
        assert_eq!(Memory::format_freq(520_000), "0.520000");

        let mut mem = Memory::new(1);
        mem.freq = 446_006_250;
        assert_eq!(mem.freq_str(), "446.006250");
    }

    #[test]
    fn test_memory_creation() {
        let mem = Memory::new(1);
        assert_eq!(mem.number, 1);
        assert_eq!(mem.mode, Mode::Fm);
        assert!(mem.tx_tone.is_none());
        assert!(!mem.empty);

        let empty = Memory::new_empty(2);
        assert!(empty.empty);
        assert!(empty.to_string().contains("empty"));
    }

    #[test]
    fn test_duplex() {
        assert_eq!(Duplex::Plus.as_str(), "+");
        assert_eq!(Duplex::None.as_str(), "");

        let mut mem = Memory::new(1);
        mem.freq = 145_000_000;
        mem.offset = 600_000;
        mem.duplex = Duplex::Minus;
        assert_eq!(mem.tx_freq(), 144_400_000);
    }

    #[test]
    fn test_tone_validity() {
        assert!(Tone::None.is_valid());
        assert!(Tone::Ctcss(88.5).is_valid());
        assert!(!Tone::Ctcss(88.6).is_valid());
        assert!(Tone::DcsReversed(754).is_valid());
        assert!(!Tone::Dcs(24).is_valid());
        assert_eq!(Tone::Dcs(23).to_string(), "D023N");
    }
}
