// Radio feature flags and capabilities

use super::constants::{CHARSET_ASCII, DTCS_CODES, TONES};
use super::memory::{Memory, Tone};
use super::options::{Mode, PowerLevel, TuningStep};
use serde::{Deserialize, Serialize};

/// What a radio supports, used to check a memory before it is encoded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadioFeatures {
    pub has_bank: bool,
    pub has_rx_dtcs: bool,
    pub has_ctone: bool,
    pub has_settings: bool,
    pub has_name: bool,
    pub can_delete: bool,

    pub valid_modes: Vec<Mode>,
    pub valid_tuning_steps: Vec<TuningStep>,
    /// (low_hz, high_hz) pairs, high exclusive
    pub valid_bands: Vec<(u64, u64)>,
    pub valid_power_levels: Vec<PowerLevel>,
    pub valid_characters: String,
    pub valid_name_length: usize,
    pub valid_tones: Vec<f32>,
    pub valid_dtcs_codes: Vec<u16>,

    /// Memory bounds (min, max), inclusive
    pub memory_bounds: (u32, u32),
}

impl Default for RadioFeatures {
    fn default() -> Self {
        Self {
            has_bank: false,
            has_rx_dtcs: false,
            has_ctone: true,
            has_settings: false,
            has_name: true,
            can_delete: true,
            valid_modes: Mode::ALL.to_vec(),
            valid_tuning_steps: TuningStep::ALL.to_vec(),
            valid_bands: Vec::new(),
            valid_power_levels: Vec::new(),
            valid_characters: CHARSET_ASCII.to_string(),
            valid_name_length: 6,
            valid_tones: TONES.to_vec(),
            valid_dtcs_codes: DTCS_CODES.to_vec(),
            memory_bounds: (0, 1),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ValidationMessage {
    Warning(String),
    Error(String),
}

impl ValidationMessage {
    pub fn is_error(&self) -> bool {
        matches!(self, ValidationMessage::Error(_))
    }

    pub fn message(&self) -> &str {
        match self {
            ValidationMessage::Warning(msg) | ValidationMessage::Error(msg) => msg,
        }
    }
}

impl RadioFeatures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a concise string representation of valid bands
    pub fn concise_bands(&self) -> String {
        self.valid_bands
            .iter()
            .map(|(lo, hi)| format!("{}-{}MHz", lo / 1_000_000, hi / 1_000_000))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn in_band(&self, freq: u64) -> bool {
        self.valid_bands.is_empty()
            || self
                .valid_bands
                .iter()
                .any(|(lo, hi)| freq >= *lo && freq < *hi)
    }

    /// Validate a memory against this radio's features
    /// Returns a list of warnings and errors
    pub fn validate_memory(&self, mem: &Memory) -> Vec<ValidationMessage> {
        let mut msgs = Vec::new();

        let (lo, hi) = self.memory_bounds;
        if mem.number < lo || mem.number > hi {
            msgs.push(ValidationMessage::Error(format!(
                "Location {} is out of range",
                mem.number
            )));
        }

        if mem.empty {
            return msgs;
        }

        if !self.valid_modes.contains(&mem.mode) {
            msgs.push(ValidationMessage::Error(format!(
                "Mode {} not supported",
                mem.mode
            )));
        }

        if !self.valid_tuning_steps.contains(&mem.tuning_step) {
            msgs.push(ValidationMessage::Error(format!(
                "Tuning step {} not supported",
                mem.tuning_step
            )));
        }

        for tone in [mem.tx_tone, mem.rx_tone] {
            let supported = match tone {
                Tone::None => true,
                Tone::Ctcss(hz) => self.valid_tones.iter().any(|t| (t - hz).abs() < 0.05),
                Tone::Dcs(code) | Tone::DcsReversed(code) => self.valid_dtcs_codes.contains(&code),
            };
            if !supported {
                msgs.push(ValidationMessage::Error(format!(
                    "Tone {} not supported",
                    tone
                )));
            }
        }

        if !self.in_band(mem.freq) {
            msgs.push(ValidationMessage::Error(format!(
                "Frequency {} is out of supported ranges {}",
                Memory::format_freq(mem.freq),
                self.concise_bands()
            )));
        } else if !self.in_band(mem.tx_freq()) {
            msgs.push(ValidationMessage::Error(format!(
                "TX freq {} is out of supported range",
                Memory::format_freq(mem.tx_freq())
            )));
        }

        if !self.valid_power_levels.is_empty() && !self.valid_power_levels.contains(&mem.power) {
            msgs.push(ValidationMessage::Warning(format!(
                "Power level {} not supported",
                mem.power
            )));
        }

        if mem.name.chars().count() > self.valid_name_length {
            msgs.push(ValidationMessage::Warning(format!(
                "Name will be truncated to {} characters",
                self.valid_name_length
            )));
        }

        if let Some(ch) = mem
            .name
            .chars()
            .find(|c| !self.valid_characters.contains(*c))
        {
            msgs.push(ValidationMessage::Error(format!(
                "Name character '{}' not supported",
                ch
            )));
        }

        msgs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features() -> RadioFeatures {
        RadioFeatures {
            memory_bounds: (1, 214),
            valid_bands: vec![(18_000_000, 620_000_000), (840_000_000, 1_300_000_000)],
            valid_name_length: 16,
            ..RadioFeatures::default()
        }
    }

    #[test]
    fn test_default_features() {
        let rf = RadioFeatures::default();
        assert!(rf.has_ctone);
        assert!(!rf.has_rx_dtcs);
        assert_eq!(rf.valid_name_length, 6);
    }

    #[test]
    fn test_validation() {
        let rf = features();
        let mut mem = Memory::new(1);
        mem.freq = 146_520_000;
        mem.tx_tone = Tone::Ctcss(88.5);
        assert!(rf.validate_memory(&mem).is_empty());

        mem.freq = 700_000_000;
        let msgs = rf.validate_memory(&mem);
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].is_error());
        assert!(msgs[0].message().contains("18-620MHz"));
    }

    #[test]
    fn test_validation_tones_and_name() {
        let rf = features();
        let mut mem = Memory::new(215);
        mem.freq = 446_000_000;
        mem.rx_tone = Tone::Dcs(24);
        mem.name = "caf\u{e9}".to_string();

        let msgs = rf.validate_memory(&mem);
        let errors: Vec<_> = msgs.iter().filter(|m| m.is_error()).collect();
        assert_eq!(errors.len(), 3);
    }
}
