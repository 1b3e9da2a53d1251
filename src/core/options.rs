// Closed option lists stored as small indices in the radio image
//
// Decoding is tolerant: `from_index` returns None for an index the list does
// not have and the caller picks the fallback. Encoding is total: every
// variant has exactly one index.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! option_list {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:expr),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
            pub const LABELS: &'static [&'static str] = &[$($label),+];

            pub fn from_index(index: usize) -> Option<Self> {
                Self::ALL.get(index).copied()
            }

            pub fn to_index(self) -> usize {
                self as usize
            }

            pub fn label(self) -> &'static str {
                Self::LABELS[self.to_index()]
            }

            pub fn from_label(label: &str) -> Option<Self> {
                Self::LABELS
                    .iter()
                    .position(|l| *l == label)
                    .map(|i| Self::ALL[i])
            }

            /// Option labels as owned strings, for settings lists
            pub fn options() -> Vec<String> {
                Self::LABELS.iter().map(|l| l.to_string()).collect()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::ALL[0]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

option_list! {
    /// Modulation
    Mode { Fm => "FM", Nfm => "NFM", Am => "AM" }
}

option_list! {
    /// Transmit power, encoded in flags2 bits 2-3
    PowerLevel { High => "High", Med => "Med", Low => "Low" }
}

option_list! {
    /// Channel tuning step, stored as a 3-bit index
    TuningStep {
        Khz2_5 => "2.5",
        Khz5 => "5.0",
        Khz6_25 => "6.25",
        Khz10 => "10.0",
        Khz12_5 => "12.5",
        Khz25 => "25.0",
        Khz8_33 => "8.33",
    }
}

impl TuningStep {
    const KHZ: [f32; 7] = [2.5, 5.0, 6.25, 10.0, 12.5, 25.0, 8.33];

    pub fn khz(self) -> f32 {
        Self::KHZ[self.to_index()]
    }
}

option_list! {
    /// DTMF PTT-ID transmission
    PttId { Off => "Off", Bot => "BOT", Eot => "EOT", Both => "BOTH" }
}

option_list! {
    /// Voice scrambler level
    Scrambler {
        Off => "Off",
        S1 => "1",
        S2 => "2",
        S3 => "3",
        S4 => "4",
        S5 => "5",
        S6 => "6",
        S7 => "7",
        S8 => "8",
        S9 => "9",
        S10 => "10",
    }
}

option_list! {
    ChannelDisplay { Frequency => "Frequency", Number => "Channel No", Name => "Channel Name" }
}

option_list! {
    BatterySave { Off => "OFF", R1_1 => "1:1", R1_2 => "1:2", R1_3 => "1:3", R1_4 => "1:4" }
}

option_list! {
    /// Cross-band and dual watch band selection
    BandSelect { Off => "Off", BandA => "Band A", BandB => "Band B" }
}

option_list! {
    ScanResume {
        Timeout => "TO: Resume after 5 seconds",
        Carrier => "CO: Resume after signal dissapears",
        Search => "SE: Stop scanning after receiving a signal",
    }
}

option_list! {
    PowerOnDisplay { FullScreen => "Full Screen", Welcome => "Welcome Info", Voltage => "Voltage" }
}

option_list! {
    KeypadTone { Off => "Off", Chinese => "Chinese", English => "English" }
}

option_list! {
    Language { Chinese => "Chinese", English => "English" }
}

option_list! {
    AlarmMode { Site => "SITE", Tone => "TONE" }
}

option_list! {
    EndOfTalk { Off => "Off", Roger => "ROGER", Mdc => "MDC" }
}

option_list! {
    /// Repeater tail tone elimination delay
    RepeaterTail {
        Off => "Off",
        Ms100 => "100ms",
        Ms200 => "200ms",
        Ms300 => "300ms",
        Ms400 => "400ms",
        Ms500 => "500ms",
        Ms600 => "600ms",
        Ms700 => "700ms",
        Ms800 => "800ms",
        Ms900 => "900ms",
    }
}

option_list! {
    /// Transmit frequency lock region
    FreqLock { Off => "Off", Fcc => "FCC", Ce => "CE", Gb => "GB", F430 => "430", F438 => "438" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_roundtrip() {
        for (i, mode) in Mode::ALL.iter().enumerate() {
            assert_eq!(mode.to_index(), i);
            assert_eq!(Mode::from_index(i), Some(*mode));
        }
        assert_eq!(Mode::from_index(3), None);
        assert_eq!(Scrambler::from_index(10), Some(Scrambler::S10));
        assert_eq!(Scrambler::from_index(11), None);
    }

    #[test]
    fn test_labels() {
        assert_eq!(PttId::Both.label(), "BOTH");
        assert_eq!(FreqLock::from_label("438"), Some(FreqLock::F438));
        assert_eq!(FreqLock::from_label("nope"), None);
        assert_eq!(RepeaterTail::LABELS.len(), 10);
        assert_eq!(BatterySave::Off.to_string(), "OFF");
        assert_eq!(BandSelect::options()[2], "Band B");
    }

    #[test]
    fn test_default_is_first() {
        assert_eq!(ScanResume::default(), ScanResume::Timeout);
        assert_eq!(Language::default(), Language::Chinese);
    }

    #[test]
    fn test_tuning_step() {
        assert_eq!(TuningStep::Khz6_25.khz(), 6.25);
        assert_eq!(TuningStep::ALL.len(), 7);
    }
}
