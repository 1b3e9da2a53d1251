// Core data structures shared by the driver, file formats and front ends
pub mod constants;
pub mod features;
pub mod memory;
pub mod options;
pub mod settings;

// Re-export commonly used types
pub use constants::*;
pub use features::{RadioFeatures, ValidationMessage};
pub use memory::{Duplex, Memory, Tone};
pub use options::*;
pub use settings::{RadioSetting, RadioSettingGroup, SettingError, SettingValue};
