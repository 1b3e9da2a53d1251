// Radio driver framework
pub mod traits;

// Drivers
pub mod uvk5;

pub use traits::{CloneModeRadio, Radio, RadioError, RadioResult, Status, StatusCallback};
pub use uvk5::UVK5Radio;
