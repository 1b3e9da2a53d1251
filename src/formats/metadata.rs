// Metadata stored after the image in .img files

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const FIRMWARE_KEY: &str = "firmware";

/// Metadata stored in .img files
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Metadata {
    /// Driver class name
    #[serde(default)]
    pub rclass: String,

    #[serde(default)]
    pub vendor: String,

    #[serde(default)]
    pub model: String,

    #[serde(default)]
    pub variant: String,

    /// Version of the tool that wrote the file
    #[serde(default, rename = "chirp_version")]
    pub tool_version: String,

    /// Additional properties
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Metadata {
    pub fn new(vendor: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            vendor: vendor.into(),
            model: model.into(),
            tool_version: crate::VERSION.to_string(),
            ..Default::default()
        }
    }

    /// Metadata for an image just read from a radio
    pub fn for_radio(
        vendor: impl Into<String>,
        model: impl Into<String>,
        firmware: impl Into<String>,
    ) -> Self {
        let mut meta = Self::new(vendor, model);
        meta.rclass = "UVK5Radio".to_string();
        meta.set_extra(FIRMWARE_KEY, serde_json::Value::String(firmware.into()));
        meta
    }

    /// Firmware version recorded when the image was downloaded
    pub fn firmware(&self) -> Option<&str> {
        self.get_extra(FIRMWARE_KEY).and_then(|v| v.as_str())
    }

    pub fn set_extra(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.extra.insert(key.into(), value);
    }

    pub fn get_extra(&self, key: &str) -> Option<&serde_json::Value> {
        self.extra.get(key)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_creation() {
        let meta = Metadata::for_radio("Quansheng", "UV-K5", "k5_2.01.26");
        assert_eq!(meta.vendor, "Quansheng");
        assert_eq!(meta.rclass, "UVK5Radio");
        assert_eq!(meta.firmware(), Some("k5_2.01.26"));
        assert!(!meta.tool_version.is_empty());
    }

    #[test]
    fn test_metadata_serialization() {
        let mut meta = Metadata::new("Quansheng", "UV-K5");
        meta.set_extra("test_key", serde_json::json!("test_value"));

        let json = meta.to_json().unwrap();
        assert!(json.contains("\"chirp_version\""));

        let meta2 = Metadata::from_json(&json).unwrap();
        assert_eq!(meta2.model, "UV-K5");
        assert_eq!(
            meta2.get_extra("test_key"),
            Some(&serde_json::json!("test_value"))
        );
    }
}
