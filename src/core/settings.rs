// Named, typed radio settings grouped for display and editing

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum SettingError {
    #[error("{name}: {value} is outside {min}..={max}")]
    OutOfRange {
        name: String,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("{name}: {value:?} is not one of the allowed options")]
    NotAnOption { name: String, value: String },

    #[error("{name}: string longer than {max_len} characters")]
    TooLong { name: String, max_len: usize },

    #[error("{name}: expected a {expected} value")]
    WrongType { name: String, expected: &'static str },

    #[error("{0} is read-only")]
    ReadOnly(String),
}

pub type Result<T> = std::result::Result<T, SettingError>;

/// Value of a single setting together with its legal domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SettingValue {
    Bool(bool),
    Int { value: i64, min: i64, max: i64 },
    List { value: String, options: Vec<String> },
    Str { value: String, max_len: usize },
}

impl SettingValue {
    pub fn list(value: impl Into<String>, options: Vec<String>) -> Self {
        SettingValue::List {
            value: value.into(),
            options,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            SettingValue::Int { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// Text of a list or string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::List { value, .. } | SettingValue::Str { value, .. } => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(b) => write!(f, "{}", if *b { "On" } else { "Off" }),
            SettingValue::Int { value, .. } => write!(f, "{}", value),
            SettingValue::List { value, .. } | SettingValue::Str { value, .. } => {
                write!(f, "{}", value)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadioSetting {
    /// Stable key used when applying settings back
    pub name: String,

    /// Human readable label
    pub label: String,

    pub value: SettingValue,

    #[serde(default)]
    pub read_only: bool,
}

impl RadioSetting {
    pub fn new(name: impl Into<String>, label: impl Into<String>, value: SettingValue) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            value,
            read_only: false,
        }
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn set_bool(&mut self, b: bool) -> Result<()> {
        self.check_writable()?;
        match &mut self.value {
            SettingValue::Bool(v) => {
                *v = b;
                Ok(())
            }
            _ => Err(wrong_type(&self.name, "boolean")),
        }
    }

    pub fn set_int(&mut self, n: i64) -> Result<()> {
        self.check_writable()?;
        match &mut self.value {
            SettingValue::Int { value, min, max } => {
                if n < *min || n > *max {
                    return Err(SettingError::OutOfRange {
                        name: self.name.clone(),
                        value: n,
                        min: *min,
                        max: *max,
                    });
                }
                *value = n;
                Ok(())
            }
            _ => Err(wrong_type(&self.name, "integer")),
        }
    }

    /// Set a list option or string value
    pub fn set_str(&mut self, s: &str) -> Result<()> {
        self.check_writable()?;
        match &mut self.value {
            SettingValue::List { value, options } => {
                if !options.iter().any(|o| o == s) {
                    return Err(SettingError::NotAnOption {
                        name: self.name.clone(),
                        value: s.to_string(),
                    });
                }
                *value = s.to_string();
                Ok(())
            }
            SettingValue::Str { value, max_len } => {
                if s.chars().count() > *max_len {
                    return Err(SettingError::TooLong {
                        name: self.name.clone(),
                        max_len: *max_len,
                    });
                }
                *value = s.to_string();
                Ok(())
            }
            _ => Err(wrong_type(&self.name, "string")),
        }
    }

    fn check_writable(&self) -> Result<()> {
        if self.read_only {
            return Err(SettingError::ReadOnly(self.name.clone()));
        }
        Ok(())
    }
}

pub(crate) fn wrong_type(name: &str, expected: &'static str) -> SettingError {
    SettingError::WrongType {
        name: name.to_string(),
        expected,
    }
}

impl fmt::Display for RadioSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadioSettingGroup {
    pub name: String,
    pub label: String,
    pub settings: Vec<RadioSetting>,
}

impl RadioSettingGroup {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            settings: Vec::new(),
        }
    }

    pub fn push(&mut self, setting: RadioSetting) {
        self.settings.push(setting);
    }

    pub fn get(&self, name: &str) -> Option<&RadioSetting> {
        self.settings.iter().find(|s| s.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut RadioSetting> {
        self.settings.iter_mut().find(|s| s.name == name)
    }
}

/// Look a setting up across all groups
pub fn find_setting<'a>(groups: &'a [RadioSettingGroup], name: &str) -> Option<&'a RadioSetting> {
    groups.iter().find_map(|g| g.get(name))
}

/// Mutable lookup across all groups
pub fn find_setting_mut<'a>(
    groups: &'a mut [RadioSettingGroup],
    name: &str,
) -> Option<&'a mut RadioSetting> {
    groups.iter_mut().find_map(|g| g.get_mut(name))
}
