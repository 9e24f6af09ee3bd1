//! Typed access to XSETTINGS properties.
//!
//! Values written through [`XSettings`] are also copied to a desktop settings
//! store when a settings key is mapped for the property.

use std::collections::{BTreeMap, HashMap};

use log::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
    pub alpha: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    Integer(i32),
    String(String),
    Color(Color),
}

impl SettingValue {
    pub fn kind(&self) -> SettingKind {
        match self {
            SettingValue::Integer(_) => SettingKind::Integer,
            SettingValue::String(_) => SettingKind::String,
            SettingValue::Color(_) => SettingKind::Color,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    Integer,
    String,
    Color,
}

#[derive(Debug, thiserror::Error)]
pub enum XSettingsError {
    #[error("property {0} not found")]
    NotFound(String),
    #[error("property {prop} is {found:?}, not {expected:?}")]
    TypeMismatch {
        prop: String,
        expected: SettingKind,
        found: SettingKind,
    },
    #[error("settings backend failed: {0}")]
    Backend(String),
}

/// The settings blob owned by the XSETTINGS manager window.
pub trait PropertyBlob {
    fn get(&self, prop: &str) -> Result<Option<SettingValue>, XSettingsError>;
    fn set(&mut self, settings: Vec<(String, SettingValue)>) -> Result<(), XSettingsError>;
}

/// Desktop settings store that mirrors selected properties.
pub trait SettingsMirror {
    fn set_key(&mut self, key: &str, value: &SettingValue) -> Result<(), XSettingsError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryBlob {
    values: BTreeMap<String, SettingValue>,
    serial: u32,
}

impl MemoryBlob {
    /// Incremented on every successful write.
    pub fn serial(&self) -> u32 {
        self.serial
    }
}

impl PropertyBlob for MemoryBlob {
    fn get(&self, prop: &str) -> Result<Option<SettingValue>, XSettingsError> {
        Ok(self.values.get(prop).cloned())
    }

    fn set(&mut self, settings: Vec<(String, SettingValue)>) -> Result<(), XSettingsError> {
        self.values.extend(settings);
        self.serial = self.serial.wrapping_add(1);
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryMirror {
    pub values: BTreeMap<String, SettingValue>,
}

impl SettingsMirror for MemoryMirror {
    fn set_key(&mut self, key: &str, value: &SettingValue) -> Result<(), XSettingsError> {
        self.values.insert(key.to_string(), value.clone());
        Ok(())
    }
}

pub struct XSettings<B, M> {
    blob: B,
    mirror: M,
    keys: HashMap<String, String>,
}

impl<B: PropertyBlob, M: SettingsMirror> XSettings<B, M> {
    /// `keys` maps XSETTINGS property names to mirrored settings keys.
    pub fn new(blob: B, mirror: M, keys: HashMap<String, String>) -> Self {
        Self { blob, mirror, keys }
    }

    pub fn blob(&self) -> &B {
        &self.blob
    }

    pub fn mirror(&self) -> &M {
        &self.mirror
    }

    pub fn set_integer(&mut self, prop: &str, value: i32) -> Result<(), XSettingsError> {
        self.set(prop, SettingValue::Integer(value))
    }

    pub fn get_integer(&self, prop: &str) -> Result<i32, XSettingsError> {
        match self.get(prop)? {
            SettingValue::Integer(v) => Ok(v),
            other => Err(mismatch(prop, SettingKind::Integer, &other)),
        }
    }

    pub fn set_string(&mut self, prop: &str, value: &str) -> Result<(), XSettingsError> {
        self.set(prop, SettingValue::String(value.to_string()))
    }

    pub fn get_string(&self, prop: &str) -> Result<String, XSettingsError> {
        match self.get(prop)? {
            SettingValue::String(v) => Ok(v),
            other => Err(mismatch(prop, SettingKind::String, &other)),
        }
    }

    pub fn set_color(&mut self, prop: &str, value: Color) -> Result<(), XSettingsError> {
        self.set(prop, SettingValue::Color(value))
    }

    pub fn get_color(&self, prop: &str) -> Result<Color, XSettingsError> {
        match self.get(prop)? {
            SettingValue::Color(v) => Ok(v),
            other => Err(mismatch(prop, SettingKind::Color, &other)),
        }
    }

    fn set(&mut self, prop: &str, value: SettingValue) -> Result<(), XSettingsError> {
        if let Err(err) = self.blob.set(vec![(prop.to_string(), value.clone())]) {
            debug!("Setting {prop} to {value:?} failed: {err}");
            return Err(err);
        }

        if let Some(key) = self.keys.get(prop) {
            if let Err(err) = self.mirror.set_key(key, &value) {
                warn!("Mirroring {prop} to settings key {key} failed: {err}");
            }
        }
        Ok(())
    }

    fn get(&self, prop: &str) -> Result<SettingValue, XSettingsError> {
        self.blob
            .get(prop)
            .inspect_err(|err| debug!("Reading {prop} failed: {err}"))?
            .ok_or_else(|| XSettingsError::NotFound(prop.to_string()))
    }
}

fn mismatch(prop: &str, expected: SettingKind, found: &SettingValue) -> XSettingsError {
    XSettingsError::TypeMismatch {
        prop: prop.to_string(),
        expected,
        found: found.kind(),
    }
}
