use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const ROTATION_0: u16 = 1;
pub const ROTATION_90: u16 = 2;
pub const ROTATION_180: u16 = 4;
pub const ROTATION_270: u16 = 8;
pub const REFLECT_NONE: u16 = 0;
pub const REFLECT_X: u16 = 16;
pub const REFLECT_Y: u16 = 32;

/// Stored placement and state of one physical monitor, keyed by its UUID.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "PascalCase", default)]
pub struct MonitorConfig {
    #[serde(rename = "UUID")]
    pub uuid: String,
    pub name: String,
    pub enabled: bool,
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
    pub rotation: u16,
    pub reflect: u16,
    #[serde(serialize_with = "finite_f64")]
    pub refresh_rate: f64,
    pub primary: bool,
}

/// Named monitor layout chosen by the user.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct CustomModeConfig {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub monitors: Vec<MonitorConfig>,
}

/// Monitor set of the mirror, extend and only-one topologies.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct ModeMonitors {
    #[serde(default, deserialize_with = "null_as_default")]
    pub monitors: Vec<MonitorConfig>,
}

impl ModeMonitors {
    pub fn new(monitors: Vec<MonitorConfig>) -> Self {
        Self { monitors }
    }
}

/// Every stored layout of one screen.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct ScreenConfig {
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub custom: Vec<CustomModeConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirror: Option<ModeMonitors>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extend: Option<ModeMonitors>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only_one: Option<ModeMonitors>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub single: Option<MonitorConfig>,
}

/// Screen identity to screen layouts. This is the unit of persistence.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(transparent)]
pub struct Configuration(BTreeMap<String, ScreenConfig>);

impl Deref for Configuration {
    type Target = BTreeMap<String, ScreenConfig>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Configuration {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl FromIterator<(String, ScreenConfig)> for Configuration {
    fn from_iter<I: IntoIterator<Item = (String, ScreenConfig)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// Older files write `null` for lists that were never filled.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// serde_json writes NaN and infinity as `null`, which would not load again.
fn finite_f64<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if !value.is_finite() {
        return Err(serde::ser::Error::custom(format!(
            "refresh rate {value} is not a finite number"
        )));
    }
    serializer.serialize_f64(*value)
}

/// An output as currently reported by the compositor.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveMonitor {
    pub uuid: String,
    pub name: String,
    pub make: String,
    pub model: String,
    pub serial: String,
    pub enabled: bool,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub refresh_rate: f64,
    pub transform: i32,
}

/// Live monitors keyed by their output handle.
pub type LiveMonitors = BTreeMap<String, LiveMonitor>;

impl From<&LiveMonitor> for MonitorConfig {
    fn from(mon: &LiveMonitor) -> Self {
        let (rotation, reflect) = transform_to_randr(mon.transform);
        if !mon.enabled {
            return Self {
                uuid: mon.uuid.clone(),
                name: mon.name.clone(),
                rotation,
                reflect,
                ..Default::default()
            };
        }

        Self {
            uuid: mon.uuid.clone(),
            name: mon.name.clone(),
            enabled: true,
            x: mon.x.clamp(i16::MIN.into(), i16::MAX.into()) as i16,
            y: mon.y.clamp(i16::MIN.into(), i16::MAX.into()) as i16,
            width: mon.width.clamp(0, u16::MAX.into()) as u16,
            height: mon.height.clamp(0, u16::MAX.into()) as u16,
            rotation,
            reflect,
            refresh_rate: mon.refresh_rate,
            primary: false,
        }
    }
}

/// Maps a Wayland output transform onto RandR rotation and reflect bits.
pub fn transform_to_randr(transform: i32) -> (u16, u16) {
    let rotation = match transform.rem_euclid(4) {
        1 => ROTATION_90,
        2 => ROTATION_180,
        3 => ROTATION_270,
        _ => ROTATION_0,
    };
    let reflect = if (4..8).contains(&transform) {
        REFLECT_X
    } else {
        REFLECT_NONE
    };
    (rotation, reflect)
}
