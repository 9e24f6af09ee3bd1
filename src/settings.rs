//! Optional `dispstore.toml` in the XDG config directory.

use std::path::PathBuf;

use serde::Deserialize;

pub const APP_NAME: &str = "dispstore";
pub const STORE_FILENAME: &str = "display.json";

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    WlrRandr,
    Hyprctl,
}

#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub backend: Option<BackendKind>,
    pub executable: Option<String>,
    /// Display configuration file, `$XDG_CONFIG_HOME/dispstore/display.json`
    /// when unset.
    pub store: Option<PathBuf>,
    pub pretty: bool,
}

impl Settings {
    pub fn read() -> anyhow::Result<Self> {
        let base_directories = xdg::BaseDirectories::new()?;
        let path = base_directories.get_config_file(format!("{APP_NAME}.toml"));

        let contents = std::fs::read(path);

        if let Err(ref err) = contents {
            if err.kind() == std::io::ErrorKind::NotFound {
                return Ok(Default::default());
            }
        }

        Self::parse(std::str::from_utf8(&contents?)?)
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

pub fn default_store_path() -> anyhow::Result<PathBuf> {
    let base_directories = xdg::BaseDirectories::with_prefix(APP_NAME)?;
    Ok(base_directories.get_config_file(STORE_FILENAME))
}
