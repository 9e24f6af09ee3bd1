//! Loading and saving the display configuration file.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Serialize;

use crate::types::{Configuration, ScreenConfig};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read {}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {}", .path.display())]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to encode display configuration")]
    Encode(#[source] serde_json::Error),
    #[error("failed to write {}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

impl StoreError {
    /// True when loading failed because the file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Read { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

/// Reads the whole configuration from `path`.
///
/// A missing or malformed file is an error, never an empty configuration.
pub fn load(path: &Path) -> Result<Configuration, StoreError> {
    let data = fs::read(path).map_err(|source| StoreError::Read {
        path: path.to_owned(),
        source,
    })?;
    let config: Configuration =
        serde_json::from_slice(&data).map_err(|source| StoreError::Decode {
            path: path.to_owned(),
            source,
        })?;
    debug!("Loaded {} screen config(s) from {}", config.len(), path.display());
    Ok(config)
}

/// Writes the whole configuration to `path`, indented by four spaces when
/// `pretty` is set.
///
/// The data goes to a temporary file next to `path` which is then renamed
/// over it, so readers never observe a partially written file.
pub fn save(config: &Configuration, path: &Path, pretty: bool) -> Result<(), StoreError> {
    let data = encode(config, pretty).map_err(StoreError::Encode)?;
    let write_err = |source| StoreError::Write {
        path: path.to_owned(),
        source,
    };

    let Some(file_name) = path.file_name() else {
        return Err(write_err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "path has no file name",
        )));
    };
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    create_dir(dir).map_err(write_err)?;

    let mut tmp_name = std::ffi::OsString::from(".");
    tmp_name.push(file_name);
    tmp_name.push(format!(".tmp-{}", std::process::id()));
    let tmp = dir.join(tmp_name);

    let result = write_file(&tmp, &data).and_then(|()| fs::rename(&tmp, path));
    if let Err(err) = result {
        let _ = fs::remove_file(&tmp);
        return Err(write_err(err));
    }

    info!("Saved {} screen config(s) to {}", config.len(), path.display());
    Ok(())
}

fn encode(config: &Configuration, pretty: bool) -> serde_json::Result<Vec<u8>> {
    if !pretty {
        return serde_json::to_vec(config);
    }
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    config.serialize(&mut ser)?;
    Ok(buf)
}

#[cfg(unix)]
fn create_dir(dir: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    fs::DirBuilder::new().recursive(true).mode(0o755).create(dir)
}

#[cfg(not(unix))]
fn create_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)
}

fn write_file(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }

    let mut file = options.open(path)?;
    file.write_all(data)?;
    file.sync_all()
}

/// In-memory configuration bound to the file it came from.
#[derive(Debug)]
pub struct Repository {
    path: PathBuf,
    config: Configuration,
}

impl Repository {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let config = load(&path)?;
        Ok(Self { path, config })
    }

    /// Like [`Repository::open`], but a missing file yields an empty
    /// configuration. Unreadable or malformed files are still errors.
    pub fn open_or_default(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        match load(&path) {
            Ok(config) => Ok(Self { path, config }),
            Err(err) if err.is_not_found() => {
                debug!("No display configuration at {}, starting empty", path.display());
                Ok(Self {
                    path,
                    config: Configuration::default(),
                })
            }
            Err(err) => Err(err),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Reads the file again. On failure the current state is kept.
    pub fn reload(&mut self) -> Result<(), StoreError> {
        self.config = load(&self.path)?;
        Ok(())
    }

    pub fn commit(&self, pretty: bool) -> Result<(), StoreError> {
        save(&self.config, &self.path, pretty)
    }

    pub fn screen(&self, id: &str) -> Option<&ScreenConfig> {
        self.config.get(id)
    }

    /// Screen config for `id`, created empty on first use.
    pub fn screen_mut(&mut self, id: &str) -> &mut ScreenConfig {
        self.config.entry(id.to_string()).or_default()
    }
}
