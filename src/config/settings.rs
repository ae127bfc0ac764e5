use std::path::{Path, PathBuf};

use clap::ValueEnum;
use compio::fs;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::debug;

use crate::ext::BestEffortPathExt;
use crate::persistence::{DEFAULT_COMPRESSION_LEVEL, SnapshotFormat};

pub const SETTINGS_FILE_NAME: &str = "treefs.yaml";
pub const DEFAULT_STATE_FILE: &str = "autosave.json";

/// Settings read from the optional YAML file. Every key has a default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub state_file: PathBuf,
    pub format: SnapshotFormat,
    pub autosave_on_signal: bool,
    pub compression_level: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
            format: SnapshotFormat::default(),
            autosave_on_signal: true,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

impl Settings {
    /// Reads the settings file at `path`. A missing file yields the defaults.
    pub async fn read(path: &Path) -> Result<Self, SettingsError> {
        debug!("Opening settings file: {}", path.best_effort_path_display());
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).context(ReadSnafu {
                    file_path: path.best_effort_path_display(),
                });
            }
        };

        let contents = String::from_utf8_lossy(&bytes);
        Self::try_from(&*contents)
    }

    fn apply(&mut self, key: &str, value: &Yaml) -> Result<(), SettingsError> {
        match key {
            "state_file" => {
                let path = value.as_str().context(InvalidValueSnafu {
                    key,
                    expected: "a path",
                })?;
                self.state_file = PathBuf::from(path);
            }
            "format" => {
                self.format = value
                    .as_str()
                    .and_then(|name| SnapshotFormat::from_str(name, true).ok())
                    .context(InvalidValueSnafu {
                        key,
                        expected: "'json' or 'compact'",
                    })?;
            }
            "autosave_on_signal" => {
                self.autosave_on_signal = value.as_bool().context(InvalidValueSnafu {
                    key,
                    expected: "a boolean",
                })?;
            }
            "compression_level" => {
                self.compression_level = value
                    .as_integer()
                    .and_then(|level| i32::try_from(level).ok())
                    .filter(|level| zstd::compression_level_range().contains(level))
                    .context(InvalidValueSnafu {
                        key,
                        expected: "a zstd compression level",
                    })?;
            }
            _ => debug!("Ignoring unknown setting: {}", key),
        }
        Ok(())
    }
}

impl TryFrom<&str> for Settings {
    type Error = SettingsError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let mut settings = Settings::default();

        let document = match documents.first() {
            None | Some(Yaml::Value(Scalar::Null)) => return Ok(settings),
            Some(document) => document,
        };

        let top_level = document
            .as_mapping()
            .ok_or(SettingsError::TopLevelNotMap)?;

        for (key, value) in top_level {
            match key.as_str() {
                Some(key) => settings.apply(key, value)?,
                None => debug!("Skipping non-string settings key: {:?}", key),
            }
        }

        Ok(settings)
    }
}

#[derive(Debug, Snafu)]
pub enum SettingsError {
    #[snafu(display("Failed to read the settings file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to parse the settings file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Top level of the settings file should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Setting '{}' should be {}", key, expected))]
    InvalidValueError { key: String, expected: &'static str },
}
