use std::path::PathBuf;

use crate::cli::Cli;
use crate::config::Settings;
use crate::persistence::{SnapshotFormat, SnapshotStore};

/// Effective configuration: the settings file overridden by command-line flags.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub state_file: PathBuf,
    pub load_on_start: bool,
    pub autosave_on_signal: bool,
    pub format: SnapshotFormat,
    pub compression_level: i32,
}

impl RuntimeConfig {
    pub fn new(cli: Cli, settings: Settings) -> Self {
        Self {
            state_file: cli.state_file.unwrap_or(settings.state_file),
            load_on_start: cli.load,
            autosave_on_signal: settings.autosave_on_signal,
            format: cli.format.unwrap_or(settings.format),
            compression_level: settings.compression_level,
        }
    }

    pub fn store(&self) -> SnapshotStore {
        SnapshotStore::new(self.format, self.compression_level)
    }
}
