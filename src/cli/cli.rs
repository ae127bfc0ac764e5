use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;
use crate::config::SETTINGS_FILE_NAME;
use crate::persistence::SnapshotFormat;

/// Interactive shell over an in-memory filesystem.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// Load the state file before starting the shell
    #[clap(long)]
    pub load: bool,

    /// Snapshot file used by `save`, `load` and the shutdown autosave
    #[clap(long, short)]
    pub state_file: Option<PathBuf>,

    /// Encoding used when writing snapshots
    #[clap(long, short, value_enum)]
    pub format: Option<SnapshotFormat>,

    /// Optional YAML settings file
    #[clap(long, short, default_value = SETTINGS_FILE_NAME)]
    pub config: PathBuf,
}
