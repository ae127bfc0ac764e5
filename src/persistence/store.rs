use std::path::Path;

use compio::BufResult;
use compio::fs;
use snafu::prelude::*;
use tracing::{debug, info};

use crate::ext::BestEffortPathExt;
use crate::filesystem::FileSystem;
use crate::persistence::codec::{self, DEFAULT_COMPRESSION_LEVEL, SnapshotFormat};
use crate::persistence::error::{ReadSnafu, SnapshotError, WriteSnafu};
use crate::persistence::record::State;

/// Reads and writes whole-tree snapshots on the host filesystem.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotStore {
    format: SnapshotFormat,
    compression_level: i32,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(SnapshotFormat::default(), DEFAULT_COMPRESSION_LEVEL)
    }
}

impl SnapshotStore {
    pub fn new(format: SnapshotFormat, compression_level: i32) -> Self {
        Self {
            format,
            compression_level,
        }
    }

    /// Takes a snapshot of `file_system` and writes it to `path`.
    pub async fn save(&self, path: &Path, file_system: &FileSystem) -> Result<(), SnapshotError> {
        let state = State::from(file_system);
        let bytes = codec::encode(&state, self.format, self.compression_level)?;
        debug!(
            "Writing {} snapshot of {} bytes to {}",
            self.format,
            bytes.len(),
            path.best_effort_path_display()
        );

        let BufResult(result, _) = fs::write(path, bytes).await;
        result.context(WriteSnafu {
            file_path: path.best_effort_path_display(),
        })?;

        info!("Saved state to {}", path.best_effort_path_display());
        Ok(())
    }

    /// Reads the snapshot at `path` into a new filesystem.
    ///
    /// The caller's current tree is never touched: it is only replaced once this
    /// returns successfully.
    pub async fn load(&self, path: &Path) -> Result<FileSystem, SnapshotError> {
        debug!("Reading snapshot from {}", path.best_effort_path_display());
        let bytes = fs::read(path).await.context(ReadSnafu {
            file_path: path.best_effort_path_display(),
        })?;

        let state = codec::decode(&bytes)?;
        let file_system = FileSystem::try_from(&state)?;

        info!(
            "Loaded {} nodes from {}",
            file_system.len(),
            path.best_effort_path_display()
        );
        Ok(file_system)
    }
}
