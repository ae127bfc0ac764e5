use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SnapshotError {
    #[snafu(display("Malformed state: {}", reason))]
    MalformedState { reason: String },
    #[snafu(display("Malformed state: invalid JSON"))]
    JsonError { source: serde_json::Error },
    #[snafu(display("Malformed state: cannot decode compact snapshot"))]
    DecodeError {
        source: bincode::error::DecodeError,
    },
    #[snafu(display("Failed to encode compact snapshot"))]
    EncodeError {
        source: bincode::error::EncodeError,
    },
    #[snafu(display("Failed to compress or decompress snapshot"))]
    CompressionError { source: std::io::Error },
    #[snafu(display("Failed to read state file {}: {}", file_path, source))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to write state file {}: {}", file_path, source))]
    WriteError {
        file_path: String,
        source: std::io::Error,
    },
}

impl SnapshotError {
    /// True when the data was read but could not be turned back into a tree.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            SnapshotError::MalformedState { .. }
                | SnapshotError::JsonError { .. }
                | SnapshotError::DecodeError { .. }
                | SnapshotError::CompressionError { .. }
        )
    }
}
