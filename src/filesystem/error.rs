use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum FsError {
    #[snafu(display("'{}' not found", name))]
    NotFound { name: String },
    #[snafu(display("Directory '{}' not found", path))]
    DirectoryNotFound { path: String },
    #[snafu(display("Invalid path '{}': {}", path, reason))]
    InvalidPath { path: String, reason: &'static str },
    #[snafu(display("'{}' already exists in '{}'", name, location))]
    AlreadyExists { name: String, location: String },
    #[snafu(display("'{}' is not a directory", path))]
    NotADirectory { path: String },
    #[snafu(display("Cannot remove root directory"))]
    CannotRemoveRoot,
    #[snafu(display("Cannot move root directory"))]
    CannotMoveRoot,
    #[snafu(display("Cannot copy root directory"))]
    CannotCopyRoot,
    #[snafu(display("Cannot move '{}' into its own subtree '{}'", source_path, destination))]
    MoveIntoDescendant {
        source_path: String,
        destination: String,
    },
    #[snafu(display("'{}' is not a valid name", name))]
    InvalidName { name: String },
    #[snafu(display("Failed to link node into the tree"))]
    TreeLink { source: indextree::NodeError },
}
