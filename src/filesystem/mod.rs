//! In-memory filesystem tree.
//!
//! Nodes live in an arena owned by [`FileSystem`]. The arena keeps explicit
//! parent back-references, so navigation, moves and removals never have to
//! search the tree for a parent.

mod content;
mod error;
mod file_system;
mod mutator;
mod node;
mod path_resolver;

pub use error::FsError;
pub use file_system::FileSystem;
pub use node::{Node, NodeKind, ROOT_NAME, is_valid_name};
