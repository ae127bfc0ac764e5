//! Path resolution against the node arena.
//!
//! Paths are relative to a starting node and split on `/`. The only absolute
//! path is the bare `/`, which names the root. `..` walks the parent
//! back-reference kept by the arena and is an error at the root.

use indextree::NodeId;
use snafu::prelude::*;

use crate::filesystem::error::{FsError, InvalidPathSnafu, NotFoundSnafu};
use crate::filesystem::file_system::FileSystem;
use crate::filesystem::node::Node;

const SEPARATOR: char = '/';

impl FileSystem {
    /// Resolves `path` starting from `start`.
    ///
    /// Fails as a whole when any component is missing; there is no partial result.
    pub fn resolve(&self, start: NodeId, path: &str) -> Result<NodeId, FsError> {
        match path {
            "" | "." => return Ok(start),
            "/" => return Ok(self.root),
            _ => {}
        }

        ensure!(
            !path.starts_with(SEPARATOR),
            InvalidPathSnafu {
                path,
                reason: "only '/' may be used as an absolute path",
            }
        );

        let mut current = start;
        for component in path.split(SEPARATOR) {
            current = match component {
                "" | "." => current,
                ".." => self.parent(current).context(InvalidPathSnafu {
                    path,
                    reason: "cannot move up from root directory",
                })?,
                name => self.child(current, name).context(NotFoundSnafu { name: path })?,
            };
        }

        Ok(current)
    }

    /// Resolves `path` and requires the result to be a directory.
    pub fn resolve_directory(&self, start: NodeId, path: &str) -> Result<NodeId, FsError> {
        let target = self.resolve(start, path).map_err(|e| match e {
            FsError::NotFound { .. } => FsError::DirectoryNotFound {
                path: path.to_string(),
            },
            other => other,
        })?;

        if self.node(target).is_some_and(Node::is_directory) {
            Ok(target)
        } else {
            Err(FsError::NotADirectory {
                path: path.to_string(),
            })
        }
    }

    /// Finds the immediate child of `parent` called `name`.
    pub fn child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.children(parent)
            .find(|id| self.node(*id).is_some_and(|node| node.name() == name))
    }

    /// Builds the absolute path of `id` by walking its ancestors.
    pub fn path_of(&self, id: NodeId) -> String {
        let mut names = id
            .ancestors(&self.arena)
            .filter(|ancestor| *ancestor != self.root)
            .filter_map(|ancestor| self.node(ancestor).map(Node::name))
            .collect::<Vec<_>>();
        names.reverse();

        format!("{SEPARATOR}{}", names.join("/"))
    }

    /// Checks whether `ancestor` is `id` itself or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        id.ancestors(&self.arena).any(|candidate| candidate == ancestor)
    }
}
