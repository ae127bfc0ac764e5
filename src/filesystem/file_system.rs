use indextree::{Arena, NodeId};
use snafu::prelude::*;
use tracing::debug;

use crate::filesystem::error::{FsError, InvalidPathSnafu};
use crate::filesystem::node::{Node, NodeKind};

/// One row of an `ls` listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub name: String,
    pub kind: NodeKind,
}

/// The simulated namespace: a node arena, its root and the current-directory cursor.
///
/// Every node lives in `arena`. The arena keeps the parent back-reference of each
/// node, so moving a node keeps its identity and the cursor never dangles.
#[derive(Debug, Clone)]
pub struct FileSystem {
    pub(crate) arena: Arena<Node>,
    pub(crate) root: NodeId,
    pub(crate) current: NodeId,
}

impl Default for FileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem {
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(Node::root());
        Self {
            arena,
            root,
            current: root,
        }
    }

    /// Builds a filesystem around an already populated arena.
    pub(crate) fn from_parts(arena: Arena<Node>, root: NodeId) -> Self {
        Self {
            arena,
            root,
            current: root,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn current_directory(&self) -> NodeId {
        self.current
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.arena
            .get(id)
            .filter(|node| !node.is_removed())
            .map(|node| node.get())
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.arena
            .get_mut(id)
            .filter(|node| !node.is_removed())
            .map(|node| node.get_mut())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).and_then(|node| node.parent())
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.children(&self.arena)
    }

    /// Name of the directory the cursor points at.
    pub fn current_name(&self) -> &str {
        self.node(self.current).map(Node::name).unwrap_or_default()
    }

    /// Absolute path of the current directory.
    pub fn pwd(&self) -> String {
        self.path_of(self.current)
    }

    pub fn ls(&self, path: Option<&str>) -> Result<Vec<Listing>, FsError> {
        let target = match path {
            Some(path) if !path.is_empty() => self.resolve_directory(self.current, path)?,
            _ => self.current,
        };

        Ok(self
            .children(target)
            .filter_map(|id| self.node(id))
            .map(|node| Listing {
                name: node.name().to_string(),
                kind: node.kind(),
            })
            .collect())
    }

    pub fn cd(&mut self, path: &str) -> Result<(), FsError> {
        let target = match path {
            "/" => self.root,
            ".." => {
                ensure!(
                    self.current != self.root,
                    InvalidPathSnafu {
                        path,
                        reason: "cannot move up from root directory",
                    }
                );
                self.parent(self.current).unwrap_or(self.root)
            }
            _ => self.resolve_directory(self.current, path)?,
        };

        debug!("Changing current directory to {}", self.path_of(target));
        self.current = target;
        Ok(())
    }

    /// Moves the cursor to the given directory. Used when re-anchoring after a load.
    pub(crate) fn set_current(&mut self, id: NodeId) {
        if self.node(id).is_some_and(Node::is_directory) {
            self.current = id;
        }
    }

    /// Number of live nodes, the root included.
    pub fn len(&self) -> usize {
        self.root.descendants(&self.arena).count()
    }
}
