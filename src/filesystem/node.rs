use derive_more::Display;

/// Name of the root directory.
pub const ROOT_NAME: &str = "/";

/// Represents the type of a filesystem node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum NodeKind {
    #[display("directory")]
    Directory,
    #[display("file")]
    File,
}

/// A single directory or file stored in the tree arena.
///
/// Children are not stored here: the arena keeps the parent/child links, so a
/// node only carries what belongs to it alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    name: String,
    kind: NodeKind,
    content: String,
}

impl Node {
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Directory,
            content: String::new(),
        }
    }

    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::File,
            content: String::new(),
        }
    }

    pub fn root() -> Self {
        Self::directory(ROOT_NAME)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_directory(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Replaces the content of a file. Directories never carry content.
    pub(crate) fn set_content(&mut self, content: impl Into<String>) {
        if self.kind == NodeKind::File {
            self.content = content.into();
        }
    }
}

/// Checks that `name` can be stored as a single path component.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains('/')
}
