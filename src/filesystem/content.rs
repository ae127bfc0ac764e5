use indextree::NodeId;
use snafu::prelude::*;
use tracing::debug;

use crate::filesystem::error::{FsError, NotFoundSnafu};
use crate::filesystem::file_system::FileSystem;

impl FileSystem {
    /// Returns the content of a file in the current directory.
    pub fn cat(&self, name: &str) -> Result<&str, FsError> {
        let id = self.file_in_current(name)?;
        Ok(self.node(id).map(|node| node.content()).unwrap_or_default())
    }

    /// Reports whether `pattern` occurs literally in a file of the current directory.
    pub fn grep(&self, name: &str, pattern: &str) -> Result<bool, FsError> {
        self.cat(name).map(|content| content.contains(pattern))
    }

    /// Replaces the content of a file in the current directory.
    pub fn write(&mut self, name: &str, content: &str) -> Result<(), FsError> {
        let id = self.file_in_current(name)?;
        if let Some(node) = self.node_mut(id) {
            node.set_content(content);
        }
        debug!("Wrote {} bytes to {}", content.len(), name);
        Ok(())
    }

    fn file_in_current(&self, name: &str) -> Result<NodeId, FsError> {
        self.child(self.current, name)
            .filter(|id| self.node(*id).is_some_and(|node| !node.is_directory()))
            .context(NotFoundSnafu { name })
    }
}
