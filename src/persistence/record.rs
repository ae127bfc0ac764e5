use hashlink::LinkedHashMap;
use serde::{Deserialize, Serialize};

/// Whole-session snapshot: the tree plus where the cursor was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    /// Absolute path of the current directory. Older snapshots store a bare name.
    pub current_directory: String,
    pub file_system_structure: NodeRecord,
}

/// Serialized form of one node and, for directories, its children in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub name: String,
    pub is_directory: bool,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<LinkedHashMap<String, NodeRecord>>,
}

impl NodeRecord {
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_directory: true,
            content: String::new(),
            children: Some(LinkedHashMap::new()),
        }
    }

    pub fn file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_directory: false,
            content: content.into(),
            children: None,
        }
    }

    /// Adds a child keyed by its own name. Returns `self` for chaining.
    #[cfg(test)]
    pub fn with_child(mut self, child: NodeRecord) -> Self {
        self.children
            .get_or_insert_with(LinkedHashMap::new)
            .insert(child.name.clone(), child);
        self
    }
}
