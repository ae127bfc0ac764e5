//! Conversion between the live tree and its [`State`] record.
//!
//! Both directions walk the tree with explicit stacks, so snapshot depth is not
//! limited by the call stack.

use std::collections::HashMap;

use hashlink::LinkedHashMap;
use indextree::{Arena, NodeId};
use snafu::prelude::*;
use tracing::{debug, warn};

use crate::filesystem::{FileSystem, Node, ROOT_NAME, is_valid_name};
use crate::persistence::error::{MalformedStateSnafu, SnapshotError};
use crate::persistence::record::{NodeRecord, State};

impl From<&FileSystem> for State {
    fn from(fs: &FileSystem) -> Self {
        State {
            current_directory: fs.pwd(),
            file_system_structure: serialize_tree(fs),
        }
    }
}

impl TryFrom<&State> for FileSystem {
    type Error = SnapshotError;

    fn try_from(state: &State) -> Result<Self, Self::Error> {
        let mut fs = deserialize_tree(&state.file_system_structure)?;
        reanchor_cursor(&mut fs, &state.current_directory);
        Ok(fs)
    }
}

/// Builds the record of the whole tree.
///
/// Nodes are visited in reverse pre-order, so every child record is complete
/// before its parent collects it.
pub fn serialize_tree(fs: &FileSystem) -> NodeRecord {
    let order = fs.root().descendants(&fs.arena).collect::<Vec<_>>();
    let mut built: HashMap<NodeId, NodeRecord> = HashMap::with_capacity(order.len());

    for id in order.into_iter().rev() {
        let Some(node) = fs.node(id) else {
            continue;
        };

        let record = if node.is_directory() {
            let children = fs
                .children(id)
                .filter_map(|child| built.remove(&child))
                .map(|child| (child.name.clone(), child))
                .collect::<LinkedHashMap<_, _>>();
            NodeRecord {
                name: node.name().to_string(),
                is_directory: true,
                content: String::new(),
                children: Some(children),
            }
        } else {
            NodeRecord::file(node.name(), node.content())
        };
        built.insert(id, record);
    }

    built
        .remove(&fs.root())
        .unwrap_or_else(|| NodeRecord::directory(ROOT_NAME))
}

/// Rebuilds a tree from its record. The cursor of the result is the root.
pub fn deserialize_tree(record: &NodeRecord) -> Result<FileSystem, SnapshotError> {
    ensure!(
        record.is_directory,
        MalformedStateSnafu {
            reason: "the root node must be a directory",
        }
    );
    ensure!(
        record.name == ROOT_NAME,
        MalformedStateSnafu {
            reason: format!("the root node must be named '{ROOT_NAME}', got '{}'", record.name),
        }
    );

    let mut arena = Arena::new();
    let root = arena.new_node(Node::root());

    let mut stack = vec![(record, root)];
    while let Some((parent_record, parent_id)) = stack.pop() {
        let Some(children) = parent_record.children.as_ref() else {
            continue;
        };

        for (key, child) in children {
            validate_child(parent_record, key, child)?;

            let node = if child.is_directory {
                Node::directory(child.name.as_str())
            } else {
                let mut node = Node::file(child.name.as_str());
                node.set_content(child.content.as_str());
                node
            };
            let child_id = arena.new_node(node);
            parent_id.append(child_id, &mut arena);
            stack.push((child, child_id));
        }
    }

    debug!("Rebuilt tree with {} nodes", arena.len());
    Ok(FileSystem::from_parts(arena, root))
}

fn validate_child(parent: &NodeRecord, key: &str, child: &NodeRecord) -> Result<(), SnapshotError> {
    ensure!(
        key == child.name,
        MalformedStateSnafu {
            reason: format!(
                "entry '{key}' in '{}' holds a node named '{}'",
                parent.name, child.name
            ),
        }
    );
    ensure!(
        is_valid_name(&child.name),
        MalformedStateSnafu {
            reason: format!("'{}' is not a valid node name", child.name),
        }
    );
    let has_children = child
        .children
        .as_ref()
        .is_some_and(|children| !children.is_empty());
    ensure!(
        child.is_directory || !has_children,
        MalformedStateSnafu {
            reason: format!("file '{}' has children", child.name),
        }
    );
    Ok(())
}

/// Points the cursor of a freshly loaded tree at the saved directory.
///
/// A saved value starting with `/` is a full path. Anything else is a bare
/// directory name, accepted only when exactly one directory carries it.
/// Whatever cannot be resolved leaves the cursor at the root.
fn reanchor_cursor(fs: &mut FileSystem, saved: &str) {
    let target = match saved.strip_prefix('/') {
        Some(relative) => fs.resolve_directory(fs.root(), relative).ok(),
        None => find_unique_directory(fs, saved),
    };

    match target {
        Some(id) => fs.set_current(id),
        None => warn!(
            "Saved current directory '{}' cannot be resolved, starting at root",
            saved
        ),
    }
}

fn find_unique_directory(fs: &FileSystem, name: &str) -> Option<NodeId> {
    let mut matches = fs.root().descendants(&fs.arena).filter(|id| {
        fs.node(*id)
            .is_some_and(|node| node.is_directory() && node.name() == name)
    });

    let first = matches.next()?;
    if matches.next().is_some() {
        warn!("Directory name '{}' is ambiguous in the loaded tree", name);
        return None;
    }
    Some(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::FsError;

    /// `/docs/{readme.md, drafts/{v1.txt, old/{}}}`, `/bin/tool`, cursor at `/docs/drafts`.
    fn sample() -> FileSystem {
        let mut fs = FileSystem::new();
        fs.mkdir("docs").unwrap();
        fs.mkdir("bin").unwrap();
        fs.cd("bin").unwrap();
        fs.touch("tool").unwrap();
        fs.write("tool", "#!/bin/sh\necho hi").unwrap();
        fs.cd("../docs").unwrap();
        fs.touch("readme.md").unwrap();
        fs.write("readme.md", "hello").unwrap();
        fs.mkdir("drafts").unwrap();
        fs.cd("drafts").unwrap();
        fs.touch("v1.txt").unwrap();
        fs.write("v1.txt", "first draft").unwrap();
        fs.mkdir("old").unwrap();
        fs
    }

    #[test]
    fn serialize_emits_children_in_insertion_order() {
        let record = serialize_tree(&sample());

        assert_eq!(record.name, "/");
        assert!(record.is_directory);
        let top = record.children.as_ref().unwrap();
        assert_eq!(top.keys().collect::<Vec<_>>(), vec!["docs", "bin"]);

        let docs = &top["docs"];
        let docs_children = docs.children.as_ref().unwrap();
        assert_eq!(
            docs_children.keys().collect::<Vec<_>>(),
            vec!["readme.md", "drafts"]
        );
        assert_eq!(docs_children["readme.md"].content, "hello");
        assert!(docs_children["readme.md"].children.is_none());
    }

    #[test]
    fn serialize_then_deserialize_reproduces_tree() {
        let original = serialize_tree(&sample());
        let rebuilt = deserialize_tree(&original).unwrap();

        assert_eq!(serialize_tree(&rebuilt), original);
        assert_eq!(rebuilt.len(), 8);
    }

    #[test]
    fn state_round_trip_restores_cursor_by_full_path() {
        let fs = sample();
        let state = State::from(&fs);
        assert_eq!(state.current_directory, "/docs/drafts");

        let mut restored = FileSystem::try_from(&state).unwrap();
        assert_eq!(restored.pwd(), "/docs/drafts");
        assert_eq!(restored.cat("v1.txt").unwrap(), "first draft");

        restored.cd("..").unwrap();
        assert_eq!(restored.pwd(), "/docs");
    }

    #[test]
    fn deep_trees_round_trip() {
        let mut fs = FileSystem::new();
        for level in 0..500 {
            fs.mkdir(&format!("d{level}")).unwrap();
            fs.cd(&format!("d{level}")).unwrap();
        }
        fs.touch("leaf").unwrap();

        let state = State::from(&fs);
        let restored = FileSystem::try_from(&state).unwrap();
        assert_eq!(restored.pwd(), fs.pwd());
        assert_eq!(restored.cat("leaf").unwrap(), "");
    }

    #[test]
    fn mutations_with_special_sources_keep_tree_restorable() {
        let mut fs = FileSystem::new();
        fs.mkdir("a").unwrap();
        fs.cd("a").unwrap();
        fs.mkdir("b").unwrap();
        fs.cd("b").unwrap();
        fs.touch("f").unwrap();

        let pairs = [
            ("/", "."),
            ("/", ".."),
            ("/", "/"),
            (".", ".."),
            (".", "/"),
            ("..", "."),
            ("..", "/"),
        ];
        for (source, destination) in pairs {
            let _ = fs.cp(source, destination);
            let _ = fs.mv(source, destination);
        }

        let state = State::from(&fs);
        let restored = FileSystem::try_from(&state).unwrap();
        assert_eq!(State::from(&restored), state);
        assert_eq!(restored.len(), fs.len());
    }

    #[test]
    fn legacy_name_only_cursor_is_resolved_when_unique() {
        let state = State {
            current_directory: "drafts".into(),
            file_system_structure: serialize_tree(&sample()),
        };

        let restored = FileSystem::try_from(&state).unwrap();
        assert_eq!(restored.pwd(), "/docs/drafts");
    }

    #[test]
    fn ambiguous_or_missing_cursor_falls_back_to_root() {
        let record = NodeRecord::directory("/")
            .with_child(NodeRecord::directory("a").with_child(NodeRecord::directory("x")))
            .with_child(NodeRecord::directory("b").with_child(NodeRecord::directory("x")));

        for saved in ["x", "/missing", "/a/x/..x", "nowhere"] {
            let state = State {
                current_directory: saved.into(),
                file_system_structure: record.clone(),
            };
            let restored = FileSystem::try_from(&state).unwrap();
            assert_eq!(restored.pwd(), "/", "cursor for {saved:?}");
        }
    }

    #[test]
    fn root_cursor_as_bare_slash_is_resolved() {
        let state = State {
            current_directory: "/".into(),
            file_system_structure: NodeRecord::directory("/"),
        };
        let restored = FileSystem::try_from(&state).unwrap();
        assert_eq!(restored.current_directory(), restored.root());
    }

    #[test]
    fn malformed_records_are_rejected() {
        let file_root = NodeRecord::file("/", "");
        assert!(deserialize_tree(&file_root).unwrap_err().is_malformed());

        let misnamed_root = NodeRecord::directory("root");
        assert!(deserialize_tree(&misnamed_root).is_err());

        let mut mismatched = NodeRecord::directory("/");
        mismatched
            .children
            .as_mut()
            .unwrap()
            .insert("key".into(), NodeRecord::file("other", ""));
        assert!(deserialize_tree(&mismatched).is_err());

        let mut file_with_children = NodeRecord::file("f", "");
        file_with_children.children = Some(
            [("g".to_string(), NodeRecord::file("g", ""))]
                .into_iter()
                .collect(),
        );
        let record = NodeRecord::directory("/").with_child(file_with_children);
        assert!(deserialize_tree(&record).is_err());

        let bad_name = NodeRecord::directory("/").with_child(NodeRecord::directory("a/b"));
        assert!(deserialize_tree(&bad_name).is_err());
    }

    #[test]
    fn loaded_tree_supports_parent_navigation_at_depth() {
        let record = NodeRecord::directory("/").with_child(
            NodeRecord::directory("a")
                .with_child(NodeRecord::directory("b").with_child(NodeRecord::directory("c"))),
        );
        let state = State {
            current_directory: "/a/b/c".into(),
            file_system_structure: record,
        };

        let mut fs = FileSystem::try_from(&state).unwrap();
        fs.cd("..").unwrap();
        assert_eq!(fs.pwd(), "/a/b");
        fs.rm("c").unwrap();
        assert!(matches!(fs.cd("c"), Err(FsError::DirectoryNotFound { .. })));
    }
}
