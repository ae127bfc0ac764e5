use indextree::NodeId;
use snafu::prelude::*;
use tracing::debug;

use crate::filesystem::error::{
    AlreadyExistsSnafu, CannotCopyRootSnafu, CannotMoveRootSnafu, FsError, InvalidNameSnafu, MoveIntoDescendantSnafu,
    NotFoundSnafu, TreeLinkSnafu,
};
use crate::filesystem::file_system::FileSystem;
use crate::filesystem::node::{Node, is_valid_name};

/// Result of `mkdir`: the name that was asked for and the one actually created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MkdirOutcome {
    pub requested: String,
    pub created: String,
}

impl MkdirOutcome {
    pub fn renamed(&self) -> bool {
        self.requested != self.created
    }
}

impl FileSystem {
    /// Creates a directory in the current directory, picking `name1`, `name2`, ...
    /// when `name` is already taken.
    pub fn mkdir(&mut self, name: &str) -> Result<MkdirOutcome, FsError> {
        ensure!(is_valid_name(name), InvalidNameSnafu { name });

        let mut created = name.to_string();
        let mut suffix = 1u64;
        while self.child(self.current, &created).is_some() {
            created = format!("{name}{suffix}");
            suffix += 1;
        }

        self.attach(self.current, Node::directory(created.as_str()))?;
        debug!("Created directory {}", created);

        Ok(MkdirOutcome {
            requested: name.to_string(),
            created,
        })
    }

    /// Creates an empty file in the current directory.
    pub fn touch(&mut self, name: &str) -> Result<(), FsError> {
        ensure!(is_valid_name(name), InvalidNameSnafu { name });
        self.ensure_free(self.current, name)?;

        self.attach(self.current, Node::file(name))?;
        debug!("Created file {}", name);
        Ok(())
    }

    /// Moves the node at `source` under the directory at `destination`.
    ///
    /// The node keeps its identity: it is detached from its parent and appended
    /// to the destination, never duplicated.
    pub fn mv(&mut self, source: &str, destination: &str) -> Result<(), FsError> {
        let source_id = self.resolve(self.current, source)?;
        let destination_id = self.resolve_directory(self.current, destination)?;

        ensure!(source_id != self.root, CannotMoveRootSnafu);
        ensure!(
            !self.is_ancestor_or_self(source_id, destination_id),
            MoveIntoDescendantSnafu {
                source_path: source,
                destination,
            }
        );

        let name = self.name_of(source_id)?;
        self.ensure_free(destination_id, &name)?;

        source_id.detach(&mut self.arena);
        destination_id
            .checked_append(source_id, &mut self.arena)
            .context(TreeLinkSnafu)?;

        debug!("Moved {} to {}", source, self.path_of(destination_id));
        Ok(())
    }

    /// Deep-copies the node at `source` under the directory at `destination`.
    pub fn cp(&mut self, source: &str, destination: &str) -> Result<(), FsError> {
        let source_id = self.resolve(self.current, source)?;
        let destination_id = self.resolve_directory(self.current, destination)?;

        ensure!(source_id != self.root, CannotCopyRootSnafu);
        let name = self.name_of(source_id)?;
        self.ensure_free(destination_id, &name)?;

        let copy = self.deep_copy(source_id)?;
        destination_id
            .checked_append(copy, &mut self.arena)
            .context(TreeLinkSnafu)?;

        debug!("Copied {} to {}", source, self.path_of(destination_id));
        Ok(())
    }

    /// Removes a child of the current directory together with its whole subtree.
    ///
    /// `/`, `.` and `..` are resolved like paths; every other name must be an
    /// immediate child of the current directory.
    pub fn rm(&mut self, name: &str) -> Result<(), FsError> {
        let target = match name {
            "" | "." | ".." | "/" => self.resolve(self.current, name)?,
            _ => self
                .child(self.current, name)
                .context(NotFoundSnafu { name })?,
        };

        let parent = self.parent(target).ok_or(FsError::CannotRemoveRoot)?;

        if self.is_ancestor_or_self(target, self.current) {
            debug!(
                "Current directory is inside {}, moving to its parent",
                self.path_of(target)
            );
            self.current = parent;
        }

        let released = target.descendants(&self.arena).count();
        target.remove_subtree(&mut self.arena);
        debug!("Removed {} ({} nodes)", name, released);
        Ok(())
    }

    fn attach(&mut self, parent: NodeId, node: Node) -> Result<NodeId, FsError> {
        let id = self.arena.new_node(node);
        parent
            .checked_append(id, &mut self.arena)
            .context(TreeLinkSnafu)?;
        Ok(id)
    }

    fn ensure_free(&self, parent: NodeId, name: &str) -> Result<(), FsError> {
        ensure!(
            self.child(parent, name).is_none(),
            AlreadyExistsSnafu {
                name,
                location: self.path_of(parent),
            }
        );
        Ok(())
    }

    fn name_of(&self, id: NodeId) -> Result<String, FsError> {
        self.node(id)
            .map(|node| node.name().to_string())
            .context(NotFoundSnafu {
                name: self.path_of(id),
            })
    }

    /// Duplicates the subtree under `source` and returns the detached copy.
    ///
    /// Walks with an explicit stack. Children are appended in the order they are
    /// visited, so the copy keeps the original insertion order.
    fn deep_copy(&mut self, source: NodeId) -> Result<NodeId, FsError> {
        let root_node = self.node(source).cloned().context(NotFoundSnafu {
            name: self.path_of(source),
        })?;
        let copy_root = self.arena.new_node(root_node);

        let mut stack = vec![(source, copy_root)];
        while let Some((original, copy)) = stack.pop() {
            let children = self.children(original).collect::<Vec<_>>();
            for child in children {
                let Some(node) = self.node(child).cloned() else {
                    continue;
                };
                let child_copy = self.arena.new_node(node);
                copy.checked_append(child_copy, &mut self.arena)
                    .context(TreeLinkSnafu)?;
                stack.push((child, child_copy));
            }
        }

        Ok(copy_root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::node::NodeKind;
    use rstest::rstest;

    fn listing(fs: &FileSystem, path: &str) -> Vec<String> {
        fs.ls(Some(path))
            .unwrap()
            .into_iter()
            .map(|entry| entry.name)
            .collect()
    }

    #[test]
    fn mkdir_creates_directory_in_current_directory() {
        let mut fs = FileSystem::new();
        let outcome = fs.mkdir("test_dir").unwrap();

        assert!(!outcome.renamed());
        let id = fs.child(fs.root(), "test_dir").unwrap();
        assert_eq!(fs.node(id).unwrap().kind(), NodeKind::Directory);
    }

    #[test]
    fn mkdir_twice_creates_suffixed_name() {
        let mut fs = FileSystem::new();
        fs.mkdir("a").unwrap();
        let outcome = fs.mkdir("a").unwrap();

        assert!(outcome.renamed());
        assert_eq!(outcome.requested, "a");
        assert_eq!(outcome.created, "a1");
    }

    #[test]
    fn mkdir_suffixes_have_no_gaps() {
        let mut fs = FileSystem::new();
        let created = (0..6)
            .map(|_| fs.mkdir("base").unwrap().created)
            .collect::<Vec<_>>();

        assert_eq!(
            created,
            vec!["base", "base1", "base2", "base3", "base4", "base5"]
        );
    }

    #[test]
    fn mkdir_skips_names_taken_by_files() {
        let mut fs = FileSystem::new();
        fs.touch("log").unwrap();
        fs.touch("log1").unwrap();

        assert_eq!(fs.mkdir("log").unwrap().created, "log2");
    }

    #[test]
    fn mkdir_rejects_invalid_names() {
        let mut fs = FileSystem::new();
        for name in ["", ".", "..", "a/b"] {
            assert!(matches!(fs.mkdir(name), Err(FsError::InvalidName { .. })));
        }
        assert!(fs.ls(None).unwrap().is_empty());
    }

    #[test]
    fn touch_creates_empty_file() {
        let mut fs = FileSystem::new();
        fs.touch("test_file.txt").unwrap();

        let id = fs.child(fs.root(), "test_file.txt").unwrap();
        let node = fs.node(id).unwrap();
        assert!(!node.is_directory());
        assert_eq!(node.content(), "");
    }

    #[test]
    fn touch_twice_fails_and_leaves_tree_unchanged() {
        let mut fs = FileSystem::new();
        fs.touch("f.txt").unwrap();
        fs.write("f.txt", "keep me").unwrap();

        let result = fs.touch("f.txt");
        assert!(matches!(result, Err(FsError::AlreadyExists { .. })));
        assert_eq!(fs.len(), 2);
        assert_eq!(fs.cat("f.txt").unwrap(), "keep me");
    }

    #[test]
    fn touch_collides_with_directories_too() {
        let mut fs = FileSystem::new();
        fs.mkdir("name").unwrap();
        assert!(matches!(
            fs.touch("name"),
            Err(FsError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn mv_transfers_the_node() {
        let mut fs = FileSystem::new();
        fs.mkdir("src").unwrap();
        fs.mkdir("dst").unwrap();
        fs.cd("src").unwrap();
        fs.touch("file.txt").unwrap();
        fs.write("file.txt", "payload").unwrap();
        fs.cd("/").unwrap();

        let before = fs.len();
        fs.mv("src/file.txt", "dst").unwrap();

        assert!(listing(&fs, "src").is_empty());
        assert_eq!(listing(&fs, "dst"), vec!["file.txt"]);
        assert_eq!(fs.len(), before);

        fs.cd("dst").unwrap();
        assert_eq!(fs.cat("file.txt").unwrap(), "payload");
    }

    #[test]
    fn mv_at_depth_keeps_parent_links_consistent() {
        let mut fs = FileSystem::new();
        fs.mkdir("a").unwrap();
        fs.cd("a").unwrap();
        fs.mkdir("b").unwrap();
        fs.cd("b").unwrap();
        fs.mkdir("c").unwrap();
        fs.cd("/").unwrap();
        fs.mkdir("target").unwrap();

        fs.mv("a/b/c", "target").unwrap();
        fs.cd("target/c").unwrap();
        fs.cd("..").unwrap();
        assert_eq!(fs.pwd(), "/target");
    }

    #[test]
    fn mv_keeps_cursor_valid_when_current_directory_moves() {
        let mut fs = FileSystem::new();
        fs.mkdir("a").unwrap();
        fs.mkdir("b").unwrap();
        fs.cd("a").unwrap();

        fs.mv(".", "../b").unwrap();
        assert_eq!(fs.pwd(), "/b/a");
        assert_eq!(fs.current_name(), "a");
    }

    #[test]
    fn mv_failures_leave_tree_unchanged() {
        let mut fs = FileSystem::new();
        fs.mkdir("a").unwrap();
        fs.mkdir("b").unwrap();
        fs.touch("f").unwrap();
        fs.cd("b").unwrap();
        fs.touch("f").unwrap();
        fs.cd("/").unwrap();

        assert!(matches!(fs.mv("missing", "a"), Err(FsError::NotFound { .. })));
        assert!(matches!(
            fs.mv("f", "missing"),
            Err(FsError::DirectoryNotFound { .. })
        ));
        assert!(matches!(
            fs.mv("a", "f"),
            Err(FsError::NotADirectory { .. })
        ));
        assert!(matches!(
            fs.mv("f", "b"),
            Err(FsError::AlreadyExists { .. })
        ));
        assert!(matches!(fs.mv("/", "a"), Err(FsError::CannotMoveRoot)));
        assert!(matches!(
            fs.mv("a", "a"),
            Err(FsError::MoveIntoDescendant { .. })
        ));

        assert_eq!(listing(&fs, "/"), vec!["a", "b", "f"]);
        assert_eq!(listing(&fs, "b"), vec!["f"]);
    }

    #[test]
    fn mv_into_own_subtree_is_rejected() {
        let mut fs = FileSystem::new();
        fs.mkdir("a").unwrap();
        fs.cd("a").unwrap();
        fs.mkdir("b").unwrap();
        fs.cd("/").unwrap();

        assert!(matches!(
            fs.mv("a", "a/b"),
            Err(FsError::MoveIntoDescendant { .. })
        ));
        assert_eq!(fs.pwd(), "/");
        assert_eq!(listing(&fs, "a"), vec!["b"]);
    }

    #[test]
    fn cp_then_rm_original_leaves_identical_copy() {
        let mut fs = FileSystem::new();
        fs.mkdir("project").unwrap();
        fs.mkdir("backup").unwrap();
        fs.cd("project").unwrap();
        fs.touch("readme.md").unwrap();
        fs.write("readme.md", "# project").unwrap();
        fs.mkdir("src").unwrap();
        fs.cd("src").unwrap();
        fs.touch("main.rs").unwrap();
        fs.write("main.rs", "fn main() {}").unwrap();
        fs.cd("/").unwrap();

        fs.cp("project", "backup").unwrap();
        fs.rm("project").unwrap();

        assert_eq!(listing(&fs, "/"), vec!["backup"]);
        assert_eq!(listing(&fs, "backup/project"), vec!["readme.md", "src"]);
        assert_eq!(listing(&fs, "backup/project/src"), vec!["main.rs"]);

        fs.cd("backup/project").unwrap();
        assert_eq!(fs.cat("readme.md").unwrap(), "# project");
        fs.cd("src").unwrap();
        assert_eq!(fs.cat("main.rs").unwrap(), "fn main() {}");
    }

    #[test]
    fn cp_produces_independent_copy() {
        let mut fs = FileSystem::new();
        fs.mkdir("dst").unwrap();
        fs.touch("f.txt").unwrap();
        fs.write("f.txt", "original").unwrap();

        fs.cp("f.txt", "dst").unwrap();
        fs.write("f.txt", "changed").unwrap();

        fs.cd("dst").unwrap();
        assert_eq!(fs.cat("f.txt").unwrap(), "original");
    }

    #[test]
    fn cp_into_own_subtree_terminates() {
        let mut fs = FileSystem::new();
        fs.mkdir("a").unwrap();
        fs.cd("a").unwrap();
        fs.mkdir("b").unwrap();
        fs.cd("/").unwrap();

        fs.cp("a", "a/b").unwrap();
        assert_eq!(listing(&fs, "a/b/a"), vec!["b"]);
        assert!(listing(&fs, "a/b/a/b").is_empty());
    }

    #[rstest]
    #[case("/", "/", "a")]
    #[case("/", "/", "/")]
    #[case("a", "..", ".")]
    #[case("a", "/", "..")]
    fn cp_of_root_is_rejected(
        #[case] cursor: &str,
        #[case] source: &str,
        #[case] destination: &str,
    ) {
        let mut fs = FileSystem::new();
        fs.mkdir("a").unwrap();
        fs.cd(cursor).unwrap();

        assert!(matches!(
            fs.cp(source, destination),
            Err(FsError::CannotCopyRoot)
        ));
        assert_eq!(fs.len(), 2);
    }

    #[test]
    fn cp_collision_fails() {
        let mut fs = FileSystem::new();
        fs.mkdir("a").unwrap();
        fs.touch("f").unwrap();
        fs.cp("f", "a").unwrap();

        assert!(matches!(
            fs.cp("f", "a"),
            Err(FsError::AlreadyExists { .. })
        ));
        assert!(matches!(fs.cp("nope", "a"), Err(FsError::NotFound { .. })));
    }

    #[test]
    fn rm_releases_whole_subtree() {
        let mut fs = FileSystem::new();
        fs.mkdir("a").unwrap();
        fs.cd("a").unwrap();
        fs.mkdir("b").unwrap();
        fs.touch("x").unwrap();
        fs.cd("b").unwrap();
        fs.touch("y").unwrap();
        fs.cd("/").unwrap();
        assert_eq!(fs.len(), 5);

        fs.rm("a").unwrap();
        assert_eq!(fs.len(), 1);
        assert!(fs.ls(None).unwrap().is_empty());
    }

    #[test]
    fn rm_only_looks_at_immediate_children() {
        let mut fs = FileSystem::new();
        fs.mkdir("a").unwrap();
        fs.cd("a").unwrap();
        fs.touch("inner").unwrap();
        fs.cd("/").unwrap();

        assert!(matches!(fs.rm("a/inner"), Err(FsError::NotFound { .. })));
        assert!(matches!(fs.rm("inner"), Err(FsError::NotFound { .. })));
        assert_eq!(listing(&fs, "a"), vec!["inner"]);
    }

    #[test]
    fn rm_root_fails_and_leaves_tree_unchanged() {
        let mut fs = FileSystem::new();
        fs.mkdir("a").unwrap();

        assert!(matches!(fs.rm("/"), Err(FsError::CannotRemoveRoot)));
        assert!(matches!(fs.rm("."), Err(FsError::CannotRemoveRoot)));
        assert_eq!(fs.len(), 2);
    }

    #[test]
    fn rm_current_directory_moves_cursor_to_parent() {
        let mut fs = FileSystem::new();
        fs.mkdir("a").unwrap();
        fs.cd("a").unwrap();
        fs.mkdir("b").unwrap();
        fs.cd("b").unwrap();

        fs.rm("..").unwrap();
        assert_eq!(fs.current_directory(), fs.root());
        assert!(fs.ls(None).unwrap().is_empty());
    }
}
