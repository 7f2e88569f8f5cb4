use std::sync::Arc;
use std::path::Path;
use std::{fs, fmt};

use rustc_hash::FxHashMap;

use crate::error::{Result, Chainable, Error, ErrorKind};

#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct EntryId(pub(crate) usize);

/// A snapshot of a directory tree, walked serially with entries in sorted
/// order: every directory precedes its children, siblings are ordered by
/// file name.
#[derive(Debug)]
pub struct FsTree {
    entries: Vec<Entry>,
    map: FxHashMap<Arc<Path>, EntryId>,
}

#[derive(Debug)]
pub struct Entry {
    pub id: EntryId,
    pub path: Arc<Path>,
    pub metadata: fs::Metadata,
    pub file_name: String,
    pub file_type: fs::FileType,
    pub parent: Option<EntryId>,
    pub children: Vec<EntryId>,
    pub depth: usize,
}

impl FsTree {
    fn new() -> Self {
        Self {
            map: FxHashMap::default(),
            entries: vec![],
        }
    }

    /// Walks the entire tree rooted at `root`.
    pub fn build<P: AsRef<Path>>(root: P) -> Result<Self> {
        Self::build_with(root.as_ref(), None)
    }

    /// Walks `root` and its immediate children only.
    pub fn build_shallow<P: AsRef<Path>>(root: P) -> Result<Self> {
        Self::build_with(root.as_ref(), Some(1))
    }

    fn build_with(root: &Path, max_depth: Option<usize>) -> Result<Self> {
        use jwalk::{Parallelism, WalkDir};

        let root_meta = fs::metadata(root).chain_with(|| error! {
            "failed to read directory",
            "path" => root.display(),
        })?;

        if !root_meta.is_dir() {
            return Err(error! {
                "path is not a directory",
                "path" => root.display(),
            }.with_kind(ErrorKind::Io));
        }

        let mut walker = WalkDir::new(root)
            .follow_links(true)
            .skip_hidden(false)
            .sort(true)
            .parallelism(Parallelism::Serial);

        if let Some(depth) = max_depth {
            walker = walker.max_depth(depth);
        }

        let mut tree = FsTree::new();
        for entry in walker {
            let entry = entry
                .map_err(|e| Error::from_std(e).with_kind(ErrorKind::Io))
                .chain_with(|| error!("failed to walk directory", "root" => root.display()))?;

            let metadata = entry.metadata()
                .map_err(|e| Error::from_std(e).with_kind(ErrorKind::Io))
                .chain_with(|| error!("failed to read metadata", "path" => entry.path().display()))?;

            tree.insert(entry, metadata);
        }

        if tree.len() == 0 {
            return err! {
                "file system tree discovery yielded zero files",
                "search root" => root.display(),
            }
        }

        Ok(tree)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn root_id(&self) -> EntryId {
        EntryId(0)
    }

    /// All entries in walk order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    /// All regular files in walk order.
    pub fn files(&self) -> impl Iterator<Item = &Entry> {
        self.iter().filter(|e| e.metadata.is_file())
    }

    /// The immediate children of `id` in sorted order.
    pub fn children(&self, id: EntryId) -> impl Iterator<Item = &Entry> {
        self[id].children.iter().map(move |child| &self[*child])
    }

    fn insert(&mut self, entry: jwalk::DirEntry<((), ())>, metadata: fs::Metadata) -> EntryId {
        let entry = Entry {
            id: EntryId(self.entries.len()),
            path: Arc::from(entry.path().into_boxed_path()),
            metadata,
            file_type: entry.file_type,
            file_name: entry.file_name.to_string_lossy().into_owned(),
            parent: self.map.get(&entry.parent_path).cloned(),
            children: vec![],
            depth: entry.depth,
        };

        self.map.insert(entry.path.clone(), entry.id);
        if let Some(parent) = entry.parent {
            self.entries[parent.0].children.push(entry.id);
        }

        let id = entry.id;
        self.entries.push(entry);
        id
    }
}

impl Entry {
    /// The complete extension, if any.
    pub fn file_ext(&self) -> Option<&str> {
        self.file_name.rsplit_once('.').map(|(_, right)| right)
    }

    pub fn is_file(&self) -> bool {
        self.metadata.is_file()
    }

    pub fn is_dir(&self) -> bool {
        self.metadata.is_dir()
    }

    /// Path relative to the root tree of `self`.
    pub fn relative_path(&self) -> &Path {
        let mut components = self.path.components();
        for _ in 0..(self.path.components().count() - self.depth) {
            components.next();
        }

        components.as_path()
    }

    /// The relative path as a `/`-separated string, as used for URLs and
    /// object keys.
    pub fn relative_key(&self) -> String {
        self.relative_path()
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl std::ops::Index<EntryId> for FsTree {
    type Output = Entry;

    fn index(&self, index: EntryId) -> &Self::Output {
        &self.entries[index.0]
    }
}

impl fmt::Debug for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("bandsite-fstree-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn walk_is_sorted_and_parents_first() {
        let root = temp_dir("sorted");
        fs::create_dir_all(root.join("b/inner")).unwrap();
        fs::write(root.join("c.txt"), "c").unwrap();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::write(root.join("b/inner/z.txt"), "z").unwrap();
        fs::write(root.join(".hidden"), "h").unwrap();

        let tree = FsTree::build(&root).unwrap();
        let keys: Vec<_> = tree.iter().skip(1).map(|e| e.relative_key()).collect();
        assert_eq!(keys, [".hidden", "a.txt", "b", "b/inner", "b/inner/z.txt", "c.txt"]);
        assert_eq!(tree[tree.root_id()].depth, 0);
        assert!(tree.files().any(|e| e.relative_key() == "b/inner/z.txt"));
    }

    #[test]
    fn shallow_walk_stops_at_children() {
        let root = temp_dir("shallow");
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("sub/deep.json"), "{}").unwrap();
        fs::write(root.join("top.json"), "{}").unwrap();

        let tree = FsTree::build_shallow(&root).unwrap();
        let names: Vec<_> = tree.children(tree.root_id()).map(|e| e.file_name.as_str()).collect();
        assert_eq!(names, ["sub", "top.json"]);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn missing_root_is_an_io_error() {
        let root = temp_dir("missing").join("nope");
        let error = FsTree::build(&root).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Io);
    }
}
