//! In-memory VFS
//!
//! Holds a small tree of directories, files, symbolic links and special
//! nodes keyed by absolute path. Individual paths can be made unlistable, unstat-able or
//! unreadable, which lets callers reproduce permission failures that are
//! awkward to set up on a real disk (for instance when running as root).

use rdirdiff_common::{DirListing, EntryMetadata, FileTimestamp, FileType, Vfs, VfsError};
use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Timestamp given to entries created without explicit times
pub const DEFAULT_TIME: FileTimestamp = FileTimestamp {
    secs: 1_700_000_000,
    nanos: 0,
};

const MAX_LINK_DEPTH: usize = 8;

#[derive(Debug, Clone)]
enum Node {
    Dir,
    File {
        content: Vec<u8>,
        modified: FileTimestamp,
        changed: FileTimestamp,
    },
    Symlink {
        target: PathBuf,
        modified: FileTimestamp,
        changed: FileTimestamp,
    },
    /// Pipe, socket or device node
    Special {
        modified: FileTimestamp,
        changed: FileTimestamp,
    },
}

#[derive(Default)]
struct Denied {
    list: HashSet<PathBuf>,
    stat: HashSet<PathBuf>,
    read: HashSet<PathBuf>,
}

pub struct MemoryVfs {
    instance_id: String,
    nodes: RwLock<HashMap<PathBuf, Node>>,
    denied: RwLock<Denied>,
}

impl MemoryVfs {
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(PathBuf::from("/"), Node::Dir);
        Self {
            instance_id: "memory".to_string(),
            nodes: RwLock::new(nodes),
            denied: RwLock::new(Denied::default()),
        }
    }

    fn insert(&self, path: &Path, node: Node) {
        if let Ok(mut nodes) = self.nodes.write() {
            for ancestor in path.ancestors().skip(1) {
                nodes.entry(ancestor.to_path_buf()).or_insert(Node::Dir);
            }
            nodes.insert(path.to_path_buf(), node);
        }
    }

    fn node(&self, path: &Path) -> Option<Node> {
        self.nodes.read().ok()?.get(path).cloned()
    }

    /// Create a directory and all its parents
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), Node::Dir);
    }

    /// Create a file stamped with `DEFAULT_TIME`
    pub fn add_file(&self, path: impl AsRef<Path>, content: &[u8]) {
        self.add_file_with_times(path, content, DEFAULT_TIME, DEFAULT_TIME);
    }

    pub fn add_file_with_times(
        &self,
        path: impl AsRef<Path>,
        content: &[u8],
        modified: FileTimestamp,
        changed: FileTimestamp,
    ) {
        self.insert(
            path.as_ref(),
            Node::File {
                content: content.to_vec(),
                modified,
                changed,
            },
        );
    }

    /// Create a symbolic link. Relative targets resolve against the link's parent.
    pub fn add_symlink(&self, path: impl AsRef<Path>, target: impl AsRef<Path>) {
        self.insert(
            path.as_ref(),
            Node::Symlink {
                target: target.as_ref().to_path_buf(),
                modified: DEFAULT_TIME,
                changed: DEFAULT_TIME,
            },
        );
    }

    /// Create a special node such as a FIFO. It lists as a file but has no
    /// readable contents.
    pub fn add_special(&self, path: impl AsRef<Path>) {
        self.insert(
            path.as_ref(),
            Node::Special {
                modified: DEFAULT_TIME,
                changed: DEFAULT_TIME,
            },
        );
    }

    /// Change the timestamps of an existing file, link or special node
    pub fn set_times(
        &self,
        path: impl AsRef<Path>,
        modified: FileTimestamp,
        changed: FileTimestamp,
    ) {
        if let Ok(mut nodes) = self.nodes.write() {
            match nodes.get_mut(path.as_ref()) {
                Some(Node::File { modified: m, changed: c, .. })
                | Some(Node::Symlink { modified: m, changed: c, .. })
                | Some(Node::Special { modified: m, changed: c }) => {
                    *m = modified;
                    *c = changed;
                }
                _ => {}
            }
        }
    }

    pub fn deny_list(&self, path: impl AsRef<Path>) {
        if let Ok(mut denied) = self.denied.write() {
            denied.list.insert(path.as_ref().to_path_buf());
        }
    }

    pub fn deny_stat(&self, path: impl AsRef<Path>) {
        if let Ok(mut denied) = self.denied.write() {
            denied.stat.insert(path.as_ref().to_path_buf());
        }
    }

    pub fn deny_read(&self, path: impl AsRef<Path>) {
        if let Ok(mut denied) = self.denied.write() {
            denied.read.insert(path.as_ref().to_path_buf());
        }
    }

    fn is_denied(&self, path: &Path, pick: impl Fn(&Denied) -> &HashSet<PathBuf>) -> bool {
        self.denied
            .read()
            .map(|denied| pick(&denied).contains(path))
            .unwrap_or(false)
    }

    /// Follow symbolic links until a non-link node is reached
    fn resolve(&self, path: &Path) -> Option<Node> {
        let mut current = path.to_path_buf();
        for _ in 0..MAX_LINK_DEPTH {
            match self.node(&current)? {
                Node::Symlink { target, .. } => {
                    current = match current.parent() {
                        Some(parent) if target.is_relative() => parent.join(&target),
                        _ => target,
                    };
                }
                other => return Some(other),
            }
        }
        None
    }
}

impl Default for MemoryVfs {
    fn default() -> Self {
        Self::new()
    }
}

impl Vfs for MemoryVfs {
    fn instance_id(&self) -> &str {
        &self.instance_id
    }

    fn list_dir(&self, path: &Path) -> Result<DirListing, VfsError> {
        if self.is_denied(path, |d| &d.list) {
            return Err(VfsError::PermissionDenied(path.display().to_string()));
        }

        match self.resolve(path) {
            Some(Node::Dir) => {}
            Some(_) => return Err(VfsError::NotADirectory(path.display().to_string())),
            None => return Err(VfsError::NotFound(path.display().to_string())),
        }

        let children: Vec<PathBuf> = match self.nodes.read() {
            Ok(nodes) => nodes
                .keys()
                .filter(|p| p.parent() == Some(path))
                .cloned()
                .collect(),
            Err(_) => return Err(VfsError::NotFound(path.display().to_string())),
        };

        let mut listing = DirListing::default();
        for child in children {
            let Some(name) = child.file_name() else {
                continue;
            };
            if matches!(self.resolve(&child), Some(Node::Dir)) {
                listing.dirs.insert(name.to_os_string());
            } else {
                listing.files.insert(name.to_os_string());
            }
        }

        Ok(listing)
    }

    fn symlink_metadata(&self, path: &Path) -> Result<EntryMetadata, VfsError> {
        if self.is_denied(path, |d| &d.stat) {
            return Err(VfsError::PermissionDenied(path.display().to_string()));
        }

        match self.node(path) {
            Some(Node::Dir) => Ok(EntryMetadata {
                size: 0,
                modified: DEFAULT_TIME,
                changed: DEFAULT_TIME,
                file_type: FileType::Directory,
            }),
            Some(Node::File {
                content,
                modified,
                changed,
            }) => Ok(EntryMetadata {
                size: content.len() as u64,
                modified,
                changed,
                file_type: FileType::File,
            }),
            Some(Node::Symlink {
                target,
                modified,
                changed,
            }) => Ok(EntryMetadata {
                size: target.as_os_str().len() as u64,
                modified,
                changed,
                file_type: FileType::Symlink,
            }),
            Some(Node::Special { modified, changed }) => Ok(EntryMetadata {
                size: 0,
                modified,
                changed,
                file_type: FileType::Other,
            }),
            None => Err(VfsError::NotFound(path.display().to_string())),
        }
    }

    fn read_link(&self, path: &Path) -> Result<PathBuf, VfsError> {
        match self.node(path) {
            Some(Node::Symlink { target, .. }) => Ok(target),
            Some(_) => Err(VfsError::NotASymlink(path.display().to_string())),
            None => Err(VfsError::NotFound(path.display().to_string())),
        }
    }

    fn open_file(&self, path: &Path) -> Result<Box<dyn Read + Send>, VfsError> {
        if self.is_denied(path, |d| &d.read) {
            return Err(VfsError::PermissionDenied(path.display().to_string()));
        }

        match self.resolve(path) {
            Some(Node::File { content, .. }) => Ok(Box::new(Cursor::new(content))),
            Some(_) => Err(VfsError::NotAFile(path.display().to_string())),
            None => Err(VfsError::NotFound(path.display().to_string())),
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.resolve(path), Some(Node::Dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_dir_partitions_children() {
        let vfs = MemoryVfs::new();
        vfs.add_file("/root/a.txt", b"a");
        vfs.add_dir("/root/sub");
        vfs.add_file("/root/sub/deep.txt", b"deep");
        vfs.add_symlink("/root/link_dir", "sub");
        vfs.add_symlink("/root/link_file", "a.txt");
        vfs.add_symlink("/root/dangling", "/nowhere");
        vfs.add_special("/root/fifo");

        let listing = vfs.list_dir(Path::new("/root")).unwrap();
        let names = |set: &HashSet<std::ffi::OsString>| {
            let mut names: Vec<String> = set
                .iter()
                .map(|n| n.to_string_lossy().into_owned())
                .collect();
            names.sort();
            names
        };
        let files = names(&listing.files);
        let dirs = names(&listing.dirs);

        assert_eq!(files, vec!["a.txt", "dangling", "fifo", "link_file"]);
        assert_eq!(dirs, vec!["link_dir", "sub"]);
    }

    #[test]
    fn test_denied_operations() {
        let vfs = MemoryVfs::new();
        vfs.add_file("/root/a.txt", b"a");
        vfs.deny_list("/root");
        vfs.deny_stat("/root/a.txt");
        vfs.deny_read("/root/a.txt");

        assert!(matches!(
            vfs.list_dir(Path::new("/root")),
            Err(VfsError::PermissionDenied(_))
        ));
        assert!(vfs.symlink_metadata(Path::new("/root/a.txt")).is_err());
        assert!(vfs.open_file(Path::new("/root/a.txt")).is_err());
    }

    #[test]
    fn test_symlink_metadata_does_not_follow() {
        let vfs = MemoryVfs::new();
        vfs.add_file("/root/a.txt", b"0123456789");
        vfs.add_symlink("/root/link", "a.txt");

        let meta = vfs.symlink_metadata(Path::new("/root/link")).unwrap();
        assert!(meta.is_symlink());
        assert_eq!(meta.size, 5);
        assert_eq!(vfs.read_link(Path::new("/root/link")).unwrap(), PathBuf::from("a.txt"));
        assert!(matches!(
            vfs.read_link(Path::new("/root/a.txt")),
            Err(VfsError::NotASymlink(_))
        ));
    }

    #[test]
    fn test_special_node_has_no_contents() {
        let vfs = MemoryVfs::new();
        vfs.add_special("/root/fifo");

        let meta = vfs.symlink_metadata(Path::new("/root/fifo")).unwrap();
        assert_eq!(meta.file_type, FileType::Other);
        assert!(matches!(
            vfs.open_file(Path::new("/root/fifo")),
            Err(VfsError::NotAFile(_))
        ));
    }
}
