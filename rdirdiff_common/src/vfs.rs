use crate::{DirListing, EntryMetadata, VfsError};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Read-only filesystem access used by the tree differ
///
/// The differ never touches `std::fs` directly, so the same comparison logic
/// runs against the local disk or an in-memory tree. Implementations must
/// never write to the trees they inspect.
pub trait Vfs: Send + Sync {
    /// Uniquely identifies the VFS instance (e.g., "local", "memory")
    fn instance_id(&self) -> &str;

    /// Lists the immediate children of a directory, split into files and
    /// directories. Symlinks pointing at directories count as directories.
    fn list_dir(&self, path: &Path) -> Result<DirListing, VfsError>;

    /// Returns the metadata of an entry without following symbolic links
    fn symlink_metadata(&self, path: &Path) -> Result<EntryMetadata, VfsError>;

    /// Returns the target of a symbolic link, unresolved
    fn read_link(&self, path: &Path) -> Result<PathBuf, VfsError>;

    /// Opens a file for reading (returns a Read trait object)
    fn open_file(&self, path: &Path) -> Result<Box<dyn Read + Send>, VfsError>;

    /// Whether a path is a directory, following symbolic links
    fn is_dir(&self, path: &Path) -> bool;
}
