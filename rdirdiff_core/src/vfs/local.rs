use rdirdiff_common::{DirListing, EntryMetadata, FileTimestamp, FileType, Vfs, VfsError};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Local filesystem VFS implementation
pub struct LocalVfs {
    instance_id: String,
}

impl LocalVfs {
    pub fn new() -> Self {
        Self {
            instance_id: "local".to_string(),
        }
    }
}

impl Default for LocalVfs {
    fn default() -> Self {
        Self::new()
    }
}

fn classify(err: io::Error, path: &Path) -> VfsError {
    match err.kind() {
        io::ErrorKind::NotFound => VfsError::NotFound(path.display().to_string()),
        io::ErrorKind::PermissionDenied => VfsError::PermissionDenied(path.display().to_string()),
        _ => VfsError::Io(err),
    }
}

#[cfg(unix)]
fn timestamps(meta: &fs::Metadata) -> (FileTimestamp, FileTimestamp) {
    use std::os::unix::fs::MetadataExt;

    (
        FileTimestamp::new(meta.mtime(), meta.mtime_nsec() as u32),
        FileTimestamp::new(meta.ctime(), meta.ctime_nsec() as u32),
    )
}

#[cfg(not(unix))]
fn timestamps(meta: &fs::Metadata) -> (FileTimestamp, FileTimestamp) {
    fn convert(time: io::Result<std::time::SystemTime>) -> FileTimestamp {
        time.ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|d| FileTimestamp::new(d.as_secs() as i64, d.subsec_nanos()))
            .unwrap_or_default()
    }

    (convert(meta.modified()), convert(meta.created()))
}

impl Vfs for LocalVfs {
    fn instance_id(&self) -> &str {
        &self.instance_id
    }

    fn list_dir(&self, path: &Path) -> Result<DirListing, VfsError> {
        let entries = fs::read_dir(path).map_err(|e| classify(e, path))?;
        let mut listing = DirListing::default();

        for entry in entries {
            let entry = entry.map_err(|e| classify(e, path))?;
            let file_type = entry.file_type().map_err(|e| classify(e, &entry.path()))?;

            // A link to a directory is listed with the directories; a
            // dangling link is listed with the files.
            let is_dir = if file_type.is_symlink() {
                fs::metadata(entry.path()).map(|m| m.is_dir()).unwrap_or(false)
            } else {
                file_type.is_dir()
            };

            if is_dir {
                listing.dirs.insert(entry.file_name());
            } else {
                listing.files.insert(entry.file_name());
            }
        }

        Ok(listing)
    }

    fn symlink_metadata(&self, path: &Path) -> Result<EntryMetadata, VfsError> {
        let meta = fs::symlink_metadata(path).map_err(|e| classify(e, path))?;
        let file_type = meta.file_type();
        let (modified, changed) = timestamps(&meta);

        Ok(EntryMetadata {
            size: meta.len(),
            modified,
            changed,
            file_type: if file_type.is_symlink() {
                FileType::Symlink
            } else if file_type.is_dir() {
                FileType::Directory
            } else if file_type.is_file() {
                FileType::File
            } else {
                FileType::Other
            },
        })
    }

    fn read_link(&self, path: &Path) -> Result<PathBuf, VfsError> {
        fs::read_link(path).map_err(|e| match e.kind() {
            io::ErrorKind::InvalidInput => VfsError::NotASymlink(path.display().to_string()),
            _ => classify(e, path),
        })
    }

    fn open_file(&self, path: &Path) -> Result<Box<dyn Read + Send>, VfsError> {
        // Only regular files: opening a FIFO or a device can block or never end
        let meta = fs::symlink_metadata(path).map_err(|e| classify(e, path))?;
        if !meta.is_file() {
            return Err(VfsError::NotAFile(path.display().to_string()));
        }

        let file = fs::File::open(path).map_err(|e| classify(e, path))?;
        Ok(Box::new(file))
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}
