use crate::checksum::{blake3_reader, md5_reader};
use rdirdiff_common::{CompareStrategy, Fingerprint, Vfs, VfsError};
use std::path::Path;

/// Maps a file to a value that is equal for files considered identical
///
/// Only consulted once size and timestamps have failed to settle the
/// comparison of a regular file pair.
pub trait Fingerprinter: Send + Sync {
    fn fingerprint(&self, vfs: &dyn Vfs, path: &Path) -> Result<Fingerprint, VfsError>;
}

impl Fingerprinter for CompareStrategy {
    fn fingerprint(&self, vfs: &dyn Vfs, path: &Path) -> Result<Fingerprint, VfsError> {
        match self {
            CompareStrategy::SizesOnly => {
                Ok(Fingerprint::Size(vfs.symlink_metadata(path)?.size))
            }
            CompareStrategy::Md5 => Ok(Fingerprint::Md5(md5_reader(vfs.open_file(path)?)?)),
            CompareStrategy::Blake3 => {
                Ok(Fingerprint::Blake3(blake3_reader(vfs.open_file(path)?)?))
            }
        }
    }
}
