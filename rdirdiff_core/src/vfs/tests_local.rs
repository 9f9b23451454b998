#[cfg(test)]
mod tests {
    use crate::vfs::LocalVfs;
    use filetime::{set_file_mtime, FileTime};
    use rdirdiff_common::{FileType, Vfs, VfsError};
    use std::fs;
    use std::io::Read;
    use tempfile::TempDir;

    // ============================================================================
    // Listing Tests
    // ============================================================================

    #[test]
    fn test_local_vfs_instance_id() {
        let vfs = LocalVfs::new();
        assert_eq!(vfs.instance_id(), "local");
    }

    #[test]
    fn test_list_dir_is_not_recursive() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(temp_dir.path().join("a.txt"), b"a").unwrap();
        fs::create_dir(temp_dir.path().join("sub")).unwrap();
        fs::write(temp_dir.path().join("sub/nested.txt"), b"n").unwrap();

        let listing = LocalVfs::new().list_dir(temp_dir.path()).unwrap();

        assert_eq!(listing.files.len(), 1);
        assert!(listing.files.contains(std::ffi::OsStr::new("a.txt")));
        assert_eq!(listing.dirs.len(), 1);
        assert!(listing.dirs.contains(std::ffi::OsStr::new("sub")));
    }

    #[test]
    fn test_list_dir_missing_directory_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let result = LocalVfs::new().list_dir(&temp_dir.path().join("gone"));
        assert!(matches!(result, Err(VfsError::NotFound(_))));
    }

    #[test]
    fn test_list_dir_on_file_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file = temp_dir.path().join("file.txt");
        fs::write(&file, b"x").unwrap();

        assert!(LocalVfs::new().list_dir(&file).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_list_dir_symlinks() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        fs::create_dir(root.join("real_dir")).unwrap();
        fs::write(root.join("real_file"), b"x").unwrap();
        symlink(root.join("real_dir"), root.join("link_dir")).unwrap();
        symlink(root.join("real_file"), root.join("link_file")).unwrap();
        symlink(root.join("missing"), root.join("dangling")).unwrap();

        let listing = LocalVfs::new().list_dir(root).unwrap();

        assert!(listing.dirs.contains(std::ffi::OsStr::new("link_dir")));
        assert!(listing.files.contains(std::ffi::OsStr::new("link_file")));
        assert!(listing.files.contains(std::ffi::OsStr::new("dangling")));
    }

    // ============================================================================
    // Metadata Tests
    // ============================================================================

    #[test]
    fn test_symlink_metadata_regular_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file = temp_dir.path().join("file.txt");
        fs::write(&file, b"hello").unwrap();
        set_file_mtime(&file, FileTime::from_unix_time(1_700_000_000, 250)).unwrap();

        let meta = LocalVfs::new().symlink_metadata(&file).unwrap();
        assert_eq!(meta.size, 5);
        assert_eq!(meta.file_type, FileType::File);
        assert_eq!(meta.modified.secs, 1_700_000_000);
        assert_eq!(meta.modified.nanos, 250);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_metadata_does_not_follow() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let link = temp_dir.path().join("link");
        symlink("some/target", &link).unwrap();

        let vfs = LocalVfs::new();
        let meta = vfs.symlink_metadata(&link).unwrap();
        assert!(meta.is_symlink());
        assert_eq!(
            vfs.read_link(&link).unwrap(),
            std::path::PathBuf::from("some/target")
        );
    }

    #[test]
    fn test_read_link_on_regular_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file = temp_dir.path().join("file.txt");
        fs::write(&file, b"x").unwrap();

        assert!(LocalVfs::new().read_link(&file).is_err());
    }

    // ============================================================================
    // File Reading Tests
    // ============================================================================

    #[test]
    fn test_open_file_reads_content() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file = temp_dir.path().join("file.txt");
        fs::write(&file, b"content").unwrap();

        let mut reader = LocalVfs::new().open_file(&file).unwrap();
        let mut buffer = String::new();
        reader.read_to_string(&mut buffer).unwrap();
        assert_eq!(buffer, "content");
    }

    #[test]
    fn test_open_file_rejects_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let result = LocalVfs::new().open_file(temp_dir.path());
        assert!(matches!(result, Err(VfsError::NotAFile(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_open_file_rejects_fifo() {
        use std::ffi::CString;
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let fifo = temp_dir.path().join("pipe");
        let c_path = CString::new(fifo.as_os_str().as_bytes()).unwrap();
        assert_eq!(unsafe { libc::mkfifo(c_path.as_ptr(), 0o644) }, 0);

        let vfs = LocalVfs::new();
        let listing = vfs.list_dir(temp_dir.path()).unwrap();
        assert!(listing.files.contains(std::ffi::OsStr::new("pipe")));
        assert_eq!(vfs.symlink_metadata(&fifo).unwrap().file_type, FileType::Other);
        // Returns at once instead of waiting for a writer
        assert!(matches!(vfs.open_file(&fifo), Err(VfsError::NotAFile(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_open_file_rejects_symlink() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file = temp_dir.path().join("file.txt");
        fs::write(&file, b"x").unwrap();
        let link = temp_dir.path().join("link");
        std::os::unix::fs::symlink(&file, &link).unwrap();

        let result = LocalVfs::new().open_file(&link);
        assert!(matches!(result, Err(VfsError::NotAFile(_))));
    }

    #[test]
    fn test_is_dir() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file = temp_dir.path().join("file.txt");
        fs::write(&file, b"x").unwrap();

        let vfs = LocalVfs::new();
        assert!(!vfs.is_dir(&file));
        assert!(vfs.is_dir(temp_dir.path()));
        assert!(!vfs.is_dir(&temp_dir.path().join("nope")));
    }
}
