use thiserror::Error;

#[derive(Error, Debug)]
pub enum RDirDiffError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("The directory path '{0}' does not exist")]
    RootNotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RDirDiffError>;

#[derive(Error, Debug)]
pub enum VfsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Not a file: {0}")]
    NotAFile(String),

    #[error("Not a symbolic link: {0}")]
    NotASymlink(String),
}
