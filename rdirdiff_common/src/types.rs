use crate::RDirDiffError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Kind of entry a divergence refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
}

impl EntryKind {
    /// Single-letter tag shown in front of every report line
    pub fn tag(&self) -> char {
        match self {
            EntryKind::File => 'f',
            EntryKind::Directory => 'd',
            EntryKind::Symlink => 's',
        }
    }
}

/// Every kind of difference (or comparison failure) the differ can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Divergence {
    /// Entry exists only under the first root
    OnlyInFirst,
    /// Entry exists only under the second root
    OnlyInSecond,
    /// Both files exist but have different byte lengths
    Size,
    /// Same size, different fingerprint
    Contents,
    /// Same size and fingerprint, different timestamps
    DateOnly,
    /// Two file symlinks point at different targets
    SymbolicFile,
    /// Two directory symlinks point at different targets
    SymbolicDir,
    /// A directory could not be listed
    CannotAccess,
    /// A file could not be stat'd
    CannotStat,
    /// A file could not be read to compute its fingerprint
    CannotRead,
}

impl Divergence {
    pub fn label(&self) -> &'static str {
        match self {
            Divergence::OnlyInFirst => "Only in first",
            Divergence::OnlyInSecond => "Only in second",
            Divergence::Size => "Diverge in size",
            Divergence::Contents => "Diverge in contents",
            Divergence::DateOnly => "Diverge only in date",
            Divergence::SymbolicFile => "Symbolic file divergence",
            Divergence::SymbolicDir => "Symbolic dir divergence",
            Divergence::CannotAccess => "Error: cannot access",
            Divergence::CannotStat => "Error: cannot stat",
            Divergence::CannotRead => "Error: cannot read",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Divergence::CannotAccess | Divergence::CannotStat | Divergence::CannotRead
        )
    }
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One detected difference, emitted exactly once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivergenceRecord {
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
    pub divergence: Divergence,
}

impl DivergenceRecord {
    pub fn new(
        name: impl Into<String>,
        path: PathBuf,
        kind: EntryKind,
        divergence: Divergence,
    ) -> Self {
        Self {
            name: name.into(),
            path,
            kind,
            divergence,
        }
    }
}

/// A filesystem timestamp with nanosecond resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct FileTimestamp {
    pub secs: i64,
    pub nanos: u32,
}

impl FileTimestamp {
    pub fn new(secs: i64, nanos: u32) -> Self {
        Self { secs, nanos }
    }
}

impl fmt::Display for FileTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.secs, self.nanos)
    }
}

/// What an entry is, without following symbolic links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileType {
    File,
    Directory,
    Symlink,
    Other,
}

/// Metadata of an entry as returned by `lstat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMetadata {
    pub size: u64,
    pub modified: FileTimestamp,
    /// Inode change time on Unix, creation time elsewhere
    pub changed: FileTimestamp,
    pub file_type: FileType,
}

impl EntryMetadata {
    pub fn is_symlink(&self) -> bool {
        self.file_type == FileType::Symlink
    }

    /// Both timestamps match exactly
    pub fn same_times(&self, other: &EntryMetadata) -> bool {
        self.modified == other.modified && self.changed == other.changed
    }
}

/// Immediate children of one directory, split by type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirListing {
    pub files: HashSet<OsString>,
    pub dirs: HashSet<OsString>,
}

/// How the content of two same-sized files with different timestamps is compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareStrategy {
    /// Only the byte length; never reads file contents
    SizesOnly,
    /// Streamed MD5 digest
    #[default]
    Md5,
    /// Streamed BLAKE3 digest
    Blake3,
}

impl CompareStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            CompareStrategy::SizesOnly => "sizes_only",
            CompareStrategy::Md5 => "md5",
            CompareStrategy::Blake3 => "blake3",
        }
    }
}

impl fmt::Display for CompareStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CompareStrategy {
    type Err = RDirDiffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sizes_only" => Ok(CompareStrategy::SizesOnly),
            "md5" => Ok(CompareStrategy::Md5),
            "blake3" => Ok(CompareStrategy::Blake3),
            other => Err(RDirDiffError::Config(format!(
                "The option '{}' is not a valid comparison function (expected md5, blake3 or sizes_only)",
                other
            ))),
        }
    }
}

/// BLAKE3 hash value (32 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Blake3Hash(pub [u8; 32]);

impl Blake3Hash {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<blake3::Hash> for Blake3Hash {
    fn from(hash: blake3::Hash) -> Self {
        Self(*hash.as_bytes())
    }
}

/// Comparable value produced by a comparison strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fingerprint {
    Size(u64),
    Md5([u8; 16]),
    Blake3(Blake3Hash),
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fingerprint::Size(size) => write!(f, "{} bytes", size),
            Fingerprint::Md5(digest) => write!(f, "md5:{}", hex::encode(digest)),
            Fingerprint::Blake3(hash) => write!(f, "blake3:{}", hash.to_hex()),
        }
    }
}

/// Aggregate counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub differences: u64,
    pub errors: u64,
}

impl RunStats {
    pub fn is_identical(&self) -> bool {
        self.differences == 0
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Content comparison strategy
    pub strategy: CompareStrategy,

    /// Drop desktop metadata files (`.DS_Store` and friends) from both sides
    pub skip_junk: bool,

    /// Report files whose content matches but whose timestamps differ
    pub report_dates: bool,

    /// Show the transient "Scanning:" line
    pub progress: bool,

    /// Directory names pruned at every depth
    pub ignore_dirs: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            strategy: CompareStrategy::default(),
            skip_junk: true,
            report_dates: false,
            progress: true,
            ignore_dirs: Vec::new(),
        }
    }
}
