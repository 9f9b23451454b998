use crate::natural::sorted_natural;
use crate::report::{ReportSink, Reporter};
use crate::strategy::Fingerprinter;
use rdirdiff_common::{
    AppConfig, DirListing, Divergence, DivergenceRecord, EntryKind, EntryMetadata, FileType,
    RDirDiffError, RunStats, Vfs,
};
use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Desktop metadata files dropped from both sides when `skip_junk` is set
pub const JUNK_FILE_NAMES: &[&str] = &[".DS_Store", "Thumbs.db", "desktop.ini"];

/// Behaviour switches of the tree differ, fixed for a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffOptions {
    pub skip_junk: bool,
    pub report_dates: bool,
    pub ignore_dirs: Vec<String>,
}

impl DiffOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            skip_junk: config.skip_junk,
            report_dates: config.report_dates,
            ignore_dirs: config.ignore_dirs.clone(),
        }
    }
}

/// A directory pair waiting to be compared
struct PendingPair {
    first: PathBuf,
    second: PathBuf,
    /// Roots are taken as given; children must pass the symlink check first
    check_links: bool,
}

/// Walks two directory trees in lock-step and reports where they diverge
///
/// Each directory pair emits, in this order: files present on one side only,
/// directories present on one side only, divergences between shared files,
/// and then the shared subdirectories are visited depth-first. Names inside
/// every group are in natural order, so the output is stable between runs.
pub struct TreeDiffer<'a> {
    vfs: &'a dyn Vfs,
    fingerprinter: &'a dyn Fingerprinter,
    options: DiffOptions,
    ignore_dirs: HashSet<OsString>,
    junk_files: HashSet<OsString>,
}

impl<'a> TreeDiffer<'a> {
    pub fn new(
        vfs: &'a dyn Vfs,
        fingerprinter: &'a dyn Fingerprinter,
        options: DiffOptions,
    ) -> Self {
        let ignore_dirs = options.ignore_dirs.iter().map(OsString::from).collect();
        let junk_files = if options.skip_junk {
            JUNK_FILE_NAMES.iter().map(OsString::from).collect()
        } else {
            HashSet::new()
        };

        Self {
            vfs,
            fingerprinter,
            options,
            ignore_dirs,
            junk_files,
        }
    }

    /// Fail fast unless both roots are existing directories
    pub fn check_roots(&self, first: &Path, second: &Path) -> Result<(), RDirDiffError> {
        for root in [first, second] {
            if !self.vfs.is_dir(root) {
                return Err(RDirDiffError::RootNotFound(root.display().to_string()));
            }
        }
        Ok(())
    }

    /// Compare two trees, streaming every divergence to the reporter
    pub fn run<S: ReportSink>(
        &self,
        first: &Path,
        second: &Path,
        reporter: &mut Reporter<S>,
    ) -> Result<RunStats, RDirDiffError> {
        self.check_roots(first, second)?;
        info!(
            "Comparing {} with {} on {}",
            first.display(),
            second.display(),
            self.vfs.instance_id()
        );

        let mut pending = vec![PendingPair {
            first: first.to_path_buf(),
            second: second.to_path_buf(),
            check_links: false,
        }];

        while let Some(pair) = pending.pop() {
            if pair.check_links {
                if let Some(differs) = self.link_divergence(&pair.first, &pair.second) {
                    if differs {
                        reporter.emit(record(
                            &pair.first,
                            EntryKind::Symlink,
                            Divergence::SymbolicDir,
                        ))?;
                    }
                    continue;
                }
            }
            self.compare_dirs(&pair.first, &pair.second, reporter, &mut pending)?;
        }

        reporter.finish()?;
        let stats = reporter.stats();
        info!(
            "Comparison finished: {} differences, {} errors",
            stats.differences, stats.errors
        );
        Ok(stats)
    }

    fn list(&self, dir: &Path) -> Option<DirListing> {
        match self.vfs.list_dir(dir) {
            Ok(mut listing) => {
                listing.files.retain(|name| !self.junk_files.contains(name));
                listing.dirs.retain(|name| !self.ignore_dirs.contains(name));
                Some(listing)
            }
            Err(e) => {
                warn!("Cannot list {}: {}", dir.display(), e);
                None
            }
        }
    }

    fn compare_dirs<S: ReportSink>(
        &self,
        first: &Path,
        second: &Path,
        reporter: &mut Reporter<S>,
        pending: &mut Vec<PendingPair>,
    ) -> io::Result<()> {
        reporter.scanning(first)?;

        let Some(left) = self.list(first) else {
            return reporter.emit(record(first, EntryKind::Directory, Divergence::CannotAccess));
        };
        let Some(right) = self.list(second) else {
            return reporter.emit(record(second, EntryKind::Directory, Divergence::CannotAccess));
        };

        // Files missing
        for name in sorted_natural(left.files.symmetric_difference(&right.files)) {
            let (root, divergence) = if left.files.contains(&name) {
                (first, Divergence::OnlyInFirst)
            } else {
                (second, Divergence::OnlyInSecond)
            };
            reporter.emit(named_record(&name, root.join(&name), EntryKind::File, divergence))?;
        }

        // Directories missing
        for name in sorted_natural(left.dirs.symmetric_difference(&right.dirs)) {
            let (root, divergence) = if left.dirs.contains(&name) {
                (first, Divergence::OnlyInFirst)
            } else {
                (second, Divergence::OnlyInSecond)
            };
            reporter.emit(named_record(
                &name,
                root.join(&name),
                EntryKind::Directory,
                divergence,
            ))?;
        }

        // Files existing on both sides
        for name in sorted_natural(left.files.intersection(&right.files)) {
            self.compare_files(&name, &first.join(&name), &second.join(&name), reporter)?;
        }

        // Directories existing on both sides, visited next in natural order
        let shared = sorted_natural(left.dirs.intersection(&right.dirs));
        for name in shared.into_iter().rev() {
            pending.push(PendingPair {
                first: first.join(&name),
                second: second.join(&name),
                check_links: true,
            });
        }

        Ok(())
    }

    /// The per-file cascade: stat, size, timestamps, then link target or fingerprint
    fn compare_files<S: ReportSink>(
        &self,
        name: &OsStr,
        first: &Path,
        second: &Path,
        reporter: &mut Reporter<S>,
    ) -> io::Result<()> {
        let file = |path: &Path, divergence| {
            named_record(name, path.to_path_buf(), EntryKind::File, divergence)
        };

        let first_meta = match self.vfs.symlink_metadata(first) {
            Ok(meta) => meta,
            Err(e) => {
                warn!("Cannot stat {}: {}", first.display(), e);
                return reporter.emit(file(first, Divergence::CannotStat));
            }
        };
        let second_meta = match self.vfs.symlink_metadata(second) {
            Ok(meta) => meta,
            Err(e) => {
                warn!("Cannot stat {}: {}", second.display(), e);
                return reporter.emit(file(second, Divergence::CannotStat));
            }
        };

        if first_meta.size != second_meta.size {
            return reporter.emit(file(first, Divergence::Size));
        }

        if first_meta.same_times(&second_meta) {
            return Ok(());
        }

        if first_meta.is_symlink() || second_meta.is_symlink() {
            if self.link_targets_differ(first, second) {
                reporter.emit(named_record(
                    name,
                    first.to_path_buf(),
                    EntryKind::Symlink,
                    Divergence::SymbolicFile,
                ))?;
            }
            return Ok(());
        }

        // Pipes, sockets and devices can block or never reach end of file
        for (path, meta) in [(first, &first_meta), (second, &second_meta)] {
            if meta.file_type != FileType::File {
                warn!("Not a regular file, contents not compared: {}", path.display());
                return reporter.emit(file(path, Divergence::CannotRead));
            }
        }

        log_stat(1, first, &first_meta);
        log_stat(2, second, &second_meta);

        let vfs = self.vfs;
        let fingerprinter = self.fingerprinter;
        let (first_print, second_print) = rayon::join(
            || fingerprinter.fingerprint(vfs, first),
            || fingerprinter.fingerprint(vfs, second),
        );

        match (first_print, second_print) {
            (Ok(a), Ok(b)) => {
                debug!("Fingerprints: {} / {}", a, b);
                if a != b {
                    return reporter.emit(file(first, Divergence::Contents));
                }
            }
            (Err(e), _) => {
                warn!("Cannot read {}: {}", first.display(), e);
                return reporter.emit(file(first, Divergence::CannotRead));
            }
            (_, Err(e)) => {
                warn!("Cannot read {}: {}", second.display(), e);
                return reporter.emit(file(second, Divergence::CannotRead));
            }
        }

        if self.options.report_dates {
            reporter.emit(file(first, Divergence::DateOnly))?;
        }
        Ok(())
    }

    /// `None` when neither entry is a symlink, otherwise whether the two
    /// unresolved link targets differ
    fn link_divergence(&self, first: &Path, second: &Path) -> Option<bool> {
        let is_link = |path: &Path| {
            self.vfs
                .symlink_metadata(path)
                .map(|meta| meta.is_symlink())
                .unwrap_or(false)
        };

        if !is_link(first) && !is_link(second) {
            return None;
        }
        Some(self.link_targets_differ(first, second))
    }

    fn link_targets_differ(&self, first: &Path, second: &Path) -> bool {
        match (self.vfs.read_link(first), self.vfs.read_link(second)) {
            (Ok(a), Ok(b)) => a != b,
            _ => true,
        }
    }
}

fn log_stat(side: u8, path: &Path, meta: &EntryMetadata) {
    debug!(
        "File {}: {}\n Modtime: {}\n Changetime: {}\n Size: {}",
        side,
        path.display(),
        meta.modified,
        meta.changed,
        meta.size
    );
}

fn named_record(
    name: &OsStr,
    path: PathBuf,
    kind: EntryKind,
    divergence: Divergence,
) -> DivergenceRecord {
    DivergenceRecord::new(name.to_string_lossy(), path, kind, divergence)
}

fn record(path: &Path, kind: EntryKind, divergence: Divergence) -> DivergenceRecord {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    DivergenceRecord::new(name, path.to_path_buf(), kind, divergence)
}
