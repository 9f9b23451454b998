pub mod vfs;
pub mod checksum;
pub mod natural;
pub mod strategy;
pub mod differ;
pub mod report;

pub use vfs::{LocalVfs, MemoryVfs};
pub use natural::natural_cmp;
pub use strategy::Fingerprinter;
pub use differ::{DiffOptions, TreeDiffer, JUNK_FILE_NAMES};
pub use report::{CollectingSink, JsonLinesSink, ReportSink, Reporter, TextSink};
