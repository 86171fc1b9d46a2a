//! dirsort - sorts the files of a directory into category folders
//!
//! Files are classified by extension through a layered mapping (built-in
//! defaults, a configuration document, command-line overrides) and can be
//! excluded with gitignore-like patterns. A batch pass walks the whole tree;
//! watch mode applies the same rules to files as they appear.

pub mod classifier;
pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod ignore;
pub mod logging;
pub mod output;
pub mod scanner;
pub mod watcher;

pub use classifier::{Classification, Classifier};
pub use config::{ConfigError, MappingConfig};
pub use file_category::{ExtensionMapping, MappingError, MappingSource};
pub use file_organizer::{FileOrganizer, OrganizeError, OrganizeOptions, OrganizeReport, Summary};
pub use ignore::{IgnoreError, IgnoreMatcher};
pub use scanner::{CategorizedFiles, ScanError, scan};
pub use watcher::{DebounceTable, Reconciler, WatchError, WatchOutcome};

pub use cli::{RunOptions, run};
