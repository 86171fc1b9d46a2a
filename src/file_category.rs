//! Extension-to-category mapping for organizing files by type.
//!
//! The mapping is layered: built-in defaults, then entries merged from a
//! configuration document, then `.ext=Category` overrides from the command
//! line. Every entry remembers which layer it came from.
//!
//! # Examples
//!
//! ```
//! use dirsort::file_category::{ExtensionMapping, MappingSource};
//!
//! let mut mapping = ExtensionMapping::default();
//! assert_eq!(mapping.lookup(".PDF"), Some("Documents"));
//!
//! mapping.apply_overrides(&[".pdf=Papers"]).unwrap();
//! assert_eq!(mapping.lookup(".pdf"), Some("Papers"));
//! assert_eq!(mapping.source_of(".pdf"), Some(MappingSource::CliOverride));
//! ```

use crate::config::{ConfigError, MappingConfig};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Category assigned to files whose name has no extension.
pub const NO_EXTENSION_CATEGORY: &str = "No Extension";

/// Category assigned to files whose extension has no mapping.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Characters that are not allowed in a category name, since it becomes a folder name.
const UNSAFE_CATEGORY_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Built-in extension mappings. Never mutated; every [`ExtensionMapping`]
/// starts from a fresh copy.
pub const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    // Images
    (".jpg", "Images"),
    (".jpeg", "Images"),
    (".png", "Images"),
    (".gif", "Images"),
    (".bmp", "Images"),
    (".svg", "Images"),
    (".webp", "Images"),
    (".tiff", "Images"),
    (".ico", "Images"),
    // Documents
    (".pdf", "Documents"),
    (".doc", "Documents"),
    (".docx", "Documents"),
    (".txt", "Documents"),
    (".rtf", "Documents"),
    (".odt", "Documents"),
    (".pages", "Documents"),
    // Spreadsheets
    (".xls", "Spreadsheets"),
    (".xlsx", "Spreadsheets"),
    (".csv", "Spreadsheets"),
    (".ods", "Spreadsheets"),
    (".numbers", "Spreadsheets"),
    // Presentations
    (".ppt", "Presentations"),
    (".pptx", "Presentations"),
    (".odp", "Presentations"),
    (".key", "Presentations"),
    // Code
    (".go", "Code"),
    (".js", "Code"),
    (".ts", "Code"),
    (".py", "Code"),
    (".java", "Code"),
    (".c", "Code"),
    (".cpp", "Code"),
    (".h", "Code"),
    (".hpp", "Code"),
    (".cs", "Code"),
    (".php", "Code"),
    (".rb", "Code"),
    (".rs", "Code"),
    (".swift", "Code"),
    (".kt", "Code"),
    (".scala", "Code"),
    (".html", "Code"),
    (".css", "Code"),
    (".scss", "Code"),
    (".sass", "Code"),
    (".less", "Code"),
    (".xml", "Code"),
    (".json", "Code"),
    (".yaml", "Code"),
    (".yml", "Code"),
    (".toml", "Code"),
    (".ini", "Code"),
    (".cfg", "Code"),
    (".conf", "Code"),
    // Archives
    (".zip", "Archives"),
    (".rar", "Archives"),
    (".7z", "Archives"),
    (".tar", "Archives"),
    (".gz", "Archives"),
    (".bz2", "Archives"),
    (".xz", "Archives"),
    (".iso", "Archives"),
    // Audio
    (".mp3", "Audio"),
    (".wav", "Audio"),
    (".flac", "Audio"),
    (".aac", "Audio"),
    (".ogg", "Audio"),
    (".wma", "Audio"),
    (".m4a", "Audio"),
    // Video
    (".mp4", "Video"),
    (".avi", "Video"),
    (".mkv", "Video"),
    (".mov", "Video"),
    (".wmv", "Video"),
    (".flv", "Video"),
    (".webm", "Video"),
    (".m4v", "Video"),
    (".3gp", "Video"),
    // Executables
    (".exe", "Executables"),
    (".msi", "Executables"),
    (".deb", "Executables"),
    (".rpm", "Executables"),
    (".dmg", "Executables"),
    (".app", "Executables"),
    (".apk", "Executables"),
];

/// Returns true for the categories that are computed but never relocated.
pub fn is_sentinel_category(category: &str) -> bool {
    category == UNKNOWN_CATEGORY || category == NO_EXTENSION_CATEGORY
}

/// Returns the lower-cased extension of a file name, including the leading dot.
///
/// Everything from the last `.` of the base name is the extension, so
/// dotfiles like `.bashrc` have one and `README` does not.
///
/// ```
/// use dirsort::file_category::extension_of;
/// use std::path::Path;
///
/// assert_eq!(extension_of(Path::new("dir/Photo.JPG")), ".jpg");
/// assert_eq!(extension_of(Path::new("archive.tar.gz")), ".gz");
/// assert_eq!(extension_of(Path::new("README")), "");
/// ```
pub fn extension_of(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    match name.rfind('.') {
        Some(idx) => name[idx..].to_lowercase(),
        None => String::new(),
    }
}

/// Where a mapping entry came from. Later variants take priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MappingSource {
    /// Built-in default dataset.
    Default,
    /// Configuration document.
    ConfigFile,
    /// `--map` command-line override.
    CliOverride,
}

impl fmt::Display for MappingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MappingSource::Default => "default",
            MappingSource::ConfigFile => "config-file",
            MappingSource::CliOverride => "cli-override",
        };
        f.write_str(name)
    }
}

/// Rejected extension, category or override.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingError {
    /// The extension string is empty.
    #[error("extension cannot be empty")]
    EmptyExtension,
    /// The extension does not start with a dot.
    #[error("invalid extension '{0}': extension must start with '.'")]
    MissingDot(String),
    /// The extension is a lone dot.
    #[error("invalid extension '.': extension must have content after '.'")]
    BareDot,
    /// The category name is empty.
    #[error("category cannot be empty")]
    EmptyCategory,
    /// The category name has surrounding whitespace.
    #[error("invalid category '{0}': category cannot have leading or trailing whitespace")]
    PaddedCategory(String),
    /// The category name contains a character that is unsafe in folder names.
    #[error("invalid category '{category}': contains invalid character '{ch}'")]
    UnsafeCategory {
        /// The rejected category.
        category: String,
        /// The offending character.
        ch: char,
    },
    /// An override without `=`.
    #[error("invalid mapping format '{0}', expected '.ext=Category'")]
    InvalidFormat(String),
}

/// Validates an extension: non-empty, starts with `.`, has content after it.
pub fn validate_extension(ext: &str) -> Result<(), MappingError> {
    if ext.is_empty() {
        return Err(MappingError::EmptyExtension);
    }
    if !ext.starts_with('.') {
        return Err(MappingError::MissingDot(ext.to_string()));
    }
    if ext.len() == 1 {
        return Err(MappingError::BareDot);
    }
    Ok(())
}

/// Validates a category name: non-empty, unpadded, and safe to use as a folder name.
pub fn validate_category(category: &str) -> Result<(), MappingError> {
    if category.is_empty() {
        return Err(MappingError::EmptyCategory);
    }
    if category.trim() != category {
        return Err(MappingError::PaddedCategory(category.to_string()));
    }
    if let Some(ch) = category.chars().find(|c| UNSAFE_CATEGORY_CHARS.contains(c)) {
        return Err(MappingError::UnsafeCategory {
            category: category.to_string(),
            ch,
        });
    }
    Ok(())
}

/// A single mapping entry: the category and the layer it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    /// Category (folder) name.
    pub category: String,
    /// Layer that last wrote this entry.
    pub source: MappingSource,
}

/// Outcome of merging a configuration document.
#[derive(Debug, Default)]
pub struct MergeReport {
    /// Number of entries written.
    pub applied: usize,
    /// Entries that failed validation, keyed by the raw extension as written.
    pub rejected: Vec<(String, MappingError)>,
}

/// Layered lookup from lower-cased extension to category name.
#[derive(Debug, Clone)]
pub struct ExtensionMapping {
    entries: HashMap<String, MappingEntry>,
}

impl ExtensionMapping {
    /// Creates a mapping seeded from `defaults`, all with [`MappingSource::Default`].
    pub fn new(defaults: &[(&str, &str)]) -> Self {
        let entries = defaults
            .iter()
            .map(|(ext, category)| {
                (
                    ext.to_lowercase(),
                    MappingEntry {
                        category: (*category).to_string(),
                        source: MappingSource::Default,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    /// Merges `customMappings` from the configuration document at `path`.
    ///
    /// A missing file is a no-op. Invalid entries are skipped and reported;
    /// only an unreadable or unparsable document is an error.
    pub fn merge_from_file(&mut self, path: &Path) -> Result<MergeReport, ConfigError> {
        match MappingConfig::load(path)? {
            Some(config) => Ok(self.merge_config(&config)),
            None => Ok(MergeReport::default()),
        }
    }

    /// Merges the entries of an already parsed configuration document.
    ///
    /// Entries set by a command-line override are left untouched, so the
    /// priority order holds whichever order the layers are applied in.
    pub fn merge_config(&mut self, config: &MappingConfig) -> MergeReport {
        let mut report = MergeReport::default();

        for (ext, category) in &config.custom_mappings {
            let validated = validate_extension(ext).and_then(|()| validate_category(category));
            if let Err(e) = validated {
                tracing::warn!(extension = %ext, category = %category, "skipping config mapping: {}", e);
                report.rejected.push((ext.clone(), e));
                continue;
            }

            let key = ext.to_lowercase();
            if self.source_of(&key) == Some(MappingSource::CliOverride) {
                continue;
            }
            self.insert(key, category.clone(), MappingSource::ConfigFile);
            report.applied += 1;
        }

        tracing::info!(applied = report.applied, "loaded custom mappings from config file");
        report
    }

    /// Applies `.ext=Category` overrides.
    ///
    /// All overrides are validated before any is written: one bad entry rejects
    /// the whole batch and leaves the mapping unchanged.
    pub fn apply_overrides<S: AsRef<str>>(&mut self, overrides: &[S]) -> Result<usize, MappingError> {
        let parsed = overrides
            .iter()
            .map(|entry| parse_override(entry.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let count = parsed.len();
        for (ext, category) in parsed {
            self.insert(ext, category, MappingSource::CliOverride);
        }
        if count > 0 {
            tracing::info!(count, "applied CLI mapping overrides");
        }
        Ok(count)
    }

    /// Case-insensitive lookup of an extension (with leading dot).
    pub fn lookup(&self, ext: &str) -> Option<&str> {
        self.entries
            .get(&ext.to_lowercase())
            .map(|entry| entry.category.as_str())
    }

    /// Returns the layer that provided the mapping for `ext`.
    pub fn source_of(&self, ext: &str) -> Option<MappingSource> {
        self.entries.get(&ext.to_lowercase()).map(|entry| entry.source)
    }

    /// Number of entries currently provided by `source`.
    pub fn count_by_source(&self, source: MappingSource) -> usize {
        self.entries.values().filter(|e| e.source == source).count()
    }

    /// Iterates over all `(extension, entry)` pairs, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MappingEntry)> {
        self.entries.iter().map(|(ext, entry)| (ext.as_str(), entry))
    }

    /// Number of mapped extensions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no extension is mapped.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, ext: String, category: String, source: MappingSource) {
        self.entries.insert(ext, MappingEntry { category, source });
    }
}

impl Default for ExtensionMapping {
    fn default() -> Self {
        Self::new(DEFAULT_CATEGORIES)
    }
}

/// Splits `.ext=Category` on the first `=`, trims both sides and validates them.
fn parse_override(entry: &str) -> Result<(String, String), MappingError> {
    let (ext, category) = entry
        .split_once('=')
        .ok_or_else(|| MappingError::InvalidFormat(entry.to_string()))?;
    let ext = ext.trim();
    let category = category.trim();

    validate_extension(ext)?;
    validate_category(category)?;

    Ok((ext.to_lowercase(), category.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn config_with(entries: &[(&str, &str)]) -> MappingConfig {
        MappingConfig {
            custom_mappings: entries
                .iter()
                .map(|(e, c)| (e.to_string(), c.to_string()))
                .collect::<BTreeMap<_, _>>(),
            description: None,
        }
    }

    #[test]
    fn test_defaults_are_tagged_default() {
        let mapping = ExtensionMapping::default();
        assert_eq!(mapping.lookup(".jpg"), Some("Images"));
        assert_eq!(mapping.lookup(".rs"), Some("Code"));
        assert_eq!(mapping.source_of(".jpg"), Some(MappingSource::Default));
        assert_eq!(mapping.len(), DEFAULT_CATEGORIES.len());
    }

    #[test]
    fn test_defaults_are_stored_lowercase() {
        let mapping = ExtensionMapping::new(&[(".MD", "Notes")]);
        assert_eq!(mapping.lookup(".md"), Some("Notes"));
        assert_eq!(mapping.lookup(".Md"), Some("Notes"));
    }

    #[test]
    fn test_lookup_case_insensitive() {
        let mapping = ExtensionMapping::default();
        assert_eq!(mapping.lookup(".PDF"), Some("Documents"));
        assert_eq!(mapping.lookup(".Mp3"), Some("Audio"));
        assert_eq!(mapping.lookup(".xyz"), None);
    }

    #[test]
    fn test_validate_extension() {
        assert!(validate_extension(".txt").is_ok());
        assert_eq!(validate_extension(""), Err(MappingError::EmptyExtension));
        assert_eq!(
            validate_extension("txt"),
            Err(MappingError::MissingDot("txt".to_string()))
        );
        assert_eq!(validate_extension("."), Err(MappingError::BareDot));
    }

    #[test]
    fn test_validate_category() {
        assert!(validate_category("Documents").is_ok());
        assert!(validate_category("My Docs").is_ok());
        assert_eq!(validate_category(""), Err(MappingError::EmptyCategory));
        assert!(matches!(
            validate_category(" Documents "),
            Err(MappingError::PaddedCategory(_))
        ));
        assert!(matches!(
            validate_category("Docs/Images"),
            Err(MappingError::UnsafeCategory { ch: '/', .. })
        ));
        for bad in ["a\\b", "a:b", "a*b", "a?b", "a\"b", "a<b", "a>b", "a|b"] {
            assert!(validate_category(bad).is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_merge_config_applies_valid_entries() {
        let mut mapping = ExtensionMapping::default();
        let report = mapping.merge_config(&config_with(&[(".md", "Notes"), (".JPG", "Photos")]));

        assert_eq!(report.applied, 2);
        assert!(report.rejected.is_empty());
        assert_eq!(mapping.lookup(".md"), Some("Notes"));
        assert_eq!(mapping.lookup(".jpg"), Some("Photos"));
        assert_eq!(mapping.source_of(".jpg"), Some(MappingSource::ConfigFile));
    }

    #[test]
    fn test_merge_config_skips_invalid_entries() {
        let mut mapping = ExtensionMapping::default();
        let report = mapping.merge_config(&config_with(&[
            ("txt", "Text"),
            (".log", " Logs "),
            (".bak", "Back/ups"),
            (".md", "Notes"),
        ]));

        assert_eq!(report.applied, 1);
        assert_eq!(report.rejected.len(), 3);
        assert_eq!(mapping.lookup(".md"), Some("Notes"));
        assert_eq!(mapping.lookup(".txt"), Some("Documents"));
        assert_eq!(mapping.lookup(".log"), None);
    }

    #[test]
    fn test_apply_overrides() {
        let mut mapping = ExtensionMapping::default();
        let count = mapping
            .apply_overrides(&[" .PDF = Papers ", ".md=Notes"])
            .expect("Overrides should apply");

        assert_eq!(count, 2);
        assert_eq!(mapping.lookup(".pdf"), Some("Papers"));
        assert_eq!(mapping.source_of(".pdf"), Some(MappingSource::CliOverride));
        assert_eq!(mapping.lookup(".md"), Some("Notes"));
    }

    #[test]
    fn test_apply_overrides_splits_on_first_equals() {
        let mut mapping = ExtensionMapping::default();
        mapping
            .apply_overrides(&[".x=a=b"])
            .expect("Only the first '=' separates");
        assert_eq!(mapping.lookup(".x"), Some("a=b"));
    }

    #[test]
    fn test_apply_overrides_missing_equals() {
        let mut mapping = ExtensionMapping::default();
        let err = mapping.apply_overrides(&[".pdf"]).unwrap_err();
        assert_eq!(err, MappingError::InvalidFormat(".pdf".to_string()));
    }

    #[test]
    fn test_apply_overrides_empty_category() {
        let mut mapping = ExtensionMapping::default();
        let err = mapping.apply_overrides(&[".pdf=   "]).unwrap_err();
        assert_eq!(err, MappingError::EmptyCategory);
    }

    #[test]
    fn test_apply_overrides_is_all_or_nothing() {
        let mut mapping = ExtensionMapping::default();
        let result = mapping.apply_overrides(&[".pdf=Papers", "md=Notes"]);

        assert!(result.is_err());
        assert_eq!(mapping.lookup(".pdf"), Some("Documents"));
        assert_eq!(mapping.source_of(".pdf"), Some(MappingSource::Default));
    }

    #[test]
    fn test_cli_override_beats_config() {
        let mut mapping = ExtensionMapping::default();
        mapping.merge_config(&config_with(&[(".pdf", "FromConfig")]));
        mapping
            .apply_overrides(&[".pdf=FromCli"])
            .expect("Override should apply");
        assert_eq!(mapping.lookup(".pdf"), Some("FromCli"));

        // Re-merging the config must not demote the override.
        mapping.merge_config(&config_with(&[(".pdf", "FromConfig")]));
        assert_eq!(mapping.lookup(".pdf"), Some("FromCli"));
        assert_eq!(mapping.source_of(".pdf"), Some(MappingSource::CliOverride));
    }

    #[test]
    fn test_count_by_source() {
        let mut mapping = ExtensionMapping::default();
        mapping.merge_config(&config_with(&[(".md", "Notes"), (".pdf", "Papers")]));
        mapping
            .apply_overrides(&[".rs=Rust"])
            .expect("Override should apply");

        assert_eq!(mapping.count_by_source(MappingSource::ConfigFile), 2);
        assert_eq!(mapping.count_by_source(MappingSource::CliOverride), 1);
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of(Path::new("a/b/photo.JPG")), ".jpg");
        assert_eq!(extension_of(Path::new("notes")), "");
        assert_eq!(extension_of(Path::new(".bashrc")), ".bashrc");
        assert_eq!(extension_of(Path::new("trailing.")), ".");
    }

    #[test]
    fn test_sentinels() {
        assert!(is_sentinel_category(UNKNOWN_CATEGORY));
        assert!(is_sentinel_category(NO_EXTENSION_CATEGORY));
        assert!(!is_sentinel_category("Images"));
    }
}
