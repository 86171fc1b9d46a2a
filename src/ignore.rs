//! Gitignore-like exclusion patterns.
//!
//! Patterns are read one per line from an ignore file. Blank lines and lines
//! starting with `#` are skipped. Each pattern is compiled once into one of
//! five shapes, picked in this order:
//!
//! 1. Bare name (`Thumbs.db`): no `/` and no `*`, equals the file name.
//! 2. Directory (`build/`): a parent directory matches, or the relative path
//!    starts with the pattern.
//! 3. Root-anchored (`/config.json`): matched against the whole path relative
//!    to the root.
//! 4. Wildcard (`*.tmp`, `test.*`): matched against the relative path or the
//!    file name.
//! 5. Substring (`docs/draft`): contained in the relative path or file name.
//!
//! Matching never fails. A glob that does not compile degrades to a
//! substring test with the `*`s removed.

use glob::{MatchOptions, Pattern};
use std::fs;
use std::io;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

/// `*` and `?` stop at `/`, like shell globs.
const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Errors that can occur while loading an ignore file.
#[derive(Debug, thiserror::Error)]
pub enum IgnoreError {
    /// The ignore file exists but could not be read.
    #[error("failed to read ignore file {}: {source}", path.display())]
    Read {
        /// Path of the ignore file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}

/// Text matcher with `*` support.
#[derive(Debug, Clone)]
enum Wildcard {
    Exact(String),
    Prefix(String),
    Suffix(String),
    Glob(Pattern),
    Contains(String),
}

impl Wildcard {
    fn compile(pattern: &str) -> Self {
        if !pattern.contains('*') {
            return Wildcard::Exact(pattern.to_string());
        }
        if let Some(prefix) = pattern.strip_suffix('*') {
            return Wildcard::Prefix(prefix.to_string());
        }
        if let Some(suffix) = pattern.strip_prefix('*') {
            return Wildcard::Suffix(suffix.to_string());
        }
        match Pattern::new(pattern) {
            Ok(glob) => Wildcard::Glob(glob),
            Err(e) => {
                tracing::debug!(pattern, error = %e, "invalid glob, falling back to substring match");
                Wildcard::Contains(pattern.replace('*', ""))
            }
        }
    }

    fn matches(&self, text: &str) -> bool {
        match self {
            Wildcard::Exact(s) => text == s,
            Wildcard::Prefix(s) => text.starts_with(s.as_str()),
            Wildcard::Suffix(s) => text.ends_with(s.as_str()),
            Wildcard::Glob(glob) => glob.matches_with(text, GLOB_OPTIONS),
            Wildcard::Contains(s) => text.contains(s.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
enum Rule {
    BaseName(String),
    Directory { segment: Wildcard, prefix: String },
    Anchored(Wildcard),
    Wildcard(Wildcard),
    Substring(String),
}

/// A single compiled ignore pattern.
#[derive(Debug, Clone)]
struct IgnorePattern {
    raw: String,
    rule: Rule,
}

impl IgnorePattern {
    fn compile(raw: &str) -> Self {
        let pattern = raw.trim().replace(MAIN_SEPARATOR, "/");

        let rule = if !pattern.contains('/') && !pattern.contains('*') {
            Rule::BaseName(pattern.clone())
        } else if let Some(dir) = pattern.strip_suffix('/') {
            Rule::Directory {
                segment: Wildcard::compile(dir),
                prefix: pattern.clone(),
            }
        } else if let Some(anchored) = pattern.strip_prefix('/') {
            Rule::Anchored(Wildcard::compile(anchored))
        } else if pattern.contains('*') {
            Rule::Wildcard(Wildcard::compile(&pattern))
        } else {
            Rule::Substring(pattern.clone())
        };

        Self { raw: pattern, rule }
    }

    fn matches(&self, rel_path: &str, file_name: &str) -> bool {
        match &self.rule {
            Rule::BaseName(name) => file_name == name,
            Rule::Directory { segment, prefix } => {
                let mut parts: Vec<&str> = rel_path.split('/').collect();
                parts.pop();
                parts.iter().any(|part| segment.matches(part))
                    || format!("{}/", rel_path).starts_with(prefix.as_str())
            }
            Rule::Anchored(wildcard) => wildcard.matches(rel_path),
            Rule::Wildcard(wildcard) => wildcard.matches(rel_path) || wildcard.matches(file_name),
            Rule::Substring(s) => rel_path.contains(s.as_str()) || file_name.contains(s.as_str()),
        }
    }
}

/// Ordered set of ignore patterns evaluated relative to a root directory.
#[derive(Debug, Clone)]
pub struct IgnoreMatcher {
    root: PathBuf,
    patterns: Vec<IgnorePattern>,
}

impl IgnoreMatcher {
    /// Creates an empty matcher for paths under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            patterns: Vec::new(),
        }
    }

    /// Creates a matcher with the given patterns, filtered like ignore file lines.
    pub fn with_patterns<I, S>(root: impl Into<PathBuf>, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut matcher = Self::new(root);
        for pattern in patterns {
            matcher.add_pattern(pattern.as_ref());
        }
        matcher
    }

    /// Loads patterns from an ignore file and returns how many were added.
    ///
    /// A missing file adds nothing and is not an error.
    pub fn load_file(&mut self, path: &Path) -> Result<usize, IgnoreError> {
        if !path.exists() {
            return Ok(0);
        }

        let content = fs::read_to_string(path).map_err(|source| IgnoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let added = content.lines().filter(|line| self.add_pattern(line)).count();
        if added > 0 {
            tracing::info!(count = added, path = %path.display(), "loaded ignore patterns");
        }
        Ok(added)
    }

    /// Adds one pattern. Blank lines and `#` comments are dropped and return false.
    pub fn add_pattern(&mut self, line: &str) -> bool {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return false;
        }
        self.patterns.push(IgnorePattern::compile(trimmed));
        true
    }

    /// Returns true if any pattern matches `path`.
    pub fn should_ignore(&self, path: &Path) -> bool {
        if self.patterns.is_empty() {
            return false;
        }

        let rel_path = self.relative_path(path);
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| rel_path.clone());

        self.patterns
            .iter()
            .any(|pattern| pattern.matches(&rel_path, &file_name))
    }

    /// The stored patterns, in insertion order.
    pub fn patterns(&self) -> Vec<&str> {
        self.patterns.iter().map(|p| p.raw.as_str()).collect()
    }

    /// The root that paths are made relative to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of stored patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns true if no pattern is stored.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// `/`-separated path relative to the root; paths outside it are used as given.
    fn relative_path(&self, path: &Path) -> String {
        match path.strip_prefix(&self.root) {
            Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
            Ok(rel) => to_slash(rel),
            Err(_) => to_slash(path),
        }
    }
}

fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace(MAIN_SEPARATOR, "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ROOT: &str = "/data/root";

    fn matcher(patterns: &[&str]) -> IgnoreMatcher {
        IgnoreMatcher::with_patterns(ROOT, patterns)
    }

    fn ignored(m: &IgnoreMatcher, rel: &str) -> bool {
        m.should_ignore(&Path::new(ROOT).join(rel))
    }

    #[test]
    fn test_load_file_skips_comments_and_blank_lines() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join(".dirsortignore");
        fs::write(
            &path,
            "# comment\n*.tmp\n*.log\n\n.DS_Store\nnode_modules/\n  spaced.txt  \n\n# end\n*.cache\n",
        )
        .expect("Failed to write ignore file");

        let mut m = IgnoreMatcher::new(temp_dir.path());
        let added = m.load_file(&path).expect("Ignore file should load");

        assert_eq!(added, 6);
        assert_eq!(
            m.patterns(),
            vec!["*.tmp", "*.log", ".DS_Store", "node_modules/", "spaced.txt", "*.cache"]
        );
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let mut m = IgnoreMatcher::new(ROOT);
        let added = m
            .load_file(Path::new("/non/existent/.dirsortignore"))
            .expect("Missing file is not an error");
        assert_eq!(added, 0);
        assert!(m.is_empty());
    }

    #[test]
    fn test_no_patterns_ignores_nothing() {
        let m = IgnoreMatcher::new(ROOT);
        assert!(!ignored(&m, "anything.txt"));
    }

    #[test]
    fn test_bare_name_matches_base_name_anywhere() {
        let m = matcher(&[".DS_Store", "Thumbs.db"]);
        assert!(ignored(&m, ".DS_Store"));
        assert!(ignored(&m, "sub/dir/.DS_Store"));
        assert!(ignored(&m, "Thumbs.db"));
        assert!(!ignored(&m, "other.txt"));
        assert!(!ignored(&m, "my.DS_Store"));
    }

    #[test]
    fn test_directory_pattern() {
        let m = matcher(&[".git/", "node_modules/", "build/"]);
        assert!(ignored(&m, ".git/config"));
        assert!(ignored(&m, ".git/objects/abc"));
        assert!(ignored(&m, "node_modules/package/index.js"));
        assert!(ignored(&m, "build/output.exe"));
        assert!(ignored(&m, "src/build/output"));
        assert!(!ignored(&m, "src/main.go"));
        assert!(!ignored(&m, "git-info.txt"));
        assert!(!ignored(&m, "buildfile"));
    }

    #[test]
    fn test_directory_pattern_matches_directory_itself() {
        let m = matcher(&["build/"]);
        assert!(ignored(&m, "build"));
    }

    #[test]
    fn test_directory_pattern_with_wildcard_segment() {
        let m = matcher(&["cache*/"]);
        assert!(ignored(&m, "cache_v2/data.bin"));
        assert!(ignored(&m, "a/cache/data.bin"));
        assert!(!ignored(&m, "data/cachefile"));
    }

    #[test]
    fn test_directory_pattern_with_nested_prefix() {
        let m = matcher(&["docs/drafts/"]);
        assert!(ignored(&m, "docs/drafts/one.md"));
        assert!(!ignored(&m, "docs/final/one.md"));
    }

    #[test]
    fn test_root_anchored_pattern() {
        let m = matcher(&["/config.json"]);
        assert!(ignored(&m, "config.json"));
        assert!(!ignored(&m, "sub/config.json"));
    }

    #[test]
    fn test_root_anchored_pattern_with_wildcard() {
        let m = matcher(&["/*.log"]);
        assert!(ignored(&m, "app.log"));
        // Suffix test on the whole relative path.
        assert!(ignored(&m, "logs/app.log"));
        assert!(!ignored(&m, "app.txt"));
    }

    #[test]
    fn test_wildcard_suffix_and_prefix() {
        let m = matcher(&["*.tmp", "test.*"]);
        assert!(ignored(&m, "file.tmp"));
        assert!(ignored(&m, "a/b/file.tmp"));
        assert!(!ignored(&m, "file.tmpx"));
        assert!(ignored(&m, "test.txt"));
        assert!(ignored(&m, "test.md"));
        assert!(!ignored(&m, "testing.txt"));
    }

    #[test]
    fn test_wildcard_prefix_uses_base_name_too() {
        let m = matcher(&["draft*"]);
        assert!(ignored(&m, "draft-1.md"));
        assert!(ignored(&m, "notes/draft-2.md"));
        assert!(!ignored(&m, "notes/final.md"));
    }

    #[test]
    fn test_wildcard_inner_glob() {
        let m = matcher(&["report*.pdf"]);
        assert!(ignored(&m, "report-2024.pdf"));
        assert!(ignored(&m, "archive/report1.pdf"));
        assert!(!ignored(&m, "summary.pdf"));
    }

    #[test]
    fn test_glob_star_does_not_cross_separator() {
        let m = matcher(&["a*z"]);
        assert!(ignored(&m, "abcz"));
        assert!(!ignored(&m, "ab/cz"));
    }

    #[test]
    fn test_invalid_glob_falls_back_to_substring() {
        let m = matcher(&["[bad*name"]);
        assert!(ignored(&m, "x[badname.txt"));
        assert!(!ignored(&m, "good.txt"));
    }

    #[test]
    fn test_substring_fallback() {
        let m = matcher(&["docs/draft"]);
        assert!(ignored(&m, "docs/draft.md"));
        assert!(ignored(&m, "old/docs/drafts/x.txt"));
        assert!(!ignored(&m, "docs/final.md"));
    }

    #[test]
    fn test_path_outside_root_uses_raw_path() {
        let m = matcher(&["elsewhere/file"]);
        assert!(m.should_ignore(Path::new("/elsewhere/file.txt")));
        assert!(!m.should_ignore(Path::new("/data/root/file.txt")));
    }

    #[test]
    fn test_matching_is_idempotent() {
        let m = matcher(&["*.tmp", "build/"]);
        let path = Path::new(ROOT).join("build/a.tmp");
        assert_eq!(m.should_ignore(&path), m.should_ignore(&path));
    }

    #[test]
    fn test_add_pattern_filters_comments() {
        let mut m = IgnoreMatcher::new(ROOT);
        assert!(!m.add_pattern("# nope"));
        assert!(!m.add_pattern("   "));
        assert!(m.add_pattern("*.bak"));
        assert_eq!(m.len(), 1);
    }
}
