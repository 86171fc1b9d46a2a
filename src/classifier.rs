//! Assigns a path to a category, or excludes it.

use crate::file_category::{
    ExtensionMapping, NO_EXTENSION_CATEGORY, UNKNOWN_CATEGORY, extension_of, is_sentinel_category,
};
use crate::ignore::IgnoreMatcher;
use std::path::Path;

/// The result of classifying one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// An ignore pattern matched; no category was computed.
    Excluded,
    /// The file name has no extension.
    NoExtension,
    /// The extension has no mapping.
    Unknown {
        /// The lower-cased extension, with leading dot.
        extension: String,
    },
    /// The extension maps to a category.
    Mapped {
        /// Category name.
        category: String,
    },
}

impl Classification {
    /// Category name, including the sentinel names. `None` when excluded.
    pub fn category(&self) -> Option<&str> {
        match self {
            Classification::Excluded => None,
            Classification::NoExtension => Some(NO_EXTENSION_CATEGORY),
            Classification::Unknown { .. } => Some(UNKNOWN_CATEGORY),
            Classification::Mapped { category } => Some(category.as_str()),
        }
    }

    /// Returns true if the path was excluded by an ignore pattern.
    pub fn is_excluded(&self) -> bool {
        matches!(self, Classification::Excluded)
    }

    /// Returns the category folder to move into, if the file should be moved at all.
    ///
    /// Sentinel categories are never relocated, including when a mapping
    /// explicitly names one of them.
    pub fn destination_category(&self) -> Option<&str> {
        match self {
            Classification::Mapped { category } if !is_sentinel_category(category) => {
                Some(category.as_str())
            }
            _ => None,
        }
    }
}

/// Combines an [`ExtensionMapping`] with an [`IgnoreMatcher`].
#[derive(Debug, Clone)]
pub struct Classifier {
    mapping: ExtensionMapping,
    ignore: IgnoreMatcher,
}

impl Classifier {
    /// Creates a classifier from a mapping and ignore matcher.
    pub fn new(mapping: ExtensionMapping, ignore: IgnoreMatcher) -> Self {
        Self { mapping, ignore }
    }

    /// Classifies `path`. Pure: the same inputs always give the same result.
    pub fn classify(&self, path: &Path) -> Classification {
        if self.ignore.should_ignore(path) {
            return Classification::Excluded;
        }

        let extension = extension_of(path);
        if let Some(category) = self.mapping.lookup(&extension) {
            return Classification::Mapped {
                category: category.to_string(),
            };
        }

        if extension.is_empty() {
            Classification::NoExtension
        } else {
            Classification::Unknown { extension }
        }
    }

    /// Returns true if an ignore pattern matches `path`.
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.ignore.should_ignore(path)
    }

    /// The extension mapping in use.
    pub fn mapping(&self) -> &ExtensionMapping {
        &self.mapping
    }

    /// The ignore matcher in use.
    pub fn ignore(&self) -> &IgnoreMatcher {
        &self.ignore
    }
}
