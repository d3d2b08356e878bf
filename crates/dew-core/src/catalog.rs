//! Catalog of DEW dataset splits and source reference books.
//!
//! The benchmark ships two splits: DEW-LogiQ (multiple-choice QA curated
//! as a continuation of AgXQA) and DEW-MathQ (problems generated from
//! symbolic equations). Problems cite reference books; books under
//! copyright are flagged so their derived content stays out of published
//! output.
//!
//! # Example
//!
//! ```rust
//! use dew_core::catalog::{Catalog, SplitKind};
//!
//! let catalog = Catalog::builtin();
//! assert_eq!(catalog.split(SplitKind::MathQ).unwrap().name, "DEW-MathQ");
//! assert!(!catalog.book("usda-nrcs-irrigation-guide").unwrap().is_restricted());
//! ```

use crate::util::ids::normalize_id;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Dataset splits
// ============================================================================

/// The two splits of the benchmark.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitKind {
    /// Multiple-choice conceptual questions.
    LogiQ,
    /// Generated symbolic-equation problems.
    MathQ,
}

impl fmt::Display for SplitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LogiQ => write!(f, "logiq"),
            Self::MathQ => write!(f, "mathq"),
        }
    }
}

/// A named, externally hosted collection of question-answer items.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetSplit {
    /// Display name (e.g., "DEW-LogiQ").
    pub name: String,
    /// Which split this is.
    pub kind: SplitKind,
    /// Short description.
    pub description: String,
    /// Where the split is published, if known.
    #[serde(default)]
    pub hosting_url: Option<String>,
    /// Prior dataset this split continues, if any.
    #[serde(default)]
    pub derived_from: Option<String>,
}

// ============================================================================
// Reference books
// ============================================================================

/// Redistribution status of a reference book.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum License {
    /// Public domain or otherwise free to redistribute.
    #[default]
    Unrestricted,
    /// Copyrighted; derived content must not be redistributed.
    Copyrighted {
        /// License or copyright notice text.
        notice: String,
    },
}

/// Citation record for a source book.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferenceBook {
    /// Stable identifier used by problem citations.
    pub id: String,
    /// Book title.
    pub title: String,
    /// Author list, in citation order.
    pub authors: Vec<String>,
    /// Publication year.
    pub year: u16,
    /// Redistribution status.
    #[serde(default)]
    pub license: License,
}

impl ReferenceBook {
    /// Returns `true` if content derived from this book must be withheld.
    pub fn is_restricted(&self) -> bool {
        matches!(self.license, License::Copyrighted { .. })
    }

    /// Short "Authors (year). Title." citation string.
    pub fn citation(&self) -> String {
        format!("{} ({}). {}.", self.authors.join(", "), self.year, self.title)
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Splits and reference books known to the toolkit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Dataset splits.
    #[serde(default)]
    pub splits: Vec<DatasetSplit>,
    /// Reference books.
    #[serde(default)]
    pub books: Vec<ReferenceBook>,
}

impl Catalog {
    /// The catalog shipped with the toolkit.
    pub fn builtin() -> Self {
        Self {
            splits: vec![
                DatasetSplit {
                    name: "DEW-LogiQ".to_string(),
                    kind: SplitKind::LogiQ,
                    description: "Multiple-choice question answering on irrigation and \
                                  agricultural water management"
                        .to_string(),
                    hosting_url: Some(
                        "https://huggingface.co/datasets/msu-ceco/dew-logiq".to_string(),
                    ),
                    derived_from: Some("AgXQA".to_string()),
                },
                DatasetSplit {
                    name: "DEW-MathQ".to_string(),
                    kind: SplitKind::MathQ,
                    description: "Problems generated from symbolic equations and validated \
                                  by solving them"
                        .to_string(),
                    hosting_url: None,
                    derived_from: None,
                },
            ],
            books: vec![
                ReferenceBook {
                    id: "usda-nrcs-irrigation-guide".to_string(),
                    title: "National Engineering Handbook, Part 652: Irrigation Guide".to_string(),
                    authors: vec!["USDA Natural Resources Conservation Service".to_string()],
                    year: 1997,
                    license: License::Unrestricted,
                },
                ReferenceBook {
                    id: "irrigation-systems-management".to_string(),
                    title: "Irrigation Systems Management".to_string(),
                    authors: vec![
                        "D. E. Eisenhauer".to_string(),
                        "D. L. Martin".to_string(),
                        "D. M. Heeren".to_string(),
                        "G. J. Hoffman".to_string(),
                    ],
                    year: 2021,
                    license: License::Copyrighted {
                        notice: "Copyrighted by the publisher; annotations derived from this \
                                 book are not redistributed"
                            .to_string(),
                    },
                },
            ],
        }
    }

    /// Parse a catalog from YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let catalog: Catalog = serde_yaml::from_str(yaml)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Merge another catalog into this one; entries with the same book id
    /// or split kind are replaced.
    pub fn merge(&mut self, other: Catalog) {
        for split in other.splits {
            self.splits.retain(|s| s.kind != split.kind);
            self.splits.push(split);
        }
        for book in other.books {
            self.books.retain(|b| b.id != book.id);
            self.books.push(book);
        }
    }

    /// Look up a book by id. The lookup normalizes the id, so
    /// `"USDA_NRCS Irrigation Guide"` finds `usda-nrcs-irrigation-guide`.
    pub fn book(&self, id: &str) -> Option<&ReferenceBook> {
        let wanted = normalize_id(id);
        self.books.iter().find(|b| normalize_id(&b.id) == wanted)
    }

    /// Look up a split by kind.
    pub fn split(&self, kind: SplitKind) -> Option<&DatasetSplit> {
        self.splits.iter().find(|s| s.kind == kind)
    }

    /// Returns `true` if `book_id` names a restricted book.
    ///
    /// Unknown ids are not restricted.
    pub fn is_restricted(&self, book_id: &str) -> bool {
        self.book(book_id).is_some_and(ReferenceBook::is_restricted)
    }

    fn validate(&self) -> Result<()> {
        for (i, book) in self.books.iter().enumerate() {
            if book.id.trim().is_empty() {
                return Err(Error::validation_field(
                    format!("books[{i}].id"),
                    "must not be empty",
                ));
            }
            let dupes = self
                .books
                .iter()
                .filter(|b| normalize_id(&b.id) == normalize_id(&book.id))
                .count();
            if dupes > 1 {
                return Err(Error::validation_field(
                    format!("books[{i}].id"),
                    format!("duplicate book id '{}'", book.id),
                ));
            }
        }
        Ok(())
    }
}
