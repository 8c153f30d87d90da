//! Validate manufacturer part numbers against text extracted from datasheet PDFs.
//!
//! The pipeline has two stages: [`corpus`] fetches and extracts documents into a
//! [`Corpus`], then [`matcher`] classifies each [`PartRecord`] into a
//! [`MatchVerdict`]. [`pipeline::Validator`] wires both together.

pub mod config;
pub mod corpus;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod matcher;
pub mod pipeline;
pub mod similarity;
pub mod tokenizer;

pub use config::{CorpusConfig, FetchConfig, MatchConfig, ValidationConfig};
pub use corpus::{BuildStats, Corpus, CorpusBuilder};
pub use error::{DocumentError, ExtractError, FetchError, PipelineError};
pub use matcher::{match_part, match_parts};
pub use pipeline::{ValidationReport, Validator};

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;

/// Opaque document identifier, normally a datasheet URL. Identity is string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentRef(String);

impl DocumentRef {
    pub fn new(reference: impl Into<String>) -> Self { Self(reference.into()) }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl Borrow<str> for DocumentRef {
    fn borrow(&self) -> &str { &self.0 }
}

impl From<String> for DocumentRef {
    fn from(s: String) -> Self { Self(s) }
}

impl From<&str> for DocumentRef {
    fn from(s: &str) -> Self { Self(s.to_string()) }
}

/// One input row: the part to validate and, optionally, the only document it may be found in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartRecord {
    #[serde(alias = "part identifier", alias = "part_identifier", alias = "mpn", alias = "MPN")]
    pub part: String,
    #[serde(
        default,
        alias = "document reference",
        alias = "document_reference",
        alias = "pdf",
        alias = "PDF"
    )]
    pub document: Option<DocumentRef>,
}

impl PartRecord {
    /// A record checked against every document in the corpus.
    pub fn unscoped(part: impl Into<String>) -> Self {
        Self { part: part.into(), document: None }
    }

    /// A record checked only against `document`.
    pub fn scoped(part: impl Into<String>, document: impl Into<DocumentRef>) -> Self {
        Self { part: part.into(), document: Some(document.into()) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Exact,
    FuzzyMatch,
    NotFound,
    Unreadable,
    MissingDocument,
}

impl MatchStatus {
    pub const ALL: [MatchStatus; 5] = [
        MatchStatus::Exact,
        MatchStatus::FuzzyMatch,
        MatchStatus::NotFound,
        MatchStatus::Unreadable,
        MatchStatus::MissingDocument,
    ];

    /// Label shown to people reviewing results.
    pub fn label(self) -> &'static str {
        match self {
            MatchStatus::Exact => "Exact",
            MatchStatus::FuzzyMatch => "Includes or Missed Suffixes",
            MatchStatus::NotFound => "Not Found",
            MatchStatus::Unreadable => "OCR",
            MatchStatus::MissingDocument => "Missing Document",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

/// Outcome for one [`PartRecord`].
///
/// Built only through the status constructors, so `Exact`/`FuzzyMatch` always carry an
/// equivalent and `Unreadable`/`MissingDocument` never carry an equivalent or similars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchVerdict {
    part: String,
    status: MatchStatus,
    equivalent: Option<String>,
    similars: Option<BTreeSet<String>>,
    document: Option<DocumentRef>,
}

impl MatchVerdict {
    pub fn exact(part: &str, similars: BTreeSet<String>, document: DocumentRef) -> Self {
        Self {
            part: part.to_string(),
            status: MatchStatus::Exact,
            equivalent: Some(part.to_string()),
            similars: (!similars.is_empty()).then_some(similars),
            document: Some(document),
        }
    }

    pub fn fuzzy(part: &str, equivalent: String, document: DocumentRef) -> Self {
        Self {
            part: part.to_string(),
            status: MatchStatus::FuzzyMatch,
            equivalent: Some(equivalent),
            similars: None,
            document: Some(document),
        }
    }

    pub fn not_found(part: &str) -> Self { Self::bare(part, MatchStatus::NotFound) }

    pub fn unreadable(part: &str) -> Self { Self::bare(part, MatchStatus::Unreadable) }

    pub fn missing_document(part: &str) -> Self { Self::bare(part, MatchStatus::MissingDocument) }

    fn bare(part: &str, status: MatchStatus) -> Self {
        Self { part: part.to_string(), status, equivalent: None, similars: None, document: None }
    }

    pub fn part(&self) -> &str { &self.part }
    pub fn status(&self) -> MatchStatus { self.status }
    pub fn equivalent(&self) -> Option<&str> { self.equivalent.as_deref() }
    pub fn similars(&self) -> Option<&BTreeSet<String>> { self.similars.as_ref() }
    pub fn document(&self) -> Option<&DocumentRef> { self.document.as_ref() }

    /// Copy of this verdict with every string value passed through `clean`.
    pub fn map_strings(&self, clean: impl Fn(&str) -> String) -> Self {
        Self {
            part: clean(&self.part),
            status: self.status,
            equivalent: self.equivalent.as_deref().map(&clean),
            similars: self.similars.as_ref().map(|s| s.iter().map(|v| clean(v)).collect()),
            document: self.document.as_ref().map(|d| DocumentRef::new(clean(d.as_str()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn part_record_accepts_column_aliases() {
        let r: PartRecord =
            serde_json::from_str(r#"{"part identifier":"LM317T","document reference":"https://x/ds.pdf"}"#).unwrap();
        assert_eq!(r, PartRecord::scoped("LM317T", "https://x/ds.pdf"));

        let r: PartRecord = serde_json::from_str(r#"{"MPN":"NE555P"}"#).unwrap();
        assert_eq!(r, PartRecord::unscoped("NE555P"));
    }

    #[test]
    fn unreadable_verdict_has_no_values() {
        let v = MatchVerdict::unreadable("ABC");
        assert_eq!(v.status(), MatchStatus::Unreadable);
        assert!(v.equivalent().is_none());
        assert!(v.similars().is_none());
    }

    #[test]
    fn verdict_serializes_snake_case_status() {
        let v = MatchVerdict::fuzzy("ABC-124", "ABC-123".into(), "doc".into());
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["status"], "fuzzy_match");
        assert_eq!(json["equivalent"], "ABC-123");
        assert_eq!(json["document"], "doc");
    }
}
