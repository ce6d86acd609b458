use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Which dataset a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Structured XML plenary transcript
    Transcript,
    /// Text recovered from a non-structured document
    FreeText,
    /// OpenDiscourse speech table
    Corpus,
    /// Static officeholder list
    Officeholder,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceKind::Transcript => "transcript",
            SourceKind::FreeText => "free-text",
            SourceKind::Corpus => "corpus",
            SourceKind::Officeholder => "officeholder",
        };
        f.write_str(name)
    }
}

/// A single document could not be parsed. The batch continues without it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("{document}: invalid date {value:?} (expected {expected})")]
    InvalidDate {
        document: String,
        value: String,
        expected: &'static str,
    },

    #[error("{document}: missing attribute `{attribute}`")]
    MissingAttribute { document: String, attribute: String },

    #[error("{document}: attribute `{attribute}` is not a number: {value:?}")]
    InvalidNumber {
        document: String,
        attribute: String,
        value: String,
    },

    #[error("{document}: malformed markup: {message}")]
    Markup { document: String, message: String },

    #[error("{document}: no session date in file name")]
    UndatedDocument { document: String },
}

impl FormatError {
    /// Identifier of the document that failed
    pub fn document(&self) -> &str {
        match self {
            FormatError::InvalidDate { document, .. }
            | FormatError::MissingAttribute { document, .. }
            | FormatError::InvalidNumber { document, .. }
            | FormatError::Markup { document, .. }
            | FormatError::UndatedDocument { document } => document,
        }
    }
}

/// A party string outside the known alias set
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
#[error("{source_kind} {document}: unknown party label {value:?}")]
pub struct VocabularyError {
    pub source_kind: SourceKind,
    pub document: String,
    pub value: String,
}

/// Whole-run failures. No partial output is produced.
#[derive(Error, Debug)]
pub enum StructuralError {
    #[error("{table}: missing required columns {columns:?}")]
    MissingColumns { table: String, columns: Vec<String> },

    #[error("no documents found under {path:?}")]
    NoDocuments { path: PathBuf },

    #[error("{table}: {message}")]
    UnreadableTable { table: String, message: String },
}

/// Top-level pipeline error
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("{} unknown party label(s): {}", .0.len(), summarize(.0))]
    Vocabulary(Vec<VocabularyError>),

    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<VocabularyError> for PipelineError {
    fn from(err: VocabularyError) -> Self {
        PipelineError::Vocabulary(vec![err])
    }
}

fn summarize(errors: &[VocabularyError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_error_lists_every_value() {
        let err = PipelineError::Vocabulary(vec![
            VocabularyError {
                source_kind: SourceKind::Transcript,
                document: "20001.xml".to_string(),
                value: "XYZ123".to_string(),
            },
            VocabularyError {
                source_kind: SourceKind::Corpus,
                document: "speeches.csv".to_string(),
                value: "ABC".to_string(),
            },
        ]);

        let message = err.to_string();
        assert!(message.starts_with("2 unknown party label(s)"));
        assert!(message.contains("transcript 20001.xml"));
        assert!(message.contains("\"XYZ123\""));
        assert!(message.contains("corpus speeches.csv"));
    }

    #[test]
    fn test_format_error_document() {
        let err = FormatError::MissingAttribute {
            document: "20001.xml".to_string(),
            attribute: "sitzung-datum".to_string(),
        };
        assert_eq!(err.document(), "20001.xml");
    }
}
