use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Party, SpeechRecord};

/// Row of the secondary corpus after the faction join, native party spelling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusSpeech {
    /// Row id from the speech table, when present
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub speech_content: String,
    pub date: NaiveDate,
    pub abbreviation: String,
    pub full_name: Option<String>,
}

impl CorpusSpeech {
    /// Identifies the row in error reports: the table id when present,
    /// otherwise speaker and date
    pub fn row_label(&self) -> String {
        match &self.id {
            Some(id) => format!("speeches row {}", id),
            None => format!(
                "speeches row ({} {}, {})",
                self.first_name.as_deref().unwrap_or("?"),
                self.last_name.as_deref().unwrap_or("?"),
                self.date
            ),
        }
    }
}

/// The column set shared by both sources.
///
/// Fields are declared in alphabetical column order, so the derived `Ord`
/// compares rows column by column in that order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CorpusRow {
    pub abbreviation: Option<Party>,
    pub date: NaiveDate,
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName")]
    pub last_name: Option<String>,
    #[serde(rename = "speechContent")]
    pub speech_content: String,
}

impl CorpusRow {
    /// Project a normalized transcript speech onto the shared columns
    pub fn from_record(record: &SpeechRecord) -> Self {
        Self {
            abbreviation: record.party,
            date: record.date,
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            speech_content: record.text.clone(),
        }
    }
}

/// Counters collected while reconciling
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationReport {
    pub transcript_rows: usize,
    pub corpus_rows: usize,
    pub duplicates_removed: usize,
    pub short_rows_dropped: usize,
    pub parties_backfilled: usize,
    pub unresolved_parties: usize,
}

/// Final merged, deduplicated corpus sorted by date
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciledCorpus {
    pub rows: Vec<CorpusRow>,
}

impl ReconciledCorpus {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CorpusRow> {
        self.rows.iter()
    }

    /// Date range covered by the corpus
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.rows.first()?;
        let last = self.rows.last()?;
        Some((first.date, last.date))
    }
}
