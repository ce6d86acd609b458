use std::collections::{BTreeSet, HashSet};

use tracing::{debug, info};

use crate::error::{PipelineError, Result, SourceKind, VocabularyError};
use crate::models::{CorpusRow, CorpusSpeech, ReconciledCorpus, ReconciliationReport, SpeechRecord};
use crate::vocabulary::{AliasTable, OfficeholderLookup, PartyVocabulary};

/// Configuration for Stage 2 reconciliation
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    /// Speeches shorter than this, after trimming, are dropped
    pub min_text_chars: usize,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self { min_text_chars: 40 }
    }
}

/// Result of Stage 2 reconciliation
#[derive(Debug)]
pub struct Stage2Result {
    pub corpus: ReconciledCorpus,
    pub report: ReconciliationReport,
}

/// Project corpus speeches onto the shared columns, mapping native
/// abbreviations into the canonical vocabulary.
///
/// Every distinct unknown abbreviation is collected before failing; each
/// error names the first row that carried it.
pub fn align_corpus(speeches: &[CorpusSpeech], aliases: &AliasTable) -> Result<Vec<CorpusRow>> {
    let mut rows = Vec::with_capacity(speeches.len());
    let mut errors: Vec<VocabularyError> = Vec::new();
    let mut seen = HashSet::new();

    for speech in speeches {
        match aliases.normalize(Some(&speech.abbreviation), SourceKind::Corpus, &speech.row_label()) {
            Ok(party) => rows.push(CorpusRow {
                abbreviation: party,
                date: speech.date,
                first_name: speech.first_name.clone(),
                last_name: speech.last_name.clone(),
                speech_content: speech.speech_content.clone(),
            }),
            Err(e) => {
                if seen.insert(e.value.clone()) {
                    errors.push(e);
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(rows)
    } else {
        Err(PipelineError::Vocabulary(errors))
    }
}

/// Fill a missing party from the officeholder list. Returns whether the row
/// changed.
fn backfill_party(row: &mut CorpusRow, officeholders: &OfficeholderLookup) -> bool {
    if row.abbreviation.is_some() {
        return false;
    }
    let (Some(first), Some(last)) = (row.first_name.as_deref(), row.last_name.as_deref()) else {
        return false;
    };
    match officeholders.lookup(first, last) {
        Some(party) => {
            debug!("Backfilled {} {} as {}", first, last, party);
            row.abbreviation = Some(party);
            true
        }
        None => false,
    }
}

/// Merge normalized transcript speeches with the secondary corpus.
///
/// Rows are trimmed and length-filtered first, then deduplicated, then
/// parties still missing are taken from the officeholder list. Backfill can
/// turn two rows into the same row, so the set is deduplicated again before
/// the final date sort. Rows sharing a date keep their full column order,
/// which makes the output independent of input order.
pub fn reconcile_corpus(
    transcripts: &[SpeechRecord],
    corpus: &[CorpusSpeech],
    vocabulary: &PartyVocabulary,
    officeholders: &OfficeholderLookup,
    config: &ReconcileConfig,
) -> Result<Stage2Result> {
    let corpus_rows = align_corpus(corpus, &vocabulary.corpus)?;

    let mut report = ReconciliationReport {
        transcript_rows: transcripts.len(),
        corpus_rows: corpus_rows.len(),
        ..Default::default()
    };

    let mut kept = Vec::with_capacity(transcripts.len() + corpus_rows.len());
    for mut row in transcripts.iter().map(CorpusRow::from_record).chain(corpus_rows) {
        let trimmed = row.speech_content.trim();
        if trimmed.chars().count() < config.min_text_chars {
            report.short_rows_dropped += 1;
            continue;
        }
        if trimmed.len() != row.speech_content.len() {
            row.speech_content = trimmed.to_string();
        }
        kept.push(row);
    }
    let kept_len = kept.len();

    let unique: BTreeSet<CorpusRow> = kept.into_iter().collect();

    let mut backfilled = BTreeSet::new();
    for mut row in unique {
        if backfill_party(&mut row, officeholders) {
            report.parties_backfilled += 1;
        }
        if row.abbreviation.is_none() {
            report.unresolved_parties += 1;
        }
        backfilled.insert(row);
    }

    let mut rows: Vec<CorpusRow> = backfilled.into_iter().collect();
    rows.sort_by_key(|row| row.date);
    report.duplicates_removed = kept_len - rows.len();

    info!(
        "Stage 2: {} rows ({} transcript, {} corpus), {} duplicates, {} short, {} backfilled",
        rows.len(),
        report.transcript_rows,
        report.corpus_rows,
        report.duplicates_removed,
        report.short_rows_dropped,
        report.parties_backfilled
    );

    Ok(Stage2Result {
        corpus: ReconciledCorpus { rows },
        report,
    })
}
