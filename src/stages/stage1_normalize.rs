use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::error::{PipelineError, Result, SourceKind, VocabularyError};
use crate::models::{ParsedSpeech, SpeechRecord};
use crate::vocabulary::PartyVocabulary;

/// Result of Stage 1 normalization
#[derive(Debug)]
pub struct Stage1Result {
    /// Speeches with canonical parties
    pub records: Vec<SpeechRecord>,
    /// Speeches rewritten by an override rule
    pub overrides_applied: usize,
    /// Unknown labels in free-text documents; those documents are dropped
    pub skipped: Vec<VocabularyError>,
}

/// Execute Stage 1: map parser party labels into the canonical vocabulary.
///
/// Labels matching an override rule take that rule's identity and party.
/// Every other label goes through the transcript alias table. Unknown labels
/// from structured transcripts fail the stage; the error lists each distinct
/// offending value once. An unknown label in a free-text document only drops
/// that document, which is reported in `skipped`.
pub fn execute_stage1(speeches: Vec<ParsedSpeech>, vocabulary: &PartyVocabulary) -> Result<Stage1Result> {
    let mut records = Vec::with_capacity(speeches.len());
    let mut overrides_applied = 0;
    let mut errors: Vec<VocabularyError> = Vec::new();
    let mut seen = HashSet::new();
    let mut skipped: Vec<VocabularyError> = Vec::new();

    for mut speech in speeches {
        if let Some(rule) = vocabulary.override_for(speech.faction.as_deref()) {
            debug!(
                "{}: reassigning {:?} speech to {} {}",
                speech.source, speech.faction, rule.first_name, rule.last_name
            );
            speech.first_name = Some(rule.first_name.clone());
            speech.last_name = Some(rule.last_name.clone());
            overrides_applied += 1;
            records.push(SpeechRecord::from_parsed(speech, Some(rule.party)));
            continue;
        }

        match vocabulary
            .transcript
            .normalize(speech.faction.as_deref(), speech.origin, &speech.source)
        {
            Ok(party) => records.push(SpeechRecord::from_parsed(speech, party)),
            Err(e) if e.source_kind == SourceKind::FreeText => {
                if !skipped.contains(&e) {
                    skipped.push(e);
                }
            }
            Err(e) => {
                if seen.insert((e.source_kind, e.value.clone())) {
                    errors.push(e);
                }
            }
        }
    }

    if !errors.is_empty() {
        return Err(PipelineError::Vocabulary(errors));
    }

    if !skipped.is_empty() {
        let dropped: HashSet<&str> = skipped.iter().map(|e| e.document.as_str()).collect();
        for e in &skipped {
            warn!("Dropping free-text document: {}", e);
        }
        records.retain(|r| !(r.origin == SourceKind::FreeText && dropped.contains(r.source.as_str())));
    }

    info!(
        "Stage 1: {} speeches normalized, {} overrides applied",
        records.len(),
        overrides_applied
    );

    Ok(Stage1Result {
        records,
        overrides_applied,
        skipped,
    })
}
