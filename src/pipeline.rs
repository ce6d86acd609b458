use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::error::StructuralError;
use crate::io::{load_corpus_files, read_free_text, read_transcripts, FreeTextBatch};
use crate::models::{ReconciledCorpus, ReconciliationReport};
use crate::parsers::CorpusLoadReport;
use crate::stages::{
    execute_stage0, execute_stage1, execute_stage3, reconcile_corpus, Stage0Config,
};
use crate::vocabulary::{OfficeholderLookup, PartyVocabulary};

/// Everything a pipeline run produced
#[derive(Debug)]
pub struct PipelineOutput {
    pub corpus: ReconciledCorpus,
    pub report: ReconciliationReport,
    pub corpus_load: CorpusLoadReport,
    /// Documents that produced no speeches, with the reason
    pub skipped_documents: Vec<(String, String)>,
    /// Where the corpus was written, when saving was requested
    pub written: Option<PathBuf>,
}

/// Run the full pipeline with the built-in vocabulary and officeholder list
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineOutput> {
    let vocabulary = PartyVocabulary::default();
    let officeholders = OfficeholderLookup::builtin(&vocabulary.officeholder)
        .context("Failed to build officeholder lookup")?;
    run_pipeline_with(config, &vocabulary, &officeholders)
}

/// Run the full pipeline with caller-supplied lookup tables.
///
/// Any vocabulary or structural error aborts the run before anything is
/// written.
pub fn run_pipeline_with(
    config: &PipelineConfig,
    vocabulary: &PartyVocabulary,
    officeholders: &OfficeholderLookup,
) -> Result<PipelineOutput> {
    info!("Loading transcripts from {:?}", config.transcript_dir);
    let transcripts = read_transcripts(&config.transcript_dir)?;
    let free_text = match &config.text_dir {
        Some(dir) => {
            info!("Loading extracted documents from {:?}", dir);
            read_free_text(dir)?
        }
        None => FreeTextBatch::default(),
    };

    if transcripts.is_empty() && free_text.documents.is_empty() {
        return Err(StructuralError::NoDocuments {
            path: config.transcript_dir.clone(),
        }
        .into());
    }

    let mut parsed = execute_stage0(&transcripts, &free_text.documents, &config.parse);
    parsed.skipped.extend(free_text.undated);
    let mut skipped_documents = parsed.skipped_documents();

    let normalized = execute_stage1(parsed.speeches, vocabulary)?;
    skipped_documents.extend(
        normalized
            .skipped
            .iter()
            .map(|e| (e.document.clone(), e.to_string())),
    );
    if !skipped_documents.is_empty() {
        warn!("{} documents skipped", skipped_documents.len());
    }

    info!("Loading secondary corpus from {:?}", config.corpus_dir);
    let corpus = load_corpus_files(&config.corpus_dir)?;
    info!(
        "Corpus: {} of {} rows loaded ({} not found, {} unmatched, {} without faction)",
        corpus.report.loaded,
        corpus.report.speeches_read,
        corpus.report.not_found,
        corpus.report.unmatched_factions,
        corpus.report.null_faction_ids
    );

    let reconciled = reconcile_corpus(
        &normalized.records,
        &corpus.speeches,
        vocabulary,
        officeholders,
        &config.reconcile,
    )?;

    let written = if config.save {
        Some(execute_stage3(&reconciled.corpus, &config.output)?.path)
    } else {
        None
    };

    Ok(PipelineOutput {
        corpus: reconciled.corpus,
        report: reconciled.report,
        corpus_load: corpus.report,
        skipped_documents,
        written,
    })
}

/// Per-party overview of a transcript directory
#[derive(Debug, Default)]
pub struct TranscriptAnalysis {
    pub documents: usize,
    pub speeches: usize,
    pub nameless_speeches: usize,
    pub reactions: usize,
    /// Speech count per canonical party; unmapped labels keep their raw form
    pub by_party: BTreeMap<String, usize>,
    pub skipped_documents: Vec<(String, String)>,
}

/// Parse transcripts only and count speeches per party without failing on
/// unknown labels
pub fn analyze_transcripts(dir: &Path, vocabulary: &PartyVocabulary) -> Result<TranscriptAnalysis> {
    let transcripts = read_transcripts(dir)?;
    if transcripts.is_empty() {
        return Err(StructuralError::NoDocuments {
            path: dir.to_path_buf(),
        }
        .into());
    }

    let parsed = execute_stage0(&transcripts, &[], &Stage0Config::default());
    let mut analysis = TranscriptAnalysis {
        documents: parsed.documents_parsed,
        speeches: parsed.speeches.len(),
        nameless_speeches: parsed.nameless_speeches,
        skipped_documents: parsed.skipped_documents(),
        ..Default::default()
    };

    for speech in &parsed.speeches {
        analysis.reactions += speech.reactions.len();
        let label = match vocabulary.override_for(speech.faction.as_deref()) {
            Some(rule) => rule.party.to_string(),
            None => match vocabulary
                .transcript
                .normalize(speech.faction.as_deref(), speech.origin, &speech.source)
            {
                Ok(Some(party)) => party.to_string(),
                Ok(None) => "(none)".to_string(),
                Err(e) => format!("unknown {:?}", e.value),
            },
        };
        *analysis.by_party.entry(label).or_default() += 1;
    }

    Ok(analysis)
}
