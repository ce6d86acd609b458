pub mod config;
pub mod error;
pub mod io;
pub mod models;
pub mod parsers;
pub mod pipeline;
pub mod stages;
pub mod vocabulary;

pub use config::PipelineConfig;
pub use error::{FormatError, PipelineError, SourceKind, StructuralError, VocabularyError};
pub use io::{read_free_text, read_transcripts, CorpusSink, CsvSink, JsonSink, OutputFormat};
pub use models::{CorpusRow, Party, ReconciledCorpus, ReconciliationReport, SpeechRecord};
pub use parsers::{load_corpus, parse_transcript, segment_document, SegmenterConfig, TranscriptConfig};
pub use pipeline::{analyze_transcripts, run_pipeline, run_pipeline_with, PipelineOutput, TranscriptAnalysis};
pub use stages::{
    execute_stage0, execute_stage1, execute_stage3, reconcile_corpus, ReconcileConfig, Stage0Config,
    Stage3Config,
};
pub use vocabulary::{AliasTable, OfficeholderLookup, PartyVocabulary};
