use std::path::{Path, PathBuf};

use crate::io::OutputFormat;
use crate::stages::{ReconcileConfig, Stage0Config, Stage3Config};

/// Environment variable naming the data directory
pub const DATA_DIR_VAR: &str = "PARLAMIND_DATA_DIR";
/// Environment variable naming the output file
pub const OUTPUT_VAR: &str = "PARLAMIND_OUTPUT";

/// Settings for a full pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory of `*.xml` plenary transcripts
    pub transcript_dir: PathBuf,
    /// Directory of `speech-YYYY-MM-DD.txt` extracted documents
    pub text_dir: Option<PathBuf>,
    /// Directory holding `speeches.csv` and `factions.csv`
    pub corpus_dir: PathBuf,
    /// Write the reconciled corpus through the output sink
    pub save: bool,
    pub parse: Stage0Config,
    pub reconcile: ReconcileConfig,
    pub output: Stage3Config,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::with_data_dir("data")
    }
}

impl PipelineConfig {
    /// Standard layout under one data directory: `xml/`, `txt/` (used when
    /// present) and `OpenDiscourse/`
    pub fn with_data_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let text_dir = dir.join("txt");
        Self {
            transcript_dir: dir.join("xml"),
            text_dir: text_dir.is_dir().then_some(text_dir),
            corpus_dir: dir.join("OpenDiscourse"),
            save: false,
            parse: Stage0Config::default(),
            reconcile: ReconcileConfig::default(),
            output: Stage3Config::default(),
        }
    }

    /// Create config from `PARLAMIND_DATA_DIR` and `PARLAMIND_OUTPUT`,
    /// falling back to the defaults for unset variables
    pub fn from_env() -> Self {
        let mut config = match std::env::var_os(DATA_DIR_VAR) {
            Some(dir) => Self::with_data_dir(PathBuf::from(dir)),
            None => Self::default(),
        };
        if let Some(output) = std::env::var_os(OUTPUT_VAR) {
            config.set_output(PathBuf::from(output));
        }
        config
    }

    /// Set the output file; a `.csv` extension selects CSV
    pub fn set_output(&mut self, path: PathBuf) {
        if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("csv")) {
            self.output.format = OutputFormat::Csv;
        }
        self.output.output_path = path;
    }
}
