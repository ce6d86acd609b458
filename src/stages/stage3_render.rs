use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

use crate::io::OutputFormat;
use crate::models::ReconciledCorpus;

/// Configuration for Stage 3 rendering
#[derive(Debug, Clone)]
pub struct Stage3Config {
    pub output_path: PathBuf,
    pub format: OutputFormat,
}

impl Default for Stage3Config {
    fn default() -> Self {
        let format = OutputFormat::default();
        Self {
            output_path: PathBuf::from(format!("output/corpus.{}", format.extension())),
            format,
        }
    }
}

/// Result of Stage 3 rendering
#[derive(Debug)]
pub struct Stage3Result {
    pub path: PathBuf,
    pub rows_written: usize,
}

/// Execute Stage 3: hand the corpus to the configured sink
pub fn execute_stage3(corpus: &ReconciledCorpus, config: &Stage3Config) -> Result<Stage3Result> {
    info!(
        "Writing {} rows as {:?} to {:?}",
        corpus.len(),
        config.format,
        config.output_path
    );
    config.format.sink().write_corpus(corpus, &config.output_path)?;

    Ok(Stage3Result {
        path: config.output_path.clone(),
        rows_written: corpus.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_corpus_still_writes_file() {
        let dir = TempDir::new().unwrap();
        let config = Stage3Config {
            output_path: dir.path().join("corpus.json"),
            format: OutputFormat::Json,
        };

        let result = execute_stage3(&ReconciledCorpus::default(), &config).unwrap();

        assert_eq!(result.rows_written, 0);
        assert_eq!(std::fs::read_to_string(&result.path).unwrap().trim(), "[]");
    }
}
