use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;

use crate::models::ReconciledCorpus;

/// On-disk format of the reconciled corpus
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON array of rows
    #[default]
    Json,
    /// One header line, one row per speech
    Csv,
}

impl OutputFormat {
    pub fn sink(self) -> Box<dyn CorpusSink> {
        match self {
            OutputFormat::Json => Box::new(JsonSink),
            OutputFormat::Csv => Box::new(CsvSink),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

/// Destination for a reconciled corpus
pub trait CorpusSink {
    fn write_corpus(&self, corpus: &ReconciledCorpus, path: &Path) -> Result<()>;
}

/// Create the file and any missing parent directories
fn create_file(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }
    let file = File::create(path).with_context(|| format!("Failed to create file: {:?}", path))?;
    Ok(BufWriter::new(file))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSink;

impl CorpusSink for JsonSink {
    fn write_corpus(&self, corpus: &ReconciledCorpus, path: &Path) -> Result<()> {
        let mut writer = create_file(path)?;
        serde_json::to_writer_pretty(&mut writer, &corpus.rows).context("Failed to write JSON")?;
        writer.flush().with_context(|| format!("Failed to flush {:?}", path))?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvSink;

impl CorpusSink for CsvSink {
    fn write_corpus(&self, corpus: &ReconciledCorpus, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_writer(create_file(path)?);
        for row in corpus.iter() {
            writer.serialize(row).context("Failed to write CSV row")?;
        }
        writer.flush().with_context(|| format!("Failed to flush {:?}", path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CorpusRow, Party};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn corpus() -> ReconciledCorpus {
        ReconciledCorpus {
            rows: vec![
                CorpusRow {
                    abbreviation: Some(Party::Gruene),
                    date: NaiveDate::from_ymd_opt(2022, 3, 16).unwrap(),
                    first_name: Some("Annalena".to_string()),
                    last_name: Some("Baerbock".to_string()),
                    speech_content: "Frieden, Freiheit, Sicherheit, \"Zeitenwende\".".to_string(),
                },
                CorpusRow {
                    abbreviation: None,
                    date: NaiveDate::from_ymd_opt(2022, 3, 17).unwrap(),
                    first_name: Some("Erika".to_string()),
                    last_name: Some("Muster".to_string()),
                    speech_content: "Zweite Zeile".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_json_sink_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/nested/corpus.json");

        JsonSink.write_corpus(&corpus(), &path).unwrap();

        let written: Vec<CorpusRow> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, corpus().rows);
    }

    #[test]
    fn test_csv_sink_writes_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corpus.csv");

        OutputFormat::Csv.sink().write_corpus(&corpus(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next(),
            Some("abbreviation,date,firstName,lastName,speechContent")
        );
        assert!(lines.next().unwrap().starts_with("Grüne,2022-03-16,Annalena,Baerbock,"));
        assert_eq!(lines.next(), Some(",2022-03-17,Erika,Muster,Zweite Zeile"));
    }
}
