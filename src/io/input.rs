use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::error::FormatError;
use crate::parsers::{load_corpus, CorpusLoad, FreeTextDocument, TranscriptDocument};

/// File name of the secondary corpus speech table
pub const SPEECHES_FILE: &str = "speeches.csv";
/// File name of the secondary corpus faction table
pub const FACTIONS_FILE: &str = "factions.csv";

/// Free-text documents plus the files that carried no usable date
#[derive(Debug, Default)]
pub struct FreeTextBatch {
    pub documents: Vec<FreeTextDocument>,
    pub undated: Vec<FormatError>,
}

/// Files in `dir` with the given extension, sorted by name
fn list_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("Failed to read directory: {:?}", dir))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to read directory entry in {:?}", dir))?
            .path();
        if path.is_file() && path.extension().is_some_and(|e| e.eq_ignore_ascii_case(extension)) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Session date from an extracted-text file name like `speech-2021-12-08.txt`
pub fn document_date(file_name: &str) -> Option<NaiveDate> {
    let stem = file_name.strip_suffix(".txt").unwrap_or(file_name);
    let day = stem.strip_prefix("speech-")?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Read every `*.xml` transcript in `dir`
pub fn read_transcripts(dir: &Path) -> Result<Vec<TranscriptDocument>> {
    let mut documents = Vec::new();
    for path in list_files(dir, "xml")? {
        let xml = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path))?;
        debug!("Read transcript {:?} ({} bytes)", path, xml.len());
        documents.push(TranscriptDocument {
            source: file_name(&path),
            xml,
        });
    }
    Ok(documents)
}

/// Read every `*.txt` document in `dir`, dating each from its file name
pub fn read_free_text(dir: &Path) -> Result<FreeTextBatch> {
    let mut batch = FreeTextBatch::default();
    for path in list_files(dir, "txt")? {
        let source = file_name(&path);
        let Some(date) = document_date(&source) else {
            warn!("Skipping {:?}: no session date in file name", path);
            batch.undated.push(FormatError::UndatedDocument { document: source });
            continue;
        };
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path))?;
        batch.documents.push(FreeTextDocument { source, date, text });
    }
    Ok(batch)
}

/// Load `speeches.csv` and `factions.csv` from `dir`
pub fn load_corpus_files(dir: &Path) -> Result<CorpusLoad> {
    let speeches_path = dir.join(SPEECHES_FILE);
    let factions_path = dir.join(FACTIONS_FILE);

    let speeches = File::open(&speeches_path)
        .with_context(|| format!("Failed to open file: {:?}", speeches_path))?;
    let factions = File::open(&factions_path)
        .with_context(|| format!("Failed to open file: {:?}", factions_path))?;

    load_corpus(speeches, factions)
        .with_context(|| format!("Failed to load corpus from {:?}", dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_document_date() {
        assert_eq!(
            document_date("speech-2021-12-08.txt"),
            NaiveDate::from_ymd_opt(2021, 12, 8)
        );
        assert_eq!(document_date("speech-2021-13-08.txt"), None);
        assert_eq!(document_date("notes.txt"), None);
    }

    #[test]
    fn test_read_transcripts_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("20002.xml"), "<b/>").unwrap();
        std::fs::write(dir.path().join("20001.xml"), "<a/>").unwrap();
        std::fs::write(dir.path().join("readme.md"), "ignored").unwrap();

        let documents = read_transcripts(dir.path()).unwrap();
        let sources: Vec<_> = documents.iter().map(|d| d.source.as_str()).collect();

        assert_eq!(sources, vec!["20001.xml", "20002.xml"]);
        assert_eq!(documents[0].xml, "<a/>");
    }

    #[test]
    fn test_read_free_text_reports_undated_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("speech-2022-01-13.txt"), "Text").unwrap();
        std::fs::write(dir.path().join("scan.txt"), "Text").unwrap();

        let batch = read_free_text(dir.path()).unwrap();

        assert_eq!(batch.documents.len(), 1);
        assert_eq!(batch.documents[0].date, NaiveDate::from_ymd_opt(2022, 1, 13).unwrap());
        assert_eq!(
            batch.undated,
            vec![FormatError::UndatedDocument {
                document: "scan.txt".to_string()
            }]
        );
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(read_transcripts(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_load_corpus_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(SPEECHES_FILE),
            "id,firstName,lastName,speechContent,date,factionId\n\
             1,Olaf,Scholz,Guten Morgen,2021-12-15,1\n\
             2,Erika,Muster,Hallo,2021-12-15,2\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join(FACTIONS_FILE),
            "id,abbreviation,fullName\n1,SPD,Sozialdemokraten\n2,not found,\n",
        )
        .unwrap();

        let load = load_corpus_files(dir.path()).unwrap();

        assert_eq!(load.speeches.len(), 1);
        assert_eq!(load.speeches[0].abbreviation, "SPD");
        assert_eq!(load.report.not_found, 1);
    }
}
