use tracing::{debug, info, warn};

use crate::error::FormatError;
use crate::models::ParsedSpeech;
use crate::parsers::{
    parse_transcript, segment_document, FreeTextDocument, SegmenterConfig, TranscriptConfig,
    TranscriptDocument,
};

/// Configuration for Stage 0
#[derive(Debug, Clone, Default)]
pub struct Stage0Config {
    pub transcript: TranscriptConfig,
    pub segmenter: SegmenterConfig,
}

/// Result of Stage 0 parsing
#[derive(Debug, Default)]
pub struct Stage0Result {
    /// Speeches from all documents, in document order
    pub speeches: Vec<ParsedSpeech>,
    /// Documents that parsed successfully
    pub documents_parsed: usize,
    /// Documents that failed with a format error
    pub skipped: Vec<FormatError>,
    /// Free-text documents without a single speaker line
    pub unsegmented: Vec<String>,
    /// Speeches dropped for lacking a speaker name
    pub nameless_speeches: usize,
}

impl Stage0Result {
    /// Every document that produced no speeches, with the reason
    pub fn skipped_documents(&self) -> Vec<(String, String)> {
        self.skipped
            .iter()
            .map(|e| (e.document().to_string(), e.to_string()))
            .chain(
                self.unsegmented
                    .iter()
                    .map(|d| (d.clone(), "no speaker lines".to_string())),
            )
            .collect()
    }
}

/// Execute Stage 0: parse every document independently.
///
/// A document that fails is recorded and skipped; the rest of the batch
/// continues.
pub fn execute_stage0(
    transcripts: &[TranscriptDocument],
    free_text: &[FreeTextDocument],
    config: &Stage0Config,
) -> Stage0Result {
    let mut result = Stage0Result::default();

    for document in transcripts {
        match parse_transcript(&document.xml, &document.source, &config.transcript) {
            Ok(parsed) => {
                debug!(
                    "{}: {} speeches, {} without speaker",
                    document.source,
                    parsed.speeches.len(),
                    parsed.nameless_speeches
                );
                result.documents_parsed += 1;
                result.nameless_speeches += parsed.nameless_speeches;
                result.speeches.extend(parsed.speeches);
            }
            Err(e) => {
                warn!("Skipping transcript: {}", e);
                result.skipped.push(e);
            }
        }
    }

    for document in free_text {
        let speeches = segment_document(document, &config.segmenter);
        if speeches.is_empty() {
            warn!("{}: no speaker lines found, skipping", document.source);
            result.unsegmented.push(document.source.clone());
            continue;
        }
        debug!("{}: {} speeches", document.source, speeches.len());
        result.documents_parsed += 1;
        result.speeches.extend(speeches);
    }

    info!(
        "Stage 0: {} speeches from {} documents ({} skipped)",
        result.speeches.len(),
        result.documents_parsed,
        result.skipped.len() + result.unsegmented.len()
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn transcript(source: &str, date: &str) -> TranscriptDocument {
        TranscriptDocument {
            source: source.to_string(),
            xml: format!(
                r#"<dbtplenarprotokoll wahlperiode="20" sitzung-nr="3" sitzung-datum="{date}">
<rede id="1"><p klasse="redner"><redner><name><vorname>Olaf</vorname><nachname>Scholz</nachname></name></redner></p>
<p klasse="J">Eine Rede über den Bundeshaushalt und die Schuldenbremse.</p></rede>
<rede id="2"><p klasse="J">Ohne Redner.</p></rede>
</dbtplenarprotokoll>"#
            ),
        }
    }

    #[test]
    fn test_bad_document_does_not_stop_batch() {
        let documents = vec![
            transcript("20003.xml", "08.12.2021"),
            transcript("broken.xml", "2021-12-08"),
            transcript("20004.xml", "09.12.2021"),
        ];

        let result = execute_stage0(&documents, &[], &Stage0Config::default());

        assert_eq!(result.documents_parsed, 2);
        assert_eq!(result.speeches.len(), 2);
        assert_eq!(result.nameless_speeches, 2);
        assert_eq!(result.skipped.len(), 1);
        let skipped = result.skipped_documents();
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].0, "broken.xml");
        assert!(skipped[0].1.contains("invalid date"));
    }

    #[test]
    fn test_unsegmentable_text_is_reported() {
        let free_text = vec![
            FreeTextDocument {
                source: "speech-2021-12-08.txt".to_string(),
                date: NaiveDate::from_ymd_opt(2021, 12, 8).unwrap(),
                text: "Olaf Scholz (SPD):\nGuten Tag.\n".to_string(),
            },
            FreeTextDocument {
                source: "speech-2021-12-09.txt".to_string(),
                date: NaiveDate::from_ymd_opt(2021, 12, 9).unwrap(),
                text: "Nur ein Deckblatt.".to_string(),
            },
        ];

        let result = execute_stage0(&[], &free_text, &Stage0Config::default());

        assert_eq!(result.speeches.len(), 1);
        assert_eq!(result.unsegmented, vec!["speech-2021-12-09.txt".to_string()]);
        assert_eq!(
            result.skipped_documents(),
            vec![("speech-2021-12-09.txt".to_string(), "no speaker lines".to_string())]
        );
    }
}
