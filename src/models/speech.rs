use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Party;
use crate::error::SourceKind;

/// One utterance as emitted by a parser, party still in its raw spelling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedSpeech {
    /// Parser that produced the speech
    pub origin: SourceKind,
    /// Document identifier, kept for error reports
    pub source: String,
    /// Session date
    pub date: NaiveDate,
    /// Legislative term (Wahlperiode)
    pub period: Option<u32>,
    /// Session number within the term, structured transcripts only
    pub session: Option<u32>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Raw faction label as found in the document
    pub faction: Option<String>,
    /// Honorific such as "Dr."
    pub title: Option<String>,
    /// Full speech body
    pub text: String,
    /// Audience reactions in document order
    pub reactions: Vec<String>,
}

/// A speech whose party has been mapped into the canonical vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechRecord {
    pub origin: SourceKind,
    pub source: String,
    pub date: NaiveDate,
    pub period: Option<u32>,
    pub session: Option<u32>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Canonical party, `None` when the source did not name one
    pub party: Option<Party>,
    pub title: Option<String>,
    pub text: String,
    pub reactions: Vec<String>,
}

impl SpeechRecord {
    /// Build from a parsed speech with an already resolved party
    pub fn from_parsed(speech: ParsedSpeech, party: Option<Party>) -> Self {
        Self {
            origin: speech.origin,
            source: speech.source,
            date: speech.date,
            period: speech.period,
            session: speech.session,
            first_name: speech.first_name,
            last_name: speech.last_name,
            party,
            title: speech.title,
            text: speech.text,
            reactions: speech.reactions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed() -> ParsedSpeech {
        ParsedSpeech {
            origin: SourceKind::Transcript,
            source: "20001.xml".to_string(),
            date: NaiveDate::from_ymd_opt(2021, 10, 26).unwrap(),
            period: Some(20),
            session: Some(1),
            first_name: Some("Wolfgang".to_string()),
            last_name: Some("Schäuble".to_string()),
            faction: Some("CDU/CSU".to_string()),
            title: Some("Dr.".to_string()),
            text: "Meine sehr verehrten Damen und Herren!".to_string(),
            reactions: vec!["(Beifall)".to_string()],
        }
    }

    #[test]
    fn test_from_parsed_keeps_fields() {
        let record = SpeechRecord::from_parsed(parsed(), Some(Party::CduCsu));

        assert_eq!(record.party, Some(Party::CduCsu));
        assert_eq!(record.session, Some(1));
        assert_eq!(record.reactions.len(), 1);
        assert_eq!(record.last_name.as_deref(), Some("Schäuble"));
    }
}
