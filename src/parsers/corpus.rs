use std::collections::HashMap;
use std::io::Read;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Result, StructuralError};
use crate::models::CorpusSpeech;

/// Columns the speech table must provide
pub const SPEECH_COLUMNS: &[&str] = &["firstName", "lastName", "speechContent", "date", "factionId"];
/// Columns the faction table must provide
pub const FACTION_COLUMNS: &[&str] = &["id", "abbreviation"];
/// Abbreviation the faction table uses for speeches it could not attribute
pub const NOT_FOUND: &str = "not found";

#[derive(Debug, Deserialize)]
struct SpeechRow {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "firstName")]
    first_name: Option<String>,
    #[serde(rename = "lastName")]
    last_name: Option<String>,
    #[serde(rename = "speechContent")]
    speech_content: Option<String>,
    date: Option<String>,
    #[serde(rename = "factionId")]
    faction_id: Option<String>,
    #[serde(default)]
    full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FactionRow {
    id: Option<String>,
    abbreviation: Option<String>,
}

/// Counts of rows dropped while loading
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpusLoadReport {
    pub speeches_read: usize,
    pub null_faction_ids: usize,
    pub unmatched_factions: usize,
    pub not_found: usize,
    pub invalid_dates: usize,
    pub loaded: usize,
}

/// Joined secondary corpus
#[derive(Debug, Clone, Default)]
pub struct CorpusLoad {
    pub speeches: Vec<CorpusSpeech>,
    pub report: CorpusLoadReport,
}

/// Header names and field values are trimmed, so the column check and row
/// deserialization see the same names
fn table_reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(input)
}

fn require_columns<R: Read>(reader: &mut csv::Reader<R>, table: &str, required: &[&str]) -> Result<()> {
    let headers = reader.headers()?;
    let missing: Vec<String> = required
        .iter()
        .filter(|column| !headers.iter().any(|h| h == **column))
        .map(|column| column.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(StructuralError::MissingColumns {
            table: table.to_string(),
            columns: missing,
        }
        .into())
    }
}

/// Faction ids are integers, but some exports write them as floats ("12.0")
fn parse_faction_id(value: &str) -> Option<i64> {
    let value = value.trim();
    value.parse::<i64>().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|f| f.fract() == 0.0)
            .map(|f| f as i64)
    })
}

/// Corpus dates are ISO dates, optionally followed by a time
fn parse_corpus_date(value: &str) -> Option<NaiveDate> {
    let day = value.trim().get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Read the faction table into id -> abbreviation
pub fn read_factions<R: Read>(factions: R) -> Result<HashMap<i64, String>> {
    let mut reader = table_reader(factions);
    require_columns(&mut reader, "factions", FACTION_COLUMNS)?;

    let mut by_id = HashMap::new();
    for row in reader.deserialize::<FactionRow>() {
        let row = row?;
        let (Some(id), Some(abbreviation)) = (row.id.as_deref().and_then(parse_faction_id), row.abbreviation) else {
            continue;
        };
        by_id.entry(id).or_insert(abbreviation);
    }
    Ok(by_id)
}

/// Load the speech table and inner-join it with the faction table.
///
/// Rows without a faction id, with an id missing from the faction table, or
/// whose faction is "not found" are dropped and counted. Party labels keep
/// the corpus's own spelling.
pub fn load_corpus<S: Read, F: Read>(speeches: S, factions: F) -> Result<CorpusLoad> {
    let factions = read_factions(factions)?;

    let mut reader = table_reader(speeches);
    require_columns(&mut reader, "speeches", SPEECH_COLUMNS)?;

    let mut load = CorpusLoad::default();
    for row in reader.deserialize::<SpeechRow>() {
        let row = row?;
        let report = &mut load.report;
        report.speeches_read += 1;

        let Some(faction_id) = row.faction_id.as_deref().and_then(parse_faction_id) else {
            report.null_faction_ids += 1;
            continue;
        };
        let Some(abbreviation) = factions.get(&faction_id) else {
            report.unmatched_factions += 1;
            continue;
        };
        if abbreviation == NOT_FOUND {
            report.not_found += 1;
            continue;
        }
        let Some(date) = row.date.as_deref().and_then(parse_corpus_date) else {
            report.invalid_dates += 1;
            debug!("Skipping corpus row with date {:?}", row.date);
            continue;
        };

        load.speeches.push(CorpusSpeech {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            speech_content: row.speech_content.unwrap_or_default(),
            date,
            abbreviation: abbreviation.clone(),
            full_name: row.full_name,
        });
    }

    load.report.loaded = load.speeches.len();
    if load.report.invalid_dates > 0 {
        warn!("Skipped {} corpus rows with unparseable dates", load.report.invalid_dates);
    }

    Ok(load)
}
