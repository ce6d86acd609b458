use std::collections::BTreeMap;

use crate::error::{SourceKind, VocabularyError};
use crate::models::Party;

/// Strip every whitespace character (including NBSP) and upper-case.
///
/// Transcripts wrap faction names across lines and use non-breaking spaces
/// inside "BÜNDNIS 90/DIE GRÜNEN", so comparison happens on this form only.
pub fn clean_label(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Fixed mapping from cleaned spellings to a canonical party
#[derive(Debug, Clone)]
pub struct AliasTable {
    name: &'static str,
    entries: BTreeMap<String, Party>,
}

impl AliasTable {
    /// Build a table; keys are cleaned on insertion
    pub fn new(name: &'static str, entries: &[(&str, Party)]) -> Self {
        let entries = entries
            .iter()
            .map(|(label, party)| (clean_label(label), *party))
            .collect();
        Self { name, entries }
    }

    /// Faction labels found in the `fraktion` element of plenary transcripts
    pub fn transcript() -> Self {
        Self::new("transcript", TRANSCRIPT_ALIASES)
    }

    /// Native abbreviations of the OpenDiscourse faction table
    pub fn corpus() -> Self {
        Self::new("corpus", CORPUS_ALIASES)
    }

    /// Party labels used in the officeholder list; a superset of `transcript()`
    pub fn officeholder() -> Self {
        let mut entries: Vec<(&str, Party)> = TRANSCRIPT_ALIASES.to_vec();
        entries.extend_from_slice(OFFICEHOLDER_EXTRA_ALIASES);
        Self::new("officeholder", &entries)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Look up a raw label. `None` input, or input that cleans to nothing,
    /// means the source named no party.
    pub fn normalize(
        &self,
        raw: Option<&str>,
        source_kind: SourceKind,
        document: &str,
    ) -> Result<Option<Party>, VocabularyError> {
        let Some(raw) = raw else {
            return Ok(None);
        };
        let key = clean_label(raw);
        if key.is_empty() {
            return Ok(None);
        }
        match self.entries.get(&key) {
            Some(party) => Ok(Some(*party)),
            None => Err(VocabularyError {
                source_kind,
                document: document.to_string(),
                value: raw.to_string(),
            }),
        }
    }

    /// Cleaned keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn get(&self, cleaned_key: &str) -> Option<Party> {
        self.entries.get(cleaned_key).copied()
    }
}

const TRANSCRIPT_ALIASES: &[(&str, Party)] = &[
    ("AfD", Party::AfD),
    ("BSW", Party::Bsw),
    ("BÜNDNIS\u{a0}90/DIE GRÜNEN", Party::Gruene),
    ("CDU/CSU", Party::CduCsu),
    ("CDU", Party::CduCsu),
    ("CSU", Party::CduCsu),
    ("DIE LINKE", Party::DieLinke),
    ("FDP", Party::Fdp),
    ("fraktionslos", Party::Fraktionslos),
    ("SPD", Party::Spd),
];

const OFFICEHOLDER_EXTRA_ALIASES: &[(&str, Party)] = &[
    ("Grüne", Party::Gruene),
    ("Linke", Party::DieLinke),
    ("parteilos", Party::Fraktionslos),
];

const CORPUS_ALIASES: &[(&str, Party)] = &[
    ("AfD", Party::AfD),
    ("BSW", Party::Bsw),
    ("CDU/CSU", Party::CduCsu),
    ("DIE LINKE.", Party::DieLinke),
    ("PDS", Party::DieLinke),
    ("FDP", Party::Fdp),
    ("Grüne", Party::Gruene),
    ("SPD", Party::Spd),
    ("BP", Party::Bp),
    ("DA", Party::Da),
    ("DP", Party::Dp),
    ("DPB", Party::Dpb),
    ("DRP", Party::Drp),
    ("FU", Party::Fu),
    ("FVP", Party::Fvp),
    ("GB/BHE", Party::GbBhe),
    ("BHE", Party::GbBhe),
    ("KPD", Party::Kpd),
    ("NR", Party::Nr),
    ("SSW", Party::Ssw),
    ("WAV", Party::Wav),
    ("Z", Party::Zentrum),
    ("Zentrum", Party::Zentrum),
    ("Fraktionslos", Party::Fraktionslos),
    ("Gast", Party::Fraktionslos),
];

/// Replacement identity for one known mislabeled speaker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyOverride {
    /// Cleaned label that triggers the override
    pub label: String,
    pub first_name: String,
    pub last_name: String,
    pub party: Party,
}

impl PartyOverride {
    pub fn matches(&self, raw: Option<&str>) -> bool {
        raw.is_some_and(|raw| clean_label(raw) == self.label)
    }
}

/// All alias tables plus override rules, injected into the stages
#[derive(Debug, Clone)]
pub struct PartyVocabulary {
    pub transcript: AliasTable,
    pub corpus: AliasTable,
    pub officeholder: AliasTable,
    pub overrides: Vec<PartyOverride>,
}

impl Default for PartyVocabulary {
    fn default() -> Self {
        Self {
            transcript: AliasTable::transcript(),
            corpus: AliasTable::corpus(),
            officeholder: AliasTable::officeholder(),
            // A speaker listed under the joint "SPDCDU/CSU" caucus line after
            // switching factions; the transcript lost the name block.
            overrides: vec![PartyOverride {
                label: clean_label("SPDCDU/CSU"),
                first_name: "Alexander".to_string(),
                last_name: "Föhr".to_string(),
                party: Party::CduCsu,
            }],
        }
    }
}

impl PartyVocabulary {
    /// Override rule for a raw transcript label, if any
    pub fn override_for(&self, raw: Option<&str>) -> Option<&PartyOverride> {
        self.overrides.iter().find(|o| o.matches(raw))
    }

    /// Every (table, key) pair whose party differs from another table's
    /// entry for the same key
    pub fn conflicts(&self) -> Vec<(String, &'static str, &'static str)> {
        let tables = [&self.transcript, &self.corpus, &self.officeholder];
        let mut conflicts = Vec::new();
        for (i, a) in tables.iter().enumerate() {
            for b in tables.iter().skip(i + 1) {
                for key in a.keys() {
                    if let (Some(pa), Some(pb)) = (a.get(key), b.get(key)) {
                        if pa != pb {
                            conflicts.push((key.to_string(), a.name(), b.name()));
                        }
                    }
                }
            }
        }
        conflicts
    }
}
