use std::collections::HashMap;

use tracing::warn;

use crate::error::{Result, SourceKind, StructuralError};
use crate::models::Party;

use super::AliasTable;

/// Federal and state officeholders who speak in the Bundestag as government
/// members, where transcripts frequently omit the faction.
pub const OFFICEHOLDERS: &[&str] = &[
    "Johann Saathoff (SPD)",
    "Caren Marks (SPD)",
    "Andreas Scheuer (CSU)",
    "Carsten Schneider (SPD)",
    "Marco Buschmann (FDP)",
    "Klaus Holetschek (CSU)",
    "Thomas Strobl (CDU)",
    "Sven Schulze (CDU)",
    "Boris Pistorius (SPD)",
    "Anne Spiegel (Grüne)",
    "Christian Lange (SPD)",
    "Eva Högl (SPD)",
    "Stephan Weil (SPD)",
    "Andreas Bovenschulte (SPD)",
    "Florian Pronold (SPD)",
    "Siemtje Möller (SPD)",
    "Thomas Schmidt (CDU)",
    "Horst Seehofer (CSU)",
    "Günter Krings (CDU)",
    "Benjamin Strasser (FDP)",
    "Dieter Janecek (Grüne)",
    "Reiner Haseloff (CDU)",
    "Helge Braun (CDU)",
    "Nancy Faeser (SPD)",
    "Olaf Scholz (SPD)",
    "Peter Tauber (CDU)",
    "Anna Lührmann (Grüne)",
    "Dorothee Bär (CSU)",
    "Anna Christmann (Grüne)",
    "Rita Hagl-Kehl (SPD)",
    "Wolfgang Schmidt (SPD)",
    "Armin Schuster (CDU)",
    "Steffen Bilger (CDU)",
    "Kerstin Griese (SPD)",
    "Luise Amtsberg (Grüne)",
    "Jan-Niclas Gesenhues (Grüne)",
    "Hubertus Heil (SPD)",
    "Stephan Mayer (CSU)",
    "Oliver Krischer (Grüne)",
    "Cem Özdemir (Grüne)",
    "Annette Widmann-Mauz (CDU)",
    "Enak Ferlemann (CDU)",
    "Daniela Behrens (SPD)",
    "Bettina Hoffmann (Grüne)",
    "Bettina Stark-Watzinger (FDP)",
    "Julia Klöckner (CDU)",
    "Karl Lauterbach (SPD)",
    "Franziska Giffey (SPD)",
    "Tobias Lindner (Grüne)",
    "Judith Gerlach (CSU)",
    "Claudia Müller (Grüne)",
    "Anke Rehlinger (SPD)",
    "Angela Merkel (CDU)",
    "Ekin Deligöz (Grüne)",
    "Michelle Müntefering (SPD)",
    "Mahmut Özdemir (SPD)",
    "Christian Lindner (FDP)",
    "Joachim Stamp (FDP)",
    "Jens Spahn (CDU)",
    "Burkhard Blienert (SPD)",
    "Thomas Hitschler (SPD)",
    "Pascal Kober (FDP)",
    "Robert Habeck (Grüne)",
    "Heiko Maas (SPD)",
    "Michael Müller (SPD)",
    "Steffi Lemke (Grüne)",
    "Florian Toncar (FDP)",
    "Franziska Brantner (Grüne)",
    "Armin Laschet (CDU)",
    "Katja Kipping (Die Linke)",
    "Bettina Jarasch (Grüne)",
    "Peter Altmaier (CDU)",
    "Markus Söder (CSU)",
    "Cansel Kiziltepe (SPD)",
    "Christine Lambrecht (SPD)",
    "Sören Bartol (SPD)",
    "Roman Poseck (CDU)",
    "Felix Klein (parteilos)",
    "Katja Hessel (FDP)",
    "Mario Brandenburg (FDP)",
    "Edgar Franke (SPD)",
    "Thomas Gebhart (CDU)",
    "Lena Kreck (Die Linke)",
    "Gerd Müller (CSU)",
    "Reem Alabali-Radovan (SPD)",
    "Bodo Ramelow (Die Linke)",
    "Michael Kellner (Grüne)",
    "Jörg Steinbach (SPD)",
    "Sven Lehmann (Grüne)",
    "Annegret Kramp-Karrenbauer (CDU)",
    "Daniela Kluckert (FDP)",
    "Marion Gentges (CDU)",
    "Mehmet Daimagüler (parteilos)",
    "Oliver Luksic (FDP)",
    "Felor Badenberg (parteilos)",
    "Bärbel Kofler (SPD)",
    "Claudia Roth (Grüne)",
    "Rita Schwarzelühr-Sutter (SPD)",
    "Peter Beuth (CDU)",
    "Volker Wissing (FDP)",
    "Jörg Kukies (SPD)",
    "Christian Pegel (SPD)",
    "Peter Tschentscher (SPD)",
    "Alexander Schweitzer (SPD)",
    "Maria Flachsbarth (CDU)",
    "Malu Dreyer (SPD)",
    "Sarah Ryglewski (SPD)",
    "Anja Karliczek (CDU)",
    "Annalena Baerbock (Grüne)",
    "Sabine Dittmar (SPD)",
    "Christian Kühn (Grüne)",
    "Ophelia Nick (Grüne)",
    "Katja Keul (Grüne)",
    "Elisabeth Winkelmeier-Becker (CDU)",
    "Kristina Sinemus (parteilos)",
    "Natalie Pawlik (SPD)",
    "Karl-Josef Laumann (CDU)",
    "Thomas Silberhorn (CSU)",
    "Klara Geywitz (SPD)",
    "Boris Rhein (CDU)",
    "Elisabeth Kaiser (SPD)",
    "Lisa Paus (Grüne)",
    "Thomas Bareiß (CDU)",
    "Bettina Hagedorn (SPD)",
    "Niels Annen (SPD)",
    "Michael Roth (SPD)",
    "Dietmar Woidke (SPD)",
    "Anette Kramme (SPD)",
    "Andreas Pinkwart (FDP)",
    "Uli Grötsch (SPD)",
    "Michael Theurer (FDP)",
    "Svenja Schulze (SPD)",
    "Monika Grütters (CDU)",
    "Jens Brandenburg (FDP)",
    "Ingmar Jung (CDU)",
];

/// Split "Full Name (party)" into (first name, last name, party label)
fn parse_entry(entry: &str) -> Option<(&str, &str, &str)> {
    let entry = entry.trim();
    let open = entry.rfind('(')?;
    let party = entry[open..].trim_start_matches('(').trim_end_matches(')').trim();
    let name = entry[..open].trim();
    let (first, last) = name.split_once(char::is_whitespace)?;
    let last = last.trim();
    if first.is_empty() || last.is_empty() || party.is_empty() {
        return None;
    }
    Some((first, last, party))
}

/// Exact (first name, last name) lookup of officeholder parties
#[derive(Debug, Clone, Default)]
pub struct OfficeholderLookup {
    by_name: HashMap<(String, String), Party>,
}

impl OfficeholderLookup {
    /// Build from the bundled officeholder list
    pub fn builtin(aliases: &AliasTable) -> Result<Self> {
        Self::from_entries(OFFICEHOLDERS, aliases)
    }

    /// Build from "Full Name (party)" strings.
    ///
    /// Fails on a malformed entry or a party label outside `aliases`. When a
    /// name appears twice with different parties the first entry wins.
    pub fn from_entries(entries: &[&str], aliases: &AliasTable) -> Result<Self> {
        let mut lookup = Self::default();

        for entry in entries {
            let (first, last, label) =
                parse_entry(entry).ok_or_else(|| StructuralError::UnreadableTable {
                    table: "officeholders".to_string(),
                    message: format!("malformed entry {:?}", entry),
                })?;

            let Some(party) = aliases.normalize(Some(label), SourceKind::Officeholder, entry)? else {
                continue;
            };

            let key = (first.to_string(), last.to_string());
            if let Some(existing) = lookup.by_name.get(&key) {
                if *existing != party {
                    warn!(
                        "Officeholder {} {} listed as {} and {}, keeping {}",
                        first, last, existing, party, existing
                    );
                }
                continue;
            }

            lookup.by_name.insert(key, party);
        }

        Ok(lookup)
    }

    /// Party of the officeholder with exactly this name
    pub fn lookup(&self, first_name: &str, last_name: &str) -> Option<Party> {
        self.by_name
            .get(&(first_name.to_string(), last_name.to_string()))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
