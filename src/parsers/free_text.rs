use chrono::NaiveDate;

use crate::error::SourceKind;
use crate::models::ParsedSpeech;

/// Configuration for segmenting extracted document text
#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    /// Words that open a parenthesized audience reaction
    pub reaction_keywords: Vec<String>,
    /// Markers after which no further speech follows
    pub closing_markers: Vec<String>,
    /// Office titles that precede a speaker's name and are not part of it
    pub role_words: Vec<String>,
    /// Academic titles kept as the speech's title
    pub honorifics: Vec<String>,
    /// Lower-case name particles that belong to the last name
    pub name_particles: Vec<String>,
    /// Shortest accepted speaker name, in words other than roles and titles
    pub min_name_words: usize,
    /// Longest accepted speaker name, in words
    pub max_name_words: usize,
    /// Keep stripped reactions on the speeches instead of discarding them
    pub keep_reactions: bool,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        let owned = |words: &[&str]| -> Vec<String> { words.iter().map(|w| w.to_string()).collect() };
        Self {
            reaction_keywords: owned(&[
                "Beifall",
                "Zuruf",
                "Zurufe",
                "Heiterkeit",
                "Lachen",
                "Widerspruch",
                "Unruhe",
                "Zustimmung",
            ]),
            closing_markers: owned(&["(Schluss der Sitzung"]),
            role_words: owned(&[
                "Präsident",
                "Präsidentin",
                "Vizepräsident",
                "Vizepräsidentin",
                "Alterspräsident",
                "Alterspräsidentin",
                "Bundeskanzler",
                "Bundeskanzlerin",
            ]),
            honorifics: owned(&["Dr.", "Prof.", "h.", "c.", "h.c."]),
            name_particles: owned(&["von", "van", "de", "der", "den", "zu", "vom"]),
            min_name_words: 2,
            max_name_words: 8,
            keep_reactions: false,
        }
    }
}

/// Text of one non-structured document, as delivered by the text extractor
#[derive(Debug, Clone)]
pub struct FreeTextDocument {
    pub source: String,
    pub date: NaiveDate,
    pub text: String,
}

/// Document text with reaction annotations removed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrippedText {
    pub text: String,
    /// Removed annotations with their byte offset in `text`
    pub reactions: Vec<(usize, String)>,
}

/// Remove "(Beifall ...)"-style annotations, including ones spanning lines.
///
/// An annotation runs to its matching close parenthesis. One that is never
/// closed is left in place.
pub fn strip_reactions(text: &str, keywords: &[String]) -> StrippedText {
    let mut result = StrippedText::default();
    let mut rest = text;

    while let Some(open) = rest.find('(') {
        let after = &rest[open + 1..];
        let is_reaction = keywords.iter().any(|k| after.starts_with(k.as_str()));
        let close = if is_reaction { matching_paren(&rest[open..]) } else { None };

        match close {
            Some(close) => {
                result.text.push_str(&rest[..open]);
                let annotation = &rest[open..open + close + 1];
                result.reactions.push((
                    result.text.len(),
                    annotation.split_whitespace().collect::<Vec<_>>().join(" "),
                ));
                rest = &rest[open + close + 1..];
            }
            None => {
                result.text.push_str(&rest[..open + 1]);
                rest = after;
            }
        }
    }

    result.text.push_str(rest);
    result
}

/// Byte offset of the parenthesis closing the one at offset 0
fn matching_paren(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// A line introducing a speaker: "Name (Party):"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeakerLine<'a> {
    /// Name part, possibly empty
    pub name: &'a str,
    pub party: Option<&'a str>,
}

/// A speaker line and the body that follows it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub speaker: SpeakerLine<'a>,
    pub body: &'a str,
    /// Byte offset of `body` within the scanned text
    pub body_start: usize,
}

fn is_name_word(word: &str, config: &SegmenterConfig) -> bool {
    let starts_upper = word.chars().next().is_some_and(char::is_uppercase);
    let valid_chars = word
        .chars()
        .all(|c| c.is_alphabetic() || matches!(c, '-' | '.' | '\''));
    valid_chars && (starts_upper || config.name_particles.iter().any(|p| p == word))
}

/// Recognize a speaker line. The line excludes its terminating newline.
pub fn parse_speaker_line<'a>(line: &'a str, config: &SegmenterConfig) -> Option<SpeakerLine<'a>> {
    let head = line.trim_end().strip_suffix(':')?.trim_end();

    let (name_part, party) = match head.strip_suffix(')') {
        Some(inner) => {
            let open = inner.rfind('(')?;
            (inner[..open].trim_end(), Some(inner[open + 1..].trim()))
        }
        None => (head, None),
    };

    // "Olaf Scholz, Bundesminister der Finanzen" names the speaker before the comma
    let name = name_part.split(',').next().unwrap_or_default().trim();
    let words: Vec<&str> = name.split_whitespace().collect();
    if words.len() > config.max_name_words || !words.iter().all(|w| is_name_word(w, config)) {
        return None;
    }
    if name.is_empty() && party.is_none() {
        return None;
    }
    let personal = words
        .iter()
        .filter(|w| !config.role_words.iter().any(|r| r == *w) && !config.honorifics.iter().any(|h| h == *w))
        .count();
    if !name.is_empty() && personal < config.min_name_words {
        return None;
    }

    Some(SpeakerLine { name, party })
}

/// Lines of `text` starting at byte `from`, each with its start offset.
/// Lines keep their trailing newline.
fn lines_from(text: &str, from: usize) -> impl Iterator<Item = (usize, &str)> {
    text[from..]
        .split_inclusive('\n')
        .scan(from, |offset, line| {
            let start = *offset;
            *offset += line.len();
            Some((start, line))
        })
}

/// Lazy scan over (speaker line, body) pairs.
///
/// Matches are taken left to right without overlap; each body stops at the
/// earliest following speaker line or closing marker. Cloning the iterator
/// restarts the scan from the clone's position.
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    text: &'a str,
    config: &'a SegmenterConfig,
    cursor: usize,
    closed: bool,
}

impl<'a> Segments<'a> {
    pub fn new(text: &'a str, config: &'a SegmenterConfig) -> Self {
        Self {
            text,
            config,
            cursor: 0,
            closed: false,
        }
    }

    /// Next speaker line at or after `from`: (line start, body start, speaker)
    fn find_speaker(&self, from: usize) -> Option<(usize, usize, SpeakerLine<'a>)> {
        lines_from(self.text, from).find_map(|(start, line)| {
            let content = line.strip_suffix('\n')?;
            let speaker = parse_speaker_line(content, self.config)?;
            Some((start, start + line.len(), speaker))
        })
    }

    /// End of the body starting at `from`, and whether a closing marker ends it
    fn find_boundary(&self, from: usize) -> (usize, bool) {
        for (start, line) in lines_from(self.text, from) {
            let marker = self
                .config
                .closing_markers
                .iter()
                .filter_map(|m| line.find(m.as_str()))
                .min();
            if let Some(pos) = marker {
                return (start + pos, true);
            }
            let is_speaker = line
                .strip_suffix('\n')
                .and_then(|content| parse_speaker_line(content, self.config))
                .is_some();
            if is_speaker {
                return (start, false);
            }
        }
        (self.text.len(), false)
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.closed || self.cursor >= self.text.len() {
            return None;
        }
        let Some((_, body_start, speaker)) = self.find_speaker(self.cursor) else {
            self.cursor = self.text.len();
            return None;
        };
        let (body_end, closed) = self.find_boundary(body_start);

        self.cursor = body_end;
        self.closed = closed;

        Some(Segment {
            speaker,
            body: &self.text[body_start..body_end],
            body_start,
        })
    }
}

/// Legislative period and session from a "Plenarprotokoll 20/12" header
pub fn protocol_number(text: &str) -> (Option<u32>, Option<u32>) {
    let Some(pos) = text.find("Plenarprotokoll") else {
        return (None, None);
    };
    let rest = text[pos + "Plenarprotokoll".len()..].trim_start();
    let period: String = rest.chars().take_while(char::is_ascii_digit).collect();
    let Some(tail) = rest[period.len()..].strip_prefix('/') else {
        return (period.parse().ok(), None);
    };
    let session: String = tail.chars().take_while(char::is_ascii_digit).collect();
    (period.parse().ok(), session.parse().ok())
}

/// Split a speaker name into (title, first name, last name)
fn split_name(
    name: &str,
    config: &SegmenterConfig,
) -> (Option<String>, Option<String>, Option<String>) {
    let mut titles = Vec::new();
    let mut words = Vec::new();

    for word in name.split_whitespace() {
        if config.role_words.iter().any(|r| r == word) {
            continue;
        }
        if config.honorifics.iter().any(|h| h == word) {
            titles.push(word);
        } else {
            words.push(word);
        }
    }

    let Some(mut split) = words.len().checked_sub(1) else {
        return (none_if_empty(titles.join(" ")), None, None);
    };
    while split > 0 && config.name_particles.iter().any(|p| p == words[split - 1]) {
        split -= 1;
    }

    (
        none_if_empty(titles.join(" ")),
        none_if_empty(words[..split].join(" ")),
        none_if_empty(words[split..].join(" ")),
    )
}

fn none_if_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

/// Segment one document into speeches.
///
/// Returns nothing when no speaker line is found; the caller decides how to
/// report that.
pub fn segment_document(document: &FreeTextDocument, config: &SegmenterConfig) -> Vec<ParsedSpeech> {
    let stripped = strip_reactions(&document.text, &config.reaction_keywords);
    let (period, session) = protocol_number(&document.text);

    Segments::new(&stripped.text, config)
        .filter(|segment| !segment.speaker.name.is_empty())
        .map(|segment| {
            let (title, first_name, last_name) = split_name(segment.speaker.name, config);
            let body_end = segment.body_start + segment.body.len();
            let reactions = if config.keep_reactions {
                stripped
                    .reactions
                    .iter()
                    // Inclusive: a reaction cut from the very end of the body belongs to it
                    .filter(|(offset, _)| (segment.body_start..=body_end).contains(offset))
                    .map(|(_, reaction)| reaction.clone())
                    .collect()
            } else {
                Vec::new()
            };

            ParsedSpeech {
                origin: SourceKind::FreeText,
                source: document.source.clone(),
                date: document.date,
                period,
                session,
                first_name,
                last_name,
                faction: segment.speaker.party.map(str::to_string),
                title,
                text: segment.body.trim().to_string(),
                reactions,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Deutscher Bundestag\nPlenarprotokoll 20/12\n\
Präsidentin Bärbel Bas:\n\
Ich eröffne die Sitzung.\n\
(Beifall im ganzen\nHause)\n\
Dr. Alice Weidel (AfD):\n\
Sehr geehrte Frau Präsidentin! (Zuruf von der SPD: Unsinn!) Wir lehnen ab.\n\
Olaf Scholz, Bundeskanzler:\n\
Das sehe ich anders.\n\
(Schluss der Sitzung: 13.02 Uhr)\n\
Anlage 1\n\
Max Muster (SPD):\n\
Nicht Teil der Sitzung.\n";

    fn document(text: &str) -> FreeTextDocument {
        FreeTextDocument {
            source: "speech-2021-12-15.txt".to_string(),
            date: NaiveDate::from_ymd_opt(2021, 12, 15).unwrap(),
            text: text.to_string(),
        }
    }

    fn keywords() -> Vec<String> {
        SegmenterConfig::default().reaction_keywords
    }

    #[test]
    fn test_strip_reactions_across_lines() {
        let stripped = strip_reactions("Ja. (Beifall bei der\nSPD) Weiter (siehe Anlage).", &keywords());

        assert_eq!(stripped.text, "Ja.  Weiter (siehe Anlage).");
        assert_eq!(stripped.reactions, vec![(4, "(Beifall bei der SPD)".to_string())]);
    }

    #[test]
    fn test_strip_reactions_nested_and_unclosed() {
        let stripped = strip_reactions("A (Zuruf (leise)) B (Lachen", &keywords());
        assert_eq!(stripped.text, "A  B (Lachen");
        assert_eq!(stripped.reactions.len(), 1);
    }

    #[test]
    fn test_parse_speaker_line() {
        let config = SegmenterConfig::default();

        let line = parse_speaker_line("Dr. Alice Weidel (AfD):", &config).unwrap();
        assert_eq!(line.name, "Dr. Alice Weidel");
        assert_eq!(line.party, Some("AfD"));

        let line = parse_speaker_line("Präsidentin Bärbel Bas:", &config).unwrap();
        assert_eq!(line.party, None);

        let line = parse_speaker_line("(CDU/CSU):", &config).unwrap();
        assert_eq!(line.name, "");

        assert!(parse_speaker_line("Ich sage Ihnen:", &config).is_none());
        assert!(parse_speaker_line("Drucksache (Anlage):", &config).is_none());
        assert!(parse_speaker_line("Präsidentin Dr.:", &config).is_none());
        assert!(parse_speaker_line("Kein Doppelpunkt", &config).is_none());
        assert!(parse_speaker_line("Zahlen 2021:", &config).is_none());
    }

    #[test]
    fn test_segments_stop_at_boundaries() {
        let config = SegmenterConfig::default();
        let segments: Vec<_> = Segments::new(SAMPLE, &config).collect();

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].speaker.name, "Präsidentin Bärbel Bas");
        assert_eq!(segments[1].speaker.party, Some("AfD"));
        assert_eq!(segments[2].body, "Das sehe ich anders.\n");
    }

    #[test]
    fn test_segments_are_restartable() {
        let config = SegmenterConfig::default();
        let mut segments = Segments::new(SAMPLE, &config);
        segments.next();
        let restart = segments.clone();

        let remaining: Vec<_> = segments.collect();
        let replayed: Vec<_> = restart.collect();
        assert_eq!(remaining, replayed);
        assert_eq!(remaining.len(), 2);
    }

    #[test]
    fn test_speaker_line_needs_line_break() {
        let config = SegmenterConfig::default();
        assert_eq!(Segments::new("Text davor\nOlaf Scholz (SPD):", &config).count(), 0);
    }

    #[test]
    fn test_segment_document() {
        let speeches = segment_document(&document(SAMPLE), &SegmenterConfig::default());

        assert_eq!(speeches.len(), 3);

        let weidel = &speeches[1];
        assert_eq!(weidel.title.as_deref(), Some("Dr."));
        assert_eq!(weidel.first_name.as_deref(), Some("Alice"));
        assert_eq!(weidel.last_name.as_deref(), Some("Weidel"));
        assert_eq!(weidel.faction.as_deref(), Some("AfD"));
        assert_eq!(weidel.text, "Sehr geehrte Frau Präsidentin!  Wir lehnen ab.");
        assert!(weidel.reactions.is_empty());
        assert_eq!(weidel.period, Some(20));
        assert_eq!(weidel.session, Some(12));

        let bas = &speeches[0];
        assert_eq!(bas.first_name.as_deref(), Some("Bärbel"));
        assert_eq!(bas.last_name.as_deref(), Some("Bas"));
        assert_eq!(bas.text, "Ich eröffne die Sitzung.");

        assert_eq!(speeches[2].last_name.as_deref(), Some("Scholz"));
    }

    #[test]
    fn test_keep_reactions() {
        let config = SegmenterConfig {
            keep_reactions: true,
            ..Default::default()
        };
        let speeches = segment_document(&document(SAMPLE), &config);

        assert_eq!(speeches[0].reactions, vec!["(Beifall im ganzen Hause)".to_string()]);
        assert_eq!(speeches[1].reactions, vec!["(Zuruf von der SPD: Unsinn!)".to_string()]);
    }

    #[test]
    fn test_single_word_line_stays_in_body() {
        let text = "Olaf Scholz (SPD):\nWir verweisen auf die\nDrucksache (Anlage):\nund zwar in der Fassung des Ausschusses.\n";
        let speeches = segment_document(&document(text), &SegmenterConfig::default());

        assert_eq!(speeches.len(), 1);
        assert!(speeches[0].text.ends_with("in der Fassung des Ausschusses."));
    }

    #[test]
    fn test_keep_reactions_at_end_of_text() {
        let config = SegmenterConfig {
            keep_reactions: true,
            ..Default::default()
        };
        let text = "Olaf Scholz (SPD):\nWir beraten den Haushalt. (Beifall bei der SPD)";
        let speeches = segment_document(&document(text), &config);

        assert_eq!(speeches.len(), 1);
        assert_eq!(speeches[0].reactions, vec!["(Beifall bei der SPD)".to_string()]);
        assert_eq!(speeches[0].text, "Wir beraten den Haushalt.");
    }

    #[test]
    fn test_empty_name_is_discarded() {
        let text = "(SPD):\nApplaus für niemanden hier.\nOlaf Scholz (SPD):\nRede.\n";
        let speeches = segment_document(&document(text), &SegmenterConfig::default());

        assert_eq!(speeches.len(), 1);
        assert_eq!(speeches[0].text, "Rede.");
    }

    #[test]
    fn test_no_speaker_yields_nothing() {
        let speeches = segment_document(&document("Nur Fließtext ohne Redner."), &SegmenterConfig::default());
        assert!(speeches.is_empty());
    }

    #[test]
    fn test_protocol_number() {
        assert_eq!(protocol_number("Plenarprotokoll 20/12\n"), (Some(20), Some(12)));
        assert_eq!(protocol_number("Plenarprotokoll\n19"), (Some(19), None));
        assert_eq!(protocol_number("kein Kopf"), (None, None));
    }

    #[test]
    fn test_split_name_keeps_particles() {
        let config = SegmenterConfig::default();
        assert_eq!(
            split_name("Beatrix von Storch", &config),
            (None, Some("Beatrix".to_string()), Some("von Storch".to_string()))
        );
        assert_eq!(
            split_name("Vizepräsident Prof. Dr. Max Muster", &config),
            (Some("Prof. Dr.".to_string()), Some("Max".to_string()), Some("Muster".to_string()))
        );
    }
}
