use chrono::NaiveDate;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{FormatError, SourceKind};
use crate::models::ParsedSpeech;

/// Which paragraph classes count as spoken content or as audience reactions
#[derive(Debug, Clone)]
pub struct TranscriptConfig {
    /// `klasse` values of paragraphs that belong to the speech text
    pub spoken_classes: Vec<String>,
    /// `klasse` values of paragraphs holding audience reactions
    pub comment_classes: Vec<String>,
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            spoken_classes: vec!["J".to_string(), "J_1".to_string(), "O".to_string()],
            comment_classes: vec!["kommentar".to_string()],
        }
    }
}

/// Raw markup of one plenary protocol
#[derive(Debug, Clone)]
pub struct TranscriptDocument {
    /// File name or other identifier
    pub source: String,
    pub xml: String,
}

/// Speeches extracted from one transcript
#[derive(Debug, Clone, Default)]
pub struct TranscriptParse {
    pub speeches: Vec<ParsedSpeech>,
    /// `rede` elements skipped because they had no speaker name
    pub nameless_speeches: usize,
}

/// Session attributes from the document root
#[derive(Debug, Clone, Copy)]
struct SessionInfo {
    date: NaiveDate,
    period: u32,
    session: Option<u32>,
}

#[derive(Debug)]
struct Frame {
    tag: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParagraphKind {
    Spoken,
    Comment,
    Other,
}

#[derive(Debug, Default)]
struct NameBlock {
    title: Option<String>,
    first_name: Option<String>,
    name_prefix: Option<String>,
    last_name: Option<String>,
    faction: Option<String>,
}

impl NameBlock {
    fn push(&mut self, field: &str, text: &str) {
        let slot = match field {
            "titel" => &mut self.title,
            "vorname" => &mut self.first_name,
            "namenszusatz" => &mut self.name_prefix,
            "nachname" => &mut self.last_name,
            "fraktion" => &mut self.faction,
            _ => return,
        };
        slot.get_or_insert_with(String::new).push_str(text);
    }

    fn is_identifiable(&self) -> bool {
        self.last_name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty())
    }
}

/// Accumulates one `rede` element
#[derive(Debug, Default)]
struct SpeechBuilder {
    speaker: Option<NameBlock>,
    pending_name: Option<NameBlock>,
    paragraph: Option<(ParagraphKind, String)>,
    comment: Option<String>,
    paragraphs: Vec<String>,
    reactions: Vec<String>,
}

impl SpeechBuilder {
    fn open(&mut self, tag: &str, class: Option<&str>, stack: &[Frame], config: &TranscriptConfig) {
        match tag {
            // Only the first speaker block of a speech names the speaker; later
            // ones mark the speaker resuming after an interjection.
            "name" if self.speaker.is_none() && stack.last().is_some_and(|f| f.tag == "redner") => {
                self.pending_name = Some(NameBlock::default());
            }
            "p" => {
                let kind = match class {
                    Some(c) if config.spoken_classes.iter().any(|s| s == c) => ParagraphKind::Spoken,
                    Some(c) if config.comment_classes.iter().any(|s| s == c) => ParagraphKind::Comment,
                    _ => ParagraphKind::Other,
                };
                self.paragraph = Some((kind, String::new()));
            }
            "kommentar" => self.comment = Some(String::new()),
            _ => {}
        }
    }

    fn text(&mut self, text: &str, stack: &[Frame]) {
        if let Some(comment) = self.comment.as_mut() {
            comment.push_str(text);
        } else if let Some(name) = self.pending_name.as_mut() {
            if let Some(field) = stack.last() {
                name.push(&field.tag, text);
            }
        } else if let Some((kind, buffer)) = self.paragraph.as_mut() {
            if *kind != ParagraphKind::Other {
                buffer.push_str(text);
            }
        }
    }

    fn close(&mut self, frame: &Frame) {
        match frame.tag.as_str() {
            "name" => {
                if let Some(name) = self.pending_name.take() {
                    self.speaker = Some(name);
                }
            }
            "p" => {
                if let Some((kind, buffer)) = self.paragraph.take() {
                    let text = collapse_whitespace(&buffer);
                    if text.is_empty() {
                        return;
                    }
                    match kind {
                        ParagraphKind::Spoken => self.paragraphs.push(text),
                        ParagraphKind::Comment => self.reactions.push(text),
                        ParagraphKind::Other => {}
                    }
                }
            }
            "kommentar" => {
                if let Some(comment) = self.comment.take() {
                    let text = collapse_whitespace(&comment);
                    if !text.is_empty() {
                        self.reactions.push(text);
                    }
                }
            }
            _ => {}
        }
    }

    fn finish(self, session: SessionInfo, document: &str) -> Option<ParsedSpeech> {
        let speaker = self.speaker.filter(NameBlock::is_identifiable)?;
        let last_name = match (speaker.name_prefix, speaker.last_name) {
            (Some(prefix), Some(last)) => Some(format!("{} {}", prefix.trim(), last.trim())),
            (_, last) => last.map(|l| l.trim().to_string()),
        };

        Some(ParsedSpeech {
            origin: SourceKind::Transcript,
            source: document.to_string(),
            date: session.date,
            period: Some(session.period),
            session: session.session,
            first_name: non_empty(speaker.first_name),
            last_name,
            faction: non_empty(speaker.faction),
            title: non_empty(speaker.title),
            text: self.paragraphs.join("\n"),
            reactions: self.reactions,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| collapse_whitespace(&v))
        .filter(|v| !v.is_empty())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse a session date in the strict `dd.mm.yyyy` form
pub fn parse_session_date(value: &str, document: &str) -> Result<NaiveDate, FormatError> {
    let value = value.trim();
    let bytes = value.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| if i == 2 || i == 5 { *b == b'.' } else { b.is_ascii_digit() });

    if well_formed {
        if let Ok(date) = NaiveDate::parse_from_str(value, "%d.%m.%Y") {
            return Ok(date);
        }
    }

    Err(FormatError::InvalidDate {
        document: document.to_string(),
        value: value.to_string(),
        expected: "dd.mm.yyyy",
    })
}

fn markup_error(document: &str, message: impl Into<String>) -> FormatError {
    FormatError::Markup {
        document: document.to_string(),
        message: message.into(),
    }
}

fn attribute(element: &BytesStart, key: &str, document: &str) -> Result<Option<String>, FormatError> {
    match element.try_get_attribute(key) {
        Ok(Some(attr)) => attr
            .unescape_value()
            .map(|value| Some(value.into_owned()))
            .map_err(|e| markup_error(document, e.to_string())),
        Ok(None) => Ok(None),
        Err(e) => Err(markup_error(document, e.to_string())),
    }
}

fn number_attribute(element: &BytesStart, key: &str, document: &str) -> Result<Option<u32>, FormatError> {
    let Some(value) = attribute(element, key, document)? else {
        return Ok(None);
    };
    value
        .trim()
        .parse()
        .map(Some)
        .map_err(|_| FormatError::InvalidNumber {
            document: document.to_string(),
            attribute: key.to_string(),
            value,
        })
}

fn read_session(element: &BytesStart, document: &str) -> Result<SessionInfo, FormatError> {
    let missing = |attribute: &str| FormatError::MissingAttribute {
        document: document.to_string(),
        attribute: attribute.to_string(),
    };

    let date = attribute(element, "sitzung-datum", document)?.ok_or_else(|| missing("sitzung-datum"))?;
    let date = parse_session_date(&date, document)?;
    let period = number_attribute(element, "wahlperiode", document)?.ok_or_else(|| missing("wahlperiode"))?;
    let session = number_attribute(element, "sitzung-nr", document)?;

    Ok(SessionInfo {
        date,
        period,
        session,
    })
}

/// Parse one plenary protocol (`dbtplenarprotokoll`) into speeches.
///
/// Every `rede` with a speaker name block yields one speech, in document
/// order. The speech text joins the spoken paragraphs with newlines;
/// `kommentar` elements and comment-classed paragraphs become reactions.
pub fn parse_transcript(
    xml: &str,
    document: &str,
    config: &TranscriptConfig,
) -> Result<TranscriptParse, FormatError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Frame> = Vec::new();
    let mut session: Option<SessionInfo> = None;
    let mut speech: Option<SpeechBuilder> = None;
    let mut result = TranscriptParse::default();

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                return Err(markup_error(
                    document,
                    format!("at byte {}: {}", reader.error_position(), e),
                ));
            }
        };

        match event {
            Event::Start(element) => {
                let tag = String::from_utf8_lossy(element.name().as_ref()).into_owned();
                let class = attribute(&element, "klasse", document)?;

                match tag.as_str() {
                    "dbtplenarprotokoll" => session = Some(read_session(&element, document)?),
                    "rede" => {
                        if session.is_none() {
                            return Err(markup_error(document, "speech outside of a session root"));
                        }
                        speech = Some(SpeechBuilder::default());
                    }
                    _ => {}
                }

                if let Some(builder) = speech.as_mut() {
                    builder.open(&tag, class.as_deref(), &stack, config);
                }
                stack.push(Frame { tag });
            }
            Event::End(_) => {
                let Some(frame) = stack.pop() else {
                    return Err(markup_error(document, "closing tag without opening tag"));
                };
                if let Some(builder) = speech.as_mut() {
                    builder.close(&frame);
                }
                if frame.tag == "rede" {
                    if let (Some(builder), Some(info)) = (speech.take(), session) {
                        match builder.finish(info, document) {
                            Some(parsed) => result.speeches.push(parsed),
                            None => result.nameless_speeches += 1,
                        }
                    }
                }
            }
            Event::Text(text) => {
                if let Some(builder) = speech.as_mut() {
                    let text = text.unescape().map_err(|e| markup_error(document, e.to_string()))?;
                    builder.text(&text, &stack);
                }
            }
            Event::CData(data) => {
                if let Some(builder) = speech.as_mut() {
                    builder.text(&String::from_utf8_lossy(&data), &stack);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(markup_error(document, format!("unclosed element <{}>", open.tag)));
    }
    if session.is_none() {
        return Err(markup_error(document, "no dbtplenarprotokoll root element"));
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speech_xml(name_block: &str, body: &str) -> String {
        format!(
            r#"<rede id="ID20001"><p klasse="redner"><redner id="1">{name_block}</redner>Sprecher:</p>{body}</rede>"#
        )
    }

    fn protocol(speeches: &[String]) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<dbtplenarprotokoll wahlperiode="20" sitzung-nr="12" sitzung-datum="26.10.2021">
  <sitzungsverlauf>
    <tagesordnungspunkt top-id="TOP 1">
      {}
    </tagesordnungspunkt>
  </sitzungsverlauf>
</dbtplenarprotokoll>"#,
            speeches.join("\n")
        )
    }

    const NAME: &str = "<name><titel>Dr.</titel><vorname>Wolfgang</vorname><nachname>Schäuble</nachname><fraktion>CDU/CSU</fraktion></name>";

    #[test]
    fn test_parse_single_speech() {
        let xml = protocol(&[speech_xml(
            NAME,
            r#"<p klasse="J_1">Meine Damen und Herren!</p>
               <kommentar>(Beifall bei der CDU/CSU)</kommentar>
               <p klasse="J">Wir beginnen
                  die Sitzung.</p>
               <p klasse="T_fett">Tagesordnungspunkt 1</p>"#,
        )]);

        let result = parse_transcript(&xml, "20012.xml", &TranscriptConfig::default()).unwrap();

        assert_eq!(result.speeches.len(), 1);
        let speech = &result.speeches[0];
        assert_eq!(speech.first_name.as_deref(), Some("Wolfgang"));
        assert_eq!(speech.last_name.as_deref(), Some("Schäuble"));
        assert_eq!(speech.title.as_deref(), Some("Dr."));
        assert_eq!(speech.faction.as_deref(), Some("CDU/CSU"));
        assert_eq!(speech.date, NaiveDate::from_ymd_opt(2021, 10, 26).unwrap());
        assert_eq!(speech.period, Some(20));
        assert_eq!(speech.session, Some(12));
        assert_eq!(speech.text, "Meine Damen und Herren!\nWir beginnen die Sitzung.");
        assert_eq!(speech.reactions, vec!["(Beifall bei der CDU/CSU)".to_string()]);
        assert_eq!(speech.source, "20012.xml");
    }

    #[test]
    fn test_nameless_speech_is_skipped() {
        let xml = protocol(&[
            speech_xml(NAME, r#"<p klasse="J">Erste Rede.</p>"#),
            r#"<rede id="ID2"><p klasse="J">Niemand spricht hier.</p></rede>"#.to_string(),
            speech_xml(
                "<name><vorname>Olaf</vorname><nachname>Scholz</nachname></name>",
                r#"<p klasse="O">Zweite Rede.</p>"#,
            ),
        ]);

        let result = parse_transcript(&xml, "d.xml", &TranscriptConfig::default()).unwrap();

        assert_eq!(result.speeches.len(), 2);
        assert_eq!(result.nameless_speeches, 1);
        assert_eq!(result.speeches[0].last_name.as_deref(), Some("Schäuble"));
        assert_eq!(result.speeches[1].last_name.as_deref(), Some("Scholz"));
        assert_eq!(result.speeches[1].faction, None);
    }

    #[test]
    fn test_first_speaker_block_wins() {
        let xml = protocol(&[speech_xml(
            NAME,
            r#"<p klasse="J">Teil eins.</p>
               <name>Präsidentin Bärbel Bas:</name>
               <p klasse="redner"><redner id="9"><name><vorname>Bärbel</vorname><nachname>Bas</nachname></name></redner>Bas:</p>
               <p klasse="J">Teil zwei.</p>"#,
        )]);

        let result = parse_transcript(&xml, "d.xml", &TranscriptConfig::default()).unwrap();

        assert_eq!(result.speeches.len(), 1);
        assert_eq!(result.speeches[0].last_name.as_deref(), Some("Schäuble"));
        assert_eq!(result.speeches[0].text, "Teil eins.\nTeil zwei.");
    }

    #[test]
    fn test_name_prefix_joins_last_name() {
        let xml = protocol(&[speech_xml(
            "<name><vorname>Beatrix</vorname><namenszusatz>von</namenszusatz><nachname>Storch</nachname><fraktion>AfD</fraktion></name>",
            r#"<p klasse="J">Text.</p>"#,
        )]);

        let result = parse_transcript(&xml, "d.xml", &TranscriptConfig::default()).unwrap();
        assert_eq!(result.speeches[0].last_name.as_deref(), Some("von Storch"));
    }

    #[test]
    fn test_invalid_date_fails_document() {
        let xml = protocol(&[]).replace("26.10.2021", "2021-10-26");
        let err = parse_transcript(&xml, "bad.xml", &TranscriptConfig::default()).unwrap_err();

        assert!(matches!(err, FormatError::InvalidDate { .. }));
        assert_eq!(err.document(), "bad.xml");
    }

    #[test]
    fn test_missing_period_fails_document() {
        let xml = protocol(&[]).replace(r#"wahlperiode="20" "#, "");
        let err = parse_transcript(&xml, "d.xml", &TranscriptConfig::default()).unwrap_err();
        assert!(matches!(err, FormatError::MissingAttribute { .. }));
    }

    #[test]
    fn test_malformed_markup_fails_document() {
        let xml = protocol(&[speech_xml(NAME, r#"<p klasse="J">offen</rede>"#)]);
        let err = parse_transcript(&xml, "d.xml", &TranscriptConfig::default()).unwrap_err();
        assert!(matches!(err, FormatError::Markup { .. }));
    }

    #[test]
    fn test_parse_session_date_is_strict() {
        assert!(parse_session_date("26.10.2021", "d").is_ok());
        assert!(parse_session_date("6.10.2021", "d").is_err());
        assert!(parse_session_date("31.02.2021", "d").is_err());
        assert!(parse_session_date("26/10/2021", "d").is_err());
    }
}
