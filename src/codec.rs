// SPDX-License-Identifier: GPL-3.0-or-later
// rpnotes - Note file format: metadata header followed by a verbatim body

use crate::note::{Field, Metadata, NoteRecord};
use thiserror::Error;

pub const HEADER_START: &str = "---RP-tools---";
/// Start marker written by older releases. Accepted on read only.
pub const LEGACY_HEADER_START: &str = "---RP-Session-Report---";
pub const HEADER_END: &str = "---";

const DELIMITER_LF: &str = "\n---\n";
const DELIMITER_CRLF: &str = "\r\n---\r\n";

/// Why a blob could not be read as a headed note. Every variant means the
/// caller should fall back to treating the whole blob as body.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("note is empty")]
    Empty,
    #[error("no header start marker")]
    NoHeader,
    #[error("header has no end delimiter")]
    NoDelimiter,
}

/// Header fields found in a blob, plus the body after the delimiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub fields: Vec<(Field, String)>,
    pub body: String,
}

impl Decoded {
    /// Write the fields present in the header onto `meta`. Fields the header
    /// does not mention keep their current value.
    pub fn apply_to(&self, meta: &mut Metadata) {
        for (field, value) in &self.fields {
            meta.set(*field, value.as_str());
        }
    }
}

/// How a blob was interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Parsed,
    /// No usable header: the whole blob became the body and metadata was reset.
    Fallback,
}

/// Serialize a record. All five keys are always written.
pub fn encode(record: &NoteRecord) -> String {
    let mut out = String::with_capacity(record.body.len() + 128);
    out.push_str(HEADER_START);
    out.push('\n');
    for field in Field::all() {
        out.push_str(field.key());
        out.push('=');
        out.push_str(record.metadata.get(*field));
        out.push('\n');
    }
    out.push_str(HEADER_END);
    out.push('\n');
    out.push_str(&record.body);
    out
}

pub fn decode(blob: &str) -> Result<Decoded, DecodeError> {
    if blob.trim().is_empty() {
        return Err(DecodeError::Empty);
    }

    let start = if blob.starts_with(LEGACY_HEADER_START) {
        LEGACY_HEADER_START
    } else if blob.starts_with(HEADER_START) {
        HEADER_START
    } else {
        return Err(DecodeError::NoHeader);
    };

    let (end, delimiter) = match blob.find(DELIMITER_LF) {
        Some(i) => (i, DELIMITER_LF),
        None => match blob.find(DELIMITER_CRLF) {
            Some(i) => (i, DELIMITER_CRLF),
            None => return Err(DecodeError::NoDelimiter),
        },
    };

    // The delimiter can sit right at the end of the marker when the header is empty.
    let header = blob.get(start.len()..end).unwrap_or_default();
    let fields = header
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.is_empty())
        .filter_map(parse_header_line)
        .collect();

    Ok(Decoded {
        fields,
        body: blob[end + delimiter.len()..].to_string(),
    })
}

fn parse_header_line(line: &str) -> Option<(Field, String)> {
    let (key, value) = line.split_once('=')?;
    if key.is_empty() {
        return None;
    }
    let field = Field::from_key(key.trim())?;
    Some((field, value.to_string()))
}

/// Decode onto `prior`, or fall back to the whole blob as body with empty metadata.
pub fn decode_or_fallback(blob: &str, prior: &Metadata) -> (Metadata, String, LoadOutcome) {
    match decode(blob) {
        Ok(decoded) => {
            let mut meta = prior.clone();
            decoded.apply_to(&mut meta);
            (meta, decoded.body, LoadOutcome::Parsed)
        }
        Err(_) => (Metadata::default(), blob.to_string(), LoadOutcome::Fallback),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_meta() -> Metadata {
        Metadata {
            name: "Aria".to_string(),
            group: "Circle".to_string(),
            where_they_meet: "Limsa = docks".to_string(),
            day_they_met: "".to_string(),
            relationship: "  friends  ".to_string(),
        }
    }

    #[test]
    fn encodes_exact_layout() {
        let record = NoteRecord::new("a.txt", sample_meta(), "body\n");
        assert_eq!(
            encode(&record),
            "---RP-tools---\nName=Aria\nGroup=Circle\nWhereTheyMeet=Limsa = docks\n\
             DayTheyMet=\nRelationship=  friends  \n---\nbody\n"
        );
    }

    #[test]
    fn round_trips_metadata_and_body() {
        let bodies = [
            "",
            "single line",
            "Met at the docks.\nShe seemed nervous.",
            "trailing newlines\n\n\n",
            "---\nlooks like a delimiter\n---\n",
            "crlf\r\nbody\r\n",
            "ünïcödé ✨ 語",
        ];
        for body in bodies {
            let record = NoteRecord::new("x.txt", sample_meta(), body);
            let decoded = decode(&encode(&record)).unwrap();
            let mut meta = Metadata::default();
            decoded.apply_to(&mut meta);
            assert_eq!(meta, record.metadata, "body {body:?}");
            assert_eq!(decoded.body, body);
        }
    }

    #[test]
    fn aria_scenario() {
        let mut meta = Metadata::default();
        meta.name = "Aria".to_string();
        meta.group = "Circle".to_string();
        let record = NoteRecord::new("aria.txt", meta, "Met at the docks.\nShe seemed nervous.");

        let (meta, body, outcome) = decode_or_fallback(&encode(&record), &Metadata::default());
        assert_eq!(outcome, LoadOutcome::Parsed);
        assert_eq!(meta.name, "Aria");
        assert_eq!(meta.group, "Circle");
        assert_eq!(body, "Met at the docks.\nShe seemed nervous.");
    }

    #[test]
    fn legacy_marker_extracts_same_fields() {
        let header = "\nName=Aria\nWhereWeMeet=Gridania\nDayWeMet=Tuesday\n---\nbody";
        let current = decode(&format!("{HEADER_START}{header}")).unwrap();
        let legacy = decode(&format!("{LEGACY_HEADER_START}{header}")).unwrap();

        assert_eq!(current, legacy);
        assert_eq!(
            legacy.fields,
            vec![
                (Field::Name, "Aria".to_string()),
                (Field::WhereTheyMeet, "Gridania".to_string()),
                (Field::DayTheyMet, "Tuesday".to_string()),
            ]
        );
    }

    #[test]
    fn plain_text_falls_back_to_body() {
        let blob = "Just some old notes.\nName=Not a header\n---\n";
        assert_eq!(decode(blob), Err(DecodeError::NoHeader));

        let prior = sample_meta();
        let (meta, body, outcome) = decode_or_fallback(blob, &prior);
        assert_eq!(outcome, LoadOutcome::Fallback);
        assert_eq!(meta, Metadata::default());
        assert_eq!(body, blob);
    }

    #[test]
    fn marker_must_be_at_very_start() {
        let blob = format!(" {HEADER_START}\nName=x\n---\nbody");
        assert_eq!(decode(&blob), Err(DecodeError::NoHeader));
    }

    #[test]
    fn missing_delimiter_falls_back() {
        let blob = "---RP-tools---\nName=Aria\nno end marker here";
        assert_eq!(decode(blob), Err(DecodeError::NoDelimiter));

        let (meta, body, outcome) = decode_or_fallback(blob, &sample_meta());
        assert_eq!(outcome, LoadOutcome::Fallback);
        assert_eq!(meta, Metadata::default());
        assert_eq!(body, blob);
    }

    #[test]
    fn empty_and_whitespace_are_unparsed() {
        assert_eq!(decode(""), Err(DecodeError::Empty));
        assert_eq!(decode(" \r\n\t"), Err(DecodeError::Empty));
    }

    #[test]
    fn crlf_header_is_accepted() {
        let blob = "---RP-tools---\r\nName=Aria\r\nGroup=Circle\r\n---\r\nline one\r\nline two";
        let decoded = decode(blob).unwrap();
        assert_eq!(
            decoded.fields,
            vec![
                (Field::Name, "Aria".to_string()),
                (Field::Group, "Circle".to_string()),
            ]
        );
        assert_eq!(decoded.body, "line one\r\nline two");
    }

    #[test]
    fn malformed_and_unknown_lines_are_skipped() {
        let blob = "---RP-tools---\nno equals sign\n=leading equals\nColor=blue\n Name =Aria\n---\n";
        let decoded = decode(blob).unwrap();
        assert_eq!(decoded.fields, vec![(Field::Name, "Aria".to_string())]);
        assert_eq!(decoded.body, "");
    }

    #[test]
    fn unmentioned_fields_keep_prior_values() {
        let blob = "---RP-tools---\nName=Kai\n---\nbody";
        let (meta, _, outcome) = decode_or_fallback(blob, &sample_meta());
        assert_eq!(outcome, LoadOutcome::Parsed);
        assert_eq!(meta.name, "Kai");
        assert_eq!(meta.group, "Circle");
        assert_eq!(meta.relationship, "  friends  ");
    }

    #[test]
    fn values_may_contain_equals() {
        let blob = "---RP-tools---\nGroup=a=b=c\n---\n";
        let decoded = decode(blob).unwrap();
        assert_eq!(decoded.fields, vec![(Field::Group, "a=b=c".to_string())]);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn metadata() -> impl Strategy<Value = Metadata> {
            let line = "[^\r\n]{0,40}";
            (line, line, line, line, line).prop_map(
                |(name, group, where_they_meet, day_they_met, relationship)| Metadata {
                    name,
                    group,
                    where_they_meet,
                    day_they_met,
                    relationship,
                },
            )
        }

        proptest! {
            #[test]
            fn encode_then_decode_restores_record(meta in metadata(), body in any::<String>()) {
                let record = NoteRecord::new("p.txt", meta, body);
                let (meta, body, outcome) =
                    decode_or_fallback(&encode(&record), &Metadata::default());
                prop_assert_eq!(outcome, LoadOutcome::Parsed);
                prop_assert_eq!(meta, record.metadata);
                prop_assert_eq!(body, record.body);
            }

            #[test]
            fn decode_never_panics(blob in "\\PC{0,300}") {
                let _ = decode_or_fallback(&blob, &Metadata::default());
            }
        }
    }
}
