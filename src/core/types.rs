// src/core/types.rs
use serde::{Deserialize, Serialize};

/// Learning progress of a word, as reported by the external learning tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KnownStatus {
    Known,
    Learning,
    Unknown,
    Ignored,
}

/// A single vocabulary entry as synced by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    /// Canonical written form. Half of the identity key.
    pub dict_form: String,
    /// Alternate representation, usually the phonetic reading.
    #[serde(default)]
    pub secondary: String,
    #[serde(default)]
    pub part_of_speech: String,
    /// Source language code. The other half of the identity key.
    pub language: String,
    pub known_status: KnownStatus,
    #[serde(default)]
    pub has_card: i64,
    #[serde(default)]
    pub tracked: i64,
    /// Last-modified epoch timestamp supplied by the caller.
    #[serde(default, rename = "mod")]
    pub modified: i64,
    /// When the word first reached the store. Never overwritten by a later sync.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

/// Identity of a word across syncs: (`dictForm`, `language`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WordKey {
    pub dict_form: String,
    pub language: String,
}

impl Word {
    pub fn key(&self) -> WordKey {
        WordKey {
            dict_form: self.dict_form.clone(),
            language: self.language.clone(),
        }
    }
}

/// The stored document: `{ "words": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordList {
    pub words: Vec<Word>,
}

/// Either shape a persisted value may take. Older deployments stored a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredShape {
    Bare(Vec<Word>),
    Envelope(WordList),
}

impl From<StoredShape> for WordList {
    fn from(shape: StoredShape) -> Self {
        match shape {
            StoredShape::Envelope(list) => list,
            StoredShape::Bare(words) => WordList { words },
        }
    }
}

/// Per-status counts shown on the dashboard front page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub total: usize,
    pub known: usize,
    pub learning: usize,
    pub unknown: usize,
    pub ignored: usize,
}

impl WordList {
    pub fn new(words: Vec<Word>) -> Self {
        Self { words }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Decodes a persisted document, accepting the envelope or the legacy bare array.
    pub fn from_json_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice::<StoredShape>(bytes).map(Into::into)
    }

    /// Same as [`WordList::from_json_slice`] for an already parsed value.
    pub fn from_json_value(value: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value::<StoredShape>(value).map(Into::into)
    }

    pub fn summary(&self) -> StatusSummary {
        let mut summary = StatusSummary {
            total: self.words.len(),
            ..StatusSummary::default()
        };
        for word in &self.words {
            match word.known_status {
                KnownStatus::Known => summary.known += 1,
                KnownStatus::Learning => summary.learning += 1,
                KnownStatus::Unknown => summary.unknown += 1,
                KnownStatus::Ignored => summary.ignored += 1,
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_uses_camel_case_wire_names() {
        let json = r#"{
            "dictForm": "食べる",
            "secondary": "たべる",
            "partOfSpeech": "verb",
            "language": "ja",
            "knownStatus": "LEARNING",
            "hasCard": 1,
            "tracked": 0,
            "mod": 1700000000000,
            "createdAt": 100
        }"#;
        let word: Word = serde_json::from_str(json).unwrap();
        assert_eq!(word.dict_form, "食べる");
        assert_eq!(word.known_status, KnownStatus::Learning);
        assert_eq!(word.modified, 1_700_000_000_000);
        assert_eq!(word.created_at, Some(100));

        let back = serde_json::to_value(&word).unwrap();
        assert_eq!(back["mod"], 1_700_000_000_000i64);
        assert_eq!(back["knownStatus"], "LEARNING");
    }

    #[test]
    fn absent_created_at_is_not_serialized() {
        let json = r#"{"dictForm":"猫","language":"ja","knownStatus":"KNOWN"}"#;
        let word: Word = serde_json::from_str(json).unwrap();
        assert_eq!(word.created_at, None);
        assert_eq!(word.secondary, "");

        let back = serde_json::to_value(&word).unwrap();
        assert!(back.get("createdAt").is_none());
    }

    #[test]
    fn legacy_bare_array_reads_as_envelope() {
        let bare = r#"[
            {"dictForm":"猫","language":"ja","knownStatus":"KNOWN"},
            {"dictForm":"犬","language":"ja","knownStatus":"UNKNOWN"}
        ]"#;
        let list = WordList::from_json_slice(bare.as_bytes()).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.words[1].dict_form, "犬");

        let envelope = serde_json::to_string(&list).unwrap();
        let again = WordList::from_json_slice(envelope.as_bytes()).unwrap();
        assert_eq!(again, list);
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(WordList::from_json_slice(b"{\"words\": 3}").is_err());
        assert!(WordList::from_json_slice(b"not json").is_err());
    }

    #[test]
    fn summary_counts_each_status() {
        let list = WordList::from_json_slice(
            br#"{"words":[
                {"dictForm":"a","language":"ja","knownStatus":"KNOWN"},
                {"dictForm":"b","language":"ja","knownStatus":"KNOWN"},
                {"dictForm":"c","language":"ja","knownStatus":"LEARNING"},
                {"dictForm":"d","language":"ja","knownStatus":"IGNORED"}
            ]}"#,
        )
        .unwrap();
        let summary = list.summary();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.known, 2);
        assert_eq!(summary.learning, 1);
        assert_eq!(summary.unknown, 0);
        assert_eq!(summary.ignored, 1);
    }
}
