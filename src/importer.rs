/// Type definitions for the Drafts JSON export (`DraftsExport.json`).
///
/// The export is a single top-level array with one object per draft:
/// ```json
/// [
///   {
///     "uuid": "4B0C6E0E-…",
///     "content": "# Trip to Japan\nDetails…",
///     "created_at": "2021-04-02T09:14:55Z",
///     "modified_at": "2021-04-03T18:01:12Z",
///     "tags": ["travel"],
///     "flagged": false,
///     "folder": 0,
///     "created_latitude": 35.6812,
///     "created_longitude": 139.7671
///   }
/// ]
/// ```
///
/// Only `content` and `created_at` are required. Every key not modelled by
/// [`Note`] is kept in [`Note::extra`] so it can be carried into frontmatter.
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, FixedOffset};
use eyre::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Note
// ---------------------------------------------------------------------------

/// A single draft as found in the export. Never mutated after loading.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Note {
    /// Full body text, written to disk verbatim.
    pub content: String,
    pub created_at: DateTime<FixedOffset>,
    #[serde(default)]
    pub modified_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    flagged: Option<bool>,
    #[serde(default)]
    pub folder: Option<Folder>,
    #[serde(default)]
    created_latitude: Option<f64>,
    #[serde(default)]
    created_longitude: Option<f64>,
    #[serde(default)]
    modified_latitude: Option<f64>,
    #[serde(default)]
    modified_longitude: Option<f64>,
    /// Unrecognised fields, preserved verbatim and in key order.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Note {
    pub fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or_default()
    }

    pub fn is_flagged(&self) -> bool {
        self.flagged.unwrap_or(false)
    }

    pub fn created_location(&self) -> Option<Location> {
        Location::from_pair(self.created_latitude, self.created_longitude)
    }

    pub fn modified_location(&self) -> Option<Location> {
        Location::from_pair(self.modified_latitude, self.modified_longitude)
    }

    /// The draft's UUID, if the export carried one. Used only for diagnostics.
    pub fn uuid(&self) -> Option<&str> {
        self.extra.get("uuid").and_then(Value::as_str)
    }
}

// ---------------------------------------------------------------------------
// Folder
// ---------------------------------------------------------------------------

/// Drafts stores the folder as an integer code; older or third-party exports
/// sometimes use a plain name instead.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Folder {
    Code(i64),
    Name(String),
}

impl Folder {
    /// Human-readable name for the well-known codes.
    pub fn name(&self) -> Option<&str> {
        match self {
            Folder::Code(0) => Some("inbox"),
            Folder::Code(1) => Some("archive"),
            Folder::Code(_) => None,
            Folder::Name(name) => Some(name),
        }
    }
}

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    /// Drafts writes `0, 0` when no location was captured; treat it as absent.
    fn from_pair(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) if latitude != 0.0 || longitude != 0.0 => {
                Some(Self {
                    latitude,
                    longitude,
                })
            }
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// A record that could not be turned into a [`Note`].
#[derive(Debug, Clone)]
pub struct SkippedNote {
    /// Zero-based position in the export array.
    pub index: usize,
    pub uuid: Option<String>,
    pub reason: String,
}

/// Result of reading an export: usable notes in input order plus the records
/// that were skipped.
#[derive(Debug, Default)]
pub struct LoadedNotes {
    pub notes: Vec<Note>,
    pub skipped: Vec<SkippedNote>,
}

impl LoadedNotes {
    /// Number of records in the export, usable or not.
    pub fn total(&self) -> usize {
        self.notes.len() + self.skipped.len()
    }
}

/// Read and parse a Drafts export from disk.
pub fn load_notes(path: &Path) -> Result<LoadedNotes> {
    let raw = fs::read(path).wrap_err_with(|| format!("Failed to read: {}", path.display()))?;
    parse_notes(&raw).wrap_err_with(|| format!("Failed to parse export: {}", path.display()))
}

/// Parse the export bytes. Only a malformed top level is an error; individual
/// records that do not fit [`Note`] are collected as [`SkippedNote`]s.
pub fn parse_notes(json_bytes: &[u8]) -> Result<LoadedNotes> {
    let entries: Vec<Value> =
        serde_json::from_slice(json_bytes).wrap_err("Expected a JSON array of notes")?;

    let mut loaded = LoadedNotes::default();
    for (index, entry) in entries.into_iter().enumerate() {
        let uuid = entry
            .get("uuid")
            .and_then(Value::as_str)
            .map(str::to_string);
        match serde_json::from_value::<Note>(entry) {
            Ok(note) => loaded.notes.push(note),
            Err(e) => loaded.skipped.push(SkippedNote {
                index,
                uuid,
                reason: e.to_string(),
            }),
        }
    }
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> LoadedNotes {
        parse_notes(value.to_string().as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_full_record() {
        let loaded = parse(json!([{
            "uuid": "ABC-123",
            "content": "Hello\nworld",
            "created_at": "2021-04-02T09:14:55Z",
            "modified_at": "2021-04-03T18:01:12+02:00",
            "tags": ["travel", "japan"],
            "flagged": true,
            "folder": 1,
            "created_latitude": 35.6812,
            "created_longitude": 139.7671,
            "modified_latitude": 0,
            "modified_longitude": 0,
            "languageGrammar": "Markdown"
        }]));

        assert!(loaded.skipped.is_empty());
        let note = &loaded.notes[0];
        assert_eq!(note.content, "Hello\nworld");
        assert_eq!(note.tags(), ["travel", "japan"]);
        assert!(note.is_flagged());
        assert_eq!(note.folder.as_ref().and_then(Folder::name), Some("archive"));
        assert_eq!(
            note.created_location(),
            Some(Location {
                latitude: 35.6812,
                longitude: 139.7671
            })
        );
        assert_eq!(note.modified_location(), None);
        assert_eq!(note.uuid(), Some("ABC-123"));
        assert_eq!(note.extra.get("languageGrammar"), Some(&json!("Markdown")));
        assert!(!note.extra.contains_key("content"));
        assert!(!note.extra.contains_key("tags"));
    }

    #[test]
    fn test_parse_minimal_record() {
        let loaded = parse(json!([{
            "content": "",
            "created_at": "2020-01-05T17:33:02Z"
        }]));
        let note = &loaded.notes[0];
        assert!(note.tags().is_empty());
        assert!(!note.is_flagged());
        assert!(note.modified_at.is_none());
        assert!(note.folder.is_none());
        assert!(note.extra.is_empty());
    }

    #[test]
    fn test_null_optionals_are_absent() {
        let loaded = parse(json!([{
            "content": "x",
            "created_at": "2020-01-05T17:33:02Z",
            "tags": null,
            "flagged": null,
            "folder": "Projects"
        }]));
        let note = &loaded.notes[0];
        assert!(note.tags().is_empty());
        assert!(!note.is_flagged());
        assert_eq!(note.folder, Some(Folder::Name("Projects".into())));
    }

    #[test]
    fn test_malformed_records_are_skipped_in_place() {
        let loaded = parse(json!([
            { "content": "first", "created_at": "2020-01-05T17:33:02Z" },
            { "uuid": "NO-DATE", "content": "missing timestamp" },
            { "content": 42, "created_at": "2020-01-05T17:33:02Z" },
            "not an object",
            { "content": "bad date", "created_at": "yesterday" },
            { "content": "last", "created_at": "2020-01-06T08:00:00Z" }
        ]));

        assert_eq!(loaded.total(), 6);
        let bodies: Vec<_> = loaded.notes.iter().map(|n| n.content.as_str()).collect();
        assert_eq!(bodies, ["first", "last"]);
        let indexes: Vec<_> = loaded.skipped.iter().map(|s| s.index).collect();
        assert_eq!(indexes, [1, 2, 3, 4]);
        assert_eq!(loaded.skipped[0].uuid.as_deref(), Some("NO-DATE"));
    }

    #[test]
    fn test_top_level_must_be_array() {
        assert!(parse_notes(br#"{"content": "x"}"#).is_err());
        assert!(parse_notes(b"not json").is_err());
    }

    #[test]
    fn test_unknown_folder_code() {
        assert_eq!(Folder::Code(7).name(), None);
        assert_eq!(Folder::Code(0).name(), Some("inbox"));
    }
}
