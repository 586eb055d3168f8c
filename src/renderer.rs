use crate::importer::{Folder, Location, Note};
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Write;

/// Frontmatter keys produced from known Drafts fields. Preserved fields with
/// one of these names are written with a `drafts_` prefix instead.
const MAPPED_KEYS: &[&str] = &[
    "created",
    "modified",
    "tags",
    "location",
    "modified_location",
    "flagged",
    "folder",
];

#[derive(Serialize)]
struct Frontmatter<'a> {
    created: &'a DateTime<FixedOffset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    modified: Option<&'a DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    tags: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    modified_location: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    flagged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    folder: Option<FolderValue<'a>>,
    #[serde(flatten)]
    preserved: BTreeMap<String, &'a Value>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum FolderValue<'a> {
    Name(&'a str),
    Code(i64),
}

impl<'a> Frontmatter<'a> {
    fn from_note(note: &'a Note) -> Self {
        let folder = note.folder.as_ref().map(|folder| match (folder.name(), folder) {
            (Some(name), _) => FolderValue::Name(name),
            (None, Folder::Code(code)) => FolderValue::Code(*code),
            (None, Folder::Name(name)) => FolderValue::Name(name),
        });

        let mut preserved = BTreeMap::new();
        for (key, value) in &note.extra {
            let key = if MAPPED_KEYS.contains(&key.as_str()) {
                format!("drafts_{}", key)
            } else {
                key.clone()
            };
            preserved.entry(key).or_insert(value);
        }

        Frontmatter {
            created: &note.created_at,
            modified: note.modified_at.as_ref(),
            tags: note.tags(),
            location: note.created_location().map(coordinates),
            modified_location: note.modified_location().map(coordinates),
            flagged: note.is_flagged(),
            folder,
            preserved,
        }
    }
}

fn coordinates(location: Location) -> [f64; 2] {
    [location.latitude, location.longitude]
}

/// Write `note` as a Markdown document: YAML frontmatter, a blank line, then
/// the body exactly as it appeared in the export.
pub fn write_note_markdown<W: Write>(writer: &mut W, note: &Note) -> std::io::Result<()> {
    let fm = Frontmatter::from_note(note);
    // serde_yaml 0.9 does not emit a leading "---"; both delimiters are ours.
    let yaml = serde_yaml::to_string(&fm).map_err(std::io::Error::other)?;

    writeln!(writer, "---")?;
    write!(writer, "{}", yaml)?;
    writeln!(writer, "---")?;
    writeln!(writer)?;
    writer.write_all(note.content.as_bytes())?;

    Ok(())
}
