use chrono::{DateTime, FixedOffset};
use std::fs::File;
use std::path::PathBuf;
use std::time::SystemTime;

/// Configuration required to run the export process.
/// This decouples the logic from how the arguments were parsed.
#[derive(Clone, Debug)]
pub struct ExportConfig {
    pub input_path: PathBuf,
    pub target_dir: PathBuf,
    pub verbose: bool,
    pub quiet: bool,
}

/// Set a file's modification time to the note's creation time, so apps that
/// sort by file date show notes in their original order.
pub fn set_modified_time(file: &File, created: &DateTime<FixedOffset>) -> std::io::Result<()> {
    file.set_modified(SystemTime::from(*created))
}

/// Path of the Markdown file for a final filename stem.
pub fn note_path(config: &ExportConfig, stem: &str) -> PathBuf {
    config.target_dir.join(format!("{}.md", stem))
}
