use crate::dedup::deduplicate;
use crate::importer::{LoadedNotes, Note, SkippedNote, load_notes};
use crate::renderer;
use crate::title::{UNTITLED, derive_title};
use crate::utils::{self, ExportConfig};
use eyre::{Context, Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, IntoInnerError};
use std::path::{Path, PathBuf};
use tracing::warn;

/// A note whose file could not be written.
#[derive(Debug)]
pub struct WriteFailure {
    pub path: PathBuf,
    pub error: eyre::Report,
}

/// Outcome of a completed run.
#[derive(Debug, Default)]
pub struct ExportSummary {
    /// Records in the export, including skipped ones.
    pub read: usize,
    pub skipped: Vec<SkippedNote>,
    /// Files written, in input order.
    pub written: Vec<PathBuf>,
    pub failures: Vec<WriteFailure>,
}

impl ExportSummary {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Closing report: the totals line, then one line per file not written.
    pub fn report_lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "Done. {} written, {} skipped, {} failed.",
            self.written.len(),
            self.skipped.len(),
            self.failures.len()
        )];
        lines.extend(
            self.failures
                .iter()
                .map(|f| format!("  failed: {} ({:#})", f.path.display(), f.error)),
        );
        lines
    }
}

fn read_line(read: usize, input_path: &Path) -> String {
    format!("{} notes read from {}", read, input_path.display())
}

fn writing_line(count: usize, target_dir: &Path) -> String {
    format!("Writing {} notes to {}", count, target_dir.display())
}

/// The main entry point for the export.
/// Everything that can abort the run (reading the export, creating the
/// target directory) happens before the first file is written.
pub fn execute(config: &ExportConfig) -> Result<ExportSummary> {
    let loaded = load_notes(&config.input_path)?;
    let read = loaded.total();
    let LoadedNotes { notes, skipped } = loaded;

    for note in &skipped {
        warn!(
            "Skipping note #{}{}: {}",
            note.index,
            note.uuid
                .as_deref()
                .map(|id| format!(" [{}]", id))
                .unwrap_or_default(),
            note.reason
        );
    }

    if !config.quiet {
        println!("{}", read_line(read, &config.input_path));
    }
    if notes.is_empty() {
        return Err(eyre!(
            "Aborting, no notes read from {}",
            config.input_path.display()
        ));
    }

    let stems = allocate_filenames(&notes);

    fs::create_dir_all(&config.target_dir).wrap_err_with(|| {
        format!(
            "Failed to create target directory: {}",
            config.target_dir.display()
        )
    })?;

    if !config.quiet {
        println!("{}", writing_line(notes.len(), &config.target_dir));
    }

    let pb = if config.quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(notes.len() as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)",
            )
            .wrap_err("Invalid progress bar template")?
            .progress_chars("=>-"),
        );
        bar
    };

    let mut summary = ExportSummary {
        read,
        skipped,
        ..Default::default()
    };

    for (note, stem) in notes.iter().zip(&stems) {
        let path = utils::note_path(config, stem);
        match export_note(note, &path) {
            Ok(()) => {
                if config.verbose {
                    pb.println(format!("Created:  {}.md", stem));
                }
                summary.written.push(path);
            }
            Err(error) => {
                pb.suspend(|| warn!("Error [{}.md]: {:#}", stem, error));
                summary.failures.push(WriteFailure { path, error });
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();

    if !config.quiet {
        for line in summary.report_lines() {
            println!("{}", line);
        }
    }

    Ok(summary)
}

/// Final filename stem for every note, in input order.
fn allocate_filenames(notes: &[Note]) -> Vec<String> {
    let candidates: Vec<_> = notes
        .iter()
        .map(|note| {
            let candidate = derive_title(&note.content).unwrap_or_else(|| {
                warn!(
                    "No usable title in note created {}, using {:?}",
                    note.created_at, UNTITLED
                );
                UNTITLED.to_string()
            });
            (candidate, note.created_at)
        })
        .collect();
    deduplicate(&candidates)
}

/// Write one note to a new file at `path`. An existing file is never
/// replaced, and a file that fails half-way is removed again.
fn export_note(note: &Note, path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .wrap_err_with(|| format!("Failed to create: {}", path.display()))?;

    if let Err(e) = write_note_file(file, note) {
        let _ = fs::remove_file(path);
        return Err(e).wrap_err_with(|| format!("Failed to write: {}", path.display()));
    }
    Ok(())
}

fn write_note_file(file: File, note: &Note) -> std::io::Result<()> {
    let mut writer = BufWriter::new(file);
    renderer::write_note_markdown(&mut writer, note)?;
    // into_inner flushes; the error keeps the flush failure
    let file = writer.into_inner().map_err(IntoInnerError::into_error)?;
    utils::set_modified_time(&file, &note.created_at)
}
