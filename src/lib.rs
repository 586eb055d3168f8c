//! # drafts-export
//!
//! A CLI tool that converts a [Drafts](https://getdrafts.com) JSON export into
//! individual Markdown files ready to drop into an [Obsidian](https://obsidian.md) vault.
//!
//! ## What it does
//!
//! Drafts can back up every draft into one `DraftsExport.json` file. This tool
//! reads that file and writes each draft as a standalone Markdown file with YAML
//! frontmatter carrying its metadata: creation and modification time, tags,
//! location, flagged status, folder, and any other field the export contained.
//! The body is written exactly as it was in Drafts.
//!
//! ## Filenames
//!
//! Each file is named after the first readable line of its draft, with Markdown
//! markers and characters that filesystems or Obsidian links reject removed.
//! When several drafts would get the same name, their creation time is
//! appended, and drafts that still clash get a sequence number. The same export
//! always produces the same filenames.
//!
//! Existing files are never overwritten; a clash with a file already in the
//! target directory is reported and the rest of the export continues.
//!
//! ## Usage
//!
//! ```sh
//! drafts-export DraftsExport.json ~/vault/Drafts
//! ```

pub mod dedup;
pub mod importer;
pub mod renderer;
pub mod sequential;
pub mod title;
pub mod utils;
