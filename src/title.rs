//! Deriving a readable base filename from a note's body text.

/// Upper bound on a derived title, in characters.
pub const MAX_TITLE_CHARS: usize = 80;

/// Upper bound on a derived title, in UTF-8 bytes. Filesystems limit names to
/// 255 bytes; this leaves room for a collision suffix and the extension.
pub const MAX_TITLE_BYTES: usize = 200;

/// Device names Windows reserves regardless of extension.
const RESERVED_STEMS: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Fallback name for notes whose body yields no usable title.
pub const UNTITLED: &str = "Untitled";

/// Candidate base filename for a note body: no extension, not unique.
pub fn derive_candidate(body: &str) -> String {
    derive_title(body).unwrap_or_else(|| UNTITLED.to_string())
}

/// Title taken from the first line of `body` that still has readable text
/// after lead-in markup and illegal characters are removed.
pub fn derive_title(body: &str) -> Option<String> {
    body.lines().find_map(title_from_line)
}

fn title_from_line(line: &str) -> Option<String> {
    let seed = first_sentence(strip_lead_in(line));
    let cleaned = sanitize(seed);
    if !cleaned.chars().any(char::is_alphanumeric) {
        return None;
    }
    Some(truncate_at_word(
        &avoid_reserved(cleaned),
        MAX_TITLE_CHARS,
        MAX_TITLE_BYTES,
    ))
}

/// Prefix `_` to titles whose stem is a reserved Windows device name, e.g.
/// `con` or `NUL.txt`.
fn avoid_reserved(title: String) -> String {
    let stem = title.split('.').next().unwrap_or_default().trim_end();
    if RESERVED_STEMS
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(stem))
    {
        format!("_{}", title)
    } else {
        title
    }
}

/// Remove Markdown headings, quotes, bullets, ordinals and task boxes from
/// the start of a line, however deeply they are nested.
fn strip_lead_in(line: &str) -> &str {
    let mut rest = line.trim_start();
    loop {
        let next = if rest.starts_with('#') {
            rest.trim_start_matches('#')
        } else if let Some(after) = rest.strip_prefix('>') {
            after
        } else if let Some(after) = strip_bullet(rest)
            .or_else(|| strip_ordinal(rest))
            .or_else(|| strip_checkbox(rest))
        {
            after
        } else {
            return rest;
        };
        rest = next.trim_start();
    }
}

fn strip_bullet(s: &str) -> Option<&str> {
    let after = s.strip_prefix(['-', '*', '+'])?;
    after.starts_with(char::is_whitespace).then_some(after)
}

fn strip_ordinal(s: &str) -> Option<&str> {
    let digits = s.len() - s.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    let after = s[digits..].strip_prefix(['.', ')'])?;
    after.starts_with(char::is_whitespace).then_some(after)
}

fn strip_checkbox(s: &str) -> Option<&str> {
    let after = ["[ ]", "[x]", "[X]"]
        .iter()
        .find_map(|marker| s.strip_prefix(marker))?;
    (after.is_empty() || after.starts_with(char::is_whitespace)).then_some(after)
}

/// A line longer than the cap is cut after its first sentence, provided that
/// sentence ends before the cap.
fn first_sentence(line: &str) -> &str {
    if line.chars().count() <= MAX_TITLE_CHARS {
        return line;
    }
    let mut chars = line.char_indices().take(MAX_TITLE_CHARS).peekable();
    while let Some((idx, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?')
            && chars.peek().is_some_and(|&(_, next)| next.is_whitespace())
        {
            return &line[..idx + c.len_utf8()];
        }
    }
    line
}

/// Map characters that are illegal on common filesystems (or that break
/// Obsidian wiki links) to safe ones, then normalise whitespace.
fn sanitize(seed: &str) -> String {
    let mapped: String = seed
        .chars()
        .map(|c| match c {
            ':' | '/' | '\\' => '-',
            '*' | '?' | '"' | '<' | '>' | '|' | '#' | '[' | ']' | '^' => ' ',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect();
    let collapsed = mapped.split_whitespace().collect::<Vec<_>>().join(" ");
    // Leading dots hide files; trailing dots and spaces are stripped by Windows.
    collapsed
        .trim_matches(|c: char| c == '.' || c.is_whitespace())
        .to_string()
}

fn truncate_at_word(title: &str, max_chars: usize, max_bytes: usize) -> String {
    let char_cut = title
        .char_indices()
        .nth(max_chars)
        .map_or(title.len(), |(idx, _)| idx);
    let mut cut = char_cut.min(max_bytes);
    while !title.is_char_boundary(cut) {
        cut -= 1;
    }
    if cut == title.len() {
        return title.to_string();
    }
    let mut head = &title[..cut];
    if !title[cut..].starts_with(char::is_whitespace)
        && let Some(space) = head.rfind(char::is_whitespace)
        && space > 0
    {
        head = &head[..space];
    }
    head.trim_end_matches(|c: char| c == '.' || c.is_whitespace())
        .to_string()
}
