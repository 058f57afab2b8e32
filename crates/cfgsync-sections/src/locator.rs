//! Section bounds detection.
//!
//! A section starts on the line after its header and ends before the first
//! later line that trims to `],`:
//! ```text
//!   keybind: [
//!     (command: Execute, value: "st", modifier: ["modkey"], key: "Return"),
//!   ],
//! ```

use std::ops::Range;

use regex::Regex;
use serde::Serialize;

use crate::document::{ConfigDocument, strip_terminator};
use crate::error::{Error, Result};

/// Token a closing line consists of, after trimming.
const CLOSING_TOKEN: &str = "],";

/// Bounds of a located section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    /// Index of the header line.
    pub header: usize,
    /// First body line (always `header + 1`).
    pub start: usize,
    /// Exclusive end of the body; also the index of the closing line.
    pub end: usize,
}

impl Section {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Presence of a section in a document, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum SectionStatus {
    Present { header: usize, lines: usize },
    Absent,
    Unterminated { header: usize },
}

/// Check that `name` is usable as a section name.
///
/// Names are restricted to ASCII letters, digits, `_` and `-`.
pub fn validate_section_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidSectionName {
            name: name.to_string(),
        })
    }
}

fn header_pattern(section: &str) -> Result<Regex> {
    validate_section_name(section)?;
    let pattern = format!(r"^\s*{}: \[\s*$", regex::escape(section));
    Ok(Regex::new(&pattern)?)
}

fn is_closing_line(line: &str) -> bool {
    strip_terminator(line).trim() == CLOSING_TOKEN
}

/// Locate the body of `section` in `document`.
///
/// The header must match the whole line, so `keybind_mode: [` or a comment
/// mentioning `keybind: [` never count as the `keybind` header.
///
/// # Errors
/// - `Error::SectionNotFound` when no header line exists
/// - `Error::UnterminatedSection` when no closing line follows the header
/// - `Error::InvalidSectionName` for names outside `[A-Za-z0-9_-]`
///
/// # Example
/// ```
/// use cfgsync_sections::{ConfigDocument, locate};
///
/// let doc = ConfigDocument::parse("a", "(\n  tags: [\n    \"1\",\n  ],\n)\n");
/// let section = locate(&doc, "tags").unwrap();
/// assert_eq!((section.header, section.start, section.end), (1, 2, 3));
/// ```
pub fn locate(document: &ConfigDocument, section: &str) -> Result<Section> {
    let pattern = header_pattern(section)?;
    let lines = document.lines();

    let header = lines
        .iter()
        .position(|line| pattern.is_match(strip_terminator(line)))
        .ok_or_else(|| Error::SectionNotFound {
            section: section.to_string(),
        })?;

    let start = header + 1;
    let end = lines[start..]
        .iter()
        .position(|line| is_closing_line(line))
        .map(|offset| start + offset)
        .ok_or_else(|| Error::UnterminatedSection {
            section: section.to_string(),
            header,
        })?;

    tracing::debug!(
        document = document.name(),
        section,
        header,
        start,
        end,
        "located section"
    );
    Ok(Section { header, start, end })
}

/// Like [`locate`], folding the outcome into a [`SectionStatus`].
pub fn probe(document: &ConfigDocument, section: &str) -> Result<SectionStatus> {
    match locate(document, section) {
        Ok(found) => Ok(SectionStatus::Present {
            header: found.header,
            lines: found.len(),
        }),
        Err(Error::SectionNotFound { .. }) => Ok(SectionStatus::Absent),
        Err(Error::UnterminatedSection { header, .. }) => {
            Ok(SectionStatus::Unterminated { header })
        }
        Err(e) => Err(e),
    }
}
