//! Cross-document validation of merged sections.
//!
//! This is a content-equality check: after merging, every tracked section of
//! every candidate must be byte-identical to the same section of the active
//! document. It does not check the configuration syntax.

use std::fmt;

use serde::Serialize;

use crate::document::{ConfigDocument, strip_terminator};
use crate::locator::locate;

/// First divergence between a candidate's section and the active one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Candidate file name.
    pub file: String,
    pub section: String,
    /// 0-based line index in the candidate document.
    pub line: usize,
    /// Active content at this position; `None` when the active body is shorter.
    pub expected: Option<String>,
    /// Candidate content at this position; `None` when the candidate body is shorter.
    pub actual: Option<String>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |value: &Option<String>| match value {
            Some(line) => format!("{:?}", strip_terminator(line)),
            None => "<end of section>".to_string(),
        };
        write!(
            f,
            "{}:{} [{}] expected {}, found {}",
            self.file,
            self.line + 1,
            self.section,
            show(&self.expected),
            show(&self.actual)
        )
    }
}

/// Compare one section of `candidate` against `active`.
///
/// Returns the first differing line, or `None` when both bodies are equal.
/// When the section cannot be located in either document there is nothing to
/// compare and `None` is returned; such pairs are reported during merging.
pub fn validate_section(
    active: &ConfigDocument,
    candidate: &ConfigDocument,
    section: &str,
) -> Option<ValidationError> {
    let (expected, actual) = match (locate(active, section), locate(candidate, section)) {
        (Ok(expected), Ok(actual)) => (expected, actual),
        (expected, actual) => {
            tracing::debug!(
                candidate = candidate.name(),
                section,
                active_located = expected.is_ok(),
                candidate_located = actual.is_ok(),
                "section not comparable, skipping"
            );
            return None;
        }
    };

    let expected_lines = &active.lines()[expected.range()];
    let actual_lines = &candidate.lines()[actual.range()];

    for offset in 0..expected_lines.len().max(actual_lines.len()) {
        let want = expected_lines.get(offset);
        let got = actual_lines.get(offset);
        if want != got {
            let error = ValidationError {
                file: candidate.name().to_string(),
                section: section.to_string(),
                line: actual.start + offset,
                expected: want.cloned(),
                actual: got.cloned(),
            };
            tracing::warn!(%error, "merged section diverges from active");
            return Some(error);
        }
    }

    None
}

/// Validate every tracked section of every candidate against `active`.
///
/// At most one error is produced per (candidate, section) pair. The merge is
/// valid iff the returned list is empty.
pub fn validate_all<'a>(
    active: &ConfigDocument,
    candidates: impl IntoIterator<Item = &'a ConfigDocument>,
    sections: &[String],
) -> Vec<ValidationError> {
    let candidates: Vec<&ConfigDocument> = candidates.into_iter().collect();
    let mut errors = Vec::new();

    for section in sections {
        for candidate in &candidates {
            if candidate.name() == active.name() {
                continue;
            }
            if let Some(error) = validate_section(active, candidate, section) {
                errors.push(error);
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(name: &str, content: &str) -> ConfigDocument {
        ConfigDocument::parse(name, content)
    }

    #[test]
    fn equal_sections_validate() {
        let active = doc("a", "keybind: [\n  A\n  B\n],\n");
        let candidate = doc("b", "(\n  keybind: [\n  A\n  B\n  ],\n)\n");
        assert_eq!(validate_section(&active, &candidate, "keybind"), None);
    }

    #[test]
    fn first_difference_is_reported_once() {
        let active = doc("a", "tags: [\n  1\n  2\n  3\n],\n");
        let candidate = doc("b", "x\ntags: [\n  1\n  9\n  8\n],\n");
        let error = validate_section(&active, &candidate, "tags").unwrap();
        assert_eq!(error.line, 3);
        assert_eq!(error.expected.as_deref(), Some("  2\n"));
        assert_eq!(error.actual.as_deref(), Some("  9\n"));
    }

    #[test]
    fn shorter_candidate_is_reported() {
        let active = doc("a", "tags: [\n  1\n  2\n],\n");
        let candidate = doc("b", "tags: [\n  1\n],\n");
        let error = validate_section(&active, &candidate, "tags").unwrap();
        assert_eq!(error.line, 2);
        assert_eq!(error.expected.as_deref(), Some("  2\n"));
        assert_eq!(error.actual, None);
    }

    #[test]
    fn longer_candidate_is_reported() {
        let active = doc("a", "tags: [\n  1\n],\n");
        let candidate = doc("b", "tags: [\n  1\n  2\n],\n");
        let error = validate_section(&active, &candidate, "tags").unwrap();
        assert_eq!(error.expected, None);
        assert_eq!(error.actual.as_deref(), Some("  2\n"));
    }

    #[test]
    fn missing_section_is_not_compared() {
        let active = doc("a", "tags: [\n  1\n],\n");
        let candidate = doc("b", "keybind: [\n],\n");
        assert_eq!(validate_section(&active, &candidate, "tags"), None);
    }

    #[test]
    fn active_document_is_skipped_in_validate_all() {
        let active = doc("a", "tags: [\n  1\n],\n");
        let errors = validate_all(&active, [&active], &["tags".to_string()]);
        assert!(errors.is_empty());
    }

    #[test]
    fn display_is_one_based() {
        let error = ValidationError {
            file: "config.b.ron".into(),
            section: "tags".into(),
            line: 4,
            expected: Some("  1\n".into()),
            actual: None,
        };
        assert_eq!(
            error.to_string(),
            "config.b.ron:5 [tags] expected \"  1\", found <end of section>"
        );
    }
}
