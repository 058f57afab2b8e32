//! Splicing a section body into a target document.

use serde::{Deserialize, Serialize};

use crate::document::{ConfigDocument, strip_terminator};
use crate::error::{Error, Result};
use crate::locator::locate;

/// What to do when the target document has no such section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingSectionPolicy {
    /// Leave the document unchanged. Sync never invents structure.
    #[default]
    Skip,
    /// Add the section with its own header and closing line.
    Append,
}

/// How a merge changed the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeOutcome {
    /// The existing body was replaced; `changed` is false when it already matched.
    Replaced { changed: bool },
    /// The section did not exist and was added.
    Appended,
    /// The section did not exist and the document was left alone.
    Skipped,
}

impl MergeOutcome {
    pub fn changed(&self) -> bool {
        match self {
            Self::Replaced { changed } => *changed,
            Self::Appended => true,
            Self::Skipped => false,
        }
    }
}

/// Result of merging a section into a document.
#[derive(Debug, Clone)]
pub struct Merged {
    pub document: ConfigDocument,
    pub outcome: MergeOutcome,
}

/// Replace the body of `section` in `target` with `new_lines`.
///
/// The new document is the target's lines up to and including the header,
/// then `new_lines` verbatim, then the target's lines from the closing line
/// onward. Header and closing syntax of the target are kept as they were.
///
/// # Errors
/// `Error::UnterminatedSection` when the target's section has no closing
/// line. A missing section is handled by `policy`, never an error.
///
/// # Example
/// ```
/// use cfgsync_sections::{ConfigDocument, MissingSectionPolicy, merge};
///
/// let target = ConfigDocument::parse("b", "keybind: [\n  X\n],\n");
/// let body = vec!["  A\n".to_string(), "  B\n".to_string()];
/// let merged = merge(&target, "keybind", &body, MissingSectionPolicy::Skip).unwrap();
/// assert_eq!(merged.document.to_content(), "keybind: [\n  A\n  B\n],\n");
/// ```
pub fn merge(
    target: &ConfigDocument,
    section: &str,
    new_lines: &[String],
    policy: MissingSectionPolicy,
) -> Result<Merged> {
    let found = match locate(target, section) {
        Ok(found) => found,
        Err(Error::SectionNotFound { .. }) => {
            return Ok(merge_missing(target, section, new_lines, policy));
        }
        Err(e) => return Err(e),
    };

    let lines = target.lines();
    let changed = lines[found.range()] != *new_lines;

    let mut merged = Vec::with_capacity(lines.len() - found.len() + new_lines.len());
    merged.extend_from_slice(&lines[..found.start]);
    merged.extend_from_slice(new_lines);
    merged.extend_from_slice(&lines[found.end..]);

    tracing::debug!(
        document = target.name(),
        section,
        replaced = found.len(),
        inserted = new_lines.len(),
        changed,
        "merged section"
    );
    Ok(Merged {
        document: target.with_lines(merged),
        outcome: MergeOutcome::Replaced { changed },
    })
}

fn merge_missing(
    target: &ConfigDocument,
    section: &str,
    new_lines: &[String],
    policy: MissingSectionPolicy,
) -> Merged {
    match policy {
        MissingSectionPolicy::Skip => {
            tracing::debug!(document = target.name(), section, "section absent, skipping");
            Merged {
                document: target.clone(),
                outcome: MergeOutcome::Skipped,
            }
        }
        MissingSectionPolicy::Append => {
            tracing::debug!(document = target.name(), section, "section absent, appending");
            Merged {
                document: append_section(target, section, new_lines),
                outcome: MergeOutcome::Appended,
            }
        }
    }
}

/// Insert a complete section into a document that lacks it.
///
/// When the document ends with the closing parenthesis of a top-level struct,
/// the section goes right before it, indented by two spaces; otherwise it is
/// added at the end of the file.
fn append_section(target: &ConfigDocument, section: &str, new_lines: &[String]) -> ConfigDocument {
    let eol = target.line_ending();
    let mut lines = target.lines().to_vec();

    let struct_close = lines
        .iter()
        .rposition(|line| !strip_terminator(line).trim().is_empty())
        .filter(|&idx| strip_terminator(&lines[idx]).trim_start().starts_with(')'));

    let (at, indent) = match struct_close {
        Some(idx) => (idx, "  "),
        None => {
            if let Some(last) = lines.last_mut()
                && !last.ends_with('\n')
            {
                last.push_str(eol);
            }
            (lines.len(), "")
        }
    };

    let mut block = Vec::with_capacity(new_lines.len() + 2);
    block.push(format!("{indent}{section}: [{eol}"));
    block.extend_from_slice(new_lines);
    block.push(format!("{indent}],{eol}"));

    lines.splice(at..at, block);
    target.with_lines(lines)
}
