//! Copying a section body out of the active document.

use crate::document::ConfigDocument;
use crate::error::{Error, Result};
use crate::locator::locate;

/// Return the body lines of `section`, terminators included.
///
/// A missing section yields an empty body: variants may legitimately omit
/// optional sections. An unterminated section is an error.
///
/// # Example
/// ```
/// use cfgsync_sections::{ConfigDocument, extract};
///
/// let doc = ConfigDocument::parse("a", "keybind: [\n  A\n  B\n],\n");
/// assert_eq!(extract(&doc, "keybind").unwrap(), vec!["  A\n", "  B\n"]);
/// assert!(extract(&doc, "tags").unwrap().is_empty());
/// ```
pub fn extract(document: &ConfigDocument, section: &str) -> Result<Vec<String>> {
    match locate(document, section) {
        Ok(found) => Ok(document.lines()[found.range()].to_vec()),
        Err(Error::SectionNotFound { .. }) => {
            tracing::debug!(
                document = document.name(),
                section,
                "section absent, nothing to extract"
            );
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}
