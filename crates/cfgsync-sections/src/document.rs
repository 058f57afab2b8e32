//! In-memory configuration documents

use cfgsync_fs::{NormalizedPath, io};

/// A configuration file held as an ordered sequence of lines.
///
/// Every line keeps its terminator (`\n`, `\r\n`, or nothing for a final
/// unterminated line), so [`ConfigDocument::to_content`] reproduces the
/// original bytes exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDocument {
    name: String,
    lines: Vec<String>,
}

impl ConfigDocument {
    /// Split `content` into a document named `name`.
    ///
    /// # Example
    /// ```
    /// use cfgsync_sections::ConfigDocument;
    ///
    /// let doc = ConfigDocument::parse("config.desk.ron", "tags: [\n  \"1\",\n],\n");
    /// assert_eq!(doc.len(), 3);
    /// assert_eq!(doc.lines()[1], "  \"1\",\n");
    /// ```
    pub fn parse(name: impl Into<String>, content: &str) -> Self {
        Self {
            name: name.into(),
            lines: content.split_inclusive('\n').map(str::to_string).collect(),
        }
    }

    /// Build a document from already split lines.
    pub fn from_lines(name: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            name: name.into(),
            lines,
        }
    }

    /// Read `<dir>/<name>` from disk.
    pub fn load(dir: &NormalizedPath, name: &str) -> crate::Result<Self> {
        let content = io::read_text(&dir.join(name))?;
        Ok(Self::parse(name, &content))
    }

    /// The file name identifying this document.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// A new document with the same name and different lines.
    pub fn with_lines(&self, lines: Vec<String>) -> Self {
        Self {
            name: self.name.clone(),
            lines,
        }
    }

    /// Join the lines back into file content.
    pub fn to_content(&self) -> String {
        self.lines.concat()
    }

    /// The line terminator this document uses.
    ///
    /// Taken from the first terminated line; documents without any newline
    /// default to `\n`.
    pub fn line_ending(&self) -> &'static str {
        match self.lines.iter().find(|line| line.ends_with('\n')) {
            Some(line) if line.ends_with("\r\n") => "\r\n",
            _ => "\n",
        }
    }
}

/// A line without its terminator.
pub fn strip_terminator(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
}
