//! Error types for cfgsync-sections

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Filesystem error: {0}")]
    Fs(#[from] cfgsync_fs::Error),

    #[error("Section '{section}' not found")]
    SectionNotFound { section: String },

    #[error("Section '{section}' opened at line {} is never closed", .header + 1)]
    UnterminatedSection { section: String, header: usize },

    #[error("Invalid section name '{name}': use letters, digits, '_' or '-'")]
    InvalidSectionName { name: String },

    #[error("Header pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

impl Error {
    /// Whether this error only means the section is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::SectionNotFound { .. })
    }
}
