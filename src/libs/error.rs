/// Failures raised while reading, validating or merging integration sites.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// Malformed input line: wrong field count, non-numeric coordinate or
    /// score, unknown strand symbol
    #[error("invalid record format: {0}")]
    Format(String),

    /// A well-formed record breaks a data-model invariant
    #[error("invalid record: {0}")]
    Validation(String),

    #[error("unsupported merge mode: {0} (only median is supported)")]
    UnsupportedMode(String),

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: Box<SiteError>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SiteError {
    /// Attaches a 1-based line number to a parsing error.
    pub fn at_line(self, line: usize) -> Self {
        Self::Line {
            line,
            source: Box::new(self),
        }
    }
}
