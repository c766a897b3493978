use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid output document: {}", .0.join("; "))]
    InvalidDocument(Vec<String>),
}

/// Row, date and number level failures. Only `MissingHeader` and `MalformedRow`
/// abort a run; the others are tolerated by the stages that produce them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("CSV input has no header row")]
    MissingHeader,

    #[error("malformed CSV at line {line}: {message}")]
    MalformedRow { line: u64, message: String },

    #[error("invalid date '{0}', expected DD/MM/YYYY")]
    Date(String),

    #[error("invalid monetary value '{0}'")]
    Money(String),

    #[error("invalid integer '{0}'")]
    Integer(String),
}

impl From<csv::Error> for ParseError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        ParseError::MalformedRow {
            line,
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
