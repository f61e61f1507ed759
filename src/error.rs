use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArborError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("optimized prediction requested before optimize() was called")]
    NotOptimized,

    #[error("bad record id '{0}'")]
    BadRecordId(String),

    #[error("unsupported record version {0}")]
    UnsupportedVersion(u64),

    #[error("malformed record: {0}")]
    Malformed(String),

    #[error("tree exceeds maximum depth of {0}")]
    TooDeep(usize),

    #[error("corrupted record: {0}")]
    Corrupted(String),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ArborError {
    /// True for errors raised because a persisted record does not follow the
    /// expected layout. Corruption of an otherwise well-formed record is
    /// reported separately.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            ArborError::BadRecordId(_)
                | ArborError::UnsupportedVersion(_)
                | ArborError::Malformed(_)
                | ArborError::TooDeep(_)
        )
    }

    pub fn is_corruption(&self) -> bool {
        matches!(self, ArborError::Corrupted(_))
    }
}

pub type Result<T> = std::result::Result<T, ArborError>;
