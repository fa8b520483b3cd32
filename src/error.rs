/// Failure categories surfaced by the decoder and the streaming engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedHeader,
    UnsupportedVersion,
    MissingResource,
    CorruptSection,
    InvalidUsage,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    #[error("unsupported format version {found:#06x} (newest understood {supported:#06x})")]
    UnsupportedVersion { found: u16, supported: u16 },

    #[error("missing resource: {path}")]
    MissingResource { path: String },

    #[error("corrupt section at offset {offset}: {detail}")]
    CorruptSection { offset: usize, detail: String },

    #[error("invalid usage: {0}")]
    InvalidUsage(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedHeader(_) => ErrorKind::MalformedHeader,
            Self::UnsupportedVersion { .. } => ErrorKind::UnsupportedVersion,
            Self::MissingResource { .. } => ErrorKind::MissingResource,
            Self::CorruptSection { .. } => ErrorKind::CorruptSection,
            Self::InvalidUsage(_) => ErrorKind::InvalidUsage,
        }
    }

    pub(crate) fn corrupt(offset: usize, detail: impl Into<String>) -> Self {
        Self::CorruptSection { offset, detail: detail.into() }
    }

    pub(crate) fn missing(path: impl Into<String>) -> Self {
        Self::MissingResource { path: path.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
