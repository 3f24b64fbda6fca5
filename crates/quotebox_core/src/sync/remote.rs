//! Remote collaborator contract and error envelope.

use crate::model::quote::Quote;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Remote call stage, reported in errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStage {
    Fetch,
    Append,
}

impl SyncStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Append => "append",
        }
    }
}

/// Normalized remote failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    pub source_id: String,
    pub stage: SyncStage,
    /// Stable machine-readable code, e.g. `network`, `http_status`.
    pub code: String,
    pub message: String,
    /// Whether a later attempt may succeed without user action.
    pub retryable: bool,
}

impl RemoteError {
    pub fn new(
        source_id: impl Into<String>,
        stage: SyncStage,
        code: impl Into<String>,
        message: impl Into<String>,
        retryable: bool,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            stage,
            code: code.into(),
            message: message.into(),
            retryable,
        }
    }
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "remote `{}` {} failed ({}): {}",
            self.source_id,
            self.stage.as_str(),
            self.code,
            self.message
        )
    }
}

impl Error for RemoteError {}

/// Remote holder of the authoritative quote snapshot.
///
/// Implementations return full copies; callers never observe partial state.
pub trait RemoteQuoteSource {
    /// Stable provider id (lowercase ascii, digits, `_`, `-`).
    fn source_id(&self) -> &str;

    /// Fetches the full current remote collection.
    fn fetch_all(&self) -> RemoteResult<Vec<Quote>>;

    /// Appends one record to the remote collection.
    fn append(&self, quote: &Quote) -> RemoteResult<()>;
}
