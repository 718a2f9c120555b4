//! Port abstraction for the append-only match log.

use async_trait::async_trait;

use crate::domain::match_record::MatchRecord;

/// Failures raised by match log adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchLogError {
    /// Append failed during execution.
    #[error("match log append failed: {message}")]
    Append { message: String },
}

/// Driven port recording confirmed matches. Append-only: no in-scope
/// operation reads the log back.
#[async_trait]
pub trait MatchLog: Send + Sync {
    /// Append one record for a confirmed match.
    async fn append(&self, record: MatchRecord) -> Result<(), MatchLogError>;
}
