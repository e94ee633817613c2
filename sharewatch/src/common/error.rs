//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! ループ内のエラーはすべて `ProbeError` としてステップ単位で捕捉され、
//! プロジェクト・ステップ情報付きでログ出力される。

use std::time::Duration;

use thiserror::Error;

use super::types::Project;

/// probe error type
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Database or network transport failure
    #[error("Connection error: {0}")]
    Connection(String),

    /// No distributor row for the project (aggregate returned NULL)
    #[error("No distributor data found for project: {project}")]
    NotFound {
        /// Project whose distributor row was missing
        project: Project,
    },

    /// Query failed to execute
    #[error("Query error: {0}")]
    Query(String),

    /// Row could not be decoded as an epoch number
    #[error("Scan error: {0}")]
    Scan(String),

    /// Pushgateway rejected or never received the metric
    #[error("Publish error: {0}")]
    Publish(String),

    /// Deadline exceeded
    #[error("Timeout error: {operation} did not finish within {after:?}")]
    Timeout {
        /// Operation that timed out
        operation: &'static str,
        /// Configured deadline
        after: Duration,
    },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ProbeError {
    /// Returns a stable short label for log fields and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connection(_) => "connection",
            Self::NotFound { .. } => "not_found",
            Self::Query(_) => "query",
            Self::Scan(_) => "scan",
            Self::Publish(_) => "publish",
            Self::Timeout { .. } => "timeout",
            Self::Config(_) => "config",
        }
    }

    /// Classifies a sqlx error raised while running a query.
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Self::Connection(err.to_string()),
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                Self::Scan(err.to_string())
            }
            other => Self::Query(other.to_string()),
        }
    }
}

/// Result type alias (probe)
pub type ProbeResult<T> = Result<T, ProbeError>;
