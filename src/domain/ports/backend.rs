//! Shared failure type for outbound capability calls.

use thiserror::Error;

/// Error types for calls to external capabilities (judging backend,
/// hypothesis generator, archive, review workflow).
///
/// These are always recovered locally -- a failed judging call becomes a
/// zero verdict, a failed proposal is dropped, a failed archive write is
/// logged and swallowed -- so they never cross the pipeline's public
/// surface.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("Backend timed out after {0}s")]
    Timeout(u64),

    #[error("Backend returned malformed output: {0}")]
    Malformed(String),

    #[error("Backend quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}
