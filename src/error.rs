//! Unified error handling for chatterd.
//!
//! The dispatch/registry core has no fatal error path: load failures roll
//! back and are returned to the caller, handler faults are caught and
//! logged, resolution misses silently fall back to raw ids.

use chatter_api::ClientError;
use thiserror::Error;

/// Errors from loading a command module.
///
/// A failed load never changes observable registry state and never crashes
/// the dispatch loop; the error value is returned to whoever requested the
/// load.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unknown module: {0}")]
    UnknownModule(String),

    #[error("module {module} failed to produce commands: {source}")]
    Module {
        module: String,
        #[source]
        source: anyhow::Error,
    },

    /// The engine task is gone; marshaled requests can no longer be served.
    #[error("engine is not running")]
    EngineStopped,
}

/// Any fault escaping a command handler.
///
/// Caught per-command during dispatch, logged with the offending event, and
/// never allowed to abort the remaining commands for that event.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("send failed: {0}")]
    Send(#[from] ClientError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type for command handlers.
pub type HandlerResult = Result<(), HandlerError>;
