//! Fatal conversion errors.
//!
//! Anything recoverable (degenerate nodes, unsupported styling) is reported
//! as a [`Diagnostic`](crate::context::Diagnostic) instead and never lands here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    /// The input is not valid JSON or doesn't match the document shape.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The document root isn't an artboard.
    #[error("Invalid root: expected an artboard, found `{found}`")]
    InvalidRoot { found: String },

    /// Canvas dimensions the pipeline doesn't handle.
    #[error("Unsupported canvas size {width}x{height}")]
    UnsupportedCanvas { width: f32, height: f32 },

    /// An internal invariant broke. Signals a gap in the layout heuristics,
    /// not bad input; the whole conversion is aborted.
    #[error("Invariant violated at {node}: {message}")]
    Invariant { node: String, message: String },
}

impl ConvertError {
    pub(crate) fn invariant(node: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invariant {
            node: node.into(),
            message: message.into(),
        }
    }
}

pub type Result<T, E = ConvertError> = std::result::Result<T, E>;
