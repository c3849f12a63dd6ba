//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while reading collapsed stack samples
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("I/O error reading {origin}: {source}")]
    Io {
        origin: String,
        source: std::io::Error,
    },

    #[error("Malformed line {line_number}: {reason} (line: {line:?})")]
    MalformedLine {
        line_number: usize,
        line: String,
        reason: MalformedReason,
    },

    #[error(transparent)]
    CountOverflow(#[from] CountOverflow),
}

impl ParseError {
    /// Line number (1-based) of the offending line, if this is a parse failure
    pub fn line_number(&self) -> Option<usize> {
        match self {
            ParseError::MalformedLine { line_number, .. } => Some(*line_number),
            ParseError::Io { .. } | ParseError::CountOverflow(_) => None,
        }
    }
}

/// Why a collapsed stack line was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    #[error("missing sample count")]
    MissingCount,

    #[error("invalid sample count {0:?}")]
    InvalidCount(String),

    #[error("sample count must be positive")]
    ZeroCount,

    #[error("stack has no frames")]
    EmptyStack,

    #[error("empty frame at position {position}")]
    EmptyFrame { position: usize },

    #[error("line is not valid UTF-8")]
    InvalidEncoding,

    #[error("sample counts of the file exceed {}", u64::MAX)]
    TotalOverflow,
}

/// Sample counts whose sum no longer fits in a `u64`
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("sample count overflow: {total} + {count} exceeds {}", u64::MAX)]
pub struct CountOverflow {
    pub total: u64,
    pub count: u64,
}

/// Errors that can occur during flamegraph generation
#[derive(Error, Debug)]
pub enum FlamegraphError {
    #[error("Failed to render flamegraph: {0}")]
    RenderFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
