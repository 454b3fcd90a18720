pub mod python;
pub mod types;

use crate::retry::{transient_message, ClassifyError, ErrorClass};
use std::path::Path;
use thiserror::Error;

pub use types::{EngineDiag, RawLine, RecognizeIn, RecognizeOut, TextCandidate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Known transient (timeouts, transport hiccups); worth retrying.
    Transient,
    /// Retrying cannot help.
    Permanent,
    /// Opaque failure; classified by message content.
    Unknown,
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct EngineError {
    pub kind: ErrorKind,
    pub message: String,
}

impl EngineError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Transient,
            message: message.into(),
        }
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Permanent,
            message: message.into(),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Unknown,
            message: message.into(),
        }
    }
}

impl ClassifyError for EngineError {
    fn class(&self) -> ErrorClass {
        match self.kind {
            ErrorKind::Transient => ErrorClass::Transient,
            ErrorKind::Permanent => ErrorClass::Permanent,
            ErrorKind::Unknown => {
                if transient_message(&self.message) {
                    ErrorClass::Transient
                } else {
                    ErrorClass::Permanent
                }
            }
        }
    }
}

/// The external OCR capability. Recognition is synchronous and potentially
/// slow; lines come back with candidates ordered best-first.
pub trait OcrEngine {
    fn doctor(&self) -> anyhow::Result<EngineDiag>;
    fn recognize(&self, image: &Path) -> Result<Vec<RawLine>, EngineError>;
}
