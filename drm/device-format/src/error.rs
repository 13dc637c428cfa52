use thiserror::Error;

use drm_core::{DeviceFamily, ReadError};

/**
    Why a single layout attempt failed.

    All variants are recoverable from the resolver's point of view: the
    attempt is discarded and the next (older) layout is tried.
*/
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("field `{field}`: {source}")]
    OutOfBounds {
        field: &'static str,
        #[source]
        source: ReadError,
    },

    #[error("signature mismatch: expected {expected}, found {found:?}")]
    SignatureMismatch { expected: String, found: String },

    #[error("version mismatch: layout is v{expected}, file declares v{found}")]
    VersionMismatch { expected: u8, found: u8 },

    #[error("field `{field}` takes its length from `{length_field}`, which is not an earlier integer field")]
    UnknownLengthField {
        field: &'static str,
        length_field: &'static str,
    },
}

/**
    One failed layout attempt, kept for diagnostics.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub version: u8,
    pub error: FormatError,
}

/**
    Every known layout of a family was tried and none matched.
*/
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no {family} device layout matched: {}", describe_attempts(.attempts))]
pub struct ParseFailure {
    pub family: DeviceFamily,
    /// All layouts of the family were attempted.
    pub exhausted: bool,
    /// Per-version failure reasons, in the order the layouts were tried.
    pub attempts: Vec<Attempt>,
}

fn describe_attempts(attempts: &[Attempt]) -> String {
    if attempts.is_empty() {
        return "no layouts registered".to_owned();
    }
    attempts
        .iter()
        .map(|a| format!("v{}: {}", a.version, a.error))
        .collect::<Vec<_>>()
        .join("; ")
}
