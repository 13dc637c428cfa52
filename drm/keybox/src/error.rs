use std::path::PathBuf;

use thiserror::Error;

/**
    Errors from keybox and keybox bundle handling.

    Checksum mismatches and metadata decryption problems are not errors:
    they are reported as fields of the parsed [`Keybox`](crate::Keybox).
*/
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyboxError {
    // ── Keybox record ─────────────────────────────────────────────────
    #[error("keybox must be exactly {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    // ── AES ───────────────────────────────────────────────────────────
    #[error("invalid AES-128 key length {0}")]
    InvalidKeyLength(usize),

    // ── I/O ───────────────────────────────────────────────────────────
    #[error("failed to read {}: {reason}", path.display())]
    Io { path: PathBuf, reason: String },
}

impl KeyboxError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            reason: err.to_string(),
        }
    }
}

/**
    Type alias for results that may return a [`KeyboxError`].
*/
pub type KeyboxResult<T> = std::result::Result<T, KeyboxError>;
