/*!
    Widevine keybox records and keybox attestation bundles.

    - [`Keybox`]: fixed 128-byte record with CRC diagnostics and metadata decryption
    - [`RevocationChecker`]: certificate serials of an XML bundle against a revocation list
*/
#![allow(clippy::doc_overindented_list_items)]

mod constants;
mod crypto;
mod error;
mod keybox;
mod revocation;

pub use self::constants::{KEYBOX_MAGIC, KEYBOX_SIZE, METADATA_SIZE};
pub use self::error::{KeyboxError, KeyboxResult};
pub use self::keybox::{DecryptedMetadata, Keybox, ascii_render};
pub use self::revocation::{
    BundleSerials, BundleStatus, ProviderState, RevocationChecker, RevocationOutcome,
    RevocationReport, RevocationSet, RevocationSource, RevocationUnavailable,
    StaticRevocationSource, extract_serials, find_bundle, serial_from_pem,
};
