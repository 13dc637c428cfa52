use drm_core::{DeviceFamily, FieldValue, Record};

use crate::error::{Attempt, ParseFailure};
use crate::registry;

/**
    How the version byte of a device file is treated during resolution.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionPolicy {
    /// The version byte is reported but not enforced; the first layout that
    /// parses structurally wins.
    #[default]
    Structural,
    /// The version byte must equal the version of the layout being tried.
    Strict,
}

/**
    A successfully parsed device file.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    pub family: DeviceFamily,
    /// Version of the layout that matched (not necessarily the version byte).
    pub version: u8,
    pub fields: Record,
}

impl DeviceRecord {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn bytes(&self, name: &str) -> Option<&[u8]> {
        self.get(name).and_then(FieldValue::as_bytes)
    }

    /**
        Version byte as written in the file.
    */
    pub fn declared_version(&self) -> Option<u64> {
        self.get("version").and_then(FieldValue::as_uint)
    }
}

/**
    Picks the layout a device file buffer matches.

    Layouts of the requested family are tried newest first; the first one
    that parses within bounds (and passes the signature and, when strict,
    version checks) is returned. Parsing never mutates the buffer and keeps
    no state between calls.
*/
#[derive(Debug, Clone, Copy, Default)]
pub struct Resolver {
    policy: VersionPolicy,
}

impl Resolver {
    pub const fn new() -> Self {
        Self::with_policy(VersionPolicy::Structural)
    }

    pub const fn strict() -> Self {
        Self::with_policy(VersionPolicy::Strict)
    }

    pub const fn with_policy(policy: VersionPolicy) -> Self {
        Self { policy }
    }

    pub const fn policy(&self) -> VersionPolicy {
        self.policy
    }

    pub fn resolve(
        &self,
        data: impl AsRef<[u8]>,
        family: DeviceFamily,
    ) -> Result<DeviceRecord, ParseFailure> {
        let data = data.as_ref();
        let layouts = registry::layouts(family);
        let mut attempts = Vec::with_capacity(layouts.len());

        for layout in layouts {
            match layout.parse(data, self.policy) {
                Ok(fields) => {
                    tracing::debug!(
                        %family,
                        version = layout.version,
                        failed_attempts = attempts.len(),
                        "device layout matched"
                    );
                    return Ok(DeviceRecord {
                        family,
                        version: layout.version,
                        fields,
                    });
                }
                Err(error) => {
                    tracing::debug!(%family, version = layout.version, %error, "device layout rejected");
                    attempts.push(Attempt {
                        version: layout.version,
                        error,
                    });
                }
            }
        }

        tracing::warn!(%family, attempts = attempts.len(), len = data.len(), "no device layout matched");
        Err(ParseFailure {
            family,
            exhausted: true,
            attempts,
        })
    }
}

/**
    Resolve with the default (structural) version policy.
*/
pub fn resolve(data: impl AsRef<[u8]>, family: DeviceFamily) -> Result<DeviceRecord, ParseFailure> {
    Resolver::new().resolve(data, family)
}
