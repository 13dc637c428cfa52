use core::fmt;
use core::str::FromStr;
use std::path::Path;

use crate::constants::{PLAYREADY_SIGNATURES, WIDEVINE_SIGNATURES};
use crate::error::ParseError;
use crate::utils::eq_ignore_ascii_case;

/**
    DRM scheme a device file belongs to.
    Determines which set of layouts the resolver tries.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeviceFamily {
    PlayReady,
    Widevine,
}

impl DeviceFamily {
    pub const fn from_name(name: &[u8]) -> Option<Self> {
        let name = name.trim_ascii();
        match name.len() {
            8 if eq_ignore_ascii_case(name, b"widevine") => Some(Self::Widevine),
            9 if eq_ignore_ascii_case(name, b"playready") => Some(Self::PlayReady),
            _ => None,
        }
    }

    pub const fn to_name(self) -> &'static str {
        match self {
            Self::PlayReady => "PlayReady",
            Self::Widevine => "Widevine",
        }
    }

    /**
        Signature tags accepted at offset 0 of this family's device files.
    */
    pub const fn signatures(self) -> &'static [&'static [u8]] {
        match self {
            Self::PlayReady => PLAYREADY_SIGNATURES,
            Self::Widevine => WIDEVINE_SIGNATURES,
        }
    }
}

impl fmt::Display for DeviceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_name())
    }
}

impl FromStr for DeviceFamily {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s.as_bytes()).ok_or_else(|| ParseError::new("device family", s))
    }
}

/**
    Kind of credential file, as detected from its extension.

    Extension mapping (case-insensitive):
    - `.prd`, `.dat`, `.bin` → PlayReady device
    - `.wvd`                 → Widevine device
    - `.kbox`, `.keybox`     → 128-byte keybox
    - `.xml`                 → keybox attestation bundle
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    PlayReady,
    Widevine,
    Keybox,
    KeyboxBundle,
    Unknown,
}

impl FileKind {
    pub const fn from_extension(ext: &[u8]) -> Self {
        let ext = ext.trim_ascii();
        match ext.len() {
            3 if eq_ignore_ascii_case(ext, b"prd") => Self::PlayReady,
            3 if eq_ignore_ascii_case(ext, b"dat") => Self::PlayReady,
            3 if eq_ignore_ascii_case(ext, b"bin") => Self::PlayReady,
            3 if eq_ignore_ascii_case(ext, b"wvd") => Self::Widevine,
            3 if eq_ignore_ascii_case(ext, b"xml") => Self::KeyboxBundle,
            4 if eq_ignore_ascii_case(ext, b"kbox") => Self::Keybox,
            6 if eq_ignore_ascii_case(ext, b"keybox") => Self::Keybox,
            _ => Self::Unknown,
        }
    }

    /**
        Classify a path by its extension. Paths without an extension are `Unknown`.
    */
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .map(|ext| Self::from_extension(ext.as_encoded_bytes()))
            .unwrap_or(Self::Unknown)
    }

    pub const fn from_name(name: &[u8]) -> Option<Self> {
        let name = name.trim_ascii();
        match name.len() {
            6 if eq_ignore_ascii_case(name, b"keybox") => Some(Self::Keybox),
            7 if eq_ignore_ascii_case(name, b"unknown") => Some(Self::Unknown),
            8 if eq_ignore_ascii_case(name, b"widevine") => Some(Self::Widevine),
            9 if eq_ignore_ascii_case(name, b"playready") => Some(Self::PlayReady),
            13 if eq_ignore_ascii_case(name, b"keybox-bundle") => Some(Self::KeyboxBundle),
            13 if eq_ignore_ascii_case(name, b"keybox_bundle") => Some(Self::KeyboxBundle),
            13 if eq_ignore_ascii_case(name, b"keybox bundle") => Some(Self::KeyboxBundle),
            _ => None,
        }
    }

    pub const fn to_name(self) -> &'static str {
        match self {
            Self::PlayReady => "PlayReady",
            Self::Widevine => "Widevine",
            Self::Keybox => "Keybox",
            Self::KeyboxBundle => "Keybox Bundle",
            Self::Unknown => "Unknown",
        }
    }

    /**
        Device family for kinds handled by the layout resolver.
    */
    pub const fn family(self) -> Option<DeviceFamily> {
        match self {
            Self::PlayReady => Some(DeviceFamily::PlayReady),
            Self::Widevine => Some(DeviceFamily::Widevine),
            _ => None,
        }
    }
}

impl From<DeviceFamily> for FileKind {
    fn from(family: DeviceFamily) -> Self {
        match family {
            DeviceFamily::PlayReady => Self::PlayReady,
            DeviceFamily::Widevine => Self::Widevine,
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_name())
    }
}

impl FromStr for FileKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s.as_bytes()).ok_or_else(|| ParseError::new("file kind", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_by_extension() {
        assert_eq!(FileKind::from_path("device.prd"), FileKind::PlayReady);
        assert_eq!(FileKind::from_path("device.dat"), FileKind::PlayReady);
        assert_eq!(FileKind::from_path("dir/device.bin"), FileKind::PlayReady);
        assert_eq!(FileKind::from_path("device.wvd"), FileKind::Widevine);
        assert_eq!(FileKind::from_path("keybox.kbox"), FileKind::Keybox);
        assert_eq!(FileKind::from_path("attest.xml"), FileKind::KeyboxBundle);
    }

    #[test]
    fn classify_is_case_insensitive() {
        assert_eq!(FileKind::from_path("DEVICE.PRD"), FileKind::PlayReady);
        assert_eq!(FileKind::from_path("Device.Wvd"), FileKind::Widevine);
    }

    #[test]
    fn classify_unknown() {
        assert_eq!(FileKind::from_path("notes.txt"), FileKind::Unknown);
        assert_eq!(FileKind::from_path("no_extension"), FileKind::Unknown);
        assert_eq!(FileKind::from_path(".prd"), FileKind::Unknown);
    }

    #[test]
    fn family_of_kind() {
        assert_eq!(FileKind::PlayReady.family(), Some(DeviceFamily::PlayReady));
        assert_eq!(FileKind::Widevine.family(), Some(DeviceFamily::Widevine));
        assert_eq!(FileKind::Keybox.family(), None);
        assert_eq!(FileKind::KeyboxBundle.family(), None);
        assert_eq!(FileKind::Unknown.family(), None);
    }

    #[test]
    fn family_signatures() {
        assert_eq!(
            DeviceFamily::PlayReady.signatures(),
            &[&b"PRD"[..], &b"PRK"[..]]
        );
        assert_eq!(DeviceFamily::Widevine.signatures(), &[&b"WVD"[..]]);
    }

    #[test]
    fn file_kind_from_str() {
        assert_eq!("playready".parse::<FileKind>().unwrap(), FileKind::PlayReady);
        assert_eq!(" Keybox ".parse::<FileKind>().unwrap(), FileKind::Keybox);
        assert_eq!(
            "keybox-bundle".parse::<FileKind>().unwrap(),
            FileKind::KeyboxBundle
        );
        let err = "fairplay".parse::<FileKind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown file kind 'fairplay'");
    }

    #[test]
    fn device_family_name_round_trip() {
        for family in [DeviceFamily::PlayReady, DeviceFamily::Widevine] {
            assert_eq!(DeviceFamily::from_name(family.to_name().as_bytes()), Some(family));
            assert_eq!(FileKind::from(family).family(), Some(family));
        }
    }
}
