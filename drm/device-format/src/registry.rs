/*!
    Known device file layouts, newest version first within each family.

    PlayReady (`PRD`, legacy `PRK`):

    Version 3 (current):
    - group_key: 96 bytes (32B private + 64B public ECC P-256)
    - encryption_key: 96 bytes (32B private + 64B public)
    - signing_key: 96 bytes (32B private + 64B public)
    - group_certificate_length: u32 BE
    - group_certificate: BCert chain bytes

    Version 2:
    - group_certificate_length (u32 BE) + group_certificate first
    - encryption_key: 96 bytes
    - signing_key: 96 bytes
    - No group_key field

    Version 1:
    - group_key: u32 BE length-prefixed
    - group_certificate: u32 BE length-prefixed

    Widevine (`WVD`):

    Version 2:
    - device_type: u8 (1 = CHROME, 2 = ANDROID)
    - security_level: u8
    - flags: 1 byte, reserved
    - private_key_len: u16 BE + private_key (PKCS#1 DER)
    - client_id_len: u16 BE + client_id (ClientIdentification protobuf)

    Version 1:
    - as version 2, followed by vmp_len: u16 BE + vmp

    Every layout starts with a 3-byte signature and a version byte.
*/

use drm_core::{DeviceFamily, PLAYREADY_SIGNATURES, WIDEVINE_SIGNATURES};

use crate::layout::{FieldKind, FieldSpec, LayoutSpec, Length};

/**
    Size of a serialized ECC P-256 keypair in PRD files.
*/
pub const ECC_KEY_SIZE: usize = 96;

/**
    Named values of the Widevine `device_type` byte.
*/
pub const WIDEVINE_DEVICE_TYPES: &[(u64, &str)] = &[(1, "CHROME"), (2, "ANDROID")];

const PRD_SIGNATURE: FieldSpec = FieldSpec::new("signature", FieldKind::Tag(PLAYREADY_SIGNATURES));
const WVD_SIGNATURE: FieldSpec = FieldSpec::new("signature", FieldKind::Tag(WIDEVINE_SIGNATURES));
const VERSION: FieldSpec = FieldSpec::new("version", FieldKind::Version);

const fn ecc_key(name: &'static str) -> FieldSpec {
    FieldSpec::new(name, FieldKind::Bytes(Length::Fixed(ECC_KEY_SIZE)))
}

pub const PLAYREADY_V3: LayoutSpec = LayoutSpec {
    family: DeviceFamily::PlayReady,
    version: 3,
    fields: &[
        PRD_SIGNATURE,
        VERSION,
        ecc_key("group_key"),
        ecc_key("encryption_key"),
        ecc_key("signing_key"),
        FieldSpec::new("group_certificate_length", FieldKind::UInt(4)),
        FieldSpec::new(
            "group_certificate",
            FieldKind::Bytes(Length::Field("group_certificate_length")),
        ),
    ],
};

pub const PLAYREADY_V2: LayoutSpec = LayoutSpec {
    family: DeviceFamily::PlayReady,
    version: 2,
    fields: &[
        PRD_SIGNATURE,
        VERSION,
        FieldSpec::new("group_certificate_length", FieldKind::UInt(4)),
        FieldSpec::new(
            "group_certificate",
            FieldKind::Bytes(Length::Field("group_certificate_length")),
        ),
        ecc_key("encryption_key"),
        ecc_key("signing_key"),
    ],
};

pub const PLAYREADY_V1: LayoutSpec = LayoutSpec {
    family: DeviceFamily::PlayReady,
    version: 1,
    fields: &[
        PRD_SIGNATURE,
        VERSION,
        FieldSpec::new("group_key", FieldKind::Prefixed(4)),
        FieldSpec::new("group_certificate", FieldKind::Prefixed(4)),
    ],
};

const DEVICE_TYPE: FieldSpec =
    FieldSpec::new("device_type", FieldKind::Enum(1, WIDEVINE_DEVICE_TYPES));
const SECURITY_LEVEL: FieldSpec = FieldSpec::new("security_level", FieldKind::UInt(1));
const FLAGS: FieldSpec = FieldSpec::new("flags", FieldKind::Bytes(Length::Fixed(1)));
const PRIVATE_KEY_LEN: FieldSpec = FieldSpec::new("private_key_len", FieldKind::UInt(2));
const PRIVATE_KEY: FieldSpec =
    FieldSpec::new("private_key", FieldKind::Bytes(Length::Field("private_key_len")));
const CLIENT_ID_LEN: FieldSpec = FieldSpec::new("client_id_len", FieldKind::UInt(2));
const CLIENT_ID: FieldSpec =
    FieldSpec::new("client_id", FieldKind::Bytes(Length::Field("client_id_len")));

pub const WIDEVINE_V2: LayoutSpec = LayoutSpec {
    family: DeviceFamily::Widevine,
    version: 2,
    fields: &[
        WVD_SIGNATURE,
        VERSION,
        DEVICE_TYPE,
        SECURITY_LEVEL,
        FLAGS,
        PRIVATE_KEY_LEN,
        PRIVATE_KEY,
        CLIENT_ID_LEN,
        CLIENT_ID,
    ],
};

pub const WIDEVINE_V1: LayoutSpec = LayoutSpec {
    family: DeviceFamily::Widevine,
    version: 1,
    fields: &[
        WVD_SIGNATURE,
        VERSION,
        DEVICE_TYPE,
        SECURITY_LEVEL,
        FLAGS,
        PRIVATE_KEY_LEN,
        PRIVATE_KEY,
        CLIENT_ID_LEN,
        CLIENT_ID,
        FieldSpec::new("vmp_len", FieldKind::UInt(2)),
        FieldSpec::new("vmp", FieldKind::Bytes(Length::Field("vmp_len"))),
    ],
};

/**
    PlayReady layouts in resolution order.
*/
pub const PLAYREADY_LAYOUTS: &[LayoutSpec] = &[PLAYREADY_V3, PLAYREADY_V2, PLAYREADY_V1];

/**
    Widevine layouts in resolution order.
*/
pub const WIDEVINE_LAYOUTS: &[LayoutSpec] = &[WIDEVINE_V2, WIDEVINE_V1];

/**
    Layouts for a family, newest version first.
*/
pub const fn layouts(family: DeviceFamily) -> &'static [LayoutSpec] {
    match family {
        DeviceFamily::PlayReady => PLAYREADY_LAYOUTS,
        DeviceFamily::Widevine => WIDEVINE_LAYOUTS,
    }
}
