use std::path::Path;

use data_encoding::BASE64;
use drm_core::{FieldValue, Record};
use flate2::Crc;

use crate::constants::{
    BODY_CRC, CRC_BODY, CRC_BODY_WITH_TRAILER, DEVICE_AES_KEY, DEVICE_ID, FLAGS_SIZE,
    KEYBOX_MAGIC, KEYBOX_SIZE, MAGIC, STABLE_ID,
};
use crate::crypto::aes::aes_ecb_decrypt_zero_padded;
use crate::error::{KeyboxError, KeyboxResult};

/**
    Result of decrypting the keybox metadata with the embedded device key.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecryptedMetadata {
    Decrypted(Vec<u8>),
    /// Decryption could not run; holds the reason.
    Failed(String),
}

impl DecryptedMetadata {
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Decrypted(bytes) => Some(bytes),
            Self::Failed(_) => None,
        }
    }

    pub fn hex(&self) -> Option<String> {
        self.bytes().map(hex::encode)
    }

    pub fn ascii(&self) -> Option<String> {
        self.bytes().map(ascii_render)
    }
}

/**
    Render bytes as text, keeping printable ASCII (0x20..=0x7E) and
    replacing everything else with `.`.
*/
pub fn ascii_render(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| if (0x20..=0x7E).contains(&b) { b as char } else { '.' })
        .collect()
}

fn crc32(data: &[u8]) -> u32 {
    let mut crc = Crc::new();
    crc.update(data);
    crc.sum()
}

/**
    A decoded Widevine keybox.

    Layout (128 bytes, integers big-endian):

    | Offset | Size | Field            |
    |--------|------|------------------|
    | 0      | 32   | `stable_id`      |
    | 32     | 16   | `device_aes_key` |
    | 48     | 72   | `device_id`      |
    | 120    | 4    | `body_crc`       |
    | 124    | 4    | `magic`          |

    `device_id` is split further into 4 bytes of flags and 68 bytes of
    metadata encrypted with `device_aes_key` (AES-128-ECB).

    Checksum and decryption results are diagnostics. A keybox with a bad
    checksum, unexpected magic or undecryptable metadata still decodes.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keybox {
    stable_id: [u8; 32],
    device_aes_key: [u8; 16],
    device_id: [u8; 72],
    body_crc: u32,
    magic: [u8; 4],
    computed_crc: u32,
    computed_crc_with_trailer: u32,
    decrypted_metadata: DecryptedMetadata,
}

impl Keybox {
    /**
        Decode a keybox from exactly [`KEYBOX_SIZE`] bytes.
    */
    pub fn from_bytes(data: impl AsRef<[u8]>) -> KeyboxResult<Self> {
        let data = data.as_ref();
        let data: &[u8; KEYBOX_SIZE] =
            data.try_into().map_err(|_| KeyboxError::InvalidLength {
                expected: KEYBOX_SIZE,
                actual: data.len(),
            })?;

        let stable_id = field::<32>(data, STABLE_ID);
        let device_aes_key = field::<16>(data, DEVICE_AES_KEY);
        let device_id = field::<72>(data, DEVICE_ID);
        let body_crc = u32::from_be_bytes(field::<4>(data, BODY_CRC));
        let magic = field::<4>(data, MAGIC);

        let computed_crc = crc32(&data[CRC_BODY]);
        let computed_crc_with_trailer = crc32(&data[CRC_BODY_WITH_TRAILER]);
        if computed_crc != body_crc {
            tracing::debug!(
                "keybox checksum mismatch: stored {body_crc:08X}, computed {computed_crc:08X}"
            );
        }

        let decrypted_metadata =
            match aes_ecb_decrypt_zero_padded(&device_aes_key, &device_id[FLAGS_SIZE..]) {
                Ok(plain) => DecryptedMetadata::Decrypted(plain),
                Err(e) => {
                    tracing::warn!("keybox metadata decryption failed: {e}");
                    DecryptedMetadata::Failed(e.to_string())
                }
            };

        Ok(Self {
            stable_id,
            device_aes_key,
            device_id,
            body_crc,
            magic,
            computed_crc,
            computed_crc_with_trailer,
            decrypted_metadata,
        })
    }

    /**
        Read and decode a keybox file.
    */
    pub fn from_file(path: impl AsRef<Path>) -> KeyboxResult<Self> {
        let path = path.as_ref();
        let len = std::fs::metadata(path)
            .map_err(|e| KeyboxError::io(path, e))?
            .len();
        if len != KEYBOX_SIZE as u64 {
            return Err(KeyboxError::InvalidLength {
                expected: KEYBOX_SIZE,
                actual: usize::try_from(len).unwrap_or(usize::MAX),
            });
        }
        let data = std::fs::read(path).map_err(|e| KeyboxError::io(path, e))?;
        Self::from_bytes(data)
    }

    pub fn stable_id(&self) -> &[u8; 32] {
        &self.stable_id
    }

    pub fn device_aes_key(&self) -> &[u8; 16] {
        &self.device_aes_key
    }

    pub fn device_id(&self) -> &[u8; 72] {
        &self.device_id
    }

    pub fn body_crc(&self) -> u32 {
        self.body_crc
    }

    pub fn magic(&self) -> &[u8; 4] {
        &self.magic
    }

    pub fn flags(&self) -> &[u8] {
        &self.device_id[..FLAGS_SIZE]
    }

    /**
        Encrypted metadata part of `device_id`.
    */
    pub fn metadata(&self) -> &[u8] {
        &self.device_id[FLAGS_SIZE..]
    }

    /**
        CRC-32 over bytes `[0, 120)`, the body before `body_crc`.
    */
    pub fn computed_crc(&self) -> u32 {
        self.computed_crc
    }

    /**
        CRC-32 over bytes `[0, 124)`, covering `body_crc` as well.
        Reported for comparison only; it never decides validity.
    */
    pub fn computed_crc_with_trailer(&self) -> u32 {
        self.computed_crc_with_trailer
    }

    pub fn crc_valid(&self) -> bool {
        self.computed_crc == self.body_crc
    }

    pub fn has_standard_magic(&self) -> bool {
        &self.magic == KEYBOX_MAGIC
    }

    pub fn decrypted_metadata(&self) -> &DecryptedMetadata {
        &self.decrypted_metadata
    }

    /**
        Flatten into a presentable record, in field order followed by
        the derived diagnostics.
    */
    pub fn to_record(&self) -> Record {
        let hex_text = |bytes: &[u8]| FieldValue::Text(hex::encode(bytes));
        let base64_text = |bytes: &[u8]| FieldValue::Text(BASE64.encode(bytes));
        let crc_text = |crc: u32| FieldValue::Text(format!("0x{crc:08X}"));

        let mut record = Record::new()
            .with("stable_id", hex_text(&self.stable_id))
            .with("device_aes_key", hex_text(&self.device_aes_key))
            .with("device_id", hex_text(&self.device_id))
            .with("body_crc", crc_text(self.body_crc))
            .with("magic", hex_text(&self.magic))
            .with("stable_id_base64", base64_text(&self.stable_id))
            .with("device_aes_key_base64", base64_text(&self.device_aes_key))
            .with("device_id_base64", base64_text(&self.device_id))
            .with("flags", hex_text(self.flags()))
            .with("metadata", hex_text(self.metadata()))
            .with("crc_valid", FieldValue::Bool(self.crc_valid()))
            .with("computed_crc", crc_text(self.computed_crc))
            .with(
                "computed_crc_with_trailer",
                crc_text(self.computed_crc_with_trailer),
            )
            .with("magic_valid", FieldValue::Bool(self.has_standard_magic()));

        match &self.decrypted_metadata {
            DecryptedMetadata::Decrypted(plain) => {
                record.push("decrypted_metadata_hex", hex_text(plain));
                record.push(
                    "decrypted_metadata_ascii",
                    FieldValue::Text(ascii_render(plain)),
                );
            }
            DecryptedMetadata::Failed(reason) => {
                record.push(
                    "decrypted_metadata_hex",
                    FieldValue::Text(format!("Decryption failed: {reason}")),
                );
                record.push("decrypted_metadata_ascii", FieldValue::Absent);
            }
        }

        record
    }
}

fn field<const N: usize>(data: &[u8; KEYBOX_SIZE], range: core::ops::Range<usize>) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&data[range]);
    out
}
