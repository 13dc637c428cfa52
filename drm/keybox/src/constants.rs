use core::ops::Range;

/**
    Exact size of a keybox record.
*/
pub const KEYBOX_SIZE: usize = 128;

/**
    Magic value found in the last four bytes of production keyboxes.
    Advisory only: records with other magic values are still decoded.
*/
pub const KEYBOX_MAGIC: &[u8; 4] = b"kbox";

/**
    Size of the encrypted metadata part of `device_id`.
*/
pub const METADATA_SIZE: usize = DEVICE_ID.end - DEVICE_ID.start - FLAGS_SIZE;

pub(crate) const STABLE_ID: Range<usize> = 0..32;
pub(crate) const DEVICE_AES_KEY: Range<usize> = 32..48;
pub(crate) const DEVICE_ID: Range<usize> = 48..120;
pub(crate) const BODY_CRC: Range<usize> = 120..124;
pub(crate) const MAGIC: Range<usize> = 124..128;

/**
    Leading `device_id` bytes holding flags; the rest is metadata.
*/
pub(crate) const FLAGS_SIZE: usize = 4;

/**
    Checksummed body: everything before `body_crc`.
*/
pub(crate) const CRC_BODY: Range<usize> = 0..120;

/**
    Alternative checksum scope that also covers `body_crc` itself.
*/
pub(crate) const CRC_BODY_WITH_TRAILER: Range<usize> = 0..124;
