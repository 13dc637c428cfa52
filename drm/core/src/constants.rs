/**
    PlayReady device file signature (`.prd`).
*/
pub const PRD_SIGNATURE: &[u8] = b"PRD";

/**
    Legacy PlayReady signature found on early provisioning dumps.
    Accepted anywhere `PRD` is.
*/
pub const PRK_SIGNATURE: &[u8] = b"PRK";

/**
    Widevine device file signature (`.wvd`).
*/
pub const WVD_SIGNATURE: &[u8] = b"WVD";

/**
    Signatures accepted for PlayReady device files, preferred first.
*/
pub const PLAYREADY_SIGNATURES: &[&[u8]] = &[PRD_SIGNATURE, PRK_SIGNATURE];

/**
    Signatures accepted for Widevine device files.
*/
pub const WIDEVINE_SIGNATURES: &[&[u8]] = &[WVD_SIGNATURE];
