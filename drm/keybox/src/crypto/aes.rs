/*!
    AES-128-ECB decryption of the keybox metadata field.

    The metadata is not block aligned (68 bytes), so it is right-padded with
    zero bytes to the next block boundary before decryption and the output is
    truncated back to the input length.
*/

use aes::{
    Aes128,
    cipher::{BlockDecrypt, KeyInit, generic_array::GenericArray},
};

use crate::error::KeyboxError;

const BLOCK_SIZE: usize = 16;

/**
    AES-128-ECB decrypt `data` under `key`, zero-padding to a whole number of
    blocks and truncating the plaintext to `data.len()`.
*/
pub fn aes_ecb_decrypt_zero_padded(key: &[u8], data: &[u8]) -> Result<Vec<u8>, KeyboxError> {
    let cipher =
        Aes128::new_from_slice(key).map_err(|_| KeyboxError::InvalidKeyLength(key.len()))?;

    let mut buffer = data.to_vec();
    buffer.resize(data.len().next_multiple_of(BLOCK_SIZE), 0);

    for chunk in buffer.chunks_exact_mut(BLOCK_SIZE) {
        cipher.decrypt_block(GenericArray::from_mut_slice(chunk));
    }

    buffer.truncate(data.len());
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aes::cipher::BlockEncrypt;
    use hex_literal::hex;

    fn ecb_encrypt(key: &[u8; 16], plaintext: &[u8]) -> Vec<u8> {
        assert!(plaintext.len().is_multiple_of(BLOCK_SIZE));
        let cipher = Aes128::new(GenericArray::from_slice(key));
        let mut out = plaintext.to_vec();
        for chunk in out.chunks_exact_mut(BLOCK_SIZE) {
            cipher.encrypt_block(GenericArray::from_mut_slice(chunk));
        }
        out
    }

    #[test]
    fn zero_key_zero_block() {
        let out = aes_ecb_decrypt_zero_padded(&[0; 16], &[0; 16]).unwrap();
        assert_eq!(out, hex!("140f0f1011b5223d79587717ffd9ec3a"));
    }

    #[test]
    fn padded_round_trip() {
        let key = hex!("000102030405060708090a0b0c0d0e0f");
        let plaintext: Vec<u8> = (0..68u8).map(|i| i.wrapping_mul(37)).collect();

        let mut padded = plaintext.clone();
        padded.resize(80, 0);
        let ciphertext = ecb_encrypt(&key, &padded);
        assert_eq!(ciphertext.len(), 80);

        let decrypted = aes_ecb_decrypt_zero_padded(&key, &ciphertext).unwrap();
        assert_eq!(&decrypted[..68], plaintext.as_slice());
    }

    #[test]
    fn output_length_matches_input() {
        let out = aes_ecb_decrypt_zero_padded(&[7; 16], &[1; 68]).unwrap();
        assert_eq!(out.len(), 68);
        let out = aes_ecb_decrypt_zero_padded(&[7; 16], &[]).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn rejects_wrong_key_length() {
        let err = aes_ecb_decrypt_zero_padded(&[0; 15], &[0; 16]).unwrap_err();
        assert_eq!(err, KeyboxError::InvalidKeyLength(15));
        let err = aes_ecb_decrypt_zero_padded(&[0; 32], &[0; 16]).unwrap_err();
        assert_eq!(err, KeyboxError::InvalidKeyLength(32));
    }
}
