//! Password blob encryption
//!
//! User passwords are stored in the configuration file as base64 encoded
//! AES-128-ECB ciphertext with PKCS#7 padding. The shared key is used as raw
//! bytes, zero padded or truncated to 16 bytes.

use crate::{Error, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use openssl::symm::{Cipher, decrypt, encrypt};

const KEY_LEN: usize = 16;

fn cipher_key(key: &str) -> [u8; KEY_LEN] {
    let mut bytes = [0u8; KEY_LEN];
    let raw = key.as_bytes();
    let len = raw.len().min(KEY_LEN);
    bytes[..len].copy_from_slice(&raw[..len]);
    bytes
}

/// Encrypt a plain password into a configuration blob
pub fn encrypt_password(password: &str, key: &str) -> Result<String> {
    if key.is_empty() {
        return Err(Error::credentials("encryption key is empty"));
    }
    let ciphertext = encrypt(
        Cipher::aes_128_ecb(),
        &cipher_key(key),
        None,
        password.as_bytes(),
    )
    .map_err(|e| Error::credentials(format!("encryption failed: {}", e)))?;
    Ok(STANDARD.encode(ciphertext))
}

/// Decrypt a configuration blob into the plain password
pub fn decrypt_password(blob: &str, key: &str) -> Result<String> {
    if key.is_empty() {
        return Err(Error::credentials("encryption key is empty"));
    }
    let ciphertext = STANDARD
        .decode(blob.trim())
        .map_err(|e| Error::credentials(format!("password is not valid base64: {}", e)))?;
    let plain = decrypt(Cipher::aes_128_ecb(), &cipher_key(key), None, &ciphertext)
        .map_err(|_| Error::credentials("password could not be decrypted with this key"))?;
    String::from_utf8(plain).map_err(|_| Error::credentials("decrypted password is not UTF-8"))
}
