//! API Key Codec
//!
//! Encodes `(user id, key epoch)` into an opaque bearer token with
//! AES-256-GCM. The GCM tag makes tokens tamper-evident: a token cannot be
//! mutated client-side to claim a different user or epoch, and forgery
//! requires the server secret. The epoch travels as the decimal rendering
//! of an `i64` millisecond timestamp, so it decodes back to the exact
//! stored value with no precision loss.

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use thiserror::Error;
use uuid::Uuid;

/// GCM nonce length in bytes.
const NONCE_LEN: usize = 12;

/// Key codec errors.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("Invalid encryption key length (expected 32 bytes, got {0})")]
    InvalidKeyLength(usize),

    #[error("Hex decoding of secret failed: {0}")]
    InvalidSecret(#[from] hex::FromHexError),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Any decode failure: bad encoding, failed authentication tag, or a
    /// payload that does not parse back to `(user id, epoch)`.
    #[error("Invalid token")]
    InvalidToken,
}

pub type KeyResult<T> = Result<T, KeyError>;

/// Build the cipher from a 64-hex-char (32-byte) secret.
fn cipher_from_secret(secret_hex: &str) -> KeyResult<Aes256Gcm> {
    let key = hex::decode(secret_hex)?;
    if key.len() != 32 {
        return Err(KeyError::InvalidKeyLength(key.len()));
    }

    Aes256Gcm::new_from_slice(&key).map_err(|e| KeyError::EncryptionFailed(e.to_string()))
}

/// Encode an API key for `(user_id, epoch_ms)`.
///
/// # Returns
/// URL-safe unpadded base64 of: nonce(12 bytes) || ciphertext || tag(16 bytes)
pub fn encode_api_key(user_id: Uuid, epoch_ms: i64, secret_hex: &str) -> KeyResult<String> {
    let cipher = cipher_from_secret(secret_hex)?;

    // Generate random nonce (12 bytes for GCM)
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let payload = format!("{user_id}:{epoch_ms}");
    let ciphertext = cipher
        .encrypt(&nonce, payload.as_bytes())
        .map_err(|e| KeyError::EncryptionFailed(e.to_string()))?;

    // Combine: nonce || ciphertext (which includes the auth tag)
    let mut combined = nonce.to_vec();
    combined.extend_from_slice(&ciphertext);

    Ok(URL_SAFE_NO_PAD.encode(combined))
}

/// Decode an API key back to `(user_id, epoch_ms)`.
///
/// Fails with `KeyError::InvalidToken` for anything that is not an intact
/// token produced under the same secret.
pub fn decode_api_key(token: &str, secret_hex: &str) -> KeyResult<(Uuid, i64)> {
    let cipher = cipher_from_secret(secret_hex)?;

    let combined = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|_| KeyError::InvalidToken)?;

    if combined.len() <= NONCE_LEN {
        return Err(KeyError::InvalidToken);
    }

    let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LEN);
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| KeyError::InvalidToken)?;

    let payload = String::from_utf8(plaintext).map_err(|_| KeyError::InvalidToken)?;

    // The user id cannot contain ':', so the epoch is everything after the
    // last separator.
    let (user_part, epoch_part) = payload.rsplit_once(':').ok_or(KeyError::InvalidToken)?;
    let user_id: Uuid = user_part.parse().map_err(|_| KeyError::InvalidToken)?;
    let epoch_ms: i64 = epoch_part.parse().map_err(|_| KeyError::InvalidToken)?;

    Ok((user_id, epoch_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";
    const WRONG_SECRET: &str = "ffeeddccbbaa99887766554433221100ffeeddccbbaa99887766554433221100";

    #[test]
    fn test_encode_decode_roundtrip() {
        let user_id = Uuid::now_v7();
        let epoch_ms = 1722325600123i64;

        let token = encode_api_key(user_id, epoch_ms, TEST_SECRET).unwrap();
        let (decoded_id, decoded_epoch) = decode_api_key(&token, TEST_SECRET).unwrap();

        assert_eq!(decoded_id, user_id);
        assert_eq!(decoded_epoch, epoch_ms);
    }

    #[test]
    fn test_roundtrip_preserves_millisecond_precision() {
        let user_id = Uuid::now_v7();

        // Values that would be mangled by f64 rounding or second-flooring.
        for epoch_ms in [0i64, 1, 999, 1001, 1722325600999, i64::MAX] {
            let token = encode_api_key(user_id, epoch_ms, TEST_SECRET).unwrap();
            let (_, decoded) = decode_api_key(&token, TEST_SECRET).unwrap();
            assert_eq!(decoded, epoch_ms);
        }
    }

    #[test]
    fn test_nonce_randomness() {
        let user_id = Uuid::now_v7();
        let epoch_ms = 1722325600123i64;

        let token1 = encode_api_key(user_id, epoch_ms, TEST_SECRET).unwrap();
        let token2 = encode_api_key(user_id, epoch_ms, TEST_SECRET).unwrap();

        // Same payload + secret should produce different tokens due to the
        // random nonce, but both must decode to the same pair.
        assert_ne!(token1, token2);
        assert_eq!(decode_api_key(&token1, TEST_SECRET).unwrap(), (user_id, epoch_ms));
        assert_eq!(decode_api_key(&token2, TEST_SECRET).unwrap(), (user_id, epoch_ms));
    }

    #[test]
    fn test_wrong_secret_fails() {
        let token = encode_api_key(Uuid::now_v7(), 42, TEST_SECRET).unwrap();
        let result = decode_api_key(&token, WRONG_SECRET);

        assert!(matches!(result, Err(KeyError::InvalidToken)));
    }

    #[test]
    fn test_any_single_bit_flip_fails() {
        let token = encode_api_key(Uuid::now_v7(), 1722325600123, TEST_SECRET).unwrap();
        let bytes = URL_SAFE_NO_PAD.decode(&token).unwrap();

        for i in 0..bytes.len() {
            let mut corrupted = bytes.clone();
            corrupted[i] ^= 0x01;
            let corrupted_token = URL_SAFE_NO_PAD.encode(&corrupted);

            let result = decode_api_key(&corrupted_token, TEST_SECRET);
            assert!(
                matches!(result, Err(KeyError::InvalidToken)),
                "bit flip at byte {i} decoded successfully"
            );
        }
    }

    #[test]
    fn test_garbage_tokens_fail() {
        for garbage in ["", "x", "not base64 !!!", "AAAA", "AAAAAAAAAAAAAAAA"] {
            let result = decode_api_key(garbage, TEST_SECRET);
            assert!(result.is_err(), "garbage token {garbage:?} decoded");
        }
    }

    #[test]
    fn test_invalid_secret_length() {
        let result = encode_api_key(Uuid::now_v7(), 42, "00ff");
        assert!(matches!(result, Err(KeyError::InvalidKeyLength(2))));
    }

    #[test]
    fn test_non_hex_secret() {
        let result = encode_api_key(Uuid::now_v7(), 42, "zz");
        assert!(matches!(result, Err(KeyError::InvalidSecret(_))));
    }
}
