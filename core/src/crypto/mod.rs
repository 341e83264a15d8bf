use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use openssl::bn::{BigNum, BigNumContext};
use openssl::hash::Hasher;
pub use openssl::hash::MessageDigest;
pub use openssl::symm::Cipher;
use openssl::symm::{Crypter, Mode};

use crate::error::CryptoError;

pub type Result<T> = std::result::Result<T, CryptoError>;

pub const BLOCK_SIZE: usize = 16;

/// Appends PKCS#7 padding. An aligned input gets a whole extra block.
pub fn pkcs7_pad(data: &[u8], block_size: usize) -> Vec<u8> {
    let pad = block_size - data.len() % block_size;
    let mut out = Vec::with_capacity(data.len() + pad);
    out.extend_from_slice(data);
    out.resize(data.len() + pad, pad as u8);
    out
}

/// Strips PKCS#7 padding, checking every pad byte.
pub fn pkcs7_unpad(data: &[u8], block_size: usize) -> Result<&[u8]> {
    if data.is_empty() || data.len() % block_size != 0 {
        return Err(CryptoError::BlockLength {
            len: data.len(),
            block: block_size,
        });
    }
    let pad = data[data.len() - 1] as usize;
    if pad == 0 || pad > block_size {
        return Err(CryptoError::Padding);
    }
    let (body, tail) = data.split_at(data.len() - pad);
    if tail.iter().any(|b| *b as usize != pad) {
        return Err(CryptoError::Padding);
    }
    Ok(body)
}

fn crypt(mode: Mode, cipher: Cipher, key: &[u8], iv: Option<&[u8]>, data: &[u8]) -> Result<Vec<u8>> {
    if key.len() != cipher.key_len() {
        return Err(CryptoError::InvalidKey(format!(
            "expected {} bytes, got {}",
            cipher.key_len(),
            key.len()
        )));
    }
    let mut crypter = Crypter::new(cipher, mode, key, iv)?;
    crypter.pad(false);

    let block_size = cipher.block_size();
    let mut output = vec![0; data.len() + block_size];

    let mut count = crypter.update(data, &mut output)?;
    count += crypter.finalize(&mut output[count..])?;
    output.truncate(count);

    Ok(output)
}

/// Pads with PKCS#7 and encrypts.
pub fn encrypt(cipher: Cipher, key: &[u8], iv: Option<&[u8]>, data: &[u8]) -> Result<Vec<u8>> {
    let block_size = cipher.block_size();
    crypt(Mode::Encrypt, cipher, key, iv, &pkcs7_pad(data, block_size))
}

/// Decrypts and strictly strips PKCS#7 padding.
pub fn decrypt(cipher: Cipher, key: &[u8], iv: Option<&[u8]>, data: &[u8]) -> Result<Vec<u8>> {
    let block_size = cipher.block_size();
    if data.is_empty() || data.len() % block_size != 0 {
        return Err(CryptoError::BlockLength {
            len: data.len(),
            block: block_size,
        });
    }
    let plain = crypt(Mode::Decrypt, cipher, key, iv, data)?;
    pkcs7_unpad(&plain, block_size).map(<[u8]>::to_vec)
}

pub fn encode(data: &[u8]) -> String {
    BASE64.encode(data)
}

pub fn decode(data: &[u8]) -> Result<Vec<u8>> {
    Ok(BASE64.decode(data)?)
}

pub fn digest(digest_type: MessageDigest, data: &[u8]) -> Result<Vec<u8>> {
    let mut hasher = Hasher::new(digest_type)?;
    hasher.update(data)?;
    Ok(hasher.finish()?.to_vec())
}

/// Textbook `base^exp mod modulus` over big-endian byte strings. The result
/// is left-padded with zeros to the modulus width.
pub fn mod_exp(base: &[u8], exp: &[u8], modulus: &[u8]) -> Result<Vec<u8>> {
    let base = BigNum::from_slice(base)?;
    let exp = BigNum::from_slice(exp)?;
    let modulus = BigNum::from_slice(modulus)?;
    let mut ctx = BigNumContext::new()?;

    let mut out = BigNum::new()?;
    out.mod_exp(&base, &exp, &modulus, &mut ctx)?;

    let width = modulus.num_bytes() as usize;
    let bytes = out.to_vec();
    let mut padded = vec![0u8; width.saturating_sub(bytes.len())];
    padded.extend_from_slice(&bytes);
    Ok(padded)
}

pub mod hex {
    pub use hex::{decode, FromHexError};

    pub fn encode_low(data: &[u8]) -> String {
        hex::encode(data)
    }

    pub fn encode_up(data: &[u8]) -> String {
        hex::encode_upper(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"0123456789abcdef";
    const IV: &[u8] = b"fedcba9876543210";

    #[test]
    fn test_pkcs7_pad_lengths() {
        assert_eq!(pkcs7_pad(&[], 16).len(), 16);
        assert_eq!(pkcs7_pad(&[1; 16], 16).len(), 32);
        assert_eq!(pkcs7_pad(&[1; 32], 16).len(), 48);

        let padded = pkcs7_pad(&[7; 13], 16);
        assert_eq!(&padded[13..], &[3, 3, 3]);
        assert_eq!(pkcs7_pad(&[], 16), vec![16u8; 16]);
    }

    #[test]
    fn test_pkcs7_unpad_strict() {
        let mut padded = pkcs7_pad(b"hello", 16);
        assert_eq!(pkcs7_unpad(&padded, 16).unwrap(), b"hello");

        padded[10] = 0x01;
        assert!(matches!(pkcs7_unpad(&padded, 16), Err(CryptoError::Padding)));

        let mut zero = vec![0u8; 16];
        assert!(matches!(pkcs7_unpad(&zero, 16), Err(CryptoError::Padding)));
        zero[15] = 17;
        assert!(matches!(pkcs7_unpad(&zero, 16), Err(CryptoError::Padding)));

        assert!(matches!(
            pkcs7_unpad(&[1; 15], 16),
            Err(CryptoError::BlockLength { len: 15, block: 16 })
        ));
    }

    #[test]
    fn test_cbc_and_ecb() {
        let data = b"{\"id\":123}";

        let cbc = encrypt(Cipher::aes_128_cbc(), KEY, Some(IV), data).unwrap();
        assert_eq!(cbc.len(), 16);
        assert_eq!(decrypt(Cipher::aes_128_cbc(), KEY, Some(IV), &cbc).unwrap(), data);

        let ecb = encrypt(Cipher::aes_128_ecb(), KEY, None, data).unwrap();
        assert_eq!(decrypt(Cipher::aes_128_ecb(), KEY, None, &ecb).unwrap(), data);
        assert_ne!(cbc, ecb);
    }

    #[test]
    fn test_decrypt_rejects_unaligned() {
        let err = decrypt(Cipher::aes_128_ecb(), KEY, None, &[0u8; 20]).unwrap_err();
        assert!(matches!(err, CryptoError::BlockLength { len: 20, block: 16 }));

        let err = decrypt(Cipher::aes_128_ecb(), KEY, None, &[]).unwrap_err();
        assert!(matches!(err, CryptoError::BlockLength { len: 0, .. }));
    }

    #[test]
    fn test_bad_key_length() {
        let err = encrypt(Cipher::aes_128_ecb(), b"short", None, b"x").unwrap_err();
        assert!(matches!(err, CryptoError::InvalidKey(_)));
    }

    #[test]
    fn test_md5_digest() {
        let d = digest(MessageDigest::md5(), b"").unwrap();
        assert_eq!(hex::encode_low(&d), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_mod_exp_padded() {
        // 2^3 mod 0x0101 = 8, padded to the two-byte modulus width
        assert_eq!(mod_exp(&[2], &[3], &[1, 1]).unwrap(), vec![0, 8]);
        assert_eq!(mod_exp(&[0], &[1, 0, 1], &[0xff, 0xff]).unwrap(), vec![0, 0]);
    }

    #[test]
    fn test_base64() {
        assert_eq!(encode(b"hello"), "aGVsbG8=");
        assert_eq!(decode(b"aGVsbG8=").unwrap(), b"hello");
        assert!(decode(b"***").is_err());
    }
}
