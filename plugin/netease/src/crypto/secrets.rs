use ncm_core::crypto::hex;
use ncm_core::CryptoError;

const WEAPI_PRESET_KEY: &[u8; 16] = b"0CoJUm6Qyw8W8jud";
const WEAPI_IV: &[u8; 16] = b"0102030405060708";
const EAPI_KEY: &[u8; 16] = b"e82ckenh8dichen8";
const RSA_EXPONENT: [u8; 3] = [0x01, 0x00, 0x01];
/// 1024 bit, big-endian
const RSA_MODULUS: [u8; 128] = [
    0xe0, 0xb5, 0x09, 0xf6, 0x25, 0x9d, 0xf8, 0x64, 0x2d, 0xbc, 0x35, 0x66,
    0x29, 0x01, 0x47, 0x7d, 0xf2, 0x26, 0x77, 0xec, 0x15, 0x2b, 0x5f, 0xf6,
    0x8a, 0xce, 0x61, 0x5b, 0xb7, 0xb7, 0x25, 0x15, 0x2b, 0x3a, 0xb1, 0x7a,
    0x87, 0x6a, 0xea, 0x8a, 0x5a, 0xa7, 0x6d, 0x2e, 0x41, 0x76, 0x29, 0xec,
    0x4e, 0xe3, 0x41, 0xf5, 0x61, 0x35, 0xfc, 0xcf, 0x69, 0x52, 0x80, 0x10,
    0x4e, 0x03, 0x12, 0xec, 0xbd, 0xa9, 0x25, 0x57, 0xc9, 0x38, 0x70, 0x11,
    0x4a, 0xf6, 0xc9, 0xd0, 0x5c, 0x4f, 0x7f, 0x0c, 0x36, 0x85, 0xb7, 0xa4,
    0x6b, 0xee, 0x25, 0x59, 0x32, 0x57, 0x5c, 0xce, 0x10, 0xb4, 0x24, 0xd8,
    0x13, 0xcf, 0xe4, 0x87, 0x5d, 0x3e, 0x82, 0x04, 0x7b, 0x97, 0xdd, 0xef,
    0x52, 0x74, 0x1d, 0x54, 0x6b, 0x8e, 0x28, 0x9d, 0xc6, 0x93, 0x5b, 0x3e,
    0xce, 0x04, 0x62, 0xdb, 0x0a, 0x22, 0xb8, 0xe7,
];

/// Key material shared by every encoder and the response decryptor.
///
/// `Default` gives the values the service expects; other sets are only useful
/// in tests.
#[derive(Clone)]
pub struct Secrets {
    pub weapi_preset_key: [u8; 16],
    pub iv: [u8; 16],
    pub eapi_key: [u8; 16],
    /// big-endian
    pub rsa_modulus: Vec<u8>,
    /// big-endian
    pub rsa_exponent: Vec<u8>,
    pub abroad_key: Option<[u8; 16]>,
}

impl Secrets {
    pub fn netease() -> Self {
        Self {
            weapi_preset_key: *WEAPI_PRESET_KEY,
            iv: *WEAPI_IV,
            eapi_key: *EAPI_KEY,
            rsa_modulus: RSA_MODULUS.to_vec(),
            rsa_exponent: RSA_EXPONENT.to_vec(),
            abroad_key: None,
        }
    }

    pub fn with_abroad_key(mut self, key: [u8; 16]) -> Self {
        self.abroad_key = Some(key);
        self
    }

    /// Parses a 16 byte key given either as 16 raw characters or 32 hex digits.
    pub fn parse_key(s: &str) -> Result<[u8; 16], CryptoError> {
        let bytes = match s.len() {
            16 => s.as_bytes().to_vec(),
            32 => hex::decode(s)?,
            n => {
                return Err(CryptoError::InvalidKey(format!(
                    "expected 16 chars or 32 hex digits, got {} chars",
                    n
                )))
            }
        };
        let mut key = [0u8; 16];
        key.copy_from_slice(&bytes);
        Ok(key)
    }
}

impl Default for Secrets {
    fn default() -> Self {
        Self::netease()
    }
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("rsa_bits", &(self.rsa_modulus.len() * 8))
            .field("abroad_key", &self.abroad_key.is_some())
            .finish_non_exhaustive()
    }
}
