use rand::RngCore;
use serde_json::Value;
use std::sync::Arc;

use ncm_core::crypto::{self, hex, Cipher};

use super::{serialize_params, CryptoType, EncodeContext, Payload, PayloadEncoder, Secrets};
use crate::error::Result;

pub struct WeapiEncoder {
    secrets: Arc<Secrets>,
}

impl WeapiEncoder {
    pub fn new(secrets: Arc<Secrets>) -> Self {
        Self { secrets }
    }

    /// 16 random bytes rendered as unpadded lowercase hex, cut to 16 chars.
    pub fn create_secret_key<R: RngCore + ?Sized>(rng: &mut R) -> String {
        let mut bytes = [0u8; 16];
        rng.fill_bytes(&mut bytes);
        let mut key: String = bytes.iter().map(|b| format!("{:x}", b)).collect();
        key.truncate(16);
        key
    }

    pub fn encrypt(&self, params: &Value) -> Result<Payload> {
        self.encrypt_with_rng(params, &mut rand::rng())
    }

    pub fn encrypt_with_rng<R: RngCore + ?Sized>(&self, params: &Value, rng: &mut R) -> Result<Payload> {
        let sec_key = Self::create_secret_key(rng);
        self.encrypt_with_key(params, &sec_key)
    }

    pub fn encrypt_with_key(&self, params: &Value, sec_key: &str) -> Result<Payload> {
        let text = serialize_params(params)?;
        let cipher = Cipher::aes_128_cbc();
        let iv = Some(&self.secrets.iv[..]);

        let first = crypto::encrypt(cipher, &self.secrets.weapi_preset_key, iv, &text)
            .map(|data| crypto::encode(&data))?;
        let params = crypto::encrypt(cipher, sec_key.as_bytes(), iv, first.as_bytes())
            .map(|data| crypto::encode(&data))?;

        Ok(Payload::Weapi {
            params,
            enc_sec_key: self.rsa_encrypt(sec_key.as_bytes())?,
        })
    }

    /// Raw RSA over the reversed key, 256 lowercase hex chars.
    pub fn rsa_encrypt(&self, sec_key: &[u8]) -> Result<String> {
        let reversed: Vec<u8> = sec_key.iter().rev().copied().collect();
        let enc = crypto::mod_exp(&reversed, &self.secrets.rsa_exponent, &self.secrets.rsa_modulus)?;
        Ok(hex::encode_low(&enc))
    }

    /// Peels both AES layers of a `params` value, given its session key.
    pub fn decrypt_params(&self, params: &str, sec_key: &str) -> Result<Vec<u8>> {
        let cipher = Cipher::aes_128_cbc();
        let iv = Some(&self.secrets.iv[..]);

        let first = crypto::decode(params.as_bytes())
            .and_then(|data| crypto::decrypt(cipher, sec_key.as_bytes(), iv, &data))?;
        let text = crypto::decode(&first)
            .and_then(|data| crypto::decrypt(cipher, &self.secrets.weapi_preset_key, iv, &data))?;
        Ok(text)
    }
}

impl PayloadEncoder for WeapiEncoder {
    fn crypto_type(&self) -> CryptoType {
        CryptoType::Weapi
    }

    fn encode(&self, params: &Value, _ctx: &EncodeContext<'_>) -> Result<Payload> {
        self.encrypt(params)
    }
}
