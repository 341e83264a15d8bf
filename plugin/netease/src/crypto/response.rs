use serde_json::Value;
use std::sync::Arc;

use ncm_core::crypto::{self, hex, Cipher};
use ncm_core::CryptoError;

use super::Secrets;
use crate::error::{NcmError, Result};

const MAX_ABROAD_DEPTH: usize = 4;

/// How an encrypted body travels on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    Hex,
    Binary,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    /// decrypted bytes that are not json
    Raw(Vec<u8>),
}

impl ResponseBody {
    pub fn json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(v) => Some(v),
            ResponseBody::Raw(_) => None,
        }
    }

    /// Keeps the bytes of a [`NcmError::MalformedResponse`], passes other
    /// errors through.
    pub(crate) fn from_result(result: Result<Value>) -> Result<Self> {
        match result {
            Ok(v) => Ok(ResponseBody::Json(v)),
            Err(NcmError::MalformedResponse { source, raw }) => {
                log::warn!("response is not json ({}), keep {} raw bytes", source, raw.len());
                Ok(ResponseBody::Raw(raw))
            }
            Err(e) => Err(e),
        }
    }
}

/// Decrypts the `result` blob of an `abroad` response.
pub trait AbroadCipher: Send + Sync {
    fn decrypt(&self, blob: &str) -> std::result::Result<Vec<u8>, CryptoError>;
}

/// Hex blob, AES-128-ECB under the configured abroad key.
pub struct EcbAbroadCipher {
    key: Option<[u8; 16]>,
}

impl EcbAbroadCipher {
    pub fn new(secrets: &Secrets) -> Self {
        Self {
            key: secrets.abroad_key,
        }
    }
}

impl AbroadCipher for EcbAbroadCipher {
    fn decrypt(&self, blob: &str) -> std::result::Result<Vec<u8>, CryptoError> {
        let key = self.key.ok_or(CryptoError::MissingKey("abroad"))?;
        let data = hex::decode(blob.trim())?;
        crypto::decrypt(Cipher::aes_128_ecb(), &key, None, &data)
    }
}

pub struct ResponseDecryptor {
    secrets: Arc<Secrets>,
    abroad: Box<dyn AbroadCipher>,
}

impl ResponseDecryptor {
    pub fn new(secrets: Arc<Secrets>) -> Self {
        let abroad = Box::new(EcbAbroadCipher::new(&secrets));
        Self { secrets, abroad }
    }

    pub fn with_abroad_cipher(mut self, abroad: Box<dyn AbroadCipher>) -> Self {
        self.abroad = abroad;
        self
    }

    pub fn decrypt_bytes(&self, body: &[u8], framing: Framing) -> Result<Vec<u8>> {
        let data = match framing {
            Framing::Hex => hex::decode(body.trim_ascii()).map_err(CryptoError::from)?,
            Framing::Binary => body.to_vec(),
        };
        Ok(crypto::decrypt(
            Cipher::aes_128_ecb(),
            &self.secrets.eapi_key,
            None,
            &data,
        )?)
    }

    /// Decrypts and parses, following the abroad framing.
    pub fn decrypt_json(&self, body: &[u8], framing: Framing) -> Result<Value> {
        let plain = self.decrypt_bytes(body, framing)?;
        self.parse_json(plain)
    }

    /// Like [`Self::decrypt_json`], but a non-json body comes back as
    /// [`ResponseBody::Raw`] instead of an error.
    pub fn decode(&self, body: &[u8], framing: Framing) -> Result<ResponseBody> {
        ResponseBody::from_result(self.decrypt_json(body, framing))
    }

    /// Parses a plain body and unwraps the abroad framing.
    pub fn parse_json(&self, raw: Vec<u8>) -> Result<Value> {
        let value = parse(raw)?;
        self.unwrap_abroad(value)
    }

    pub fn unwrap_abroad(&self, mut value: Value) -> Result<Value> {
        for _ in 0..MAX_ABROAD_DEPTH {
            if !value.get("abroad").is_some_and(is_truthy) {
                return Ok(value);
            }
            let blob = value
                .get("result")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    CryptoError::InvalidPayload("abroad response without string result".to_string())
                })?;
            log::debug!("decrypt abroad result, {} chars", blob.len());
            value = parse(self.abroad.decrypt(blob)?)?;
        }
        Err(CryptoError::InvalidPayload("abroad nesting too deep".to_string()).into())
    }
}

fn parse(raw: Vec<u8>) -> Result<Value> {
    match serde_json::from_slice(&raw) {
        Ok(v) => Ok(v),
        Err(source) => Err(NcmError::MalformedResponse { source, raw }),
    }
}

fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
