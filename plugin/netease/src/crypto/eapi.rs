use serde_json::Value;
use std::sync::Arc;

use ncm_core::crypto::{self, hex, Cipher, MessageDigest};
use ncm_core::CryptoError;

use super::{serialize_params, CryptoType, EncodeContext, Payload, PayloadEncoder, Secrets};
use crate::error::Result;

const SEPARATOR: &str = "-36cd479b6b5-";

/// Lowercase hex MD5 over `nobody{path}use{body}md5forencrypt`.
pub fn eapi_sign(path: &str, body: &[u8]) -> Result<String> {
    let mut src = Vec::with_capacity(path.len() + body.len() + 22);
    src.extend_from_slice(b"nobody");
    src.extend_from_slice(path.as_bytes());
    src.extend_from_slice(b"use");
    src.extend_from_slice(body);
    src.extend_from_slice(b"md5forencrypt");
    let hash = crypto::digest(MessageDigest::md5(), &src)?;
    Ok(hex::encode_low(&hash))
}

/// Decrypted `params` of an eapi request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EapiRequest {
    pub path: String,
    pub body: String,
    pub sign: String,
}

pub struct EapiEncoder {
    secrets: Arc<Secrets>,
}

impl EapiEncoder {
    pub fn new(secrets: Arc<Secrets>) -> Self {
        Self { secrets }
    }

    pub fn encrypt(&self, path: &str, params: &Value) -> Result<Payload> {
        let body = serialize_params(params)?;
        let sign = eapi_sign(path, &body)?;

        let mut src = Vec::with_capacity(path.len() + body.len() + 2 * SEPARATOR.len() + sign.len());
        src.extend_from_slice(path.as_bytes());
        src.extend_from_slice(SEPARATOR.as_bytes());
        src.extend_from_slice(&body);
        src.extend_from_slice(SEPARATOR.as_bytes());
        src.extend_from_slice(sign.as_bytes());

        let params = crypto::encrypt(Cipher::aes_128_ecb(), &self.secrets.eapi_key, None, &src)
            .map(|data| hex::encode_up(&data))?;
        Ok(Payload::Eapi { params })
    }

    /// Plain envelope bytes of an uppercase (or lowercase) hex `params`.
    pub fn decrypt_raw(&self, params: &str) -> Result<Vec<u8>> {
        let data = hex::decode(params).map_err(CryptoError::from)?;
        Ok(crypto::decrypt(
            Cipher::aes_128_ecb(),
            &self.secrets.eapi_key,
            None,
            &data,
        )?)
    }

    pub fn decrypt_params(&self, params: &str) -> Result<EapiRequest> {
        let plain = String::from_utf8(self.decrypt_raw(params)?).map_err(CryptoError::from)?;

        let invalid = || CryptoError::InvalidPayload("missing eapi separator".to_string());
        let (path, rest) = plain.split_once(SEPARATOR).ok_or_else(invalid)?;
        let (body, sign) = rest.rsplit_once(SEPARATOR).ok_or_else(invalid)?;

        Ok(EapiRequest {
            path: path.to_string(),
            body: body.to_string(),
            sign: sign.to_string(),
        })
    }
}

impl PayloadEncoder for EapiEncoder {
    fn crypto_type(&self) -> CryptoType {
        CryptoType::Eapi
    }

    fn encode(&self, params: &Value, ctx: &EncodeContext<'_>) -> Result<Payload> {
        self.encrypt(ctx.path, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NcmError;
    use serde_json::json;

    const PATH: &str = "/api/song/enhance/player/url";

    fn encoder() -> EapiEncoder {
        EapiEncoder::new(Arc::new(Secrets::default()))
    }

    #[test]
    fn test_known_vector() {
        let p = encoder().encrypt(PATH, &json!({"id": 123})).unwrap();
        assert_eq!(
            p.params(),
            "FA90B329E9614F79E79598F37DC2EDB430F8378D2A2796338F0BFDEAEF824A22\
             F75CA120B8D9A82B52ABE3F84A6FF3035F815A5D878F77C15DB6C43F5C99863B\
             B00D91BBD5649FC4CF44D2780A3A9D26B725DAC691FBE84A2990FB01DFD75726\
             6AA3B102FBE7296AB0DB9EA5C46AD12B"
        );
    }

    #[test]
    fn test_signature_tail() {
        let enc = encoder();
        let p = enc.encrypt(PATH, &json!({"id": 123})).unwrap();
        let plain = String::from_utf8(enc.decrypt_raw(p.params()).unwrap()).unwrap();

        let (_, tail) = plain.rsplit_once(SEPARATOR).unwrap();
        assert!(plain.ends_with(&format!("{}{}", SEPARATOR, tail)));
        assert_eq!(tail.len(), 32);
        assert!(tail.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
        assert_eq!(tail, "48eecde3201c58cea4b17ccb304b1259");
    }

    #[test]
    fn test_sign_stable() {
        let a = eapi_sign(PATH, br#"{"id":123}"#).unwrap();
        let b = eapi_sign(PATH, br#"{"id":123}"#).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, eapi_sign(PATH, br#"{"id":124}"#).unwrap());
    }

    #[test]
    fn test_round_trip() {
        let enc = encoder();
        let cases = [
            json!({}),
            json!({"radioId": 336355127, "limit": 50, "offset": 0, "asc": false}),
            json!({"s": "周杰伦 -36cd479b6b5- tricky", "type": 1}),
        ];
        for params in cases {
            let p = enc.encrypt("/api/v1/dj/program/byradio", &params).unwrap();
            assert!(p.params().chars().all(|c| !c.is_ascii_lowercase()));

            let req = enc.decrypt_params(p.params()).unwrap();
            assert_eq!(req.path, "/api/v1/dj/program/byradio");
            assert_eq!(serde_json::from_str::<Value>(&req.body).unwrap(), params);
            assert_eq!(req.sign, eapi_sign(&req.path, req.body.as_bytes()).unwrap());
        }
    }

    #[test]
    fn test_decrypt_rejects_bad_input() {
        let enc = encoder();
        assert!(matches!(
            enc.decrypt_params("zz"),
            Err(NcmError::Crypto(CryptoError::Hex(_)))
        ));
        assert!(matches!(
            enc.decrypt_params("ABCD"),
            Err(NcmError::Crypto(CryptoError::BlockLength { len: 2, .. }))
        ));
    }
}
