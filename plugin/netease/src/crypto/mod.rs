use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

pub mod eapi;
pub mod params;
pub mod response;
pub mod secrets;
pub mod weapi;

pub use eapi::{EapiEncoder, EapiRequest};
pub use params::{serialize_params, to_request};
pub use response::{AbroadCipher, EcbAbroadCipher, Framing, ResponseBody, ResponseDecryptor};
pub use secrets::Secrets;
pub use weapi::WeapiEncoder;

/// Endpoint family, which decides both the url prefix and the body encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoType {
    Weapi,
    Eapi,
    None,
}

impl CryptoType {
    pub fn url_prefix(self) -> &'static str {
        match self {
            CryptoType::Weapi => "/weapi",
            CryptoType::Eapi => "/eapi",
            CryptoType::None => "/api",
        }
    }
}

/// Form body sent in place of the plain parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Weapi {
        params: String,
        #[serde(rename = "encSecKey")]
        enc_sec_key: String,
    },
    Eapi {
        params: String,
    },
}

impl Payload {
    pub fn params(&self) -> &str {
        match self {
            Payload::Weapi { params, .. } | Payload::Eapi { params } => params,
        }
    }

    pub fn to_form(&self) -> std::result::Result<String, serde_urlencoded::ser::Error> {
        serde_urlencoded::to_string(self)
    }
}

pub struct EncodeContext<'a> {
    /// `/api/...` form of the endpoint path
    pub path: &'a str,
}

/// Turns plain parameters into a wire payload.
pub trait PayloadEncoder: Send + Sync {
    fn crypto_type(&self) -> CryptoType;
    fn encode(&self, params: &Value, ctx: &EncodeContext<'_>) -> Result<Payload>;
}
