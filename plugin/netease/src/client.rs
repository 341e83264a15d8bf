use bytes::Bytes;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use ncm_core::http::{client_builder, cookie_header, HeaderMap, HeaderValue, HttpClient};
use reqwest::header::{COOKIE, REFERER, USER_AGENT};

use crate::config::ClientConfig;
use crate::crypto::{
    EapiEncoder, EncodeContext, Framing, PayloadEncoder, ResponseBody, ResponseDecryptor, Secrets,
    WeapiEncoder,
};
use crate::error::{ApiError, NcmError, Result};
use crate::types::*;

pub struct Client {
    http: HttpClient,
    config: ClientConfig,
    cookies: BTreeMap<String, String>,
    weapi: WeapiEncoder,
    eapi: EapiEncoder,
    decryptor: ResponseDecryptor,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_secrets(config, Secrets::default())
    }

    pub fn with_secrets(config: ClientConfig, secrets: Secrets) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(REFERER, HeaderValue::from_str(&config.referer)?);
        headers.insert(USER_AGENT, HeaderValue::from_str(&config.user_agent)?);

        let http = client_builder(headers, config.timeout()).build()?;
        let secrets = Arc::new(secrets);

        Ok(Self {
            http,
            cookies: config.cookies.clone(),
            config,
            weapi: WeapiEncoder::new(secrets.clone()),
            eapi: EapiEncoder::new(secrets.clone()),
            decryptor: ResponseDecryptor::new(secrets),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn cookies(&self) -> &BTreeMap<String, String> {
        &self.cookies
    }

    /// Merges session cookies. Some endpoints (cloud publish) reject the
    /// desktop platform, so the platform pair is pinned to android.
    pub fn load_cookies<I>(&mut self, cookies: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.cookies.extend(cookies);
        self.cookies.insert("appver".to_string(), "7.2.24".to_string());
        self.cookies.insert("os".to_string(), "android".to_string());
    }

    pub fn decryptor(&self) -> &ResponseDecryptor {
        &self.decryptor
    }

    fn encoder(&self, crypto: CryptoType) -> Option<&dyn PayloadEncoder> {
        match crypto {
            CryptoType::Weapi => Some(&self.weapi as &dyn PayloadEncoder),
            CryptoType::Eapi => Some(&self.eapi as &dyn PayloadEncoder),
            CryptoType::None => None,
        }
    }

    pub fn format_url(&self, crypto: CryptoType, path: &str) -> String {
        format!(
            "{}{}{}",
            self.config.base_url.trim_end_matches('/'),
            crypto.url_prefix(),
            path
        )
    }

    /// Binary ciphertext for eapi endpoints that asked for it, plain json
    /// otherwise.
    pub fn response_framing<A: Api>() -> Option<Framing> {
        (A::CRYPTO == CryptoType::Eapi && A::ENCRYPTED_RESPONSE).then_some(Framing::Binary)
    }

    fn prepare_body<A: Api>(&self, api: &A) -> Value {
        let mut body = api.body();
        let Some(obj) = body.as_object_mut() else {
            return body;
        };
        match A::CRYPTO {
            CryptoType::Weapi => {
                if let Some(csrf) = self.cookies.get("__csrf") {
                    obj.entry("csrf_token")
                        .or_insert_with(|| Value::String(csrf.clone()));
                }
            }
            CryptoType::Eapi if A::ENCRYPTED_RESPONSE => {
                obj.insert("e_r".to_string(), Value::Bool(true));
            }
            _ => (),
        }
        body
    }

    pub fn build_request<A: Api>(&self, api: &A) -> Result<reqwest::Request> {
        let path = api.path();
        let url = self.format_url(A::CRYPTO, &path);
        let body = self.prepare_body(api);

        let mut builder = match A::OPERATION {
            Operation::Get => self.http.get(&url).query(&body),
            Operation::Post => {
                let builder = self.http.post(&url);
                match self.encoder(A::CRYPTO) {
                    Some(encoder) => {
                        let api_path = format!("{}{}", CryptoType::None.url_prefix(), path);
                        let ctx = EncodeContext { path: &api_path };
                        builder.form(&encoder.encode(&body, &ctx)?)
                    }
                    None => builder.form(&body),
                }
            }
        };

        let cookie = cookie_header(self.cookies.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }

        log::debug!("{:?} {} ({:?})", A::OPERATION, url, A::CRYPTO);
        Ok(builder.build()?)
    }

    /// `framing` is [`Self::response_framing`] of the endpoint that was
    /// requested; the body itself is not inspected.
    pub fn decode_response(&self, framing: Option<Framing>, body: &[u8]) -> Result<Value> {
        match framing {
            Some(framing) => self.decryptor.decrypt_json(body, framing),
            None => self.decryptor.parse_json(body.to_vec()),
        }
    }

    /// Like [`Self::decode_response`], but a body that is not json comes back
    /// as [`ResponseBody::Raw`].
    pub fn decode_body(&self, framing: Option<Framing>, body: &[u8]) -> Result<ResponseBody> {
        ResponseBody::from_result(self.decode_response(framing, body))
    }

    pub fn parse_output<A: Api>(&self, value: &Value) -> Result<A::Output> {
        check_code(value)?;
        <A::Output as Deserialize<'_>>::deserialize(value).map_err(NcmError::Parse)
    }

    pub async fn request_raw<A: Api>(&self, api: &A) -> Result<Bytes> {
        let req = self.build_request(api)?;
        let rsp = self.http.execute(req).await?;
        Ok(rsp.bytes().await?)
    }

    /// Decoded body without a typed output. Non-json bodies are kept as raw
    /// bytes, json bodies still go through the `code` check.
    pub async fn request_body<A: Api>(&self, api: &A) -> Result<ResponseBody> {
        let bytes = self.request_raw(api).await?;
        let body = self.decode_body(Self::response_framing::<A>(), &bytes)?;
        if let ResponseBody::Json(value) = &body {
            check_code(value)?;
        }
        Ok(body)
    }

    pub async fn request<A: Api>(&self, api: &A) -> Result<A::Output> {
        let bytes = self.request_raw(api).await?;
        let value = self.decode_response(Self::response_framing::<A>(), &bytes)?;
        self.parse_output::<A>(&value)
    }
}

/// Fails with the upstream error when `code` is present and not 200.
pub fn check_code(value: &Value) -> Result<()> {
    match value.get("code").and_then(Value::as_i64) {
        Some(code) if code != CODE_OK => {
            let err = serde_json::from_value::<ApiError>(value.clone()).unwrap_or(ApiError {
                code: Some(code),
                message: None,
                err_msg: None,
            });
            log::warn!("upstream error {}", err);
            Err(err.into())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::djradio::DjradioPrograms;
    use crate::api::search::{Search, SearchType};
    use crate::api::songs::SongUrls;
    use ncm_core::crypto::{self, Cipher};
    use serde_json::json;

    fn client() -> Client {
        Client::new(ClientConfig::default()).unwrap()
    }

    fn form_body(req: &reqwest::Request) -> BTreeMap<String, String> {
        let bytes = req.body().and_then(|b| b.as_bytes()).unwrap();
        serde_urlencoded::from_bytes(bytes).unwrap()
    }

    #[test]
    fn test_weapi_request() {
        let mut c = client();
        c.load_cookies([("__csrf".to_string(), "tok".to_string())]);

        let req = c.build_request(&SongUrls::new(vec![1])).unwrap();
        assert_eq!(
            req.url().as_str(),
            "https://music.163.com/weapi/song/enhance/player/url"
        );
        assert_eq!(req.method(), reqwest::Method::POST);

        let form = form_body(&req);
        assert_eq!(form.len(), 2);
        assert_eq!(form["encSecKey"].len(), 256);

        let cookie = req.headers()[COOKIE].to_str().unwrap();
        assert!(cookie.contains("__csrf=tok"));
        assert!(cookie.contains("os=android"));
    }

    #[test]
    fn test_csrf_token_injected() {
        let mut c = client();
        c.load_cookies([("__csrf".to_string(), "tok".to_string())]);
        let body = c.prepare_body(&SongUrls::new(vec![1]));
        assert_eq!(body["csrf_token"], "tok");

        let body = client().prepare_body(&SongUrls::new(vec![1]));
        assert!(body.get("csrf_token").is_none());
    }

    #[test]
    fn test_eapi_request() {
        let c = client();
        let api = DjradioPrograms {
            radio_id: 7,
            offset: 0,
            limit: 50,
            asc: false,
        };
        let req = c.build_request(&api).unwrap();
        assert_eq!(
            req.url().as_str(),
            "https://music.163.com/eapi/v1/dj/program/byradio"
        );

        let form = form_body(&req);
        let signed = c.eapi.decrypt_params(&form["params"]).unwrap();
        assert_eq!(signed.path, "/api/v1/dj/program/byradio");
        assert_eq!(
            serde_json::from_str::<Value>(&signed.body).unwrap(),
            json!({"radioId": 7, "limit": 50, "offset": 0, "asc": false})
        );
    }

    #[test]
    fn test_plain_request() {
        let c = client();
        let req = c.build_request(&Search::new("jay", SearchType::Song)).unwrap();
        assert_eq!(req.url().as_str(), "https://music.163.com/api/search/get");
        let form = form_body(&req);
        assert_eq!(form["s"], "jay");
        assert_eq!(form["type"], "1");
    }

    struct EncryptedPrograms;

    impl Api for EncryptedPrograms {
        type Output = Value;

        const CRYPTO: CryptoType = CryptoType::Eapi;
        const ENCRYPTED_RESPONSE: bool = true;

        fn path(&self) -> String {
            "/v1/dj/program/byradio".to_string()
        }

        fn body(&self) -> Value {
            json!({ "radioId": 7 })
        }
    }

    fn seal(data: &[u8]) -> Vec<u8> {
        crypto::encrypt(Cipher::aes_128_ecb(), &Secrets::default().eapi_key, None, data).unwrap()
    }

    #[test]
    fn test_response_framing() {
        assert_eq!(
            Client::response_framing::<EncryptedPrograms>(),
            Some(Framing::Binary)
        );
        assert_eq!(Client::response_framing::<DjradioPrograms>(), None);
        assert_eq!(Client::response_framing::<SongUrls>(), None);

        let c = client();
        assert_eq!(c.prepare_body(&EncryptedPrograms)["e_r"], true);

        let req = c.build_request(&EncryptedPrograms).unwrap();
        let signed = c.eapi.decrypt_params(&form_body(&req)["params"]).unwrap();
        assert_eq!(
            serde_json::from_str::<Value>(&signed.body).unwrap(),
            json!({"radioId": 7, "e_r": true})
        );

        let api = DjradioPrograms {
            radio_id: 7,
            offset: 0,
            limit: 50,
            asc: false,
        };
        assert!(c.prepare_body(&api).get("e_r").is_none());
    }

    #[test]
    fn test_decode_eapi_binary() {
        let c = client();
        let body = seal(br#"{"code":200,"count":0}"#);

        let v = c.decode_response(Some(Framing::Binary), &body).unwrap();
        assert_eq!(v["count"], 0);

        let v = c.decode_response(None, br#" {"code":200}"#).unwrap();
        assert_eq!(v["code"], 200);
    }

    #[test]
    fn test_ciphertext_starting_with_brace() {
        let c = client();
        // ciphertext of this body starts with 0x7b
        let body = seal(br#"{"k00195":1,"code":200}"#);
        assert_eq!(body[0], b'{');

        let v = c.decode_response(Some(Framing::Binary), &body).unwrap();
        assert_eq!(v, json!({"code": 200, "k00195": 1}));

        let v = c
            .decode_response(Client::response_framing::<EncryptedPrograms>(), &body)
            .unwrap();
        assert_eq!(v["k00195"], 1);
    }

    #[test]
    fn test_decode_body_raw() {
        let c = client();

        let body = c.decode_body(Some(Framing::Binary), &seal(b"<html>")).unwrap();
        assert_eq!(body, ResponseBody::Raw(b"<html>".to_vec()));

        let body = c.decode_body(None, b"<html>").unwrap();
        assert_eq!(body, ResponseBody::Raw(b"<html>".to_vec()));

        let body = c.decode_body(None, br#"{"code":200}"#).unwrap();
        assert_eq!(body.json(), Some(&json!({"code": 200})));

        let err = c.decode_body(Some(Framing::Binary), b"<html>").unwrap_err();
        assert!(matches!(err, NcmError::Crypto(_)));
    }

    #[test]
    fn test_upstream_code() {
        let c = client();
        let err = c
            .parse_output::<SongUrls>(&json!({"code": 301, "msg": "need login"}))
            .unwrap_err();
        assert!(matches!(err, NcmError::Upstream(_)));
        assert_eq!(err.code(), Some(301));

        let ok = c
            .parse_output::<SongUrls>(&json!({"code": 200, "data": [{"id": 1, "url": null}]}))
            .unwrap();
        assert_eq!(ok.data.len(), 1);
    }

    #[test]
    fn test_schema_mismatch() {
        let err = client()
            .parse_output::<SongUrls>(&json!({"code": 200, "data": "nope"}))
            .unwrap_err();
        assert!(matches!(err, NcmError::Parse(_)));
    }

    #[tokio::test]
    async fn test_transport_error() {
        let c = Client::new(ClientConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        })
        .unwrap();
        let err = c.request(&SongUrls::new(vec![1])).await.unwrap_err();
        assert!(matches!(err, NcmError::Request(_)));

        let err = c.request_body(&EncryptedPrograms).await.unwrap_err();
        assert!(matches!(err, NcmError::Request(_)));
    }
}
