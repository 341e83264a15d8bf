use serde::Deserialize;
use serde_json::{json, Value};

use super::*;
use crate::model::{Djradio, Program};

pub struct DjradioDetail {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct DjradioDetailResponse {
    pub data: Djradio,
}

impl Api for DjradioDetail {
    type Output = DjradioDetailResponse;

    const CRYPTO: CryptoType = CryptoType::Eapi;

    fn path(&self) -> String {
        "/djradio/v2/get".to_string()
    }

    fn body(&self) -> Value {
        json!({ "id": self.id })
    }
}

pub struct DjradioPrograms {
    pub radio_id: i64,
    pub offset: i64,
    pub limit: i64,
    pub asc: bool,
}

#[derive(Debug, Deserialize)]
pub struct DjradioProgramsResponse {
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub more: bool,
    #[serde(default)]
    pub programs: Vec<Program>,
}

impl Api for DjradioPrograms {
    type Output = DjradioProgramsResponse;

    const CRYPTO: CryptoType = CryptoType::Eapi;

    fn path(&self) -> String {
        "/v1/dj/program/byradio".to_string()
    }

    fn body(&self) -> Value {
        json!({
            "radioId": self.radio_id,
            "limit": self.limit,
            "offset": self.offset,
            "asc": self.asc,
        })
    }
}

pub struct DjradioSubscribed;

#[derive(Debug, Deserialize)]
pub struct DjradioSubscribedResponse {
    #[serde(rename = "djRadios", default)]
    pub dj_radios: Vec<Djradio>,
    #[serde(rename = "hasMore", default)]
    pub has_more: bool,
}

impl Api for DjradioSubscribed {
    type Output = DjradioSubscribedResponse;

    const CRYPTO: CryptoType = CryptoType::Eapi;

    fn path(&self) -> String {
        "/djradio/subed/v1".to_string()
    }

    fn body(&self) -> Value {
        json!({ "limit": 100, "time": 0, "needFee": false })
    }
}
