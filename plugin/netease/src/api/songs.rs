use serde::Deserialize;
use serde_json::{json, Value};

use super::*;
use crate::model::{Song, SongUrl};

/// Playable urls. The server falls back to a lower bitrate when `br` is not
/// available; `url` is null for songs the account cannot play.
pub struct SongUrls {
    pub ids: Vec<i64>,
    pub br: i64,
}

impl SongUrls {
    pub fn new(ids: Vec<i64>) -> Self {
        Self { ids, br: 320000 }
    }
}

#[derive(Debug, Deserialize)]
pub struct SongUrlsResponse {
    #[serde(default)]
    pub data: Vec<SongUrl>,
}

impl Api for SongUrls {
    type Output = SongUrlsResponse;

    const CRYPTO: CryptoType = CryptoType::Weapi;

    fn path(&self) -> String {
        "/song/enhance/player/url".to_string()
    }

    fn body(&self) -> Value {
        json!({
            "ids": self.ids,
            "br": self.br,
        })
    }
}

/// At most 1000 ids per call.
pub struct SongDetail {
    pub ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SongDetailResponse {
    #[serde(default)]
    pub songs: Vec<Song>,
}

impl Api for SongDetail {
    type Output = SongDetailResponse;

    const CRYPTO: CryptoType = CryptoType::Weapi;

    fn path(&self) -> String {
        "/v3/song/detail".to_string()
    }

    fn body(&self) -> Value {
        let c: Vec<Value> = self.ids.iter().map(|id| json!({ "id": id })).collect();
        // both fields are json text inside the json body
        json!({
            "c": Value::Array(c).to_string(),
            "ids": json!(self.ids).to_string(),
        })
    }
}
