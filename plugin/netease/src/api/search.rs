use serde::Deserialize;
use serde_json::{json, Value};

use super::*;
use crate::model::Song;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchType {
    Song = 1,
    Album = 10,
    Artist = 100,
    Playlist = 1000,
    User = 1002,
}

pub struct Search {
    pub keyword: String,
    pub stype: SearchType,
    pub offset: i64,
    pub limit: i64,
}

impl Search {
    pub fn new(keyword: impl Into<String>, stype: SearchType) -> Self {
        Self {
            keyword: keyword.into(),
            stype,
            offset: 0,
            limit: 30,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchResult {
    pub songs: Vec<Song>,
    #[serde(rename = "songCount")]
    pub song_count: i64,
    pub albums: Vec<Value>,
    pub artists: Vec<Value>,
    pub playlists: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub result: SearchResult,
}

/// Results may come back with the `abroad` framing, which the client unwraps
/// before this type sees them.
impl Api for Search {
    type Output = SearchResponse;

    const CRYPTO: CryptoType = CryptoType::None;

    fn path(&self) -> String {
        "/search/get".to_string()
    }

    fn body(&self) -> Value {
        json!({
            "s": self.keyword,
            "type": self.stype as i64,
            "offset": self.offset,
            "limit": self.limit,
            "total": "true",
        })
    }
}
