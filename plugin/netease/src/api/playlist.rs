use serde::Deserialize;
use serde_json::{json, Value};

use super::*;
use crate::model::Playlist;

/// `trackIds` of the response always lists every song of the playlist.
pub struct PlaylistDetail {
    pub id: i64,
    pub offset: i64,
    pub limit: i64,
}

impl PlaylistDetail {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            offset: 0,
            limit: 200,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PlaylistDetailResponse {
    pub playlist: Playlist,
}

impl Api for PlaylistDetail {
    type Output = PlaylistDetailResponse;

    const CRYPTO: CryptoType = CryptoType::Weapi;

    fn path(&self) -> String {
        "/v3/playlist/detail".to_string()
    }

    fn body(&self) -> Value {
        json!({
            "id": self.id,
            "offset": self.offset,
            "limit": self.limit,
            "n": self.limit,
        })
    }
}
