use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "picUrl", default)]
    pub pic_url: Option<String>,
}

/// Song as returned by the v3 endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Song {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "ar", default)]
    pub artists: Vec<Artist>,
    #[serde(rename = "al")]
    pub album: Option<Album>,
    /// milliseconds
    #[serde(rename = "dt", default)]
    pub duration: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SongUrl {
    pub id: i64,
    pub url: Option<String>,
    #[serde(default)]
    pub br: i64,
    #[serde(default)]
    pub size: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackId {
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: i64,
    pub name: String,
    #[serde(rename = "coverImgUrl", default)]
    pub cover_img_url: Option<String>,
    #[serde(rename = "trackIds", default)]
    pub track_ids: Vec<TrackId>,
    #[serde(default)]
    pub tracks: Vec<Song>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Djradio {
    pub id: i64,
    pub name: String,
    #[serde(rename = "picUrl", default)]
    pub pic_url: Option<String>,
    #[serde(rename = "programCount", default)]
    pub program_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub id: i64,
    pub name: String,
    #[serde(rename = "mainSong")]
    pub main_song: Option<Song>,
}
