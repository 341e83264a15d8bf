use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_6) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/13.1.2 Safari/605.1.15";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_agent: String,
    pub referer: String,
    /// seconds
    pub timeout: Option<u64>,
    pub cookies: BTreeMap<String, String>,
}

impl ClientConfig {
    pub fn from_json(data: &str) -> serde_json::Result<Self> {
        serde_json::from_str(data)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://music.163.com".to_string(),
            user_agent: USER_AGENT.to_string(),
            referer: "https://music.163.com/".to_string(),
            timeout: Some(2),
            cookies: BTreeMap::from([
                ("appver".to_string(), "1.2.1".to_string()),
                ("os".to_string(), "osx".to_string()),
            ]),
        }
    }
}
