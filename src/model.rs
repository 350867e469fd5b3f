// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Accepts strings and numbers, treats everything else (and empty strings) as absent.
fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Value = Deserialize::deserialize(deserializer)?;

    match value {
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        _ => Ok(None),
    }
}

fn deserialize_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Value = Deserialize::deserialize(deserializer)?;

    match value {
        Value::Array(arr) => Ok(arr
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) if !s.is_empty() => Some(s),
                _ => None,
            })
            .collect()),
        Value::String(s) if !s.is_empty() => Ok(vec![s]),
        _ => Ok(Vec::new()),
    }
}

/// Upstream channel record; every field is optional until validated.
#[derive(Debug, Deserialize)]
struct RawChannel {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    country: Option<String>,
    #[serde(default, deserialize_with = "deserialize_string_list")]
    categories: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawStream {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    channel: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    url: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    quality: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    referrer: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    user_agent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub country: Option<String>,
    pub categories: Vec<String>,
}

impl Channel {
    /// Decodes one upstream record. Records without a usable `id` are rejected.
    pub fn from_raw(value: &Value) -> Option<Self> {
        let raw = RawChannel::deserialize(value).ok()?;
        let id = raw.id?;

        Some(Self {
            name: raw.name.unwrap_or_else(|| id.clone()),
            id,
            country: raw.country,
            categories: raw.categories,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stream {
    pub channel: String,
    pub url: String,
    pub title: Option<String>,
    pub quality: Option<String>,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
}

impl Stream {
    /// Decodes one upstream record. Records missing `channel` or `url` are rejected.
    pub fn from_raw(value: &Value) -> Option<Self> {
        let raw = RawStream::deserialize(value).ok()?;

        Some(Self {
            channel: raw.channel?,
            url: raw.url?,
            title: raw.title,
            quality: raw.quality,
            referrer: raw.referrer,
            user_agent: raw.user_agent,
        })
    }

    /// Playable by an in-page player: plain http(s) and no custom request headers.
    pub fn is_browser_playable(&self) -> bool {
        let web_scheme = url::Url::parse(&self.url)
            .map(|u| matches!(u.scheme(), "http" | "https"))
            .unwrap_or(false);

        web_scheme && self.referrer.is_none() && self.user_agent.is_none()
    }

    pub fn label(&self) -> String {
        match (&self.title, &self.quality) {
            (Some(title), Some(quality)) => format!("{} ({})", title, quality),
            (Some(title), None) => title.clone(),
            (None, Some(quality)) => quality.clone(),
            (None, None) => self.url.clone(),
        }
    }
}

/// The cached payload of one successful refresh. Upstream records are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub channels: Vec<Value>,
    pub streams: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<i64>,
}

impl Snapshot {
    pub fn new(channels: Vec<Value>, streams: Vec<Value>) -> Self {
        Self {
            channels,
            streams,
            fetched_at: Some(chrono::Utc::now().timestamp()),
        }
    }

    pub fn fetched_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.fetched_at
            .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_channel_name_falls_back_to_id() {
        let ch = Channel::from_raw(&json!({"id": "bbc", "name": null})).unwrap();
        assert_eq!(ch.name, "bbc");

        let ch = Channel::from_raw(&json!({"id": "bbc", "name": ""})).unwrap();
        assert_eq!(ch.name, "bbc");

        let ch = Channel::from_raw(&json!({"id": "bbc"})).unwrap();
        assert_eq!(ch.name, "bbc");
        assert!(ch.categories.is_empty());
        assert_eq!(ch.country, None);
    }

    #[test]
    fn test_channel_without_id_is_rejected() {
        assert!(Channel::from_raw(&json!({"name": "Nameless"})).is_none());
        assert!(Channel::from_raw(&json!({"id": null, "name": "Null"})).is_none());
        assert!(Channel::from_raw(&json!("not an object")).is_none());
    }

    #[test]
    fn test_channel_categories_are_lenient() {
        let ch = Channel::from_raw(&json!({
            "id": "a",
            "categories": ["news", null, 3, "general"],
            "is_nsfw": false
        }))
        .unwrap();
        assert_eq!(ch.categories, vec!["news", "general"]);

        let ch = Channel::from_raw(&json!({"id": "a", "categories": null})).unwrap();
        assert!(ch.categories.is_empty());
    }

    #[test]
    fn test_stream_requires_channel_and_url() {
        assert!(Stream::from_raw(&json!({"channel": "bbc"})).is_none());
        assert!(Stream::from_raw(&json!({"url": "http://x/1"})).is_none());
        assert!(Stream::from_raw(&json!({"channel": null, "url": "http://x/1"})).is_none());
        assert!(Stream::from_raw(&json!({"channel": "bbc", "url": ""})).is_none());

        let s = Stream::from_raw(&json!({
            "channel": "bbc",
            "url": "http://x/1",
            "quality": "720p",
            "referrer": null
        }))
        .unwrap();
        assert_eq!(s.channel, "bbc");
        assert_eq!(s.quality.as_deref(), Some("720p"));
        assert_eq!(s.referrer, None);
    }

    #[test]
    fn test_browser_playable() {
        let mut s = Stream::from_raw(&json!({"channel": "a", "url": "https://x/1.m3u8"})).unwrap();
        assert!(s.is_browser_playable());

        s.referrer = Some("https://origin.example/".to_string());
        assert!(!s.is_browser_playable());

        s.referrer = None;
        s.user_agent = Some("Mozilla/5.0".to_string());
        assert!(!s.is_browser_playable());

        s.user_agent = None;
        s.url = "rtmp://x/live".to_string();
        assert!(!s.is_browser_playable());

        s.url = "not a url".to_string();
        assert!(!s.is_browser_playable());
    }

    #[test]
    fn test_stream_label() {
        let s = Stream::from_raw(&json!({
            "channel": "a",
            "url": "http://x/1",
            "title": "Main",
            "quality": "1080p"
        }))
        .unwrap();
        assert_eq!(s.label(), "Main (1080p)");
    }

    #[test]
    fn test_snapshot_fetched_at_optional() {
        let snapshot: Snapshot =
            serde_json::from_str(r#"{"channels": [], "streams": []}"#).unwrap();
        assert_eq!(snapshot.fetched_at, None);
        assert!(snapshot.fetched_at().is_none());

        let snapshot = Snapshot::new(vec![], vec![]);
        assert!(snapshot.fetched_at().is_some());
    }
}
