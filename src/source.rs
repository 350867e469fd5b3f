// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::{CatalogError, Result};

pub const DEFAULT_CHANNELS_URL: &str = "https://iptv-org.github.io/api/channels.json";
pub const DEFAULT_STREAMS_URL: &str = "https://iptv-org.github.io/api/streams.json";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feed {
    Channels,
    Streams,
}

impl std::fmt::Display for Feed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Feed::Channels => write!(f, "channels"),
            Feed::Streams => write!(f, "streams"),
        }
    }
}

/// Where catalog feeds come from. Each feed is a JSON array of records.
pub trait CatalogSource {
    fn fetch(&self, feed: Feed) -> impl Future<Output = Result<Vec<Value>>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    channels_url: String,
    streams_url: String,
}

impl HttpSource {
    pub fn new(channels_url: String, streams_url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("iptv-catalog/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CatalogError::Fetch {
                url: channels_url.clone(),
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            channels_url,
            streams_url,
        })
    }

    pub fn url(&self, feed: Feed) -> &str {
        match feed {
            Feed::Channels => &self.channels_url,
            Feed::Streams => &self.streams_url,
        }
    }
}

impl CatalogSource for HttpSource {
    async fn fetch(&self, feed: Feed) -> Result<Vec<Value>> {
        let url = self.url(feed);
        debug!("Requesting {} feed: {}", feed, url);

        let fetch_error = |message: String| CatalogError::Fetch {
            url: url.to_string(),
            message,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        if !response.status().is_success() {
            return Err(fetch_error(format!(
                "HTTP request failed with status: {}",
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| fetch_error(format!("failed to read response body: {}", e)))?;

        debug!("Received {} bytes for {} feed", body.len(), feed);

        parse_feed(url, &body)
    }
}

/// A feed must be a JSON array; anything else is a parse error.
pub fn parse_feed(origin: &str, body: &[u8]) -> Result<Vec<Value>> {
    match serde_json::from_slice::<Value>(body).map_err(|e| CatalogError::parse(origin, e))? {
        Value::Array(records) => Ok(records),
        other => Err(CatalogError::parse(
            origin,
            format!("expected a JSON array, got {}", json_kind(&other)),
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_feed_accepts_arrays() {
        let records = parse_feed("test", br#"[{"id": "a"}, {"id": "b"}]"#).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_parse_feed_rejects_other_shapes() {
        let err = parse_feed("test", br#"{"channels": []}"#).unwrap_err();
        match err {
            CatalogError::Parse { origin, message } => {
                assert_eq!(origin, "test");
                assert!(message.contains("an object"));
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(matches!(
            parse_feed("test", b"<html>").unwrap_err(),
            CatalogError::Parse { .. }
        ));
    }

    #[test]
    fn test_http_source_urls() {
        let source = HttpSource::new(
            DEFAULT_CHANNELS_URL.to_string(),
            DEFAULT_STREAMS_URL.to_string(),
            DEFAULT_TIMEOUT,
        )
        .unwrap();
        assert_eq!(source.url(Feed::Channels), DEFAULT_CHANNELS_URL);
        assert_eq!(source.url(Feed::Streams), DEFAULT_STREAMS_URL);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_fetch_error() {
        let source = HttpSource::new(
            "http://127.0.0.1:9/channels.json".to_string(),
            "http://127.0.0.1:9/streams.json".to_string(),
            Duration::from_secs(2),
        )
        .unwrap();
        let err = source.fetch(Feed::Channels).await.unwrap_err();
        assert!(err.is_fetch());
    }
}
