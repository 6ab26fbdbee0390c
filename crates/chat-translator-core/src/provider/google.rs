use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use super::traits::ProviderClient;
use crate::config::{Lang, ProviderId};
use crate::error::{Error, Result};

const API_URL: &str = "https://translate.googleapis.com/translate_a/single";

/// Keyless Google Translate web endpoint. Universal baseline of the chain:
/// lower quality than the paid tiers but almost always available.
pub struct GoogleProvider {
    client: Client,
    timeout: Duration,
}

impl GoogleProvider {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl ProviderClient for GoogleProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Google
    }

    fn requires_api_key(&self) -> bool {
        false
    }

    async fn translate(
        &self,
        text: &str,
        target: &Lang,
        source: &Lang,
        _api_key: &str,
    ) -> Result<String> {
        debug!("Google request: {} -> {}", source, target);

        let response = self
            .client
            .get(API_URL)
            .timeout(self.timeout)
            .query(&[
                ("client", "gtx"),
                ("sl", source.as_str()),
                ("tl", target.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::ProviderTimeout
                } else {
                    Error::ProviderRequest(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            warn!("Google Translate error: {}", status);
            return Err(Error::ProviderRequest(format!("HTTP {status}")));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::ProviderInvalidResponse(e.to_string()))?;

        parse_segments(&body)
    }
}

/// The gtx endpoint answers with nested arrays; the first element holds
/// sentence segments whose first field is the translated text.
fn parse_segments(body: &serde_json::Value) -> Result<String> {
    let segments = body
        .get(0)
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| Error::ProviderInvalidResponse("missing segment array".to_string()))?;

    let mut translated = String::new();
    for segment in segments {
        if let Some(part) = segment.get(0).and_then(serde_json::Value::as_str) {
            translated.push_str(part);
        }
    }

    if translated.is_empty() {
        return Err(Error::ProviderInvalidResponse("no translated segments".to_string()));
    }

    Ok(translated)
}
