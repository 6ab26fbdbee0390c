use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::traits::ProviderClient;
use crate::config::{Lang, ProviderId};
use crate::error::{Error, Result};

const API_URL: &str = "https://translate.api.cloud.yandex.net/translate/v2/translate";

/// Yandex Cloud Translate. Secondary tier; speaks bare ISO 639-1 codes.
pub struct YandexProvider {
    client: Client,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct YandexRequest<'a> {
    texts: Vec<&'a str>,
    #[serde(rename = "targetLanguageCode")]
    target_language_code: &'a str,
    #[serde(rename = "sourceLanguageCode")]
    source_language_code: &'a str,
}

#[derive(Debug, Deserialize)]
struct YandexResponse {
    translations: Vec<YandexTranslation>,
}

#[derive(Debug, Deserialize)]
struct YandexTranslation {
    text: String,
}

impl YandexProvider {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl ProviderClient for YandexProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Yandex
    }

    async fn translate(
        &self,
        text: &str,
        target: &Lang,
        source: &Lang,
        api_key: &str,
    ) -> Result<String> {
        let request = YandexRequest {
            texts: vec![text],
            target_language_code: target.as_str(),
            source_language_code: source.as_str(),
        };

        debug!("Yandex request: {} -> {}", source, target);

        let response = self
            .client
            .post(API_URL)
            .timeout(self.timeout)
            .header("Authorization", format!("Api-Key {api_key}"))
            .json(&request)
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
            warn!("Yandex Translate error: {}", status);
            return Err(Error::ProviderRequest(format!("HTTP {status}")));
        }

        let body: YandexResponse = response
            .json()
            .await
            .map_err(|e| Error::ProviderInvalidResponse(e.to_string()))?;

        body.translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .ok_or_else(|| Error::ProviderInvalidResponse("empty translations array".to_string()))
    }
}
