use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::traits::ProviderClient;
use crate::config::{Lang, ProviderId};
use crate::error::{Error, Result};

const API_URL: &str = "https://api-free.deepl.com/v2/translate";

/// DeepL API translator. Highest quality tier in the fallback chain.
pub struct DeepLProvider {
    client: Client,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct DeepLResponse {
    translations: Vec<DeepLTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeepLTranslation {
    text: String,
}

impl DeepLProvider {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl ProviderClient for DeepLProvider {
    fn id(&self) -> ProviderId {
        ProviderId::DeepL
    }

    async fn translate(
        &self,
        text: &str,
        target: &Lang,
        source: &Lang,
        api_key: &str,
    ) -> Result<String> {
        let params = [
            ("text", text.to_string()),
            ("target_lang", deepl_lang_code(target)),
            ("source_lang", deepl_lang_code(source)),
        ];

        debug!("DeepL request: {} -> {}", source, target);

        let response = self
            .client
            .post(API_URL)
            .timeout(self.timeout)
            .header("Authorization", format!("DeepL-Auth-Key {api_key}"))
            .form(&params)
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
            warn!("DeepL error: {}", status);
            return Err(Error::ProviderRequest(format!("HTTP {status}")));
        }

        let body: DeepLResponse = response
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

/// DeepL speaks its own region-qualified dialect of language codes.
/// A mapping miss degrades to the upper-cased bare code rather than failing
/// the call.
fn deepl_lang_code(lang: &Lang) -> String {
    let mapped = match lang.as_str() {
        "en" => "EN-US",
        "ru" => "RU",
        "de" => "DE",
        "fr" => "FR",
        "es" => "ES",
        "it" => "IT",
        "pt" => "PT-BR",
        "nl" => "NL",
        "pl" => "PL",
        "ja" => "JA",
        "zh" => "ZH",
        _ => return lang.as_str().to_uppercase(),
    };
    mapped.to_string()
}
