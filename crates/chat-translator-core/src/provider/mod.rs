//! Provider fallback chain.
//!
//! Providers are attempted strictly sequentially in the static priority
//! order: ordering encodes a quality preference, and racing them in parallel
//! would waste quota on lower-quality providers that "win" on latency.

mod deepl;
mod google;
mod traits;
mod yandex;

pub use deepl::DeepLProvider;
pub use google::GoogleProvider;
pub use traits::ProviderClient;
pub use yandex::YandexProvider;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::{prompt_language_name, Lang, ProviderConfig};
use crate::llm::LlmClient;
use crate::util::log_snippet;

/// Build the default provider set, sharing the engine's pooled HTTP client.
pub fn default_providers(client: &Client, timeout: Duration) -> Vec<Arc<dyn ProviderClient>> {
    vec![
        Arc::new(DeepLProvider::new(client.clone(), timeout)),
        Arc::new(YandexProvider::new(client.clone(), timeout)),
        Arc::new(GoogleProvider::new(client.clone(), timeout)),
    ]
}

/// Tries providers in priority order, short-circuiting on the first
/// non-empty result. The LLM last resort is attempted only after every
/// configured provider has failed.
pub struct FallbackController {
    providers: Vec<Arc<dyn ProviderClient>>,
    llm: Arc<dyn LlmClient>,
}

impl FallbackController {
    pub fn new(providers: Vec<Arc<dyn ProviderClient>>, llm: Arc<dyn LlmClient>) -> Self {
        Self { providers, llm }
    }

    /// Translate through the fallback chain. Returns `None` only if literally
    /// nothing succeeded; individual provider failures are logged and skipped.
    pub async fn translate_text(
        &self,
        text: &str,
        target: &Lang,
        source: &Lang,
        config: &ProviderConfig,
    ) -> Option<String> {
        for provider in &self.providers {
            let id = provider.id();
            let Some(settings) = config.settings_for(id) else {
                continue;
            };

            if !settings.enabled {
                debug!("Skipping {} (disabled)", id);
                continue;
            }

            let api_key = match settings.api_key.as_deref() {
                Some(key) => key,
                None if !provider.requires_api_key() => "",
                None => {
                    debug!("Skipping {} (no API key)", id);
                    continue;
                }
            };

            match provider.translate(text, target, source, api_key).await {
                Ok(result) if !result.trim().is_empty() => {
                    info!("Translated with {}: {}", id, log_snippet(&result, 50));
                    return Some(result);
                }
                Ok(_) => {
                    warn!("{} returned empty result, trying next provider", id);
                }
                Err(e) => {
                    warn!("{} failed: {}, trying next provider", id, e);
                }
            }
        }

        // Last resort: plain "translate this" completion against the LLM
        if let Some(api_key) = config.llm_api_key.as_deref() {
            match self.translate_with_llm(text, target, source, api_key).await {
                Ok(result) if !result.trim().is_empty() => {
                    info!("Translated with LLM last resort");
                    return Some(result);
                }
                Ok(_) => warn!("LLM last resort returned empty result"),
                Err(e) => warn!("LLM last resort failed: {}", e),
            }
        }

        None
    }

    async fn translate_with_llm(
        &self,
        text: &str,
        target: &Lang,
        source: &Lang,
        api_key: &str,
    ) -> crate::error::Result<String> {
        let system_prompt = "You are a translation engine. \
            Output only the translation, no explanations.";
        let user_prompt = format!(
            "Translate the following text from {} into {}.\n\nText: \"{}\"",
            prompt_language_name(source),
            prompt_language_name(target),
            text
        );

        let completion = self.llm.complete(api_key, system_prompt, &user_prompt).await?;

        // Models sometimes wrap the answer in quotes
        Ok(completion
            .trim()
            .trim_start_matches('"')
            .trim_end_matches('"')
            .to_string())
    }
}
