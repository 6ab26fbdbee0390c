//! Chat Translator Core Library
//!
//! Translation orchestration engine for a chat translation assistant:
//! - Runtime settings resolution (static defaults + operator override store)
//! - Statistical source-language detection
//! - Provider fallback chain (DeepL, Yandex, Google, LLM last resort)
//! - LLM style enhancement with structured metadata extraction
//!
//! The engine is stateless across calls: each `translate()` owns its own
//! resolved configuration and result record. The only shared resource is the
//! pooled HTTP client, which is safe for concurrent use and lives as long as
//! the engine. Dropping an in-flight `translate()` future abandons its
//! request cleanly without affecting the pool.

pub mod config;
pub mod detect;
pub mod enhance;
pub mod error;
pub mod llm;
pub mod provider;
pub mod settings;
pub mod util;

pub use config::{
    get_language_name, Lang, LlmConfig, ProviderConfig, ProviderId, ProviderSettings,
    StaticConfig, Style, PROVIDER_PRIORITY,
};
pub use detect::{LanguageIdModel, WhatlangDetector};
pub use enhance::{Enhancer, EnhancementResult};
pub use error::{Error, Result};
pub use llm::{LlmClient, OpenAiChatClient};
pub use provider::{FallbackController, ProviderClient};
pub use settings::{NoOverrides, OverrideStore, SettingsResolver};

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, Instrument};

/// Opaque requester identity. Used only for per-deployment configuration
/// lookup and log correlation, never interpreted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequesterId(pub String);

impl RequesterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for RequesterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One translation request, ephemeral per call.
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    /// Raw user text to translate.
    pub text: String,
    /// Target language code.
    pub target_lang: Lang,
    /// Source language, detected when absent.
    pub source_lang: Option<Lang>,
    /// Register/tone preset for enhancement.
    pub style: Style,
    /// Whether to run LLM style enhancement at all.
    pub enhance: bool,
    /// Grammar mode: full metadata including grammar notes and transcription.
    pub explain_grammar: bool,
    /// Who is asking.
    pub requester: RequesterId,
}

/// Metadata record returned to (and persisted by) the caller.
///
/// Created fresh on every `translate()` call and never mutated by the engine
/// afterwards. Persistence and re-display are the caller's responsibility;
/// `original_text` is retained specifically so a later re-styling call does
/// not need the original message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub source_lang: Lang,
    pub target_lang: Lang,
    pub style: Style,
    /// Literal result from the provider chain; immutable once set.
    pub basic_translation: String,
    /// Style-adapted rewrite; equals `basic_translation` when enhancement is
    /// disabled or degraded.
    pub enhanced_translation: String,
    pub alternatives: Vec<String>,
    pub explanation: String,
    pub grammar: String,
    pub transcription: String,
    /// Verbatim source text.
    pub original_text: String,
}

impl TranslationResult {
    fn fold_enhancement(&mut self, enhancement: EnhancementResult) {
        self.enhanced_translation = if enhancement.enhanced_translation.trim().is_empty() {
            self.basic_translation.clone()
        } else {
            enhancement.enhanced_translation
        };
        self.alternatives = enhancement.alternatives;
        self.explanation = enhancement.explanation;
        self.grammar = enhancement.grammar;
        self.transcription = enhancement.transcription;
    }
}

/// High-level translation engine combining all components.
///
/// Construct once per process (or per deployment) and share: the pooled HTTP
/// client and LLM client are acquired here and released when the engine is
/// dropped, independent of how many translate calls succeeded or failed.
pub struct TranslationEngine {
    resolver: SettingsResolver,
    detector: Arc<dyn LanguageIdModel>,
    fallback: FallbackController,
    enhancer: Enhancer,
}

impl TranslationEngine {
    /// Create an engine with the default collaborators and no override store.
    ///
    /// # Panics
    /// Panics if the HTTP client cannot be created, which should only happen
    /// in extreme circumstances (e.g., TLS backend unavailable on the system).
    pub fn new(config: StaticConfig) -> Self {
        Self::with_store(config, Arc::new(NoOverrides))
    }

    /// Create an engine backed by an operator override store.
    ///
    /// # Panics
    /// Panics if the HTTP client cannot be created.
    #[allow(clippy::expect_used)]
    pub fn with_store(config: StaticConfig, store: Arc<dyn OverrideStore>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.llm.timeout_secs.max(
                config.provider_timeout_secs,
            )))
            .build()
            .expect("Failed to create HTTP client");

        let llm: Arc<dyn LlmClient> = Arc::new(OpenAiChatClient::new(client.clone(), &config.llm));
        let providers = provider::default_providers(
            &client,
            Duration::from_secs(config.provider_timeout_secs),
        );

        Self {
            detector: Arc::new(WhatlangDetector),
            fallback: FallbackController::new(providers, llm.clone()),
            enhancer: Enhancer::new(llm),
            resolver: SettingsResolver::new(config, store),
        }
    }

    /// Create an engine with injected collaborators, for tests and embedders
    /// that substitute stub clients per case.
    pub fn with_parts(
        config: StaticConfig,
        store: Arc<dyn OverrideStore>,
        detector: Arc<dyn LanguageIdModel>,
        providers: Vec<Arc<dyn ProviderClient>>,
        llm: Arc<dyn LlmClient>,
    ) -> Self {
        Self {
            detector,
            fallback: FallbackController::new(providers, llm.clone()),
            enhancer: Enhancer::new(llm),
            resolver: SettingsResolver::new(config, store),
        }
    }

    /// Translate user text, returning the final display text and the full
    /// metadata record.
    ///
    /// Sequence: resolve settings, detect source language if absent (typed
    /// failure if detection fails), run the provider fallback chain (typed
    /// failure if nothing succeeds), then optionally fold in LLM style
    /// enhancement. Enhancement is best-effort: its failure never turns a
    /// successful literal translation into a visible error.
    pub async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<(String, TranslationResult)> {
        // The requester id rides on the span so every provider and LLM log
        // line inside this call carries it
        let span = info_span!("translate", requester = %request.requester);
        self.translate_inner(request).instrument(span).await
    }

    async fn translate_inner(
        &self,
        request: &TranslationRequest,
    ) -> Result<(String, TranslationResult)> {
        info!(
            "Translation request: target={}, style={}",
            request.target_lang, request.style
        );

        let config = self.resolver.resolve().await;

        let source_lang = match request.source_lang.clone() {
            Some(lang) => lang,
            None => self
                .detector
                .detect(&request.text)
                .ok_or(Error::DetectionFailed)?,
        };

        let basic_translation = self
            .fallback
            .translate_text(&request.text, &request.target_lang, &source_lang, &config)
            .await
            .ok_or(Error::AllProvidersFailed)?;

        let mut result = TranslationResult {
            source_lang,
            target_lang: request.target_lang.clone(),
            style: request.style,
            basic_translation: basic_translation.clone(),
            enhanced_translation: basic_translation.clone(),
            alternatives: Vec::new(),
            explanation: String::new(),
            grammar: String::new(),
            transcription: String::new(),
            original_text: request.text.clone(),
        };

        if request.enhance && config.enhance_enabled {
            let enhancement = self
                .enhancer
                .enhance(
                    &request.text,
                    &result.basic_translation,
                    &request.target_lang,
                    request.style,
                    request.explain_grammar,
                    &config,
                )
                .await;
            result.fold_enhancement(enhancement);
        } else {
            debug!(
                "Enhancement skipped: requested={}, enabled={}",
                request.enhance, config.enhance_enabled
            );
        }

        Ok((result.enhanced_translation.clone(), result))
    }

    /// Re-style a previously returned translation.
    ///
    /// Uses the prior record's `original_text` and `basic_translation`
    /// directly, skipping language detection and the provider chain entirely;
    /// the literal translation is already known. Infallible: a failed
    /// enhancement degrades to the stored literal translation.
    pub async fn restyle(
        &self,
        prior: &TranslationResult,
        style: Style,
        explain_grammar: bool,
    ) -> (String, TranslationResult) {
        info!(
            "Re-style request: {} -> {}",
            prior.style, style
        );

        let config = self.resolver.resolve().await;

        let mut result = TranslationResult {
            style,
            enhanced_translation: prior.basic_translation.clone(),
            alternatives: Vec::new(),
            explanation: String::new(),
            grammar: String::new(),
            transcription: String::new(),
            ..prior.clone()
        };

        if config.enhance_enabled {
            let enhancement = self
                .enhancer
                .enhance(
                    &prior.original_text,
                    &prior.basic_translation,
                    &prior.target_lang,
                    style,
                    explain_grammar,
                    &config,
                )
                .await;
            result.fold_enhancement(enhancement);
        } else {
            debug!("Re-style degraded: enhancement disabled by configuration");
        }

        (result.enhanced_translation.clone(), result)
    }

    /// Access the static defaults the engine was constructed with.
    pub const fn static_config(&self) -> &StaticConfig {
        self.resolver.defaults()
    }
}
