//! Integration tests for chat-translator-core
//!
//! These tests verify the end-to-end orchestration workflow:
//! - Settings resolution against a stub override store
//! - Language detection fail-fast behavior
//! - Strict provider ordering and short-circuit
//! - Enhancement folding and degradation
//! - Re-styling from a stored result

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chat_translator_core::{
    Error, Lang, LanguageIdModel, LlmClient, ProviderClient, ProviderId, RequesterId, Result,
    StaticConfig, Style, TranslationEngine, TranslationRequest, TranslationResult,
};

// =============================================================================
// Stub Collaborators
// =============================================================================

/// Provider stub with a fixed outcome and an invocation counter.
struct StubProvider {
    id: ProviderId,
    outcome: Option<String>,
    calls: AtomicUsize,
}

impl StubProvider {
    fn succeeding(id: ProviderId, text: &str) -> Arc<Self> {
        Arc::new(Self {
            id,
            outcome: Some(text.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing(id: ProviderId) -> Arc<Self> {
        Arc::new(Self {
            id,
            outcome: None,
            calls: AtomicUsize::new(0),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderClient for StubProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn requires_api_key(&self) -> bool {
        false
    }

    async fn translate(
        &self,
        _text: &str,
        _target: &Lang,
        _source: &Lang,
        _api_key: &str,
    ) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome
            .clone()
            .ok_or_else(|| Error::ProviderRequest("stub provider failure".to_string()))
    }
}

/// LLM stub replying with a fixed completion, recording the prompts it saw.
struct StubLlm {
    reply: Result<String>,
    calls: AtomicUsize,
    last_user_prompt: std::sync::Mutex<Option<String>>,
}

impl StubLlm {
    fn replying(content: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(content.to_string()),
            calls: AtomicUsize::new(0),
            last_user_prompt: std::sync::Mutex::new(None),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: Err(Error::LlmRequest("stub llm failure".to_string())),
            calls: AtomicUsize::new(0),
            last_user_prompt: std::sync::Mutex::new(None),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_prompt(&self) -> Option<String> {
        self.last_user_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for StubLlm {
    async fn complete(&self, _key: &str, _system: &str, user_prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_user_prompt.lock().unwrap() = Some(user_prompt.to_string());
        match &self.reply {
            Ok(content) => Ok(content.clone()),
            Err(_) => Err(Error::LlmRequest("stub llm failure".to_string())),
        }
    }
}

/// Detector stub returning a fixed language, or nothing.
struct StubDetector {
    lang: Option<Lang>,
    calls: AtomicUsize,
}

impl StubDetector {
    fn detecting(code: &str) -> Arc<Self> {
        Arc::new(Self {
            lang: Some(Lang::new(code)),
            calls: AtomicUsize::new(0),
        })
    }

    fn undetecting() -> Arc<Self> {
        Arc::new(Self {
            lang: None,
            calls: AtomicUsize::new(0),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LanguageIdModel for StubDetector {
    fn detect(&self, _text: &str) -> Option<Lang> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.lang.clone()
    }
}

// =============================================================================
// Test Fixtures
// =============================================================================

/// Static config with every provider keyed and an LLM key configured.
fn full_config() -> StaticConfig {
    StaticConfig {
        deepl_api_key: Some("deepl-key".to_string()),
        yandex_api_key: Some("yandex-key".to_string()),
        openai_api_key: Some("openai-key".to_string()),
        ..StaticConfig::default()
    }
}

/// Static config with no keys anywhere.
fn keyless_config() -> StaticConfig {
    StaticConfig::default()
}

fn request(text: &str, target: &str, enhance: bool) -> TranslationRequest {
    TranslationRequest {
        text: text.to_string(),
        target_lang: Lang::new(target),
        source_lang: None,
        style: Style::Informal,
        enhance,
        explain_grammar: false,
        requester: RequesterId::new("42"),
    }
}

fn engine_with(
    config: StaticConfig,
    detector: Arc<StubDetector>,
    providers: Vec<Arc<StubProvider>>,
    llm: Arc<StubLlm>,
) -> TranslationEngine {
    let providers: Vec<Arc<dyn ProviderClient>> = providers
        .into_iter()
        .map(|p| p as Arc<dyn ProviderClient>)
        .collect();
    TranslationEngine::with_parts(
        config,
        Arc::new(chat_translator_core::NoOverrides),
        detector,
        providers,
        llm,
    )
}

// =============================================================================
// End-to-End Scenarios
// =============================================================================

#[tokio::test]
async fn test_end_to_end_without_enhancement() {
    // "Привет, как дела?" -> detector says ru -> second provider answers
    let deepl = StubProvider::failing(ProviderId::DeepL);
    let yandex = StubProvider::succeeding(ProviderId::Yandex, "Hi, how are you?");
    let detector = StubDetector::detecting("ru");
    let llm = StubLlm::replying("unused");

    let engine = engine_with(
        full_config(),
        detector.clone(),
        vec![deepl, yandex],
        llm,
    );

    let (final_text, metadata) = engine
        .translate(&request("Привет, как дела?", "en", false))
        .await
        .expect("translation should succeed");

    assert_eq!(final_text, "Hi, how are you?");
    assert_eq!(metadata.source_lang, Lang::new("ru"));
    assert_eq!(metadata.basic_translation, "Hi, how are you?");
    assert_eq!(metadata.enhanced_translation, "Hi, how are you?");
    assert_eq!(metadata.original_text, "Привет, как дела?");
    assert_eq!(detector.call_count(), 1);
}

#[tokio::test]
async fn test_exactly_one_provider_wins() {
    // [A: fail, B: succeed, C: would also succeed] — result must come from B
    // and C must never be invoked
    let a = StubProvider::failing(ProviderId::DeepL);
    let b = StubProvider::succeeding(ProviderId::Yandex, "from B");
    let c = StubProvider::succeeding(ProviderId::Google, "from C");
    let llm = StubLlm::replying("from llm");

    let engine = engine_with(
        full_config(),
        StubDetector::detecting("es"),
        vec![a.clone(), b.clone(), c.clone()],
        llm.clone(),
    );

    let (final_text, _) = engine
        .translate(&request("hola", "en", false))
        .await
        .expect("translation should succeed");

    assert_eq!(final_text, "from B");
    assert_eq!(a.call_count(), 1);
    assert_eq!(b.call_count(), 1);
    assert_eq!(c.call_count(), 0);
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_explicit_source_lang_skips_detection() {
    let provider = StubProvider::succeeding(ProviderId::Google, "hello");
    let detector = StubDetector::undetecting();

    let engine = engine_with(
        keyless_config(),
        detector.clone(),
        vec![provider],
        StubLlm::failing(),
    );

    let mut req = request("hallo", "en", false);
    req.source_lang = Some(Lang::new("de"));

    let (_, metadata) = engine.translate(&req).await.expect("should succeed");
    assert_eq!(metadata.source_lang, Lang::new("de"));
    assert_eq!(detector.call_count(), 0);
}

#[tokio::test]
async fn test_detection_failure_aborts_before_providers() {
    let provider = StubProvider::succeeding(ProviderId::Google, "never used");

    let engine = engine_with(
        full_config(),
        StubDetector::undetecting(),
        vec![provider.clone()],
        StubLlm::replying("never used"),
    );

    let err = engine
        .translate(&request("???", "en", false))
        .await
        .expect_err("detection should fail");

    assert!(matches!(err, Error::DetectionFailed));
    // No providers attempted after a detection failure
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_all_providers_failed_without_llm_key() {
    let a = StubProvider::failing(ProviderId::DeepL);
    let b = StubProvider::failing(ProviderId::Google);
    let llm = StubLlm::replying("should not be used");

    let engine = engine_with(
        keyless_config(),
        StubDetector::detecting("ru"),
        vec![a, b],
        llm.clone(),
    );

    let err = engine
        .translate(&request("Привет", "en", false))
        .await
        .expect_err("should fail with no providers and no llm key");

    assert!(matches!(err, Error::AllProvidersFailed));
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_llm_last_resort_rescues_translation() {
    let a = StubProvider::failing(ProviderId::DeepL);
    let llm = StubLlm::replying("rescued translation");

    let engine = engine_with(
        full_config(),
        StubDetector::detecting("ru"),
        vec![a],
        llm.clone(),
    );

    let (final_text, metadata) = engine
        .translate(&request("Привет", "en", false))
        .await
        .expect("llm last resort should succeed");

    assert_eq!(final_text, "rescued translation");
    assert_eq!(metadata.basic_translation, "rescued translation");
    assert_eq!(llm.call_count(), 1);
}

// =============================================================================
// Enhancement Folding
// =============================================================================

#[tokio::test]
async fn test_enhancement_replaces_final_text() {
    let provider = StubProvider::succeeding(ProviderId::DeepL, "How are you?");
    let llm = StubLlm::replying(
        "Enhanced: Hey, how's it going?\n\
         Alternatives:\n\
         - What's up?\n\
         Grammar: Informal contraction.\n\
         Transcription: [haʊ ɑːr juː]",
    );

    let engine = engine_with(
        full_config(),
        StubDetector::detecting("ru"),
        vec![provider],
        llm,
    );

    let mut req = request("Как дела?", "en", true);
    req.explain_grammar = true;

    let (final_text, metadata) = engine.translate(&req).await.expect("should succeed");

    assert_eq!(final_text, "Hey, how's it going?");
    assert_eq!(metadata.basic_translation, "How are you?");
    assert_eq!(metadata.enhanced_translation, "Hey, how's it going?");
    assert_eq!(metadata.alternatives, vec!["What's up?"]);
    assert_eq!(metadata.grammar, "Informal contraction.");
    assert_eq!(metadata.transcription, "[haʊ ɑːr juː]");
}

#[tokio::test]
async fn test_enhancement_failure_degrades_silently() {
    let provider = StubProvider::succeeding(ProviderId::DeepL, "How are you?");

    let engine = engine_with(
        full_config(),
        StubDetector::detecting("ru"),
        vec![provider],
        StubLlm::failing(),
    );

    let (final_text, metadata) = engine
        .translate(&request("Как дела?", "en", true))
        .await
        .expect("literal translation must survive enhancement failure");

    assert_eq!(final_text, "How are you?");
    assert_eq!(metadata.enhanced_translation, "How are you?");
    assert!(metadata.alternatives.is_empty());
    assert!(metadata.grammar.is_empty());
}

#[tokio::test]
async fn test_enhancement_not_requested_skips_llm() {
    let provider = StubProvider::succeeding(ProviderId::DeepL, "Hello");
    let llm = StubLlm::replying("Enhanced: should not appear");

    let engine = engine_with(
        full_config(),
        StubDetector::detecting("ru"),
        vec![provider],
        llm.clone(),
    );

    let (final_text, _) = engine
        .translate(&request("Привет", "en", false))
        .await
        .expect("should succeed");

    assert_eq!(final_text, "Hello");
    assert_eq!(llm.call_count(), 0);
}

// =============================================================================
// Re-styling
// =============================================================================

fn stored_result() -> TranslationResult {
    TranslationResult {
        source_lang: Lang::new("fr"),
        target_lang: Lang::new("en"),
        style: Style::Informal,
        basic_translation: "Hello".to_string(),
        enhanced_translation: "Hey there".to_string(),
        alternatives: vec!["Hi".to_string()],
        explanation: String::new(),
        grammar: String::new(),
        transcription: String::new(),
        original_text: "Bonjour".to_string(),
    }
}

#[tokio::test]
async fn test_restyle_skips_detection_and_providers() {
    let provider = StubProvider::succeeding(ProviderId::DeepL, "never used");
    let detector = StubDetector::detecting("fr");
    let llm = StubLlm::replying("Enhanced: Good day to you.");

    let engine = engine_with(
        full_config(),
        detector.clone(),
        vec![provider.clone()],
        llm.clone(),
    );

    let (final_text, metadata) = engine
        .restyle(&stored_result(), Style::Formal, true)
        .await;

    assert_eq!(final_text, "Good day to you.");
    assert_eq!(metadata.style, Style::Formal);
    assert_eq!(metadata.basic_translation, "Hello");
    assert_eq!(metadata.original_text, "Bonjour");
    // Neither the provider chain nor the detector run again
    assert_eq!(provider.call_count(), 0);
    assert_eq!(detector.call_count(), 0);
    assert_eq!(llm.call_count(), 1);

    // The enhancer was fed the stored original text and literal translation
    let prompt = llm.last_prompt().expect("llm should have been called");
    assert!(prompt.contains("Bonjour"));
    assert!(prompt.contains("Hello"));
    assert!(!prompt.contains("Hey there"));
}

// =============================================================================
// Log Correlation
// =============================================================================

/// Hands formatted log output to a shared buffer for inspection.
#[derive(Clone)]
struct LogCapture(Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogCapture {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[tokio::test]
async fn test_requester_id_appears_on_translate_logs() {
    let capture = LogCapture(Arc::new(std::sync::Mutex::new(Vec::new())));
    let subscriber = tracing_subscriber::fmt()
        .with_writer(capture.clone())
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let engine = engine_with(
        full_config(),
        StubDetector::detecting("ru"),
        vec![StubProvider::succeeding(ProviderId::DeepL, "Hello")],
        StubLlm::replying("unused"),
    );

    let mut req = request("Привет", "en", false);
    req.requester = RequesterId::new("chat-1337");
    engine.translate(&req).await.expect("should succeed");

    let output =
        String::from_utf8(capture.0.lock().unwrap().clone()).expect("log output should be utf8");
    // The translate span carries the requester id into every log line
    assert!(output.contains("chat-1337"), "missing requester in: {output}");
}

#[tokio::test]
async fn test_restyle_degrades_without_llm_key() {
    let engine = engine_with(
        keyless_config(),
        StubDetector::detecting("fr"),
        vec![StubProvider::succeeding(ProviderId::DeepL, "never used")],
        StubLlm::replying("Enhanced: should not appear"),
    );

    let (final_text, metadata) = engine
        .restyle(&stored_result(), Style::Business, false)
        .await;

    assert_eq!(final_text, "Hello");
    assert_eq!(metadata.enhanced_translation, "Hello");
    assert!(metadata.alternatives.is_empty());
}
