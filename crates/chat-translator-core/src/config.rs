use serde::{Deserialize, Serialize};

/// Language codes following ISO 639-1
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lang(pub String);

impl Lang {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Lang {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Lang {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Closed set of tone/register presets for the enhancement prompt.
///
/// Unknown style codes fall back to `Informal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Informal,
    Formal,
    Business,
    Travel,
    Academic,
}

impl Style {
    /// All styles, in menu order.
    pub const ALL: [Self; 5] = [
        Self::Informal,
        Self::Formal,
        Self::Business,
        Self::Travel,
        Self::Academic,
    ];

    /// Parse a style code, falling back to `Informal` for unknown codes.
    pub fn from_code(code: &str) -> Self {
        match code {
            "formal" => Self::Formal,
            "business" => Self::Business,
            "travel" => Self::Travel,
            "academic" => Self::Academic,
            _ => Self::Informal,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Informal => "informal",
            Self::Formal => "formal",
            Self::Business => "business",
            Self::Travel => "travel",
            Self::Academic => "academic",
        }
    }

    /// Natural-language description interpolated into the enhancement prompt.
    pub const fn prompt_description(self) -> &'static str {
        match self {
            Self::Informal => "casual and friendly, as if talking to a friend",
            Self::Formal => "formal and polite, suitable for official documents",
            Self::Business => "professional and business-like",
            Self::Travel => "simple and clear, suitable for tourists",
            Self::Academic => "academic and scholarly",
        }
    }

    /// User-facing style label in the given interface language.
    pub fn display_name(self, display_lang: &str) -> &'static str {
        match display_lang {
            "ru" => match self {
                Self::Informal => "Неформальный",
                Self::Formal => "Формальный",
                Self::Business => "Деловой",
                Self::Travel => "Для путешествий",
                Self::Academic => "Академический",
            },
            _ => match self {
                Self::Informal => "Informal",
                Self::Formal => "Formal",
                Self::Business => "Business",
                Self::Travel => "Travel",
                Self::Academic => "Academic",
            },
        }
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::Informal
    }
}

impl std::fmt::Display for Style {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identifier of a translation provider in the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// Highest quality, paid
    DeepL,
    /// Secondary, paid
    Yandex,
    /// Universal baseline, keyless
    Google,
}

impl ProviderId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DeepL => "deepl",
            Self::Yandex => "yandex",
            Self::Google => "google",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Static fallback order. Ordering encodes quality preference; the LLM
/// last resort sits after all of these and is driven by the LLM key alone.
pub const PROVIDER_PRIORITY: [ProviderId; 3] =
    [ProviderId::DeepL, ProviderId::Yandex, ProviderId::Google];

/// Per-provider slice of a resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub provider: ProviderId,
    pub enabled: bool,
    pub api_key: Option<String>,
}

/// Fully resolved, request-scoped provider configuration.
///
/// Built once per `translate()` call by the settings resolver and immutable
/// afterwards; every downstream component reads from this snapshot instead of
/// re-querying the override store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Providers in fixed priority order.
    pub providers: Vec<ProviderSettings>,
    /// API key for the LLM (last-resort translation and style enhancement).
    pub llm_api_key: Option<String>,
    /// Whether LLM style enhancement is switched on for this deployment.
    pub enhance_enabled: bool,
}

impl ProviderConfig {
    pub fn settings_for(&self, id: ProviderId) -> Option<&ProviderSettings> {
        self.providers.iter().find(|s| s.provider == id)
    }
}

/// LLM backend configuration for OpenAI-compatible chat APIs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_api_base")]
    pub api_base: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_llm_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o".to_string()
}

const fn default_llm_timeout_secs() -> u64 {
    60
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: default_llm_api_base(),
            model: default_llm_model(),
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

/// Static deployment configuration.
///
/// These are the compile-time/boot-time defaults; the override store can
/// replace any key or kill-switch at runtime without a redeploy (see
/// `settings::SettingsResolver`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticConfig {
    pub deepl_api_key: Option<String>,
    #[serde(default = "default_true")]
    pub deepl_enabled: bool,

    pub yandex_api_key: Option<String>,
    #[serde(default = "default_true")]
    pub yandex_enabled: bool,

    #[serde(default = "default_true")]
    pub google_enabled: bool,

    pub openai_api_key: Option<String>,
    #[serde(default = "default_true")]
    pub enhance_enabled: bool,

    /// LLM backend settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Per-call timeout for provider HTTP requests
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,
}

const fn default_true() -> bool {
    true
}

const fn default_provider_timeout_secs() -> u64 {
    15
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            deepl_api_key: None,
            deepl_enabled: true,
            yandex_api_key: None,
            yandex_enabled: true,
            google_enabled: true,
            openai_api_key: None,
            enhance_enabled: true,
            llm: LlmConfig::default(),
            provider_timeout_secs: default_provider_timeout_secs(),
        }
    }
}

impl StaticConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, crate::error::Error> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            crate::error::Error::ConfigLoad(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        toml::from_str(&content).map_err(|e| {
            crate::error::Error::ConfigLoad(format!("Failed to parse config: {e}"))
        })
    }

    /// Load from default locations (~/.config/chat-translator/config.toml, ./config.toml)
    pub fn load() -> Self {
        if let Some(config_dir) = crate::util::config_dir() {
            let user_config = config_dir.join("chat-translator").join("config.toml");
            if user_config.exists() {
                match Self::from_file(&user_config) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {}", user_config.display());
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        let local_config = std::path::PathBuf::from("config.toml");
        if local_config.exists() {
            match Self::from_file(&local_config) {
                Ok(config) => {
                    tracing::debug!("Loaded config from ./config.toml");
                    return config;
                }
                Err(e) => {
                    tracing::warn!("Failed to load ./config.toml: {}", e);
                }
            }
        }

        tracing::debug!("No config file found, using defaults");
        Self::default()
    }
}

/// Get a language's display name in the given interface language.
///
/// Falls back to the English table for unknown interface languages and to the
/// upper-cased raw code for unknown language codes. Used purely for
/// user-facing labels, never for provider calls.
pub fn get_language_name(code: &str, display_language: &str) -> String {
    let name = match display_language {
        "ru" => language_name_ru(code),
        _ => language_name_en(code),
    };
    name.map_or_else(|| code.to_uppercase(), ToString::to_string)
}

fn language_name_en(code: &str) -> Option<&'static str> {
    let name = match code {
        "en" => "English",
        "ru" => "Russian",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "it" => "Italian",
        "pt" => "Portuguese",
        "ja" => "Japanese",
        "zh" => "Chinese",
        "ko" => "Korean",
        "ar" => "Arabic",
        "hi" => "Hindi",
        "tr" => "Turkish",
        "pl" => "Polish",
        "nl" => "Dutch",
        "sv" => "Swedish",
        "da" => "Danish",
        "no" => "Norwegian",
        "fi" => "Finnish",
        "cs" => "Czech",
        "hu" => "Hungarian",
        "ro" => "Romanian",
        "uk" => "Ukrainian",
        "he" => "Hebrew",
        "th" => "Thai",
        "vi" => "Vietnamese",
        _ => return None,
    };
    Some(name)
}

fn language_name_ru(code: &str) -> Option<&'static str> {
    let name = match code {
        "en" => "Английский",
        "ru" => "Русский",
        "es" => "Испанский",
        "fr" => "Французский",
        "de" => "Немецкий",
        "it" => "Итальянский",
        "pt" => "Португальский",
        "ja" => "Японский",
        "zh" => "Китайский",
        "ko" => "Корейский",
        "ar" => "Арабский",
        "hi" => "Хинди",
        "tr" => "Турецкий",
        "pl" => "Польский",
        "nl" => "Нидерландский",
        "sv" => "Шведский",
        "da" => "Датский",
        "no" => "Норвежский",
        "fi" => "Финский",
        "cs" => "Чешский",
        "hu" => "Венгерский",
        "ro" => "Румынский",
        "uk" => "Украинский",
        "he" => "Иврит",
        "th" => "Тайский",
        "vi" => "Вьетнамский",
        _ => return None,
    };
    Some(name)
}

/// Convert a language code to an English name for LLM prompts.
///
/// The LLM understands most ISO codes, so unknown codes degrade to a generic
/// phrase rather than failing the prompt.
pub fn prompt_language_name(lang: &Lang) -> &'static str {
    language_name_en(lang.as_str()).unwrap_or("the specified language")
}
