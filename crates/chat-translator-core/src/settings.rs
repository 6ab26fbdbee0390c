//! Runtime settings resolution.
//!
//! API keys and provider kill-switches must be changeable by an operator at
//! runtime without a redeploy, so static deployment defaults are overlaid
//! with a mutable key-value store (the admin dashboard writes to it, this
//! engine only reads). The resolver merges both into a single immutable
//! [`ProviderConfig`] snapshot per request; a total failure of the store
//! degrades to "use static configuration" rather than aborting translation.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::{
    ProviderConfig, ProviderId, ProviderSettings, StaticConfig, PROVIDER_PRIORITY,
};

/// Setting keys understood by the resolver. These match the key names the
/// operator dashboard writes.
pub mod keys {
    pub const DEEPL_ENABLED: &str = "deepl_enabled";
    pub const DEEPL_API_KEY: &str = "deepl_api_key";
    pub const YANDEX_ENABLED: &str = "yandex_enabled";
    pub const YANDEX_API_KEY: &str = "yandex_api_key";
    pub const GOOGLE_ENABLED: &str = "google_enabled";
    pub const OPENAI_API_KEY: &str = "openai_api_key";
    pub const ENHANCE_ENABLED: &str = "gpt_enhance_enabled";
}

/// Error type for override store lookups. The store is an external
/// collaborator (typically database-backed), so the error is opaque here.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Mutable, operator-editable key-value configuration store.
#[async_trait]
pub trait OverrideStore: Send + Sync {
    /// Fetch an override value. `Ok(None)` means no override is set.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
}

/// Override store that never overrides anything. Useful for deployments
/// without an admin dashboard and for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOverrides;

#[async_trait]
impl OverrideStore for NoOverrides {
    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Ok(None)
    }
}

/// Merges static deployment configuration with the override store into a
/// request-scoped [`ProviderConfig`]. Never errors.
pub struct SettingsResolver {
    defaults: StaticConfig,
    store: Arc<dyn OverrideStore>,
}

impl SettingsResolver {
    pub fn new(defaults: StaticConfig, store: Arc<dyn OverrideStore>) -> Self {
        Self { defaults, store }
    }

    pub const fn defaults(&self) -> &StaticConfig {
        &self.defaults
    }

    /// Resolve the full provider configuration for one request.
    pub async fn resolve(&self) -> ProviderConfig {
        let mut providers = Vec::with_capacity(PROVIDER_PRIORITY.len());
        for id in PROVIDER_PRIORITY {
            providers.push(self.resolve_provider(id).await);
        }

        let llm_api_key = self
            .resolve_key(keys::OPENAI_API_KEY, self.defaults.openai_api_key.clone())
            .await;
        let enhance_enabled = self
            .resolve_flag(keys::ENHANCE_ENABLED, self.defaults.enhance_enabled)
            .await;

        ProviderConfig {
            providers,
            llm_api_key,
            enhance_enabled,
        }
    }

    async fn resolve_provider(&self, id: ProviderId) -> ProviderSettings {
        let (enabled_key, key_key, default_enabled, default_key) = match id {
            ProviderId::DeepL => (
                keys::DEEPL_ENABLED,
                Some(keys::DEEPL_API_KEY),
                self.defaults.deepl_enabled,
                self.defaults.deepl_api_key.clone(),
            ),
            ProviderId::Yandex => (
                keys::YANDEX_ENABLED,
                Some(keys::YANDEX_API_KEY),
                self.defaults.yandex_enabled,
                self.defaults.yandex_api_key.clone(),
            ),
            // Google is the keyless baseline; only the kill-switch applies
            ProviderId::Google => (keys::GOOGLE_ENABLED, None, self.defaults.google_enabled, None),
        };

        let enabled = self.resolve_flag(enabled_key, default_enabled).await;
        let api_key = match key_key {
            Some(key) => self.resolve_key(key, default_key).await,
            None => None,
        };

        ProviderSettings {
            provider: id,
            enabled,
            api_key,
        }
    }

    /// Look up one override. Store failures and absent/empty values both
    /// resolve to `None`; empty strings count as "not set" so an operator can
    /// clear a key back to the default.
    async fn lookup(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(Some(value)) if !value.trim().is_empty() => Some(value),
            Ok(_) => None,
            Err(e) => {
                warn!("Override store lookup failed for '{}': {}, using default", key, e);
                None
            }
        }
    }

    async fn resolve_flag(&self, key: &str, default: bool) -> bool {
        match self.lookup(key).await {
            Some(value) => match parse_flag(&value) {
                Some(flag) => flag,
                None => {
                    warn!(
                        "Unparseable override '{}' for '{}', using default {}",
                        value, key, default
                    );
                    default
                }
            },
            None => {
                debug!("No override for '{}', using default {}", key, default);
                default
            }
        }
    }

    async fn resolve_key(&self, key: &str, default: Option<String>) -> Option<String> {
        match self.lookup(key).await {
            Some(value) => Some(value),
            None => {
                debug!("No override for '{}', using static default", key);
                default.filter(|k| !k.trim().is_empty())
            }
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
