use async_trait::async_trait;

use crate::config::{Lang, ProviderId};
use crate::error::Result;

/// Trait for translation provider backends.
///
/// Each provider has its own request/response shape, auth header, and
/// language-code dialect; those stay internal to the implementation. The API
/// key is passed per call because it is resolved per request.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Position of this provider in the static priority list.
    fn id(&self) -> ProviderId;

    /// Whether this provider needs an API key to be invoked at all.
    fn requires_api_key(&self) -> bool {
        true
    }

    /// Translate text from source language to target language.
    async fn translate(
        &self,
        text: &str,
        target: &Lang,
        source: &Lang,
        api_key: &str,
    ) -> Result<String>;
}
