use thiserror::Error;

/// Unified error type for chat-translator-core
///
/// Only two variants ever reach callers of the engine façade:
/// - `DetectionFailed` when the source language cannot be determined
/// - `AllProvidersFailed` when every enabled provider (including the LLM
///   last resort) failed or was unavailable
///
/// The remaining variants describe transport-level failures inside a single
/// provider or LLM attempt. The fallback controller and the enhancement step
/// catch and log them at the point of occurrence; they never propagate past
/// that boundary.
#[derive(Error, Debug)]
pub enum Error {
    // ==========================================================================
    // Terminal Errors (surfaced to the caller)
    // ==========================================================================
    /// Source language could not be determined and none was supplied
    #[error("could not detect source language")]
    DetectionFailed,

    /// Every configured translation provider failed
    #[error("all translation providers failed")]
    AllProvidersFailed,

    // ==========================================================================
    // Provider Errors (caught by the fallback controller)
    // ==========================================================================
    /// Provider API request failed
    #[error("provider request failed: {0}")]
    ProviderRequest(String),

    /// Provider returned a response we could not interpret
    #[error("invalid provider response: {0}")]
    ProviderInvalidResponse(String),

    /// Provider request timed out
    #[error("provider request timed out")]
    ProviderTimeout,

    // ==========================================================================
    // LLM Errors (caught by the enhancement step / last-resort fallback)
    // ==========================================================================
    /// LLM completion request failed
    #[error("LLM request failed: {0}")]
    LlmRequest(String),

    /// LLM returned a response with no usable completion
    #[error("invalid LLM response: {0}")]
    LlmInvalidResponse(String),

    // ==========================================================================
    // Configuration Errors
    // ==========================================================================
    /// Failed to load configuration file
    #[error("failed to load config: {0}")]
    ConfigLoad(String),
}

pub type Result<T> = std::result::Result<T, Error>;
