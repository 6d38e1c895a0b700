use crate::error::ApiError;
use crate::provider::{CompletionOptions, OpenAiCompatibleClient};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Completion provider configuration owned by the provider domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider type.
    #[serde(default = "default_provider_type")]
    pub provider_type: ProviderType,

    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// API key optional and can be loaded from environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL or endpoint provider specific.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Default completion options for this provider.
    #[serde(default)]
    pub default_options: CompletionOptions,
}

/// Provider type enumeration. All variants speak the chat-completions wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderType {
    #[serde(rename = "openai")]
    OpenAI,
    #[serde(rename = "ollama")]
    Ollama,
    #[serde(rename = "local")]
    LocalCustom,
}

fn default_provider_type() -> ProviderType {
    ProviderType::OpenAI
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: default_provider_type(),
            model: default_model(),
            api_key: None,
            endpoint: None,
            default_options: CompletionOptions::default(),
        }
    }
}

impl ProviderConfig {
    fn endpoint_has_scheme(endpoint: &str) -> bool {
        endpoint.starts_with("http://") || endpoint.starts_with("https://")
    }

    fn infer_endpoint_scheme(provider_type: ProviderType, endpoint: &str) -> String {
        let endpoint = endpoint.trim();
        if provider_type == ProviderType::LocalCustom && !Self::endpoint_has_scheme(endpoint) {
            format!("https://{}", endpoint)
        } else {
            endpoint.to_string()
        }
    }

    pub fn default_endpoint(provider_type: ProviderType) -> Option<&'static str> {
        match provider_type {
            ProviderType::OpenAI => Some("https://api.openai.com/v1"),
            ProviderType::Ollama => Some("http://localhost:11434/v1"),
            ProviderType::LocalCustom => None,
        }
    }

    /// Configured endpoint with scheme inferred, or the provider type's default.
    pub fn resolved_endpoint(&self) -> Option<String> {
        self.endpoint
            .as_deref()
            .map(|endpoint| Self::infer_endpoint_scheme(self.provider_type, endpoint))
            .or_else(|| Self::default_endpoint(self.provider_type).map(str::to_string))
    }

    pub fn endpoint_url_is_valid(provider_type: ProviderType, endpoint: &str) -> bool {
        let endpoint = Self::infer_endpoint_scheme(provider_type, endpoint);
        if !Self::endpoint_has_scheme(&endpoint) {
            return false;
        }

        let Some(rest) = endpoint.split_once("://").map(|(_, rest)| rest) else {
            return false;
        };

        if rest.is_empty() || rest.chars().any(char::is_whitespace) {
            return false;
        }

        let authority = rest.split('/').next().unwrap_or_default();
        let host_port = authority.rsplit('@').next().unwrap_or(authority);

        let host = if host_port.starts_with('[') {
            let Some(end_bracket) = host_port.find(']') else {
                return false;
            };
            &host_port[1..end_bracket]
        } else {
            host_port.split(':').next().unwrap_or_default()
        };

        if host.is_empty() {
            return false;
        }

        host == "localhost" || host.contains('.') || host.parse::<std::net::IpAddr>().is_ok()
    }

    /// Validate provider configuration.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.model.trim().is_empty() {
            return Err(ApiError::ConfigError("Model name cannot be empty".to_string()));
        }

        if let Some(endpoint) = &self.endpoint {
            if !Self::endpoint_url_is_valid(self.provider_type, endpoint) {
                return Err(ApiError::ConfigError(format!(
                    "Invalid endpoint URL: {}",
                    endpoint
                )));
            }
        }

        if let Some(temp) = self.default_options.temperature {
            if !(0.0..=2.0).contains(&temp) {
                return Err(ApiError::ConfigError(format!(
                    "Temperature must be between 0.0 and 2.0, got {}",
                    temp
                )));
            }
        }

        Ok(())
    }

    /// Build the chat-completions client this configuration describes.
    pub fn to_client(&self) -> Result<OpenAiCompatibleClient, ApiError> {
        self.validate()?;

        let api_key = self.api_key.clone().or_else(|| match self.provider_type {
            ProviderType::OpenAI => std::env::var("OPENAI_API_KEY").ok(),
            _ => None,
        });

        if self.provider_type == ProviderType::OpenAI && api_key.is_none() {
            return Err(ApiError::ProviderNotConfigured(
                "OpenAI API key required (set in config or OPENAI_API_KEY env var)".to_string(),
            ));
        }

        let endpoint = self.resolved_endpoint().ok_or_else(|| {
            ApiError::ProviderNotConfigured("LocalCustom provider requires endpoint".to_string())
        })?;

        debug!(provider = %self.provider_type, model = %self.model, endpoint = %endpoint, "Building completion client");
        OpenAiCompatibleClient::new(
            endpoint,
            self.model.clone(),
            api_key,
            self.default_options.clone(),
        )
    }
}
