use super::config::ProviderType;
use crate::error::ApiError;
use std::fmt;
use std::str::FromStr;

pub fn provider_type_slug(provider_type: ProviderType) -> &'static str {
    match provider_type {
        ProviderType::OpenAI => "openai",
        ProviderType::Ollama => "ollama",
        ProviderType::LocalCustom => "local",
    }
}

pub fn parse_provider_type(type_str: &str) -> Result<ProviderType, ApiError> {
    match type_str {
        "openai" => Ok(ProviderType::OpenAI),
        "ollama" => Ok(ProviderType::Ollama),
        "local" => Ok(ProviderType::LocalCustom),
        _ => Err(ApiError::ConfigError(format!(
            "Invalid provider type: {}. Must be openai, ollama, or local",
            type_str
        ))),
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(provider_type_slug(*self))
    }
}

impl FromStr for ProviderType {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_provider_type(s)
    }
}
