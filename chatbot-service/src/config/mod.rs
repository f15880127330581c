use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;

/// Region the inference endpoint is addressed in.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Anthropic Claude 3 Sonnet on Bedrock.
pub const DEFAULT_MODEL_ID: &str = "anthropic.claude-3-sonnet-20240229-v1:0";

pub const DEFAULT_MAX_TOKENS: u32 = 1000;

pub const DEFAULT_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone, Deserialize)]
pub struct ChatbotConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub inference: InferenceSettings,
    pub provider: ProviderKind,
    pub otlp_endpoint: Option<String>,
}

/// Fixed generation parameters sent with every inference call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InferenceSettings {
    pub region: String,
    pub model_id: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Only serialized into the payload when set.
    pub anthropic_version: Option<String>,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            anthropic_version: None,
        }
    }
}

/// Which inference backend the service talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Bedrock,
    Mock,
}

impl FromStr for ProviderKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bedrock" => Ok(ProviderKind::Bedrock),
            "mock" => Ok(ProviderKind::Mock),
            other => Err(AppError::ConfigError(anyhow::anyhow!(
                "Unknown inference provider '{}', expected 'bedrock' or 'mock'",
                other
            ))),
        }
    }
}

impl ChatbotConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(ChatbotConfig {
            common: common_config,
            inference: InferenceSettings {
                region: get_env("AWS_REGION", Some(DEFAULT_REGION), is_prod)?,
                model_id: get_env("CHATBOT_MODEL_ID", Some(DEFAULT_MODEL_ID), is_prod)?,
                max_tokens: parse_env(
                    "CHATBOT_MAX_TOKENS",
                    &DEFAULT_MAX_TOKENS.to_string(),
                    is_prod,
                )?,
                temperature: parse_env(
                    "CHATBOT_TEMPERATURE",
                    &DEFAULT_TEMPERATURE.to_string(),
                    is_prod,
                )?,
                anthropic_version: env::var("CHATBOT_ANTHROPIC_VERSION")
                    .ok()
                    .filter(|v| !v.is_empty()),
            },
            provider: get_env("CHATBOT_PROVIDER", Some("bedrock"), is_prod)?.parse()?,
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|v| !v.is_empty()),
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

fn parse_env<T>(key: &str, default: &str, is_prod: bool) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = get_env(key, Some(default), is_prod)?;
    raw.trim().parse().map_err(|e: T::Err| {
        AppError::ConfigError(anyhow::anyhow!("{} has invalid value '{}': {}", key, raw, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_match_constants() {
        let settings = InferenceSettings::default();
        assert_eq!(settings.region, "us-east-1");
        assert_eq!(settings.model_id, "anthropic.claude-3-sonnet-20240229-v1:0");
        assert_eq!(settings.max_tokens, 1000);
        assert_eq!(settings.temperature, 0.7);
        assert!(settings.anthropic_version.is_none());
    }

    #[test]
    fn provider_kind_parses_case_insensitively() {
        assert_eq!("Bedrock".parse::<ProviderKind>().unwrap(), ProviderKind::Bedrock);
        assert_eq!("mock".parse::<ProviderKind>().unwrap(), ProviderKind::Mock);
        assert!("openai".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn get_env_falls_back_to_default_outside_prod() {
        let value = get_env("CHATBOT_TEST_UNSET_VARIABLE", Some("fallback"), false).unwrap();
        assert_eq!(value, "fallback");
    }

    #[test]
    fn get_env_requires_value_in_prod() {
        let err = get_env("CHATBOT_TEST_UNSET_VARIABLE", Some("fallback"), true).unwrap_err();
        assert!(err.to_string().contains("required in production"));
    }

    #[test]
    fn parse_env_uses_default_and_reports_bad_values() {
        let tokens: u32 = parse_env("CHATBOT_TEST_UNSET_TOKENS", "1000", false).unwrap();
        assert_eq!(tokens, 1000);

        env::set_var("CHATBOT_TEST_BAD_TOKENS", "abc");
        let err = parse_env::<u32>("CHATBOT_TEST_BAD_TOKENS", "1000", false).unwrap_err();
        assert!(err.to_string().contains("CHATBOT_TEST_BAD_TOKENS has invalid value 'abc'"));
    }
}
