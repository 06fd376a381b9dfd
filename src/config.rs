use std::env;
use std::fmt;

use thiserror::Error;
use tracing::warn;
use url::Url;

pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_LANGSMITH_ENDPOINT: &str = "https://api.smith.langchain.com";
pub const DEFAULT_LANGSMITH_PROJECT: &str = "default";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not a valid URL: {source}")]
    InvalidUrl {
        var: &'static str,
        #[source]
        source: url::ParseError,
    },
}

/// Everything the process reads from its environment, gathered once at start-up.
#[derive(Clone)]
pub struct Config {
    pub groq_api_key: Option<String>,
    pub model: String,
    pub base_url: Url,
    pub tracing: Option<TracingConfig>,
}

/// LangSmith trace submission settings. Present only when tracing is enabled
/// and a key is available.
#[derive(Clone)]
pub struct TracingConfig {
    pub api_key: String,
    pub endpoint: Url,
    pub project: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // .env files written for the Python tooling use lowercase names
        let first = |keys: &[&str]| {
            keys.iter()
                .filter_map(|key| lookup(*key))
                .find(|value| !value.trim().is_empty())
        };

        let groq_api_key = first(&["GROQ_API_KEY", "groq_api_key"]);
        let model = first(&["GROQ_MODEL"]).unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = parse_url(
            "GROQ_BASE_URL",
            first(&["GROQ_BASE_URL"]).as_deref().unwrap_or(DEFAULT_GROQ_BASE_URL),
        )?;

        let tracing_enabled = first(&["LANGCHAIN_TRACING_V2", "LANGSMITH_TRACING"])
            .map(|flag| is_truthy(&flag))
            .unwrap_or(false);

        let tracing = if tracing_enabled {
            match first(&["LANGSMITH_API_KEY", "langsmith_api_key"]) {
                Some(api_key) => Some(TracingConfig {
                    api_key,
                    endpoint: parse_url(
                        "LANGSMITH_ENDPOINT",
                        first(&["LANGSMITH_ENDPOINT"])
                            .as_deref()
                            .unwrap_or(DEFAULT_LANGSMITH_ENDPOINT),
                    )?,
                    project: first(&["LANGSMITH_PROJECT"])
                        .unwrap_or_else(|| DEFAULT_LANGSMITH_PROJECT.to_string()),
                }),
                None => {
                    warn!("Trace submission requested but LANGSMITH_API_KEY is not set; tracing disabled");
                    None
                }
            }
        } else {
            None
        };

        Ok(Self {
            groq_api_key,
            model,
            base_url,
            tracing,
        })
    }

    /// Applies command line flags on top of the environment.
    pub fn with_overrides(
        mut self,
        model: Option<String>,
        base_url: Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(model) = model {
            self.model = model;
        }
        if let Some(base_url) = base_url {
            self.base_url = parse_url("--base-url", &base_url)?;
        }
        Ok(self)
    }
}

fn parse_url(var: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value.trim()).map_err(|source| ConfigError::InvalidUrl { var, source })
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}

fn redact(key: &Option<String>) -> &'static str {
    if key.is_some() {
        "<redacted>"
    } else {
        "<unset>"
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("groq_api_key", &redact(&self.groq_api_key))
            .field("model", &self.model)
            .field("base_url", &self.base_url.as_str())
            .field("tracing", &self.tracing)
            .finish()
    }
}

impl fmt::Debug for TracingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracingConfig")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint.as_str())
            .field("project", &self.project)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = load(&[]).unwrap();
        assert!(config.groq_api_key.is_none());
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.base_url.as_str(), "https://api.groq.com/openai/v1");
        assert!(config.tracing.is_none());
    }

    #[test]
    fn lowercase_key_names_are_accepted() {
        let config = load(&[("groq_api_key", "gsk-lower")]).unwrap();
        assert_eq!(config.groq_api_key.as_deref(), Some("gsk-lower"));

        let config = load(&[("GROQ_API_KEY", "gsk-upper"), ("groq_api_key", "gsk-lower")]).unwrap();
        assert_eq!(config.groq_api_key.as_deref(), Some("gsk-upper"));
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let config = load(&[("GROQ_API_KEY", "  ")]).unwrap();
        assert!(config.groq_api_key.is_none());
    }

    #[test]
    fn tracing_needs_flag_and_key() {
        let config = load(&[("LANGSMITH_API_KEY", "ls-key")]).unwrap();
        assert!(config.tracing.is_none());

        let config = load(&[("LANGCHAIN_TRACING_V2", "true")]).unwrap();
        assert!(config.tracing.is_none());

        let config = load(&[
            ("LANGCHAIN_TRACING_V2", "TRUE"),
            ("langsmith_api_key", "ls-key"),
            ("LANGSMITH_PROJECT", "chatbot"),
        ])
        .unwrap();
        let tracing = config.tracing.unwrap();
        assert_eq!(tracing.api_key, "ls-key");
        assert_eq!(tracing.project, "chatbot");
        assert_eq!(tracing.endpoint.as_str(), "https://api.smith.langchain.com/");
    }

    #[test]
    fn false_flag_disables_tracing() {
        let config = load(&[
            ("LANGSMITH_TRACING", "false"),
            ("LANGSMITH_API_KEY", "ls-key"),
        ])
        .unwrap();
        assert!(config.tracing.is_none());
    }

    #[test]
    fn invalid_url_is_reported() {
        let err = load(&[("GROQ_BASE_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { var: "GROQ_BASE_URL", .. }));
    }

    #[test]
    fn overrides_replace_environment_values() {
        let config = load(&[("GROQ_MODEL", "llama-3.3-70b-versatile")])
            .unwrap()
            .with_overrides(Some("gemma2-9b-it".into()), Some("http://localhost:9000/v1".into()))
            .unwrap();
        assert_eq!(config.model, "gemma2-9b-it");
        assert_eq!(config.base_url.as_str(), "http://localhost:9000/v1");
    }

    #[test]
    fn debug_output_hides_keys() {
        let config = load(&[
            ("GROQ_API_KEY", "gsk-secret"),
            ("LANGCHAIN_TRACING_V2", "1"),
            ("LANGSMITH_API_KEY", "ls-secret"),
        ])
        .unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("gsk-secret"));
        assert!(!rendered.contains("ls-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
