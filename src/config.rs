use std::time::Duration;

use crate::error::ConfigError;

pub const TOKEN_VAR: &str = "AIPROXY_TOKEN";
pub const URL_VAR: &str = "AIPROXY_URL";
pub const MODEL_VAR: &str = "AIPROXY_MODEL";
pub const TIMEOUT_VAR: &str = "AIPROXY_TIMEOUT_SECS";

pub const DEFAULT_API_URL: &str = "https://aiproxy.sanand.workers.dev/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for the narrative endpoint, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_token: String,
    pub api_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl Config {
    /// Load from the process environment after merging a `.env` file from
    /// the working directory, if one exists. Variables already set win.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_token = get(TOKEN_VAR).ok_or(ConfigError::Missing(TOKEN_VAR))?;
        let api_url = get(URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let model = get(MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let timeout = match get(TIMEOUT_VAR) {
            None => DEFAULT_TIMEOUT,
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        name: TIMEOUT_VAR,
                        expected: "a positive number of seconds",
                        value: raw,
                    })
                }
            },
        };

        Ok(Config {
            api_token,
            api_url,
            model,
            timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn token_is_required() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing(TOKEN_VAR));
        assert_eq!(
            err.to_string(),
            "AIPROXY_TOKEN environment variable is not set."
        );

        let blank = Config::from_lookup(lookup(&[(TOKEN_VAR, "  ")])).unwrap_err();
        assert_eq!(blank, ConfigError::Missing(TOKEN_VAR));
    }

    #[test]
    fn defaults_apply() {
        let cfg = Config::from_lookup(lookup(&[(TOKEN_VAR, "secret")])).unwrap();
        assert_eq!(cfg.api_token, "secret");
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
        assert_eq!(cfg.model, DEFAULT_MODEL);
        assert_eq!(cfg.timeout, Duration::from_secs(30));
    }

    #[test]
    fn overrides_apply() {
        let cfg = Config::from_lookup(lookup(&[
            (TOKEN_VAR, "t"),
            (URL_VAR, "http://localhost:9/v1/chat/completions"),
            (MODEL_VAR, "gpt-4o"),
            (TIMEOUT_VAR, "5"),
        ]))
        .unwrap();
        assert_eq!(cfg.api_url, "http://localhost:9/v1/chat/completions");
        assert_eq!(cfg.model, "gpt-4o");
        assert_eq!(cfg.timeout, Duration::from_secs(5));
    }

    #[test]
    fn bad_timeout_is_rejected() {
        for raw in ["0", "-3", "soon"] {
            let err = Config::from_lookup(lookup(&[(TOKEN_VAR, "t"), (TIMEOUT_VAR, raw)])).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { name: TIMEOUT_VAR, .. }), "{raw}");
        }
    }
}
