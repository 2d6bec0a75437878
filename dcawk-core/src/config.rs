use std::io::{self, BufRead, Write as _};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::error::{DcawkError, Result};

pub const DEFAULT_CONFIG_FILE: &str = "api_config.json";
/// Generic fallback when the environment-specific variable is unset.
pub const FALLBACK_ENV_VAR: &str = "ELLUCIAN_API_KEY";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Prod,
    Test,
}

impl Environment {
    pub fn label(self) -> &'static str {
        match self {
            Environment::Prod => "production",
            Environment::Test => "test",
        }
    }

    pub fn env_var(self) -> &'static str {
        match self {
            Environment::Prod => "ELLUCIAN_API_KEY_PROD",
            Environment::Test => "ELLUCIAN_API_KEY_TEST",
        }
    }

    pub fn config_key(self) -> &'static str {
        match self {
            Environment::Prod => "prod_api_key",
            Environment::Test => "test_api_key",
        }
    }
}

/// On-disk key store. Unknown keys ride along untouched so a rewrite
/// never loses anything another tool put in the file.
#[derive(Serialize, Deserialize, Default, Debug)]
pub struct ApiConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prod_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_api_key: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ApiConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            DcawkError::Config(format!("configuration file {}: {e}", path.display()))
        })?;
        serde_json::from_str(&text)
            .map_err(|e| DcawkError::Config(format!("invalid JSON in {}: {e}", path.display())))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Stored key for one environment; whitespace-only entries count as
    /// absent.
    pub fn key_for(&self, env: Environment) -> Option<&str> {
        let key = match env {
            Environment::Prod => self.prod_api_key.as_deref(),
            Environment::Test => self.test_api_key.as_deref(),
        };
        key.map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn set_key(&mut self, env: Environment, key: String) {
        match env {
            Environment::Prod => self.prod_api_key = Some(key),
            Environment::Test => self.test_api_key = Some(key),
        }
    }
}

fn prompt_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Resolve the API key for one environment: environment variable first,
/// then the JSON config file, then an interactive prompt with optional
/// persistence back to the file. An empty prompt answer is fatal; a
/// failed save is only a warning.
pub fn resolve_api_key(env: Environment, config_path: &Path) -> Result<String> {
    for var in [env.env_var(), FALLBACK_ENV_VAR] {
        if let Ok(key) = std::env::var(var) {
            let key = key.trim().to_string();
            if !key.is_empty() {
                info!(var, "using {} API key from environment", env.label());
                return Ok(key);
            }
        }
    }

    let mut config = ApiConfig::load(config_path)?;
    if let Some(key) = config.key_for(env) {
        info!(path = %config_path.display(), "using {} API key from config file", env.label());
        return Ok(key.to_string());
    }

    let key = prompt_line(&format!("Enter {} API key: ", env.label()))?;
    if key.is_empty() {
        return Err(DcawkError::Config("API key is required".into()));
    }

    let save = prompt_line("Save this key to config file? (y/n): ")?;
    if save.eq_ignore_ascii_case("y") {
        config.set_key(env, key.clone());
        match config.save(config_path) {
            Ok(()) => info!(
                key = env.config_key(),
                path = %config_path.display(),
                "API key saved to config file"
            ),
            Err(err) => warn!(%err, "failed to save API key to config file"),
        }
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_lookup_trims_and_treats_blank_as_absent() {
        let config = ApiConfig {
            prod_api_key: Some("  abc-123  ".into()),
            test_api_key: Some("   ".into()),
            extra: Map::new(),
        };
        assert_eq!(config.key_for(Environment::Prod), Some("abc-123"));
        assert_eq!(config.key_for(Environment::Test), None);
    }

    #[test]
    fn unknown_keys_survive_a_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api_config.json");
        std::fs::write(
            &path,
            r#"{"prod_api_key": "p", "notes": "keep me", "retries": 3}"#,
        )
        .unwrap();

        let mut config = ApiConfig::load(&path).unwrap();
        config.set_key(Environment::Test, "t".into());
        config.save(&path).unwrap();

        let reloaded = ApiConfig::load(&path).unwrap();
        assert_eq!(reloaded.key_for(Environment::Prod), Some("p"));
        assert_eq!(reloaded.key_for(Environment::Test), Some("t"));
        assert_eq!(reloaded.extra.get("notes"), Some(&json!("keep me")));
        assert_eq!(reloaded.extra.get("retries"), Some(&json!(3)));
    }

    #[test]
    fn missing_config_file_is_a_descriptive_error() {
        let err = ApiConfig::load(Path::new("/nonexistent/api_config.json")).unwrap_err();
        assert!(err.to_string().contains("api_config.json"));
    }

    #[test]
    fn malformed_config_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api_config.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = ApiConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
    }
}
