//! # Issuance Configuration
//!
//! Prefix fields and lock granularity. Layered lowest to highest:
//! built-in defaults, environment, YAML file. Command-line flags are applied
//! on top by the binary.
//!
//! | Key | Environment | Default |
//! |-----|-------------|---------|
//! | `provider_prefix` | `CPSRN_PROVIDER_PREFIX` | `788346` |
//! | `org_prefix` | `CPSRN_ORG_PREFIX` | `26649` |
//! | `lock_scope` | `CPSRN_LOCK_SCOPE` | `per_category` |

use std::path::Path;

use cpsrn_core::{IssuanceError, RegistryPrefix};
use serde::{Deserialize, Serialize};

use crate::coordinator::LockScope;
use crate::error::ConfigError;

/// Environment variable overriding the provider prefix.
pub const ENV_PROVIDER_PREFIX: &str = "CPSRN_PROVIDER_PREFIX";
/// Environment variable overriding the organisation prefix.
pub const ENV_ORG_PREFIX: &str = "CPSRN_ORG_PREFIX";
/// Environment variable overriding the lock scope.
pub const ENV_LOCK_SCOPE: &str = "CPSRN_LOCK_SCOPE";

/// Resolved issuance settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceConfig {
    pub provider_prefix: String,
    pub org_prefix: String,
    pub lock_scope: LockScope,
}

impl Default for IssuanceConfig {
    fn default() -> Self {
        Self {
            provider_prefix: RegistryPrefix::DEFAULT_PROVIDER.to_string(),
            org_prefix: RegistryPrefix::DEFAULT_ORG.to_string(),
            lock_scope: LockScope::default(),
        }
    }
}

/// File layer: every key optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    provider_prefix: Option<String>,
    org_prefix: Option<String>,
    lock_scope: Option<LockScope>,
}

impl IssuanceConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`, keyed by environment
    /// variable name.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(provider) = lookup(ENV_PROVIDER_PREFIX) {
            config.provider_prefix = provider;
        }
        if let Some(org) = lookup(ENV_ORG_PREFIX) {
            config.org_prefix = org;
        }
        if let Some(scope) = lookup(ENV_LOCK_SCOPE) {
            config.lock_scope = scope.parse()?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Environment layer plus, if given, the YAML file at `path`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::from_env()?;
        if let Some(path) = path {
            config.merge_yaml_file(path)?;
        }
        Ok(config)
    }

    /// Overlay keys present in the YAML file at `path`.
    pub fn merge_yaml_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.merge_yaml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded issuance config");
        Ok(())
    }

    /// Overlay keys present in `yaml`.
    pub fn merge_yaml_str(&mut self, yaml: &str) -> Result<(), ConfigError> {
        let file: ConfigFile = if yaml.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        if let Some(provider) = file.provider_prefix {
            self.provider_prefix = provider;
        }
        if let Some(org) = file.org_prefix {
            self.org_prefix = org;
        }
        if let Some(scope) = file.lock_scope {
            self.lock_scope = scope;
        }
        self.validate()
    }

    /// The registry prefix these settings describe.
    pub fn prefix(&self) -> Result<RegistryPrefix, ConfigError> {
        RegistryPrefix::new(self.provider_prefix.as_str(), self.org_prefix.as_str()).map_err(
            |e| match e {
                IssuanceError::InvalidInput(msg) => ConfigError::Invalid(msg),
                other => ConfigError::Invalid(other.to_string()),
            },
        )
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.prefix().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_production_prefix() {
        let config = IssuanceConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, IssuanceConfig::default());
        assert_eq!(config.prefix().unwrap().to_string(), "788346-26649");
        assert_eq!(config.lock_scope, LockScope::PerCategory);
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = IssuanceConfig::from_lookup(lookup(&[
            (ENV_PROVIDER_PREFIX, "100"),
            (ENV_ORG_PREFIX, "200"),
            (ENV_LOCK_SCOPE, "global"),
        ]))
        .unwrap();
        assert_eq!(config.prefix().unwrap().to_string(), "100-200");
        assert_eq!(config.lock_scope, LockScope::Global);
    }

    #[test]
    fn invalid_environment_is_rejected() {
        assert!(matches!(
            IssuanceConfig::from_lookup(lookup(&[(ENV_PROVIDER_PREFIX, "abc")])),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            IssuanceConfig::from_lookup(lookup(&[(ENV_LOCK_SCOPE, "sharded")])),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn yaml_overrides_only_present_keys() {
        let mut config = IssuanceConfig::default();
        config.merge_yaml_str("lock_scope: global\n").unwrap();
        assert_eq!(config.lock_scope, LockScope::Global);
        assert_eq!(config.provider_prefix, "788346");

        config.merge_yaml_str("").unwrap();
        assert_eq!(config.lock_scope, LockScope::Global);
    }

    #[test]
    fn yaml_unknown_keys_are_rejected() {
        let mut config = IssuanceConfig::default();
        assert!(matches!(
            config.merge_yaml_str("prefix: 1\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn yaml_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "provider_prefix: \"123\"\norg_prefix: \"456\"").unwrap();

        let mut config = IssuanceConfig::default();
        config.merge_yaml_file(file.path()).unwrap();
        assert_eq!(config.prefix().unwrap().to_string(), "123-456");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = IssuanceConfig::default();
        let err = config.merge_yaml_file(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
