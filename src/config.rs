//! Configuration management and validation.
//!
//! The configuration is read once at start-up, optionally overridden from the
//! command line, validated, and then shared read-only with every pipeline
//! component.

use crate::constants::{DEFAULT_INDEX_NAME, VALIDATION_CONFIG_NAME, env};
use crate::error::{ProcessorError, Result};
use crate::models::ContainerRole;
use std::path::PathBuf;
use tracing::debug;

/// Search service settings
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Base URL of the search service; metadata is only logged when unset
    pub endpoint: Option<String>,
    pub index_name: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            index_name: DEFAULT_INDEX_NAME.to_string(),
        }
    }
}

/// Immutable processor configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Known key prefixes, matched in order
    pub known_prefixes: Vec<String>,
    pub submissions_container: String,
    pub curated_container: String,
    /// Deployment environment copied into every metadata document
    pub environment: String,
    pub verbose: bool,
    pub search: SearchConfig,
    /// Directory receiving staged downloads
    pub staging_dir: PathBuf,
    /// Object name of the validation configuration under a prefix
    pub validation_config_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            known_prefixes: Vec::new(),
            submissions_container: String::new(),
            curated_container: String::new(),
            environment: String::new(),
            verbose: false,
            search: SearchConfig::default(),
            staging_dir: std::env::temp_dir(),
            validation_config_name: VALIDATION_CONFIG_NAME.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| ProcessorError::configuration(format!("{} not configured", name)))
        };

        let mut config = Config {
            environment: required(env::ENVIRONMENT_NAME)?,
            submissions_container: required(env::SUBMISSIONS_BUCKET_NAME)?,
            curated_container: required(env::CURATED_BUCKET_NAME)?,
            known_prefixes: lookup(env::STATIC_PREFIXES)
                .map(|value| parse_prefixes(&value))
                .unwrap_or_default(),
            verbose: lookup(env::VERBOSE_OUTPUT).as_deref() == Some("TRUE"),
            ..Config::default()
        };

        if let Some(endpoint) = lookup(env::ELASTICSEARCH_ENDPOINT) {
            config.search.endpoint = Some(endpoint);
        }
        if let Some(staging_dir) = lookup(env::STAGING_DIR) {
            config.staging_dir = PathBuf::from(staging_dir);
        }

        debug!(
            "Loaded configuration: environment={}, {} known prefixes",
            config.environment,
            config.known_prefixes.len()
        );
        Ok(config)
    }

    pub fn with_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.known_prefixes = prefixes;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_staging_dir(mut self, staging_dir: PathBuf) -> Self {
        self.staging_dir = staging_dir;
        self
    }

    pub fn with_search_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.search.endpoint = Some(endpoint.into());
        self
    }

    /// Check the settings every pipeline variant depends on
    pub fn validate(&self) -> Result<()> {
        if self.environment.is_empty() {
            return Err(ProcessorError::configuration(
                "environment name must not be empty",
            ));
        }
        if self.submissions_container.is_empty() || self.curated_container.is_empty() {
            return Err(ProcessorError::configuration(
                "submissions and curated container names must be set",
            ));
        }
        if self.known_prefixes.iter().any(|prefix| prefix.is_empty()) {
            return Err(ProcessorError::configuration(
                "known prefixes must not contain empty entries",
            ));
        }
        Ok(())
    }

    /// Validation needs at least one known prefix to match keys against
    pub fn validate_for_validation(&self) -> Result<()> {
        self.validate()?;
        if self.known_prefixes.is_empty() {
            return Err(ProcessorError::configuration(format!(
                "{} not configured",
                env::STATIC_PREFIXES
            )));
        }
        Ok(())
    }

    /// Resolve the role of a container by name
    pub fn role_of(&self, container: &str) -> ContainerRole {
        if container == self.submissions_container {
            ContainerRole::Submissions
        } else if container == self.curated_container {
            ContainerRole::Curated
        } else {
            ContainerRole::Other
        }
    }

    /// First known prefix the key starts with
    pub fn match_prefix(&self, key: &str) -> Option<&str> {
        self.known_prefixes
            .iter()
            .map(String::as_str)
            .find(|prefix| key.starts_with(prefix))
    }

    /// Key of the validation configuration stored under a prefix
    pub fn validation_config_key(&self, prefix: &str) -> String {
        format!("{}/{}", prefix, self.validation_config_name)
    }
}

/// Split a comma-separated prefix list, dropping surrounding whitespace
pub fn parse_prefixes(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|prefix| !prefix.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    fn base_vars() -> Vec<(&'static str, &'static str)> {
        vec![
            (env::ENVIRONMENT_NAME, "dev"),
            (env::SUBMISSIONS_BUCKET_NAME, "submissions"),
            (env::CURATED_BUCKET_NAME, "curated"),
        ]
    }

    #[test]
    fn test_from_lookup_reads_required_values() {
        let mut vars = base_vars();
        vars.push((env::STATIC_PREFIXES, "cv/providerA, cv/providerB"));
        vars.push((env::VERBOSE_OUTPUT, "TRUE"));

        let config = Config::from_lookup(lookup_from(&vars)).unwrap();

        assert_eq!(config.environment, "dev");
        assert_eq!(config.submissions_container, "submissions");
        assert_eq!(config.curated_container, "curated");
        assert_eq!(config.known_prefixes, vec!["cv/providerA", "cv/providerB"]);
        assert!(config.verbose);
        assert_eq!(config.search.index_name, "metadata");
        assert!(config.validate_for_validation().is_ok());
    }

    #[test]
    fn test_missing_environment_is_configuration_error() {
        let vars = vec![
            (env::SUBMISSIONS_BUCKET_NAME, "submissions"),
            (env::CURATED_BUCKET_NAME, "curated"),
        ];

        match Config::from_lookup(lookup_from(&vars)) {
            Err(ProcessorError::Configuration { message }) => {
                assert!(message.contains(env::ENVIRONMENT_NAME));
            }
            other => panic!("Expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_verbose_requires_exact_true() {
        let mut vars = base_vars();
        vars.push((env::VERBOSE_OUTPUT, "true"));

        let config = Config::from_lookup(lookup_from(&vars)).unwrap();
        assert!(!config.verbose);
    }

    #[test]
    fn test_validation_variant_requires_prefixes() {
        let config = Config::from_lookup(lookup_from(&base_vars())).unwrap();

        assert!(config.validate().is_ok());
        assert!(matches!(
            config.validate_for_validation(),
            Err(ProcessorError::Configuration { .. })
        ));
    }

    #[test]
    fn test_role_of_containers() {
        let config = Config::from_lookup(lookup_from(&base_vars())).unwrap();

        assert_eq!(config.role_of("submissions"), ContainerRole::Submissions);
        assert_eq!(config.role_of("curated"), ContainerRole::Curated);
        assert_eq!(config.role_of("other"), ContainerRole::Other);
    }

    #[test]
    fn test_match_prefix_first_match_wins() {
        let config = Config::default().with_prefixes(vec![
            "cv/provider".to_string(),
            "cv/providerA".to_string(),
        ]);

        assert_eq!(
            config.match_prefix("cv/providerA/typeX/file1"),
            Some("cv/provider")
        );
        assert_eq!(config.match_prefix("waze/type=x/file1"), None);
    }

    #[test]
    fn test_validation_config_key() {
        let config = Config::default();
        assert_eq!(
            config.validation_config_key("cv/providerA"),
            "cv/providerA/config.ini"
        );
    }
}
