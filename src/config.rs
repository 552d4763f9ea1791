//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration file (config/default.toml, config/local.toml)
//! 3. Environment variables (override)

use std::path::Path;

use serde::Deserialize;

use crate::federation::{DEFAULT_ACTOR_TYPES, DEFAULT_POST_TYPES, TypeRegistry};

/// Main kernel configuration
#[derive(Debug, Clone, Deserialize)]
pub struct KernelConfig {
    pub federation: FederationConfig,
    pub logging: LoggingConfig,
}

/// Federation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FederationConfig {
    pub delete: DeleteConfig,
    pub types: TypeTableConfig,
}

/// Delete activity handling
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteConfig {
    /// Whether routed deletions reach the handlers
    #[serde(default)]
    pub policy: DeletePolicy,
}

/// Execution strategy applied after routing
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeletePolicy {
    /// Call the deletion handler
    Execute,
    /// Acknowledge the activity without calling any handler
    #[default]
    Suppress,
}

/// Recognized object type labels
#[derive(Debug, Clone, Deserialize)]
pub struct TypeTableConfig {
    /// Types deleted through the note-deletion handler
    pub post: Vec<String>,
    /// Types deleted through the actor-deletion handler
    pub actor: Vec<String>,
}

impl Default for TypeTableConfig {
    fn default() -> Self {
        Self {
            post: DEFAULT_POST_TYPES.iter().map(|s| s.to_string()).collect(),
            actor: DEFAULT_ACTOR_TYPES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl LoggingConfig {
    /// Filter directive for this crate at the configured level.
    pub fn filter_directive(&self) -> String {
        format!("apkernel={}", self.level.to_ascii_lowercase())
    }

    /// Subscriber filter: `RUST_LOG` wins when set, otherwise `logging.level`.
    pub fn env_filter(&self) -> tracing_subscriber::EnvFilter {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(self.filter_directive()))
    }

    pub fn is_json(&self) -> bool {
        self.format == "json"
    }
}

impl KernelConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (APKERNEL__*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::KernelError> {
        use config::File;

        Self::build(
            Self::defaults()?
                .add_source(File::with_name("config/default").required(false))
                .add_source(File::with_name("config/local").required(false)),
        )
    }

    /// Load configuration from an explicit file, still honoring the
    /// environment overrides.
    pub fn load_from_file(path: &Path) -> Result<Self, crate::error::KernelError> {
        use config::File;

        Self::build(Self::defaults()?.add_source(File::from(path).required(true)))
    }

    fn defaults()
    -> Result<config::ConfigBuilder<config::builder::DefaultState>, crate::error::KernelError>
    {
        let table = TypeTableConfig::default();
        Ok(config::Config::builder()
            .set_default("federation.delete.policy", "suppress")?
            .set_default("federation.types.post", table.post)?
            .set_default("federation.types.actor", table.actor)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?)
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, crate::error::KernelError> {
        use config::Environment;

        let config = builder
            .add_source(
                Environment::with_prefix("APKERNEL")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("federation.types.post")
                    .with_list_parse_key("federation.types.actor")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::KernelError::Config(e.to_string()))?;

        let kernel_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::KernelError::Config(e.to_string()))?;
        kernel_config.validate()?;
        Ok(kernel_config)
    }

    fn validate(&self) -> Result<(), crate::error::KernelError> {
        TypeRegistry::from_config(&self.federation.types)?;

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(crate::error::KernelError::Config(format!(
                "logging.format must be \"pretty\" or \"json\", got {:?}",
                self.logging.format
            )));
        }

        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(crate::error::KernelError::Config(format!(
                "logging.level must be one of trace, debug, info, warn, error, got {:?}",
                self.logging.level
            )));
        }

        Ok(())
    }
}
