//! Layered configuration loading.
//!
//! Precedence, lowest first: struct defaults, TOML file, `GATEWAY__*` environment.

use config::{Config, Environment, File, FileFormat};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use super::{ConfigResult, ConfigurationError, GatewayConfig};

const CONFIG_PATH_VAR: &str = "GATEWAY_CONFIG_PATH";
const DEFAULT_CONFIG_FILE: &str = "config/gateway.toml";
const ENV_PREFIX: &str = "GATEWAY";
const ENV_SEPARATOR: &str = "__";

/// Loaded, validated configuration plus where it came from
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: GatewayConfig,
    environment: String,
    source_file: Option<PathBuf>,
}

impl ConfigManager {
    /// Load from `GATEWAY_CONFIG_PATH` (must exist when set), else from
    /// `config/gateway.toml` when present, then apply environment overrides.
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        let file = match env::var(CONFIG_PATH_VAR) {
            Ok(path) => {
                let path = PathBuf::from(path);
                if !path.exists() {
                    return Err(ConfigurationError::ConfigFileNotFound { path });
                }
                Some(path)
            }
            Err(_) => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                path.exists().then_some(path)
            }
        };

        Self::load_with(file.as_deref(), None).map(Arc::new)
    }

    /// Load a specific TOML file, then apply environment overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> ConfigResult<Arc<ConfigManager>> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigurationError::ConfigFileNotFound {
                path: path.to_path_buf(),
            });
        }
        Self::load_with(Some(path), None).map(Arc::new)
    }

    /// Parse inline TOML without consulting the process environment
    pub fn from_toml_str(toml: &str) -> ConfigResult<ConfigManager> {
        Self::build(
            Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
            None,
            Some(HashMap::new()),
        )
    }

    /// Entry point for tests that need environment overrides without touching
    /// the real process environment.
    pub fn load_with(
        file: Option<&Path>,
        env_overrides: Option<HashMap<String, String>>,
    ) -> ConfigResult<ConfigManager> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }
        Self::build(builder, file.map(Path::to_path_buf), env_overrides)
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        source_file: Option<PathBuf>,
        env_overrides: Option<HashMap<String, String>>,
    ) -> ConfigResult<ConfigManager> {
        let environment_source = Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true)
            .source(env_overrides);

        let config: GatewayConfig = builder
            .add_source(environment_source)
            .build()?
            .try_deserialize()?;

        config.validate()?;

        let environment = detect_environment();
        debug!(
            environment = %environment,
            source_file = ?source_file,
            "Configuration sources merged"
        );
        info!(
            environment = %environment,
            role = ?config.replica.role,
            workers = config.workers.count,
            max_retries = config.workers.max_retries,
            "⚙️ Gateway configuration loaded"
        );

        Ok(ConfigManager {
            config,
            environment,
            source_file,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn source_file(&self) -> Option<&Path> {
        self.source_file.as_deref()
    }
}

/// Current deployment environment name
pub fn detect_environment() -> String {
    env::var("GATEWAY_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}
