pub mod registry;
pub mod service;
pub mod settings;
pub mod validation;

pub use registry::{parse_registry, strip_jsonc_comments, RegistryError, RegistryFormat, ServiceRegistry};
pub use service::ServiceDescriptor;
pub use settings::{parse_settings, FixedResponse, SettingsError, StackSettings};
pub use validation::{validate_registry, ValidationMessage, ValidationResult, ValidationSeverity};

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default settings file location: ~/.ecs-topology/settings.yaml
pub fn default_settings_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ecs-topology")
        .join("settings.yaml")
}

/// Errors for file I/O operations (separate from pure parsing errors)
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Registry error: {0}")]
    RegistryError(#[from] RegistryError),

    #[error("Settings error: {0}")]
    SettingsError(#[from] SettingsError),
}

// ============================================================================
// SBIO: I/O wrapper - thin layer over pure functions
// ============================================================================

/// Load a service registry from disk; the extension selects YAML or JSON(C).
pub fn load_registry_file(path: &Path) -> Result<ServiceRegistry, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let format = RegistryFormat::from_extension(path.extension().and_then(|e| e.to_str()));
    let registry = parse_registry(&content, format)?;
    tracing::debug!(path = %path.display(), services = registry.len(), "loaded registry");
    Ok(registry)
}

/// Load stack settings from a YAML file.
pub fn load_settings_file(path: &Path) -> Result<StackSettings, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_settings(&content)?)
}
