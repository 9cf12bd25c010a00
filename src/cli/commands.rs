//! Command implementations for the CLI
//!
//! SBIO pattern: Commands return Results, I/O is handled by caller

use std::path::Path;

use thiserror::Error;

use super::OutputFormat;
use crate::config::{
    default_settings_path, load_registry_file, load_settings_file, validate_registry, ConfigError,
    ServiceRegistry, StackSettings, ValidationResult, ValidationSeverity,
};
use crate::plan::{DeploymentPlan, PlanError, TopologyBuilder};
use crate::routing::{ListenerKind, PatternError, RouteDecision, RoutingTable};

/// Errors that can occur during command execution
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    #[error("Pattern error: {0}")]
    Pattern(#[from] PatternError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Registry has {0} validation error(s); refusing to synthesize")]
    StrictValidation(usize),
}

/// Result type for commands
pub type CommandResult<T> = Result<T, CommandError>;

// ============================================================================
// Loading
// ============================================================================

/// Load the registry from a file, or fall back to the built-in registry
pub fn load_registry(path: Option<&Path>) -> CommandResult<ServiceRegistry> {
    match path {
        Some(path) => Ok(load_registry_file(path)?),
        None => {
            tracing::debug!("no registry file given, using the built-in registry");
            Ok(ServiceRegistry::builtin())
        }
    }
}

/// Load stack settings from the given file, else from
/// `~/.ecs-topology/settings.yaml` if it exists, else use the built-in defaults
pub fn load_settings(path: Option<&Path>) -> CommandResult<StackSettings> {
    load_settings_from(path, &default_settings_path())
}

/// Same as [`load_settings`] with an explicit fallback location
pub fn load_settings_from(path: Option<&Path>, fallback: &Path) -> CommandResult<StackSettings> {
    if let Some(path) = path {
        return Ok(load_settings_file(path)?);
    }
    if fallback.exists() {
        tracing::debug!(path = %fallback.display(), "using default settings file");
        return Ok(load_settings_file(fallback)?);
    }
    Ok(StackSettings::default())
}

// ============================================================================
// Synth
// ============================================================================

/// A synthesized plan and its serialized form
#[derive(Debug)]
pub struct SynthOutput {
    pub plan: DeploymentPlan,
    /// Serialized plan, terminated by exactly one newline
    pub document: String,
    pub fingerprint: String,
    /// Lint result when synthesized in strict mode
    pub validation: Option<ValidationResult>,
}

/// Build and serialize the plan. In strict mode the registry is linted first.
pub fn synth(
    registry: &ServiceRegistry,
    settings: &StackSettings,
    format: OutputFormat,
    strict: bool,
) -> CommandResult<SynthOutput> {
    let validation = if strict {
        let result = validate_registry(registry);
        let errors = result
            .messages
            .iter()
            .filter(|m| m.severity == ValidationSeverity::Error)
            .count();
        if errors > 0 {
            return Err(CommandError::StrictValidation(errors));
        }
        Some(result)
    } else {
        None
    };

    let plan = TopologyBuilder::new(settings.clone()).build(registry);
    plan.check_references()?;

    let mut document = match format {
        OutputFormat::Json => plan.to_json()?,
        OutputFormat::Yaml => plan.to_yaml()?,
    };
    if !document.ends_with('\n') {
        document.push('\n');
    }
    let fingerprint = plan.fingerprint()?;

    Ok(SynthOutput {
        plan,
        document,
        fingerprint,
        validation,
    })
}

// ============================================================================
// Routing
// ============================================================================

pub fn routing_table(registry: &ServiceRegistry, settings: &StackSettings) -> RoutingTable {
    RoutingTable::from_registry(registry, settings.default_response.clone())
}

/// Resolve a path on one listener, or on both when none is given
pub fn resolve_path(
    table: &RoutingTable,
    listener: Option<ListenerKind>,
    path: &str,
) -> CommandResult<Vec<(ListenerKind, RouteDecision)>> {
    let listeners = match listener {
        Some(kind) => vec![kind],
        None => ListenerKind::ALL.to_vec(),
    };

    let mut decisions = Vec::with_capacity(listeners.len());
    for kind in listeners {
        decisions.push((kind, table.resolve(kind, path)?));
    }
    Ok(decisions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceDescriptor;

    fn duplicate_priority_registry() -> ServiceRegistry {
        let svc = |name: &str, alb_path: &str| ServiceDescriptor {
            name: name.to_string(),
            internet_facing: false,
            container_port: 3000,
            health_check_path: "/health".to_string(),
            memory_limit: 512,
            cpu_limit: 256,
            desired_count: 1,
            priority: 2,
            alb_path: alb_path.to_string(),
        };
        ServiceRegistry::new(vec![svc("a1", "/a*"), svc("b1", "/b*")])
    }

    #[test]
    fn test_load_registry_defaults_to_builtin() {
        let registry = load_registry(None).unwrap();
        assert_eq!(registry, ServiceRegistry::builtin());
    }

    #[test]
    fn test_load_settings_explicit_file() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        std::fs::write(file.path(), "stackName: prod\n").unwrap();
        let settings = load_settings(Some(file.path())).unwrap();
        assert_eq!(settings.stack_name, "prod");
    }

    #[test]
    fn test_load_settings_prefers_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("explicit.yaml");
        let fallback = dir.path().join("settings.yaml");
        std::fs::write(&explicit, "stackName: explicit\n").unwrap();
        std::fs::write(&fallback, "stackName: fallback\n").unwrap();

        let settings = load_settings_from(Some(&explicit), &fallback).unwrap();
        assert_eq!(settings.stack_name, "explicit");
    }

    #[test]
    fn test_load_settings_uses_fallback_file() {
        let dir = tempfile::tempdir().unwrap();
        let fallback = dir.path().join("settings.yaml");
        std::fs::write(&fallback, "stackName: fallback\nmaxAzs: 3\n").unwrap();

        let settings = load_settings_from(None, &fallback).unwrap();
        assert_eq!(settings.stack_name, "fallback");
        assert_eq!(settings.max_azs, 3);
        assert_eq!(settings.listener_port, 80);
    }

    #[test]
    fn test_load_settings_defaults_without_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings_from(None, &dir.path().join("settings.yaml")).unwrap();
        assert_eq!(settings, StackSettings::default());
    }

    #[test]
    fn test_load_settings_malformed_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let fallback = dir.path().join("settings.yaml");
        std::fs::write(&fallback, "maxAzs: [oops\n").unwrap();

        let result = load_settings_from(None, &fallback);
        assert!(matches!(
            result,
            Err(CommandError::Config(ConfigError::SettingsError(_)))
        ));
    }

    #[test]
    fn test_load_settings_missing_file() {
        let result = load_settings(Some(Path::new("/nonexistent/settings.yaml")));
        assert!(matches!(
            result,
            Err(CommandError::Config(ConfigError::IoError(_)))
        ));
    }

    #[test]
    fn test_synth_json() {
        let output = synth(
            &ServiceRegistry::builtin(),
            &StackSettings::default(),
            OutputFormat::Json,
            false,
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output.document).unwrap();
        assert_eq!(value["kind"], "DeploymentPlan");
        assert!(output.document.ends_with("}\n"));
        assert_eq!(output.fingerprint, output.plan.fingerprint().unwrap());
        assert!(output.validation.is_none());
    }

    #[test]
    fn test_synth_yaml() {
        let output = synth(
            &ServiceRegistry::builtin(),
            &StackSettings::default(),
            OutputFormat::Yaml,
            true,
        )
        .unwrap();
        assert!(output.document.contains("kind: DeploymentPlan"));
        assert!(output.document.ends_with('\n'));
        assert!(!output.document.ends_with("\n\n"));
        assert!(output.validation.unwrap().passed);
    }

    #[test]
    fn test_synth_lenient_accepts_duplicate_priority() {
        let output = synth(
            &duplicate_priority_registry(),
            &StackSettings::default(),
            OutputFormat::Json,
            false,
        )
        .unwrap();
        assert_eq!(output.plan.rules_on(ListenerKind::Internal).len(), 2);
    }

    #[test]
    fn test_synth_strict_rejects_duplicate_priority() {
        let result = synth(
            &duplicate_priority_registry(),
            &StackSettings::default(),
            OutputFormat::Json,
            true,
        );
        assert!(matches!(result, Err(CommandError::StrictValidation(1))));
    }

    #[test]
    fn test_resolve_both_listeners() {
        let table = routing_table(&ServiceRegistry::builtin(), &StackSettings::default());
        let decisions = resolve_path(&table, None, "/customers/7").unwrap();
        assert_eq!(decisions.len(), 2);
        assert_eq!(
            decisions[0],
            (
                ListenerKind::Public,
                RouteDecision::Forward {
                    service: "frontend-app".to_string(),
                    priority: 4
                }
            )
        );
        assert_eq!(
            decisions[1],
            (
                ListenerKind::Internal,
                RouteDecision::Forward {
                    service: "customer-service".to_string(),
                    priority: 3
                }
            )
        );
    }
}
