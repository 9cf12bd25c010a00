//! Registry linting
//!
//! The topology builder accepts any registry. This module is the opt-in
//! check that reports what the provisioning engine would reject (or what is
//! likely a mistake) before a plan is handed over.
//!
//! # Checks
//! - Unique service names and valid repository names
//! - Unique rule priorities per listener, within the provider's range
//! - Path-pattern syntax, and rules shadowed by an earlier catch-all
//! - Fargate CPU/memory combinations
//! - Health check paths, container ports, replica counts

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::registry::ServiceRegistry;
use super::service::ServiceDescriptor;
use crate::routing::{check_syntax, is_catch_all, ListenerKind};

/// Highest rule priority a listener accepts
pub const MAX_RULE_PRIORITY: u32 = 50_000;

static REPOSITORY_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-z0-9]+(?:[._-][a-z0-9]+)*/)*[a-z0-9]+(?:[._-][a-z0-9]+)*$")
        .expect("Invalid regex in REPOSITORY_NAME")
});

/// Validation result with severity levels
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ValidationSeverity {
    /// Informational hint
    Info,
    /// Warning - deployable but probably not intended
    Warning,
    /// Error - the provider will reject the plan
    Error,
}

/// A single validation message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationMessage {
    pub severity: ValidationSeverity,
    pub code: String,
    /// Service the message is about, if any
    pub service: Option<String>,
    pub message: String,
    pub suggestion: Option<String>,
}

/// Validation result containing all messages
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    pub messages: Vec<ValidationMessage>,
    pub passed: bool,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            passed: true,
        }
    }

    pub fn add(&mut self, msg: ValidationMessage) {
        if msg.severity == ValidationSeverity::Error {
            self.passed = false;
        }
        self.messages.push(msg);
    }

    fn push(
        &mut self,
        severity: ValidationSeverity,
        code: &str,
        service: Option<&str>,
        message: String,
        suggestion: Option<&str>,
    ) {
        self.add(ValidationMessage {
            severity,
            code: code.to_string(),
            service: service.map(String::from),
            message,
            suggestion: suggestion.map(String::from),
        });
    }

    pub fn info(&mut self, code: &str, service: Option<&str>, message: String) {
        self.push(ValidationSeverity::Info, code, service, message, None);
    }

    pub fn warning(&mut self, code: &str, service: Option<&str>, message: String, suggestion: Option<&str>) {
        self.push(ValidationSeverity::Warning, code, service, message, suggestion);
    }

    pub fn error(&mut self, code: &str, service: Option<&str>, message: String, suggestion: Option<&str>) {
        self.push(ValidationSeverity::Error, code, service, message, suggestion);
    }

    pub fn has_errors(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.severity == ValidationSeverity::Error)
    }

    pub fn has_warnings(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.severity == ValidationSeverity::Warning)
    }

    /// Messages carrying a given code
    pub fn with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a ValidationMessage> {
        self.messages.iter().filter(move |m| m.code == code)
    }
}

// ============================================================================
// SBIO: Pure validation logic (no I/O)
// ============================================================================

/// Memory sizes (MiB) Fargate accepts for each CPU size
pub fn fargate_task_sizes() -> BTreeMap<u32, Vec<u32>> {
    let mut sizes = BTreeMap::new();
    sizes.insert(256, vec![512, 1024, 2048]);
    sizes.insert(512, (1..=4).map(|gb| gb * 1024).collect());
    sizes.insert(1024, (2..=8).map(|gb| gb * 1024).collect());
    sizes.insert(2048, (4..=16).map(|gb| gb * 1024).collect());
    sizes.insert(4096, (8..=30).map(|gb| gb * 1024).collect());
    sizes.insert(8192, (4..=15).map(|step| step * 4096).collect());
    sizes.insert(16384, (4..=15).map(|step| step * 8192).collect());
    sizes
}

/// Checks that only concern one descriptor
pub fn validate_service(service: &ServiceDescriptor) -> ValidationResult {
    let mut result = ValidationResult::new();
    let name = Some(service.name.as_str());

    if !(2..=256).contains(&service.name.len()) || !REPOSITORY_NAME.is_match(&service.name) {
        result.error(
            "INVALID_NAME",
            name,
            format!("'{}' is not a valid image repository name", service.name),
            Some("Use 2-256 lowercase letters, digits and single '.', '_' or '-' separators"),
        );
    }

    if service.container_port == 0 {
        result.error(
            "INVALID_PORT",
            name,
            "containerPort must be greater than 0".to_string(),
            None,
        );
    }

    if !service.health_check_path.starts_with('/') {
        result.error(
            "INVALID_HEALTH_CHECK_PATH",
            name,
            format!(
                "Health check path '{}' must start with '/'",
                service.health_check_path
            ),
            None,
        );
    }

    if service.priority == 0 || service.priority > MAX_RULE_PRIORITY {
        result.error(
            "PRIORITY_OUT_OF_RANGE",
            name,
            format!(
                "Priority {} is outside 1..={}",
                service.priority, MAX_RULE_PRIORITY
            ),
            None,
        );
    }

    if let Err(e) = check_syntax(&service.alb_path) {
        result.error("INVALID_PATH_PATTERN", name, e.to_string(), None);
    }

    let sizes = fargate_task_sizes();
    match sizes.get(&service.cpu_limit) {
        Some(memory) if memory.contains(&service.memory_limit) => {}
        Some(memory) => result.error(
            "INVALID_TASK_SIZE",
            name,
            format!(
                "{} MiB is not a valid memory size for {} CPU units",
                service.memory_limit, service.cpu_limit
            ),
            Some(&format!(
                "Pick one of {}",
                memory
                    .iter()
                    .map(|m| m.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        ),
        None => result.error(
            "INVALID_TASK_SIZE",
            name,
            format!("{} is not a valid Fargate CPU size", service.cpu_limit),
            Some(&format!(
                "Pick one of {}",
                sizes
                    .keys()
                    .map(|c| c.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        ),
    }

    if service.desired_count == 0 {
        result.info(
            "ZERO_REPLICAS",
            name,
            "desiredCount is 0; the service is deployed without running tasks".to_string(),
        );
    }

    result
}

/// Lint a whole registry: per-service checks followed by cross-service checks.
pub fn validate_registry(registry: &ServiceRegistry) -> ValidationResult {
    let mut result = ValidationResult::new();

    if registry.is_empty() {
        result.warning(
            "EMPTY_REGISTRY",
            None,
            "Registry declares no services; both listeners only serve the default response"
                .to_string(),
            None,
        );
    }

    for service in registry {
        for msg in validate_service(service).messages {
            result.add(msg);
        }
    }

    let mut seen = HashSet::new();
    for service in registry {
        if !seen.insert(service.name.as_str()) {
            result.error(
                "DUPLICATE_NAME",
                Some(&service.name),
                format!("Service name '{}' is declared more than once", service.name),
                Some("Service names key the repositories and every derived resource"),
            );
        }
    }

    let mut by_priority: HashMap<(ListenerKind, u32), &str> = HashMap::new();
    for service in registry {
        let key = (service.listener(), service.priority);
        if let Some(first) = by_priority.get(&key) {
            result.error(
                "DUPLICATE_PRIORITY",
                Some(&service.name),
                format!(
                    "Priority {} on the {} listener is already used by '{}'",
                    service.priority, key.0, first
                ),
                Some("Priorities must be unique per listener"),
            );
        } else {
            by_priority.insert(key, &service.name);
        }
    }

    for listener in ListenerKind::ALL {
        let on_listener: Vec<_> = registry
            .iter()
            .filter(|s| s.listener() == listener)
            .collect();
        for catch_all in on_listener.iter().filter(|s| is_catch_all(&s.alb_path)) {
            for shadowed in on_listener
                .iter()
                .filter(|s| s.priority > catch_all.priority)
            {
                result.warning(
                    "SHADOWED_ROUTE",
                    Some(&shadowed.name),
                    format!(
                        "Rule '{}' (priority {}) is unreachable behind catch-all '{}' (priority {})",
                        shadowed.alb_path, shadowed.priority, catch_all.alb_path, catch_all.priority
                    ),
                    Some("Give the catch-all rule the highest priority number on the listener"),
                );
            }
        }
    }

    result
}
