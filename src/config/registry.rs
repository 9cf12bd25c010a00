use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::service::ServiceDescriptor;

/// Errors that can occur while parsing a registry document
#[derive(Error, Debug, PartialEq)]
pub enum RegistryError {
    #[error("JSON parse error: {0}")]
    Json(String),

    #[error("YAML parse error: {0}")]
    Yaml(String),
}

/// Source format of a registry document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryFormat {
    /// JSON, optionally with `//` and `/* */` comments
    Json,
    Yaml,
}

impl RegistryFormat {
    /// Pick the format from a file extension; anything that is not YAML is read as JSON(C)
    pub fn from_extension(ext: Option<&str>) -> Self {
        match ext {
            Some("yaml") | Some("yml") => RegistryFormat::Yaml,
            _ => RegistryFormat::Json,
        }
    }
}

/// Ordered, read-only list of the services in one deployment
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServiceRegistry {
    services: Vec<ServiceDescriptor>,
}

// ============================================================================
// SBIO: Pure parsing functions (no I/O)
// ============================================================================

#[derive(Clone, Copy, PartialEq)]
enum ScanState {
    Code,
    Str,
    StrEscape,
    LineComment,
    BlockComment,
}

/// Remove `//` and `/* */` comments from JSONC, leaving string literals untouched.
pub fn strip_jsonc_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut state = ScanState::Code;

    while let Some(c) = chars.next() {
        state = match (state, c) {
            (ScanState::Code, '"') => {
                out.push(c);
                ScanState::Str
            }
            (ScanState::Code, '/') if chars.peek() == Some(&'/') => {
                chars.next();
                ScanState::LineComment
            }
            (ScanState::Code, '/') if chars.peek() == Some(&'*') => {
                chars.next();
                ScanState::BlockComment
            }
            (ScanState::Code, _) => {
                out.push(c);
                ScanState::Code
            }
            (ScanState::Str, '\\') => {
                out.push(c);
                ScanState::StrEscape
            }
            (ScanState::Str, '"') => {
                out.push(c);
                ScanState::Code
            }
            (ScanState::Str, _) | (ScanState::StrEscape, _) => {
                out.push(c);
                ScanState::Str
            }
            (ScanState::LineComment, '\n') => {
                out.push('\n');
                ScanState::Code
            }
            (ScanState::LineComment, _) => ScanState::LineComment,
            (ScanState::BlockComment, '*') if chars.peek() == Some(&'/') => {
                chars.next();
                ScanState::Code
            }
            (ScanState::BlockComment, _) => ScanState::BlockComment,
        };
    }

    out
}

/// Parse a registry document in the given format.
/// Pure function - no I/O, and no semantic validation.
pub fn parse_registry(content: &str, format: RegistryFormat) -> Result<ServiceRegistry, RegistryError> {
    match format {
        RegistryFormat::Json => serde_json::from_str(&strip_jsonc_comments(content))
            .map_err(|e| RegistryError::Json(e.to_string())),
        RegistryFormat::Yaml => {
            serde_yaml::from_str(content).map_err(|e| RegistryError::Yaml(e.to_string()))
        }
    }
}

impl ServiceRegistry {
    pub fn new(services: Vec<ServiceDescriptor>) -> Self {
        Self { services }
    }

    /// The reference deployment: two internal APIs and a public frontend
    pub fn builtin() -> Self {
        let service = |name: &str, internet_facing, container_port, priority, alb_path: &str| {
            ServiceDescriptor {
                name: name.to_string(),
                internet_facing,
                container_port,
                health_check_path: "/health".to_string(),
                memory_limit: 512,
                cpu_limit: 256,
                desired_count: 1,
                priority,
                alb_path: alb_path.to_string(),
            }
        };

        Self::new(vec![
            service("account-service", false, 3000, 2, "/accounts*"),
            service("customer-service", false, 3000, 3, "/customers*"),
            service("frontend-app", true, 80, 4, "/*"),
        ])
    }

    pub fn services(&self) -> &[ServiceDescriptor] {
        &self.services
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ServiceDescriptor> {
        self.services.iter()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// First service with the given name
    pub fn get(&self, name: &str) -> Option<&ServiceDescriptor> {
        self.services.iter().find(|s| s.name == name)
    }
}

impl<'a> IntoIterator for &'a ServiceRegistry {
    type Item = &'a ServiceDescriptor;
    type IntoIter = std::slice::Iter<'a, ServiceDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.services.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_line_comments() {
        let input = "{\n  // services below\n  \"services\": []\n}";
        let result = strip_jsonc_comments(input);
        assert!(!result.contains("services below"));
        assert!(result.contains("\"services\": []"));
    }

    #[test]
    fn test_strip_block_comments() {
        let input = r#"{ /* block */ "services": [] }"#;
        let result = strip_jsonc_comments(input);
        assert!(!result.contains("block"));
        assert!(result.contains("\"services\": []"));
    }

    #[test]
    fn test_preserve_path_patterns_in_strings() {
        let input = r#"{"albPath": "/*", "note": "a // b", "quoted": "x\"/*y"}"#;
        assert_eq!(strip_jsonc_comments(input), input);
    }

    #[test]
    fn test_parse_jsonc_registry() {
        let jsonc = r#"{
            // internal API
            "services": [
                {
                    "name": "account-service",
                    "internetFacing": false,
                    "containerPort": 3000,
                    "healthCheckPath": "/health",
                    "memoryLimit": 512,
                    "cpuLimit": 256,
                    "desiredCount": 1,
                    "priority": 2,
                    "albPath": "/accounts*" /* prefix match */
                }
            ]
        }"#;

        let registry = parse_registry(jsonc, RegistryFormat::Json).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.services()[0].alb_path, "/accounts*");
    }

    #[test]
    fn test_parse_yaml_registry() {
        let yaml = r#"
services:
  - name: frontend-app
    internetFacing: true
    containerPort: 80
    healthCheckPath: /health
    memoryLimit: 512
    cpuLimit: 256
    desiredCount: 2
    priority: 4
    albPath: "/*"
"#;

        let registry = parse_registry(yaml, RegistryFormat::Yaml).unwrap();
        let frontend = registry.get("frontend-app").unwrap();
        assert!(frontend.internet_facing);
        assert_eq!(frontend.desired_count, 2);
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        let result = parse_registry(r#"{"services": [ {"name": "x"} ]}"#, RegistryFormat::Json);
        assert!(matches!(result, Err(RegistryError::Json(_))));
    }

    #[test]
    fn test_parse_accepts_duplicates() {
        let json = r#"{"services": [
            {"name": "a", "internetFacing": false, "containerPort": 1, "healthCheckPath": "/h",
             "memoryLimit": 512, "cpuLimit": 256, "desiredCount": 1, "priority": 1, "albPath": "/a*"},
            {"name": "a", "internetFacing": false, "containerPort": 1, "healthCheckPath": "/h",
             "memoryLimit": 512, "cpuLimit": 256, "desiredCount": 1, "priority": 1, "albPath": "/a*"}
        ]}"#;

        let registry = parse_registry(json, RegistryFormat::Json).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(RegistryFormat::from_extension(Some("yml")), RegistryFormat::Yaml);
        assert_eq!(RegistryFormat::from_extension(Some("yaml")), RegistryFormat::Yaml);
        assert_eq!(RegistryFormat::from_extension(Some("jsonc")), RegistryFormat::Json);
        assert_eq!(RegistryFormat::from_extension(None), RegistryFormat::Json);
    }

    #[test]
    fn test_builtin_registry_order() {
        let registry = ServiceRegistry::builtin();
        let names: Vec<_> = registry.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["account-service", "customer-service", "frontend-app"]);
    }
}
