use serde::{Deserialize, Serialize};

use crate::routing::ListenerKind;

/// A single containerized service declared in the registry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDescriptor {
    /// Service name; also names the image repository and every derived resource
    pub name: String,

    /// Attach to the public listener instead of the internal one
    pub internet_facing: bool,

    /// Port the process listens on inside its container
    pub container_port: u16,

    /// Path probed by the target group health check
    pub health_check_path: String,

    /// Task memory reservation in MiB
    pub memory_limit: u32,

    /// Task CPU reservation in CPU units (1024 = one vCPU)
    pub cpu_limit: u32,

    /// Target replica count
    pub desired_count: u32,

    /// Listener rule priority, lower is evaluated first
    pub priority: u32,

    /// Path pattern routed to this service, e.g. `/accounts*`
    pub alb_path: String,
}

impl ServiceDescriptor {
    /// The listener this service is placed behind
    pub fn listener(&self) -> ListenerKind {
        ListenerKind::for_service(self)
    }

    pub fn repository_name(&self) -> &str {
        &self.name
    }

    pub fn container_name(&self) -> String {
        format!("{}-Container", self.name)
    }

    pub fn log_stream_prefix(&self) -> String {
        format!("{}-Logs", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_internal_service() {
        let json = r#"{
            "name": "account-service",
            "internetFacing": false,
            "containerPort": 3000,
            "healthCheckPath": "/health",
            "memoryLimit": 512,
            "cpuLimit": 256,
            "desiredCount": 1,
            "priority": 2,
            "albPath": "/accounts*"
        }"#;

        let service: ServiceDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(service.name, "account-service");
        assert!(!service.internet_facing);
        assert_eq!(service.container_port, 3000);
        assert_eq!(service.alb_path, "/accounts*");
        assert_eq!(service.listener(), ListenerKind::Internal);
    }

    #[test]
    fn test_parse_missing_field() {
        let json = r#"{
            "name": "frontend-app",
            "internetFacing": true
        }"#;

        let result: Result<ServiceDescriptor, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_uses_camel_case() {
        let service = ServiceDescriptor {
            name: "frontend-app".to_string(),
            internet_facing: true,
            container_port: 80,
            health_check_path: "/health".to_string(),
            memory_limit: 512,
            cpu_limit: 256,
            desired_count: 1,
            priority: 4,
            alb_path: "/*".to_string(),
        };

        let value = serde_json::to_value(&service).unwrap();
        assert_eq!(value["internetFacing"], true);
        assert_eq!(value["healthCheckPath"], "/health");
        assert_eq!(value["albPath"], "/*");
    }

    #[test]
    fn test_derived_names() {
        let service = ServiceDescriptor {
            name: "customer-service".to_string(),
            internet_facing: false,
            container_port: 3000,
            health_check_path: "/health".to_string(),
            memory_limit: 512,
            cpu_limit: 256,
            desired_count: 1,
            priority: 3,
            alb_path: "/customers*".to_string(),
        };

        assert_eq!(service.repository_name(), "customer-service");
        assert_eq!(service.container_name(), "customer-service-Container");
        assert_eq!(service.log_stream_prefix(), "customer-service-Logs");
    }
}
