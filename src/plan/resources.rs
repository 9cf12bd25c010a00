//! Resource definitions that make up a deployment plan
//!
//! Resources refer to each other by logical id. Nothing here talks to a
//! cloud API; the provisioning engine realizes these definitions.

use serde::{Deserialize, Serialize};

use crate::config::FixedResponse;

/// One node of the plan graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Resource {
    Repository(Repository),
    Vpc(Vpc),
    Cluster(Cluster),
    SecurityGroup(SecurityGroup),
    LoadBalancer(LoadBalancer),
    Listener(Listener),
    TaskDefinition(TaskDefinition),
    Service(FargateService),
    TargetGroup(TargetGroup),
    ListenerRule(ListenerRule),
    HostedZone(HostedZone),
    AliasRecord(AliasRecord),
}

impl Resource {
    pub fn kind(&self) -> &'static str {
        match self {
            Resource::Repository(_) => "Repository",
            Resource::Vpc(_) => "Vpc",
            Resource::Cluster(_) => "Cluster",
            Resource::SecurityGroup(_) => "SecurityGroup",
            Resource::LoadBalancer(_) => "LoadBalancer",
            Resource::Listener(_) => "Listener",
            Resource::TaskDefinition(_) => "TaskDefinition",
            Resource::Service(_) => "Service",
            Resource::TargetGroup(_) => "TargetGroup",
            Resource::ListenerRule(_) => "ListenerRule",
            Resource::HostedZone(_) => "HostedZone",
            Resource::AliasRecord(_) => "AliasRecord",
        }
    }

    /// Logical ids this resource depends on
    pub fn references(&self) -> Vec<&str> {
        match self {
            Resource::Repository(_) | Resource::Vpc(_) => vec![],
            Resource::Cluster(c) => vec![c.vpc.as_str()],
            Resource::SecurityGroup(sg) => vec![sg.vpc.as_str()],
            Resource::LoadBalancer(lb) => vec![lb.vpc.as_str(), lb.security_group.as_str()],
            Resource::Listener(l) => vec![l.load_balancer.as_str()],
            Resource::TaskDefinition(td) => td
                .containers
                .iter()
                .map(|c| c.image.repository.as_str())
                .collect(),
            Resource::Service(s) => vec![s.cluster.as_str(), s.task_definition.as_str()],
            Resource::TargetGroup(tg) => vec![tg.vpc.as_str(), tg.target_service.as_str()],
            Resource::ListenerRule(r) => vec![r.listener.as_str(), r.target_group.as_str()],
            Resource::HostedZone(z) => vec![z.vpc.as_str()],
            Resource::AliasRecord(a) => vec![a.zone.as_str(), a.target.as_str()],
        }
    }
}

/// Container image repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub repository_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubnetType {
    Public,
    PrivateWithNat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetGroup {
    pub name: String,
    pub subnet_type: SubnetType,
}

/// Virtual network with a single NAT instance for private egress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vpc {
    pub cidr: String,
    pub max_azs: u8,
    pub nat_gateways: u8,
    pub nat_instance_type: String,
    pub subnets: Vec<SubnetGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub vpc: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    Http,
    Tcp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressRule {
    /// Source CIDR block
    pub peer: String,
    pub protocol: Protocol,
    pub port: u16,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityGroup {
    pub vpc: String,
    pub ingress: Vec<IngressRule>,
}

/// Application load balancer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancer {
    pub vpc: String,
    pub internet_facing: bool,
    pub subnet_type: SubnetType,
    pub security_group: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listener {
    pub load_balancer: String,
    pub port: u16,
    pub protocol: Protocol,
    pub default_action: FixedResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSource {
    /// Logical id of the repository resource
    pub repository: String,
    pub repository_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogConfiguration {
    pub driver: String,
    pub stream_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortMapping {
    pub container_port: u16,
    pub protocol: Protocol,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerDefinition {
    pub name: String,
    pub image: ImageSource,
    pub logging: LogConfiguration,
    pub port_mappings: Vec<PortMapping>,
}

/// Fargate task definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDefinition {
    pub memory_limit_mib: u32,
    pub cpu: u32,
    pub containers: Vec<ContainerDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FargateService {
    pub cluster: String,
    pub task_definition: String,
    pub desired_count: u32,
    pub assign_public_ip: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheck {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetGroup {
    pub vpc: String,
    pub protocol: Protocol,
    pub port: u16,
    /// Logical id of the service whose tasks are registered
    pub target_service: String,
    pub target_container: String,
    pub health_check: HealthCheck,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "values", rename_all = "kebab-case")]
pub enum RuleCondition {
    PathPattern(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenerRule {
    pub listener: String,
    pub priority: u32,
    pub conditions: Vec<RuleCondition>,
    /// Forward action target
    pub target_group: String,
}

impl ListenerRule {
    /// Path patterns of all path-pattern conditions, in order
    pub fn path_patterns(&self) -> impl Iterator<Item = &str> {
        self.conditions.iter().flat_map(|c| match c {
            RuleCondition::PathPattern(values) => values.iter().map(String::as_str),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostedZone {
    pub zone_name: String,
    pub private: bool,
    pub vpc: String,
}

/// A-record alias; `record_name` equal to the zone name is the zone apex
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasRecord {
    pub zone: String,
    pub record_name: String,
    pub record_type: String,
    /// Logical id of the load balancer
    pub target: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_tagged_by_type() {
        let resource = Resource::Repository(Repository {
            repository_name: "frontend-app".to_string(),
        });
        let value = serde_json::to_value(&resource).unwrap();
        assert_eq!(value["type"], "Repository");
        assert_eq!(value["repositoryName"], "frontend-app");

        let back: Resource = serde_json::from_value(value).unwrap();
        assert_eq!(back, resource);
    }

    #[test]
    fn test_rule_condition_shape() {
        let condition = RuleCondition::PathPattern(vec!["/accounts*".to_string()]);
        let value = serde_json::to_value(&condition).unwrap();
        assert_eq!(value["field"], "path-pattern");
        assert_eq!(value["values"][0], "/accounts*");
    }

    #[test]
    fn test_listener_rule_references() {
        let rule = Resource::ListenerRule(ListenerRule {
            listener: "InternalHttpListener".to_string(),
            priority: 2,
            conditions: vec![RuleCondition::PathPattern(vec!["/accounts*".to_string()])],
            target_group: "account-service-TargetGroup".to_string(),
        });
        assert_eq!(
            rule.references(),
            vec!["InternalHttpListener", "account-service-TargetGroup"]
        );
        assert_eq!(rule.kind(), "ListenerRule");
    }

    #[test]
    fn test_subnet_type_names() {
        let value = serde_json::to_value(SubnetType::PrivateWithNat).unwrap();
        assert_eq!(value, "PRIVATE_WITH_NAT");
    }
}
