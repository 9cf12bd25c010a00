//! Topology builder
//!
//! Translates a service registry into a [`DeploymentPlan`] in one linear pass:
//! repositories, network, cluster, public listener, internal listener,
//! per-service routing, DNS. The builder never validates the registry;
//! conflicts such as duplicate priorities are left for the provisioning
//! engine to reject.

use tracing::{debug, info, warn};

use super::resources::*;
use super::DeploymentPlan;
use crate::config::{ServiceDescriptor, ServiceRegistry, StackSettings};
use crate::routing::{ListenerKind, RouteRule};

/// Logical ids of the fixed resources and the per-service naming scheme
pub mod logical_ids {
    use crate::routing::ListenerKind;

    pub const VPC: &str = "VPC-for-ECS";
    pub const CLUSTER: &str = "ECS-Cluster";
    pub const PUBLIC_SECURITY_GROUP: &str = "InternetFacingAlbSG";
    pub const PUBLIC_LOAD_BALANCER: &str = "InternetFacingAlB";
    pub const PUBLIC_LISTENER: &str = "HTTPListenerForWeb";
    pub const INTERNAL_SECURITY_GROUP: &str = "InternalAlbSG";
    pub const INTERNAL_LOAD_BALANCER: &str = "InternalAlb";
    pub const INTERNAL_LISTENER: &str = "InternalHttpListener";
    pub const HOSTED_ZONE: &str = "Route53-Private-HostedZone";
    pub const ALIAS_RECORD: &str = "AliasRecord";

    pub fn listener(kind: ListenerKind) -> &'static str {
        match kind {
            ListenerKind::Public => PUBLIC_LISTENER,
            ListenerKind::Internal => INTERNAL_LISTENER,
        }
    }

    pub fn repository(service: &str) -> String {
        format!("ECR-Repository-{}", service)
    }

    pub fn task_definition(service: &str) -> String {
        format!("{}-TaskDefinition", service)
    }

    pub fn service(service: &str) -> String {
        format!("{}-ECS-Service", service)
    }

    pub fn target_group(service: &str) -> String {
        format!("{}-TargetGroup", service)
    }

    pub fn listener_rule(service: &str) -> String {
        format!("{}-ListenerRule", service)
    }
}

/// Builds deployment plans for a fixed set of stack settings
#[derive(Debug, Clone, Default)]
pub struct TopologyBuilder {
    settings: StackSettings,
}

/// Build a plan with the default stack settings
pub fn build(registry: &ServiceRegistry) -> DeploymentPlan {
    TopologyBuilder::default().build(registry)
}

impl TopologyBuilder {
    pub fn new(settings: StackSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &StackSettings {
        &self.settings
    }

    /// Translate the registry into a plan. Reads each descriptor once, in order.
    pub fn build(&self, registry: &ServiceRegistry) -> DeploymentPlan {
        let mut plan = DeploymentPlan::new(&self.settings.stack_name);

        self.add_repositories(&mut plan, registry);
        self.add_network(&mut plan);
        self.add_cluster(&mut plan);
        self.add_public_listener(&mut plan);
        self.add_internal_listener(&mut plan);
        for service in registry {
            self.add_service(&mut plan, service);
        }
        self.add_dns(&mut plan);

        info!(
            stack = %self.settings.stack_name,
            services = registry.len(),
            resources = plan.len(),
            "built deployment plan"
        );
        plan
    }

    fn add_repositories(&self, plan: &mut DeploymentPlan, registry: &ServiceRegistry) {
        for service in registry {
            let id = logical_ids::repository(&service.name);
            let repository = Resource::Repository(Repository {
                repository_name: service.repository_name().to_string(),
            });
            put(plan, id, repository);
        }
        debug!(count = registry.len(), "derived image repositories");
    }

    fn add_network(&self, plan: &mut DeploymentPlan) {
        let vpc = Vpc {
            cidr: self.settings.vpc_cidr.clone(),
            max_azs: self.settings.max_azs,
            nat_gateways: 1,
            nat_instance_type: self.settings.nat_instance_type.clone(),
            subnets: vec![
                SubnetGroup {
                    name: "Public".to_string(),
                    subnet_type: SubnetType::Public,
                },
                SubnetGroup {
                    name: "Private".to_string(),
                    subnet_type: SubnetType::PrivateWithNat,
                },
            ],
        };
        debug!(cidr = %vpc.cidr, azs = vpc.max_azs, "derived network");
        put(plan, logical_ids::VPC, Resource::Vpc(vpc));
    }

    fn add_cluster(&self, plan: &mut DeploymentPlan) {
        let cluster = Cluster {
            vpc: logical_ids::VPC.to_string(),
        };
        put(plan, logical_ids::CLUSTER, Resource::Cluster(cluster));
        debug!("derived compute cluster");
    }

    fn add_public_listener(&self, plan: &mut DeploymentPlan) {
        self.add_load_balancer(
            plan,
            ListenerKind::Public,
            IngressRule {
                peer: "0.0.0.0/0".to_string(),
                protocol: Protocol::Tcp,
                port: self.settings.listener_port,
                description: "HTTP Access".to_string(),
            },
        );
    }

    fn add_internal_listener(&self, plan: &mut DeploymentPlan) {
        self.add_load_balancer(
            plan,
            ListenerKind::Internal,
            IngressRule {
                peer: self.settings.vpc_cidr.clone(),
                protocol: Protocol::Tcp,
                port: self.settings.listener_port,
                description: "Internal HTTP Access".to_string(),
            },
        );
    }

    /// Security group, load balancer and listener for one side of the topology
    fn add_load_balancer(&self, plan: &mut DeploymentPlan, kind: ListenerKind, ingress: IngressRule) {
        let (sg_id, lb_id, subnet_type) = match kind {
            ListenerKind::Public => (
                logical_ids::PUBLIC_SECURITY_GROUP,
                logical_ids::PUBLIC_LOAD_BALANCER,
                SubnetType::Public,
            ),
            ListenerKind::Internal => (
                logical_ids::INTERNAL_SECURITY_GROUP,
                logical_ids::INTERNAL_LOAD_BALANCER,
                SubnetType::PrivateWithNat,
            ),
        };

        put(
            plan,
            sg_id,
            Resource::SecurityGroup(SecurityGroup {
                vpc: logical_ids::VPC.to_string(),
                ingress: vec![ingress],
            }),
        );
        put(
            plan,
            lb_id,
            Resource::LoadBalancer(LoadBalancer {
                vpc: logical_ids::VPC.to_string(),
                internet_facing: kind == ListenerKind::Public,
                subnet_type,
                security_group: sg_id.to_string(),
            }),
        );
        put(
            plan,
            logical_ids::listener(kind),
            Resource::Listener(Listener {
                load_balancer: lb_id.to_string(),
                port: self.settings.listener_port,
                protocol: Protocol::Http,
                default_action: self.settings.default_response.clone(),
            }),
        );
        debug!(listener = %kind, port = self.settings.listener_port, "derived listener");
    }

    /// Task definition, service, target group and listener rule for one descriptor
    fn add_service(&self, plan: &mut DeploymentPlan, service: &ServiceDescriptor) {
        let route = RouteRule::derive(service);
        let task_id = logical_ids::task_definition(&service.name);
        let service_id = logical_ids::service(&service.name);
        let target_group_id = logical_ids::target_group(&service.name);

        let container = ContainerDefinition {
            name: service.container_name(),
            image: ImageSource {
                repository: logical_ids::repository(&service.name),
                repository_name: service.repository_name().to_string(),
            },
            logging: LogConfiguration {
                driver: "awslogs".to_string(),
                stream_prefix: service.log_stream_prefix(),
            },
            port_mappings: vec![PortMapping {
                container_port: service.container_port,
                protocol: Protocol::Tcp,
            }],
        };
        put(
            plan,
            task_id.clone(),
            Resource::TaskDefinition(TaskDefinition {
                memory_limit_mib: service.memory_limit,
                cpu: service.cpu_limit,
                containers: vec![container],
            }),
        );

        put(
            plan,
            service_id.clone(),
            Resource::Service(FargateService {
                cluster: logical_ids::CLUSTER.to_string(),
                task_definition: task_id,
                desired_count: service.desired_count,
                assign_public_ip: service.internet_facing,
            }),
        );

        put(
            plan,
            target_group_id.clone(),
            Resource::TargetGroup(TargetGroup {
                vpc: logical_ids::VPC.to_string(),
                protocol: Protocol::Http,
                port: route.container_port,
                target_service: service_id,
                target_container: service.container_name(),
                health_check: HealthCheck {
                    path: route.health_check_path.clone(),
                },
            }),
        );

        put(
            plan,
            logical_ids::listener_rule(&service.name),
            Resource::ListenerRule(ListenerRule {
                listener: logical_ids::listener(route.listener).to_string(),
                priority: route.priority,
                conditions: vec![RuleCondition::PathPattern(vec![route.path_pattern.clone()])],
                target_group: target_group_id,
            }),
        );

        debug!(
            service = %service.name,
            listener = %route.listener,
            priority = route.priority,
            path = %route.path_pattern,
            "derived routing rule"
        );
    }

    fn add_dns(&self, plan: &mut DeploymentPlan) {
        put(
            plan,
            logical_ids::HOSTED_ZONE,
            Resource::HostedZone(HostedZone {
                zone_name: self.settings.hosted_zone_name.clone(),
                private: true,
                vpc: logical_ids::VPC.to_string(),
            }),
        );
        put(
            plan,
            logical_ids::ALIAS_RECORD,
            Resource::AliasRecord(AliasRecord {
                zone: logical_ids::HOSTED_ZONE.to_string(),
                record_name: self.settings.hosted_zone_name.clone(),
                record_type: "A".to_string(),
                target: logical_ids::INTERNAL_LOAD_BALANCER.to_string(),
            }),
        );
        debug!(zone = %self.settings.hosted_zone_name, "derived private DNS");
    }
}

fn put(plan: &mut DeploymentPlan, id: impl Into<String>, resource: Resource) {
    let id = id.into();
    if let Some(previous) = plan.insert(id.clone(), resource) {
        // Duplicate service names collide here; the later definition wins.
        warn!(
            logical_id = %id,
            kind = previous.kind(),
            "resource defined more than once, keeping the last definition"
        );
    }
}
