//! Service placement and listener routing
//!
//! Every service is placed behind exactly one listener, picked by its
//! `internetFacing` flag, and reached through one rule on that listener. The
//! load balancer evaluates rules in ascending priority and forwards to the
//! first whose path pattern matches; when none does, the listener's default
//! fixed response is returned.

pub mod pattern;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{FixedResponse, ServiceDescriptor, ServiceRegistry};

pub use pattern::{check_syntax, is_catch_all, PathPattern, PatternError};

/// Which of the two listeners a service is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListenerKind {
    /// Internet-facing load balancer
    Public,
    /// Load balancer reachable only from inside the VPC
    Internal,
}

impl ListenerKind {
    pub const ALL: [ListenerKind; 2] = [ListenerKind::Public, ListenerKind::Internal];

    /// Placement rule: `internetFacing` alone decides the listener
    pub fn for_service(service: &ServiceDescriptor) -> Self {
        if service.internet_facing {
            ListenerKind::Public
        } else {
            ListenerKind::Internal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ListenerKind::Public => "public",
            ListenerKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ListenerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ListenerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "public" => Ok(ListenerKind::Public),
            "internal" => Ok(ListenerKind::Internal),
            other => Err(format!(
                "unknown listener '{}', expected 'public' or 'internal'",
                other
            )),
        }
    }
}

/// The routing rule derived for one service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRule {
    pub service: String,
    pub listener: ListenerKind,
    pub priority: u32,
    /// Copied verbatim from `albPath`
    pub path_pattern: String,
    /// Copied verbatim from `healthCheckPath`
    pub health_check_path: String,
    pub container_port: u16,
}

impl RouteRule {
    /// Derive the rule for a service. Pure; no validation.
    pub fn derive(service: &ServiceDescriptor) -> Self {
        Self {
            service: service.name.clone(),
            listener: ListenerKind::for_service(service),
            priority: service.priority,
            path_pattern: service.alb_path.clone(),
            health_check_path: service.health_check_path.clone(),
            container_port: service.container_port,
        }
    }
}

/// Outcome of evaluating a request path against one listener
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Forward { service: String, priority: u32 },
    FixedResponse(FixedResponse),
}

/// All rules of a deployment, grouped by listener
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingTable {
    rules: Vec<RouteRule>,
    default_response: FixedResponse,
}

impl RoutingTable {
    /// Derive one rule per service, in registry order. A repeated service
    /// name replaces the earlier rule in place, matching the plan builder.
    pub fn from_registry(registry: &ServiceRegistry, default_response: FixedResponse) -> Self {
        let mut rules: Vec<RouteRule> = Vec::with_capacity(registry.len());
        for rule in registry.iter().map(RouteRule::derive) {
            match rules.iter_mut().find(|r| r.service == rule.service) {
                Some(existing) => *existing = rule,
                None => rules.push(rule),
            }
        }
        Self {
            rules,
            default_response,
        }
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    pub fn default_response(&self) -> &FixedResponse {
        &self.default_response
    }

    /// Rules on one listener in evaluation order.
    /// Equal priorities keep registry order; the provider rejects them anyway.
    pub fn rules_for(&self, listener: ListenerKind) -> Vec<&RouteRule> {
        let mut rules: Vec<_> = self
            .rules
            .iter()
            .filter(|r| r.listener == listener)
            .collect();
        rules.sort_by_key(|r| r.priority);
        rules
    }

    /// Evaluate a request path the way the load balancer would.
    /// Any query string is dropped; conditions only see the path.
    pub fn resolve(&self, listener: ListenerKind, path: &str) -> Result<RouteDecision, PatternError> {
        let path = path.split_once('?').map_or(path, |(path, _)| path);
        for rule in self.rules_for(listener) {
            let pattern = PathPattern::compile(&rule.path_pattern)?;
            if pattern.matches(path) {
                tracing::trace!(
                    listener = %listener,
                    path,
                    service = %rule.service,
                    priority = rule.priority,
                    "path matched rule"
                );
                return Ok(RouteDecision::Forward {
                    service: rule.service.clone(),
                    priority: rule.priority,
                });
            }
        }
        Ok(RouteDecision::FixedResponse(self.default_response.clone()))
    }
}
