//! Deployment plan - the output of the topology builder
//!
//! A plan is an explicit graph of uniquely keyed resource definitions.
//! Edges are logical-id strings, so the whole graph is plain owned data that
//! can be serialized, compared and fingerprinted.

pub mod builder;
pub mod resources;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::routing::ListenerKind;

pub use builder::{build, logical_ids, TopologyBuilder};
pub use resources::*;

/// API version stamped on every plan
pub const API_VERSION: &str = "ecs-topology/v1";

/// Errors raised when inspecting or rendering a plan
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Resource '{from}' references undefined resource '{to}'")]
    DanglingReference { from: String, to: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Metadata for a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanMetadata {
    pub stack_name: String,
}

/// The complete resource plan handed to the provisioning engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentPlan {
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Kind is always "DeploymentPlan"
    pub kind: String,

    pub metadata: PlanMetadata,

    /// Resource definitions keyed by logical id
    resources: BTreeMap<String, Resource>,

    /// Logical ids in derivation order
    order: Vec<String>,
}

impl DeploymentPlan {
    pub fn new(stack_name: impl Into<String>) -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: "DeploymentPlan".to_string(),
            metadata: PlanMetadata {
                stack_name: stack_name.into(),
            },
            resources: BTreeMap::new(),
            order: Vec::new(),
        }
    }

    /// Add a resource under a logical id. An existing definition with the
    /// same id is replaced and returned; its position in the order is kept.
    pub fn insert(&mut self, logical_id: impl Into<String>, resource: Resource) -> Option<Resource> {
        let logical_id = logical_id.into();
        let previous = self.resources.insert(logical_id.clone(), resource);
        if previous.is_none() {
            self.order.push(logical_id);
        }
        previous
    }

    pub fn get(&self, logical_id: &str) -> Option<&Resource> {
        self.resources.get(logical_id)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Logical ids in the order the builder derived them
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Resources in derivation order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Resource)> {
        self.order
            .iter()
            .filter_map(|id| self.resources.get(id).map(|r| (id.as_str(), r)))
    }

    /// Resource counts per kind, sorted by kind
    pub fn counts_by_kind(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for resource in self.resources.values() {
            *counts.entry(resource.kind()).or_insert(0) += 1;
        }
        counts
    }

    pub fn repositories(&self) -> Vec<&Repository> {
        self.iter()
            .filter_map(|(_, r)| match r {
                Resource::Repository(repo) => Some(repo),
                _ => None,
            })
            .collect()
    }

    pub fn listener_rules(&self) -> Vec<(&str, &ListenerRule)> {
        self.iter()
            .filter_map(|(id, r)| match r {
                Resource::ListenerRule(rule) => Some((id, rule)),
                _ => None,
            })
            .collect()
    }

    /// Rules attached to one of the two listeners, sorted by priority
    pub fn rules_on(&self, listener: ListenerKind) -> Vec<&ListenerRule> {
        let listener_id = logical_ids::listener(listener);
        let mut rules: Vec<_> = self
            .listener_rules()
            .into_iter()
            .map(|(_, rule)| rule)
            .filter(|rule| rule.listener == listener_id)
            .collect();
        rules.sort_by_key(|rule| rule.priority);
        rules
    }

    pub fn target_group(&self, logical_id: &str) -> Option<&TargetGroup> {
        match self.get(logical_id) {
            Some(Resource::TargetGroup(tg)) => Some(tg),
            _ => None,
        }
    }

    pub fn service(&self, logical_id: &str) -> Option<&FargateService> {
        match self.get(logical_id) {
            Some(Resource::Service(svc)) => Some(svc),
            _ => None,
        }
    }

    /// Fail on the first reference (in derivation order) that names no resource in this plan
    pub fn check_references(&self) -> Result<(), PlanError> {
        for (id, resource) in self.iter() {
            for target in resource.references() {
                if !self.resources.contains_key(target) {
                    return Err(PlanError::DanglingReference {
                        from: id.to_string(),
                        to: target.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, PlanError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> Result<String, PlanError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Hex SHA-256 of the compact JSON form. Equal plans share a fingerprint.
    pub fn fingerprint(&self) -> Result<String, PlanError> {
        let bytes = serde_json::to_vec(self)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }
}
