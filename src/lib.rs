//! Deployment topology for load-balanced container services
//!
//! A static [`config::ServiceRegistry`] is translated by the
//! [`plan::TopologyBuilder`] into a [`plan::DeploymentPlan`]: image
//! repositories, one VPC and cluster, a public and an internal listener, one
//! routing rule per service and a private DNS alias. The plan is plain data
//! for an external provisioning engine; this crate never calls a cloud API.

pub mod cli;
pub mod config;
pub mod plan;
pub mod routing;
