//! Stack-wide topology settings
//!
//! These are the fixed decisions of the deployment (network shape, listener
//! port, fallback response, DNS zone). They are not derived from the service
//! registry; the defaults reproduce the reference stack and a YAML file can
//! override any of them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while reading settings
#[derive(Error, Debug, PartialEq)]
pub enum SettingsError {
    #[error("Failed to parse settings: {0}")]
    ParseError(String),
}

/// Topology constants shared by every service in the plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackSettings {
    #[serde(default = "default_stack_name")]
    pub stack_name: String,

    /// Availability zones spanned by the VPC
    #[serde(default = "default_max_azs")]
    pub max_azs: u8,

    /// Instance type of the single NAT instance
    #[serde(default = "default_nat_instance_type")]
    pub nat_instance_type: String,

    #[serde(default = "default_vpc_cidr")]
    pub vpc_cidr: String,

    /// Port of both the public and the internal listener
    #[serde(default = "default_listener_port")]
    pub listener_port: u16,

    /// Returned by a listener when no rule matches
    #[serde(default)]
    pub default_response: FixedResponse,

    #[serde(default = "default_hosted_zone_name")]
    pub hosted_zone_name: String,
}

/// Fixed HTTP response served by a listener's default action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedResponse {
    #[serde(default = "default_status_code")]
    pub status_code: u16,

    #[serde(default = "default_message_body")]
    pub message_body: String,
}

impl Default for FixedResponse {
    fn default() -> Self {
        Self {
            status_code: default_status_code(),
            message_body: default_message_body(),
        }
    }
}

impl Default for StackSettings {
    fn default() -> Self {
        Self {
            stack_name: default_stack_name(),
            max_azs: default_max_azs(),
            nat_instance_type: default_nat_instance_type(),
            vpc_cidr: default_vpc_cidr(),
            listener_port: default_listener_port(),
            default_response: FixedResponse::default(),
            hosted_zone_name: default_hosted_zone_name(),
        }
    }
}

fn default_stack_name() -> String {
    "CdkEcsStack".to_string()
}

fn default_max_azs() -> u8 {
    2
}

fn default_nat_instance_type() -> String {
    "t2.micro".to_string()
}

fn default_vpc_cidr() -> String {
    "10.0.0.0/16".to_string()
}

fn default_listener_port() -> u16 {
    80
}

fn default_status_code() -> u16 {
    200
}

fn default_message_body() -> String {
    "No routes defined".to_string()
}

fn default_hosted_zone_name() -> String {
    "service.internal".to_string()
}

/// Parse settings from a YAML string; missing keys keep their defaults
pub fn parse_settings(content: &str) -> Result<StackSettings, SettingsError> {
    serde_yaml::from_str(content).map_err(|e| SettingsError::ParseError(e.to_string()))
}
