//! CLI module for ecs-topology
//!
//! Subcommands:
//! - `ecs-topology synth` - Build the deployment plan and print it
//! - `ecs-topology validate` - Lint the service registry
//! - `ecs-topology routes` - Show the routing table per listener
//! - `ecs-topology resolve` - Show which service a request path reaches
//! - `ecs-topology services` - List the registry

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::routing::ListenerKind;

mod commands;
mod display;

pub use commands::*;
pub use display::*;

#[derive(Parser, Debug)]
#[command(name = "ecs-topology")]
#[command(about = "Derive load-balanced container deployment plans from a service registry")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging output (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Service registry file (JSON, JSONC or YAML); the built-in registry when omitted
    #[arg(long, global = true, env = "ECS_TOPOLOGY_REGISTRY", value_name = "FILE")]
    pub registry: Option<PathBuf>,

    /// Stack settings file (YAML)
    #[arg(long, global = true, env = "ECS_TOPOLOGY_SETTINGS", value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Path to a .env file loaded before reading the environment
    #[arg(long, global = true, value_name = "FILE")]
    pub env_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the deployment plan
    Synth(SynthArgs),

    /// Lint the service registry
    Validate,

    /// Show the routing rules of both listeners
    Routes,

    /// Show which service receives a request path
    Resolve(ResolveArgs),

    /// List the services in the registry
    Services,
}

impl Commands {
    /// Whether the command reads stack settings; `validate` and `services`
    /// only look at the registry
    pub fn needs_settings(&self) -> bool {
        match self {
            Commands::Synth(_) | Commands::Routes | Commands::Resolve(_) => true,
            Commands::Validate | Commands::Services => false,
        }
    }
}

/// Serialization format of a synthesized plan
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

/// Arguments for the synth command
#[derive(Parser, Debug)]
pub struct SynthArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Write the plan to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Lint the registry first and refuse to synthesize if it has errors
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the resolve command
#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// Request path, e.g. /accounts/42
    pub path: String,

    /// Only evaluate this listener (public or internal)
    #[arg(short, long)]
    pub listener: Option<ListenerKind>,
}
