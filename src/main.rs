use std::process;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ecs_topology::cli::{
    format_plan_summary, format_resolution, format_routes, format_services, format_validation,
    load_registry, load_settings, resolve_path, routing_table, synth, Cli, CommandResult, Commands,
};
use ecs_topology::config::{validate_registry, StackSettings};

fn main() {
    let mut cli = Cli::parse();

    // Load .env file if specified, then re-read env-backed arguments
    if let Some(ref env_file) = cli.env_file {
        if let Err(e) = dotenvy::from_path(env_file) {
            eprintln!("Failed to load env file {}: {}", env_file.display(), e);
            process::exit(1);
        }
        cli = Cli::parse();
    }

    // Initialize logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}

/// Execute the selected command and return the process exit code
fn run(cli: Cli) -> CommandResult<i32> {
    let registry = load_registry(cli.registry.as_deref())?;
    // Settings are only read by commands that derive listeners from them
    let settings = if cli.command.needs_settings() {
        load_settings(cli.settings.as_deref())?
    } else {
        StackSettings::default()
    };

    match cli.command {
        Commands::Synth(args) => {
            let output = synth(&registry, &settings, args.format, args.strict)?;
            if let Some(validation) = &output.validation {
                if validation.has_warnings() {
                    eprint!("{}", format_validation(validation));
                }
            }
            match args.output {
                Some(path) => {
                    std::fs::write(&path, &output.document)?;
                    info!(path = %path.display(), "wrote deployment plan");
                    print!("{}", format_plan_summary(&output.plan, &output.fingerprint));
                }
                None => print!("{}", output.document),
            }
            Ok(0)
        }
        Commands::Validate => {
            let result = validate_registry(&registry);
            print!("{}", format_validation(&result));
            Ok(if result.passed { 0 } else { 1 })
        }
        Commands::Routes => {
            print!("{}", format_routes(&routing_table(&registry, &settings)));
            Ok(0)
        }
        Commands::Resolve(args) => {
            let table = routing_table(&registry, &settings);
            let decisions = resolve_path(&table, args.listener, &args.path)?;
            print!("{}", format_resolution(&args.path, &decisions));
            Ok(0)
        }
        Commands::Services => {
            print!("{}", format_services(&registry));
            Ok(0)
        }
    }
}
