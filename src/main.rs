// ABOUTME: Entry point for the machine-image CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use commands::{RunOptions, apply_resources, connect_to_service, list};
use machine_image::config::{self, Action, ImageResource, Manifest};
use machine_image::error::Result;
use machine_image::output::{Output, OutputMode};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let mut output = Output::new(mode);
    output.start_timer();

    if let Err(e) = run(cli, &output).await {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &Output) -> Result<()> {
    let options = RunOptions {
        timeout: cli.timeout,
        no_wait: cli.no_wait,
    };

    let resource = match cli.command {
        Commands::Init { name, force } => {
            let cwd = env::current_dir()?;
            config::init_config(&cwd, name.as_deref(), force)?;
            output.success(&format!("Wrote {}", config::CONFIG_FILENAME));
            return Ok(());
        }
        Commands::Apply { file } => {
            let manifest = match file {
                Some(path) => Manifest::load(&path)?,
                None => Manifest::discover(&env::current_dir()?)?,
            };
            let options = RunOptions {
                timeout: options.timeout.or(manifest.timeout),
                ..options
            };

            let service = connect_to_service(output).await?;
            apply_resources(&service, manifest.images, options, output).await?;
            output.success("All images converged");
            return Ok(());
        }
        Commands::List => {
            let service = connect_to_service(output).await?;
            return list(&service, output).await;
        }
        Commands::Pull {
            source,
            name,
            kind,
            verify,
            force,
        } => {
            let mut resource = ImageResource::new(name, Action::Pull);
            resource.source = Some(source);
            resource.kind = kind;
            resource.verify = verify;
            resource.force = force;
            resource
        }
        Commands::Import {
            path,
            name,
            kind,
            force,
            read_only,
        } => {
            let mut resource = ImageResource::new(name, Action::Import);
            resource.path = Some(path);
            resource.kind = kind;
            resource.force = force;
            resource.read_only = Some(read_only);
            resource
        }
        Commands::Export {
            name,
            path,
            kind,
            format,
            force,
        } => {
            let mut resource = ImageResource::new(name, Action::Export);
            resource.path = Some(path);
            resource.kind = kind;
            resource.format = format;
            resource.force = force;
            resource
        }
        Commands::Clone {
            from,
            to,
            read_only,
        } => {
            let mut resource = ImageResource::new(to.clone(), Action::Clone);
            resource.from = Some(from);
            resource.to = Some(to);
            resource.read_only = Some(read_only);
            resource
        }
        Commands::Rename { from, to } => {
            let mut resource = ImageResource::new(to.clone(), Action::Rename);
            resource.from = Some(from);
            resource.to = Some(to);
            resource
        }
        Commands::Remove { name } => ImageResource::new(name, Action::Remove),
        Commands::Set {
            name,
            read_only,
            limit,
        } => {
            let mut resource = ImageResource::new(name, Action::SetProperties);
            resource.read_only = read_only;
            resource.limit_bytes = limit;
            resource
        }
    };

    resource
        .validate()
        .map_err(machine_image::error::Error::InvalidConfig)?;

    let service = connect_to_service(output).await?;
    apply_resources(&service, [resource], options, output).await
}
