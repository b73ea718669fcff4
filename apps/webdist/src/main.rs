//! webdist - build, localize and package the pyLoad webui
//!
//! Thin CLI over the stage registry in `webdist-builder`: each pipeline
//! command runs the registered stage of the same name while the event
//! stream is rendered concurrently.

mod cli;
mod display;
mod error;
mod events;
mod logging;
mod setup;

use crate::cli::{Cli, Commands};
use crate::display::{CommandResult, OutputRenderer, StageEntry};
use crate::error::CliError;
use crate::events::EventHandler;
use crate::setup::ProjectSetup;
use clap::Parser;
use std::path::Path;
use std::process;
use tokio::select;
use tracing::{error, info};
use webdist_builder::StageRegistry;
use webdist_config::constants::LOGS_DIR;
use webdist_events::EventReceiver;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    let root = match setup::resolve_root(&cli.global) {
        Ok(root) => root,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    init_tracing(&root, json_mode, cli.global.debug);

    match run(cli, root).await {
        Ok(code) => process::exit(code),
        Err(e) => {
            error!("Application error: {}", e);
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

/// Main application logic; returns the process exit code
async fn run(cli: Cli, root: std::path::PathBuf) -> Result<i32, CliError> {
    info!("Starting webdist v{}", env!("CARGO_PKG_VERSION"));

    let project = ProjectSetup::load(root, &cli.global).await?;
    let colors_enabled = project.colors_enabled();
    let renderer = OutputRenderer::new(cli.global.json, colors_enabled);
    let registry = StageRegistry::with_defaults();

    let result = match &cli.command {
        Commands::Stages => CommandResult::StageList(
            registry
                .stages()
                .map(|(name, stage)| StageEntry {
                    name: name.to_string(),
                    description: stage.description().to_string(),
                })
                .collect(),
        ),
        Commands::Metadata => CommandResult::Metadata(Box::new(project.metadata().await?)),
        command => {
            let Some(stage) = command.stage_name() else {
                return Err(CliError::Setup("command does not run a stage".to_string()));
            };
            let handler = EventHandler::new(colors_enabled, cli.global.debug, cli.global.json);
            run_stage_with_events(&project, &registry, stage, &handler).await?
        }
    };

    renderer.render_result(&result)?;

    // a top-level compile reports the production install's exit status
    let code = match (&cli.command, &result) {
        (Commands::Compile, CommandResult::Stage(report)) => report.exit_code,
        _ => 0,
    };
    info!(exit_code = code, "Command completed");
    Ok(code)
}

/// Run one registered stage while rendering its events
async fn run_stage_with_events(
    project: &ProjectSetup,
    registry: &StageRegistry,
    stage: &str,
    event_handler: &EventHandler,
) -> Result<CommandResult, CliError> {
    let (event_sender, event_receiver) = webdist_events::channel();
    let ctx = project.build_context(event_sender).await?;

    let report = drain_while(registry.run(&ctx, stage), event_receiver, event_handler).await?;
    Ok(CommandResult::Stage(report))
}

/// Await `future`, handling events as they arrive and draining the rest
async fn drain_while<T, E>(
    future: impl std::future::Future<Output = Result<T, E>>,
    mut event_receiver: EventReceiver,
    event_handler: &EventHandler,
) -> Result<T, CliError>
where
    CliError: From<E>,
{
    let mut future = Box::pin(future);

    loop {
        select! {
            result = &mut future => {
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(&event);
                }
                return result.map_err(CliError::from);
            }

            event = event_receiver.recv() => {
                if let Some(event) = event {
                    event_handler.handle_event(&event);
                }
            }
        }
    }
}

/// Initialize tracing/logging
fn init_tracing(root: &Path, json_mode: bool, debug_enabled_flag: bool) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;
    let filter = |default: &str| {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default))
    };

    if debug_enabled {
        // Debug mode: structured JSON logs to file
        let log_dir = root.join(LOGS_DIR);
        let log_file = log_dir.join(format!(
            "webdist-{}.log",
            chrono::Utc::now().format("%Y%m%d-%H%M%S")
        ));

        let file = std::fs::create_dir_all(&log_dir).and_then(|()| std::fs::File::create(&log_file));
        match file {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(file)
                    .with_env_filter(filter("info,webdist=debug,webdist_builder=debug"))
                    .init();
                if !json_mode {
                    eprintln!("Debug logging enabled: {}", log_file.display());
                }
                return;
            }
            Err(e) if !json_mode => {
                eprintln!("Warning: Failed to create log file: {e}");
            }
            Err(_) => {}
        }
    }

    if json_mode {
        // JSON mode: keep stderr free of log lines
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            // events already reach the console through the event handler
            .with_env_filter(filter("warn,webdist::logging=off"))
            .init();
    }
}
