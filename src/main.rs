//! Roomcraft - conversational room redesign CLI.

mod adapters;
mod cassette;
mod cli;
mod config;
mod context;
mod controller;
mod encoding;
mod error;
mod frontend;
mod model;
mod output;
mod params;
mod ports;
mod session;
mod view;

use std::path::Path;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::adapters::live::gemini::ServiceSettings;
use crate::cli::Cli;
use crate::config::Config;
use crate::context::{ServiceContext, RECORD_ENV, REPLAY_ENV};
use crate::controller::DesignController;
use crate::error::DesignError;
use crate::frontend::{Frontend, SaveOptions};
use crate::model::{detect_image_backend, ModelSet};
use crate::params::{validate_aspect_ratio, validate_format};
use crate::session::ImageHandle;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "ROOMCRAFT_LOG";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "roomcraft=debug" } else { "roomcraft=warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Returns whether every intent succeeded.
async fn run(cli: Cli) -> Result<bool, DesignError> {
    // Load config
    let config_path = config::discover_config_path(cli.config.as_deref());
    let config = Config::load(&config_path).map_err(DesignError::Config)?;

    // Resolve models, then validate everything before touching keys or cassettes
    let image_model = cli.image_model.as_deref().unwrap_or(&config.models.image);
    let models = ModelSet::resolve(&config.models.chat, &config.models.prompt, image_model);
    let image_backend =
        detect_image_backend(&models.image).map_err(DesignError::InvalidArgument)?;

    let aspect_ratio = cli.aspect_ratio.clone().unwrap_or_else(|| config.render.aspect_ratio.clone());
    validate_aspect_ratio(&aspect_ratio, image_backend).map_err(DesignError::InvalidArgument)?;
    let format = cli.format.clone().unwrap_or_else(|| config.output.format.clone());
    validate_format(&format).map_err(DesignError::InvalidArgument)?;

    if cli.verbose {
        eprintln!("Models: chat={} prompt={} image={}", models.chat, models.prompt, models.image);
        eprintln!("Image backend: {image_backend:?}");
    }

    let settings = ServiceSettings {
        base_url: config.api.base_url.clone(),
        models,
        image_backend,
        aspect_ratio,
    };

    // Create context based on mode (live / recording / replaying)
    let replay_path = std::env::var(REPLAY_ENV).ok();
    let is_recording = std::env::var(RECORD_ENV).is_ok_and(|v| v == "true" || v == "1");

    let (ctx, recording_session) = if let Some(ref cassette_path) = replay_path {
        if cli.verbose {
            eprintln!("Replaying from: {cassette_path}");
        }
        (ServiceContext::replaying(Path::new(cassette_path))?, None)
    } else if is_recording {
        if cli.verbose {
            eprintln!("Recording mode enabled");
        }
        let (ctx, session) = ServiceContext::recording(settings, &config)?;
        (ctx, Some(session))
    } else {
        (ServiceContext::live(settings, &config)?, None)
    };

    let mut frontend = Frontend::new(
        DesignController::new(ctx.service),
        SaveOptions { output: cli.output.clone(), format, analysis: cli.save_analysis.clone() },
    );
    let progress = frontend.spawn_progress();

    // Scripted intents, in order
    let mut all_ok = frontend.upload(ImageHandle::parse(&cli.image)).await;
    for message in &cli.messages {
        all_ok &= frontend.say(message).await;
    }
    if cli.visualize {
        all_ok &= frontend.visualize().await;
    }

    if cli.interactive {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        all_ok &= frontend.interactive(stdin).await?;
    }

    // The service holds the recorder; drop it before finishing the cassette
    drop(frontend);
    let _ = progress.await;

    if let Some(session) = recording_session {
        match session.finish() {
            Ok(path) => eprintln!("Cassette saved: {}", path.display()),
            Err(e) => eprintln!("Warning: failed to save cassette: {e}"),
        }
    }

    Ok(all_ok)
}
