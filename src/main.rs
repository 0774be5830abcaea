//! checkgen - renders queued check amounts to PNG and stores them.

mod adapters;
mod cli;
mod config;
mod context;
mod error;
mod generator;
mod message;
mod output;
mod ports;
mod render;
mod server;
mod telemetry;

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;

use crate::adapters::fs_font::FileFontSource;
use crate::cli::{resolve_amount, Cli, Command};
use crate::config::Config;
use crate::context::ServiceContext;
use crate::error::CheckError;
use crate::output::{artifact_name, encode_png};
use crate::ports::FontSource;
use crate::render::CheckRenderer;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CheckError> {
    // Load config, then let the host environment override it once
    let config_path = config::discover_config_path(cli.config.as_deref());
    let mut config = Config::load(&config_path).map_err(CheckError::Config)?;
    config.apply_env();

    match cli.command {
        Command::Serve { port } => {
            telemetry::init(&config.logging);
            if let Some(port) = port {
                config.server.port = port;
            }
            let generator = ServiceContext::live(&config)?.into_generator()?;
            server::serve(Arc::new(generator), config.server.port).await
        }
        Command::Render { amount, amount_file, output, font } => {
            let amount = resolve_amount(amount.as_deref(), amount_file.as_deref())?;
            let font_path = font.map_or_else(|| config.render.font_path.clone(), PathBuf::from);
            let renderer = CheckRenderer::new(FileFontSource::new(font_path).load()?);

            let png = encode_png(&renderer.render(&amount))?;
            let output_path = output
                .map_or_else(|| PathBuf::from(artifact_name(chrono::Utc::now())), PathBuf::from);
            tokio::fs::write(&output_path, png).await?;
            eprintln!("Saved: {}", output_path.display());
            Ok(())
        }
    }
}
