//! assetmap - resolve asset references and render them as HTML.

mod cli;

use anyhow::Result;
use assetmap::log;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    assetmap::logger::set_verbose(cli.verbose);

    if let Err(e) = run(&cli) {
        log!("error"; "{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let runtime = cli::load_runtime(cli)?;

    match &cli.command {
        Commands::Resolve { asset } => cli::run_resolve(&runtime, asset),
        Commands::Render { asset, preload } => cli::run_render(&runtime, asset, *preload),
        Commands::Template { file } => cli::run_template(&runtime, file),
    }
}
