//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Asset resolution and rendering CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: assets.toml)
    #[arg(short = 'C', long, global = true, default_value = "assets.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// CSP nonce added to rendered <script>, <link> and <style> elements
    #[arg(long, global = true)]
    pub nonce: Option<String>,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Print the URL (and local file) of an asset
    Resolve {
        #[command(flatten)]
        asset: AssetArgs,
    },

    /// Print the HTML that imports an asset
    Render {
        #[command(flatten)]
        asset: AssetArgs,

        /// Print the preload hint instead
        #[arg(short, long)]
        preload: bool,
    },

    /// Expand asset tags in a template file
    #[command(visible_alias = "t")]
    Template {
        /// Template file. Use `-` to read from stdin.
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,
    },
}

/// Asset reference with options.
#[derive(clap::Args, Debug, Clone)]
pub struct AssetArgs {
    /// Asset reference, optionally qualified with a mapper (`vite:main.js`)
    pub reference: String,

    /// Asset option as key=value; values are parsed as JSON when possible
    #[arg(short = 'o', long = "option", value_name = "KEY=VALUE")]
    pub options: Vec<String>,
}
