//! Command-line interface module.

mod args;
mod common;
mod render;
mod resolve;
mod template;

pub use args::{Cli, Commands};
pub use common::load_runtime;
pub use render::run_render;
pub use resolve::run_resolve;
pub use template::run_template;
