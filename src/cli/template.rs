//! `template` command: expand asset tags in a file.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};

use assetmap::runtime::Runtime;
use assetmap::template::Template;

pub fn run_template(runtime: &Runtime, file: &Path) -> Result<()> {
    let source = read_source(file)?;
    let template =
        Template::compile(&source).with_context(|| format!("Failed to compile {}", file.display()))?;
    let html = template
        .render(runtime)
        .with_context(|| format!("Failed to render {}", file.display()))?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(html.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

/// Read the template, or stdin when `file` is `-`.
fn read_source(file: &Path) -> Result<String> {
    if file.as_os_str() == "-" {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source)?;
        return Ok(source);
    }
    fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))
}
