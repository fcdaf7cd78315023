//! `resolve` command: print where an asset lives.

use anyhow::Result;

use super::args::AssetArgs;
use super::common::parse_options;
use assetmap::runtime::Runtime;

pub fn run_resolve(runtime: &Runtime, args: &AssetArgs) -> Result<()> {
    let options = parse_options(&args.options)?;
    let asset = runtime.asset(args.reference.as_str(), &options)?;

    println!("{}", asset.url());
    if let Some(file) = asset.file() {
        println!("{}", file.display());
    }
    assetmap::debug!("resolve"; "{} asset", asset.kind());
    Ok(())
}
