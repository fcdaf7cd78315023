//! `render` command: print the HTML for an asset.

use anyhow::Result;

use super::args::AssetArgs;
use super::common::parse_options;
use assetmap::runtime::Runtime;

pub fn run_render(runtime: &Runtime, args: &AssetArgs, preload: bool) -> Result<()> {
    let options = parse_options(&args.options)?;
    let asset = runtime.asset(args.reference.as_str(), &options)?;

    let html = if preload {
        runtime.render_asset_preload(&asset)?
    } else {
        runtime.render_asset(&asset)?
    };
    println!("{html}");
    Ok(())
}
