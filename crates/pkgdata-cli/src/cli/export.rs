use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;

use super::app::GlobalArgs;
use super::segments;

#[derive(Args, Clone, Debug)]
pub struct ExportArg {
    pub package: String,
    #[arg(help = "File or directory inside the package, `/` separated")]
    pub path: String,
    #[arg(help = "Destination, must not exist yet")]
    pub dest: PathBuf,
}

pub fn export(global: &GlobalArgs, arg: ExportArg) -> Result<()> {
    if arg.dest.exists() {
        bail!("{} already exists", arg.dest.display());
    }
    let loader = global.loader(&arg.package)?;
    let resource = loader.readable(&segments(&arg.path));
    resource
        .copy_to(&arg.dest)
        .with_context(|| format!("Failed to export {} to {}", resource, arg.dest.display()))?;
    tracing::info!(resource = %resource, dest = %arg.dest.display(), "exported");
    Ok(())
}
