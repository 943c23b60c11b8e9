use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pkgdata::{Config, Loader, open_root};

use super::{cat, describe, export, ls};

#[derive(Clone, Debug, Parser)]
#[command(name = "pkgdata", version = env!("CARGO_PKG_VERSION"), about, long_about = None, propagate_version = true)]
pub struct App {
    #[command(flatten)]
    pub global: GlobalArgs,
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Args, Clone, Debug, Default)]
pub struct GlobalArgs {
    #[arg(long, global = true, help = "Configuration file to use instead of the discovered one")]
    pub config: Option<PathBuf>,
    #[arg(
        long = "search-path",
        short = 'p',
        global = true,
        help = "Directory searched for packages before the configured ones"
    )]
    pub search_paths: Vec<PathBuf>,
    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "More logging, repeat for more")]
    pub verbose: u8,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    #[command(alias = "d", name = "describe", about = "Show the package summary")]
    Describe(describe::DescribeArg),
    #[command(name = "ls", about = "List package entries")]
    Ls(ls::LsArg),
    #[command(name = "cat", about = "Write a package file to stdout")]
    Cat(cat::CatArg),
    #[command(alias = "x", name = "export", about = "Copy a package file or directory out")]
    Export(export::ExportArg),
}

impl App {
    pub fn run(self) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        match self.cmd {
            Commands::Describe(arg) => describe::describe(&self.global, arg, &mut stdout),
            Commands::Ls(arg) => ls::ls(&self.global, arg, &mut stdout),
            Commands::Cat(arg) => cat::cat(&self.global, arg, &mut stdout),
            Commands::Export(arg) => export::export(&self.global, arg),
        }
    }
}

impl GlobalArgs {
    /// Configuration after command line overrides.
    pub fn config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => Config::discover().context("Failed to discover configuration")?,
        };
        config.search_paths.splice(0..0, self.search_paths.iter().cloned());
        Ok(config)
    }

    /// Bind a loader to `package`: a package name, or a path to a package
    /// directory or archive.
    pub fn loader(&self, package: &str) -> Result<Loader> {
        let config = self.config()?;
        let loader = if looks_like_path(package) {
            let root = open_root(Path::new(package))
                .with_context(|| format!("Failed to open package at {package}"))?;
            Loader::with_config(root, &config)
        } else {
            Loader::with_config(package, &config)
        };
        loader.with_context(|| format!("Failed to load package {package}"))
    }
}

fn looks_like_path(package: &str) -> bool {
    package.contains(['/', '\\']) || Path::new(package).is_file()
}
