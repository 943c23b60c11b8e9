use std::io::Write;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use super::app::GlobalArgs;
use super::segments;

#[derive(Args, Clone, Debug)]
pub struct LsArg {
    pub package: String,
    #[arg(help = "Directory inside the package; the public top level when omitted")]
    pub path: Option<String>,
    #[arg(long, help = "Print entries as JSON")]
    pub json: bool,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct Entry {
    name: String,
    dir: bool,
}

impl Entry {
    fn render(&self) -> String {
        if self.dir {
            format!("{}/", self.name)
        } else {
            self.name.clone()
        }
    }
}

pub fn ls(global: &GlobalArgs, arg: LsArg, out: &mut impl Write) -> Result<()> {
    let loader = global.loader(&arg.package)?;

    let entries: Vec<Entry> = match &arg.path {
        None => loader
            .top_level()?
            .into_iter()
            .map(|name| match name.strip_suffix('/') {
                Some(dir) => Entry {
                    name: dir.to_owned(),
                    dir: true,
                },
                None => Entry { name, dir: false },
            })
            .collect(),
        Some(path) => loader
            .readable(&segments(path))
            .iter_dir()?
            .iter()
            .map(|child| Entry {
                name: child.name(),
                dir: child.is_dir(),
            })
            .collect(),
    };

    if arg.json {
        serde_json::to_writer_pretty(&mut *out, &entries)?;
        writeln!(out)?;
    } else {
        for entry in &entries {
            writeln!(out, "{}", entry.render())?;
        }
    }
    Ok(())
}
