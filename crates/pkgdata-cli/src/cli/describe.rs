use std::io::Write;

use anyhow::Result;
use clap::Args;

use super::app::GlobalArgs;

#[derive(Args, Clone, Debug)]
pub struct DescribeArg {
    #[arg(help = "Package name or path to a package directory or archive")]
    pub package: String,
}

pub fn describe(global: &GlobalArgs, arg: DescribeArg, out: &mut impl Write) -> Result<()> {
    let loader = global.loader(&arg.package)?;
    writeln!(out, "{}", loader.description()?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::fixture;

    #[test]
    fn prints_description() {
        let (_dir, global) = fixture::package();
        let mut out = Vec::new();
        describe(&global, DescribeArg { package: "mypkg".into() }, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Load package files relative to ``mypkg``."));
        assert!(text.ends_with("* ``data/``\n* ``schema.json``\n"));
    }
}
