use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;

use super::app::GlobalArgs;
use super::segments;

#[derive(Args, Clone, Debug)]
pub struct CatArg {
    pub package: String,
    #[arg(help = "File inside the package, `/` separated")]
    pub path: String,
}

pub fn cat(global: &GlobalArgs, arg: CatArg, out: &mut impl Write) -> Result<()> {
    let loader = global.loader(&arg.package)?;
    let bytes = loader
        .readable(&segments(&arg.path))
        .read_bytes()
        .with_context(|| format!("Failed to read {} from {}", arg.path, arg.package))?;
    out.write_all(&bytes)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::fixture;

    fn run(path: &str) -> Result<Vec<u8>> {
        let (_dir, global) = fixture::package();
        let mut out = Vec::new();
        cat(
            &global,
            CatArg {
                package: "mypkg".into(),
                path: path.into(),
            },
            &mut out,
        )?;
        Ok(out)
    }

    #[test]
    fn writes_file_content() {
        assert_eq!(run("data/table.csv").unwrap(), b"a,b\n");
    }

    #[test]
    fn missing_file_fails() {
        let err = run("data/missing.csv").unwrap_err();
        let inner = err.downcast_ref::<pkgdata::Error>().unwrap();
        assert!(inner.is_not_found());
    }
}
