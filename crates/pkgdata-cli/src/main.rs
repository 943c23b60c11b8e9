use anyhow::Result;
use clap::Parser;

use cli::app::App;

mod cli;
mod logging;

fn main() -> Result<()> {
    let app = App::parse();
    logging::init_logging(app.global.verbose)?;
    app.run()
}
