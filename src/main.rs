//! CLI entry point for the sprite sheet pipeline

use clap::Parser;
use spritegrid::io::cli::{Cli, PipelineRunner};
use spritegrid::io::logging;

fn main() -> spritegrid::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_level());
    let runner = PipelineRunner::new(cli);
    runner.run()?;
    Ok(())
}
