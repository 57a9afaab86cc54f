use shoesim::utils;
use shoesim::utils::prelude::*;
use structopt::StructOpt;

mod cli;
mod commands;

fn main() -> Result<()> {
    // panic setup should be done early
    utils::panic::setup();

    let opt = cli::Opt::from_args();

    // initialize Configuration
    utils::app_config::init(opt.config.as_deref(), opt.preset.as_deref())?;

    // logging reads its outputs from the configuration
    let _guard = utils::logging::setup(opt.cmd.produces_output())?;

    trace!("Start cli execution");

    cli::execute(opt)
}
