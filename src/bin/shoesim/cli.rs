use std::path::PathBuf;

use structopt::clap::AppSettings;
use structopt::StructOpt;

use crate::commands::{self, Cmd};
use shoesim::utils::Result;

#[derive(StructOpt)]
#[structopt(global_settings = &[AppSettings::VersionlessSubcommands])]
pub struct Opt {
    /// Set a custom config file
    #[structopt(short, long, parse(from_os_str), value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Apply a preset from the configuration
    #[structopt(short, long, value_name = "NAME")]
    pub preset: Option<String>,

    #[structopt(subcommand)]
    pub cmd: Command,
}

#[derive(StructOpt)]
pub enum Command {
    Config(commands::Config),
    Run(commands::Run),
}

impl Command {
    /// Whether the command prints its results to stdout
    pub fn produces_output(&self) -> bool {
        match self {
            Command::Config(_) | Command::Run(_) => true,
        }
    }
}

/// Match commands
pub fn execute(opt: Opt) -> Result<()> {
    match opt.cmd {
        Command::Config(cmd) => cmd.run(),
        Command::Run(cmd) => cmd.run(),
    }
}
