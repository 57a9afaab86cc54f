use structopt::StructOpt;

use shoesim::config::SimConfig;
use shoesim::utils::float::round2;
use shoesim::utils::prelude::*;

/// Should be implemented by individual subcommand
pub trait Cmd {
    fn run(self) -> Result<()>;
}

/// Show the effective simulation configuration
#[derive(StructOpt)]
pub struct Config {}

impl Cmd for Config {
    fn run(self) -> Result<()> {
        let cfg: SimConfig = config().fetch()?;
        print!("{}", serde_yaml::to_string(&cfg)?);

        Ok(())
    }
}

/// Simulate one working day and write the trace
#[derive(StructOpt)]
pub struct Run {
    /// Override the configured seed
    #[structopt(long)]
    seed: Option<String>,
}

impl Cmd for Run {
    fn run(self) -> Result<()> {
        let summary = shoesim::run_sim(self.seed)?;

        println!("events:                    {}", summary.events);
        println!("day closed at (min):       {:.2}", round2(summary.closed_at.0));
        println!("drop-offs:                 {}", summary.drop_offs);
        println!("refused drop-offs:         {}", summary.refused_drop_offs);
        println!("pickups:                   {}", summary.picked_up);
        println!("pickups with empty stock:  {}", summary.empty_pickups);
        println!("repairs completed:         {}", summary.repairs_completed);
        println!("average repair time (min): {:.2}", round2(summary.average_repair_time));
        println!("peak average repair (min): {:.2}", round2(summary.peak_average_repair_time));
        println!("peak queue length:         {}", summary.peak_queue_len);
        println!("ready for pickup:          {}", summary.ready_for_pickup);
        if summary.truncated {
            warn!("run stopped by the event cap, results cover a partial day");
        }

        Ok(())
    }
}
