use crate::config::SimConfig;
use crate::randvars::seeded_rng;
use crate::simulator::simulate;
use crate::trace::Summary;
use crate::utils::prelude::*;

pub mod config;
pub mod items;
pub mod output;
pub mod randvars;
pub mod simulator;
pub mod stats;
pub mod stock;
pub mod trace;
pub mod types;
pub mod utils;
pub mod worker;

pub use crate::simulator::SimulationRun;
pub use crate::trace::RunResult;

/// Simulate one day with the global configuration and write the trace files
pub fn run_sim(seed_override: Option<String>) -> Result<Summary> {
    let _g = info_span!("sim").entered();

    let mut cfg: SimConfig = config().fetch()?;
    if seed_override.is_some() {
        cfg.seed = seed_override;
    }
    cfg.shop.validate()?;

    let result = {
        let _g = info_span!("run").entered();
        info!(seed = ?cfg.seed, shop = ?cfg.shop, "starting day");
        simulate(cfg.shop.clone(), seeded_rng(cfg.seed.as_deref()), cfg.max_events)?
    };

    {
        let _g = info_span!("output").entered();
        output::render(&result, &cfg)?;
    }

    Ok(result.summary)
}
