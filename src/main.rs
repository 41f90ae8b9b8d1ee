/*
 * Birbs Flocking Simulation
 *
 * Simulates a flock of birbs on a wrap-around world. Options are given as
 * `name=value` arguments (for example `birbCount=5000 visualDistance=96`),
 * optionally on top of a JSON file passed as `config=path/to/birbs.json`.
 *
 * Controls: P pause, G grid/brute-force search, L grid lines, R reset camera,
 * click a birb to follow it, Esc to stop following.
 */

use anyhow::{Context, Result};
use log::info;

use birbs::SimulationConfig;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = SimulationConfig::from_args(std::env::args().skip(1))
        .context("invalid simulation config")?;

    info!(
        "launching viewer: {} birbs, {}x{} world, visual distance {}",
        config.birb_count, config.world_width, config.world_height, config.visual_distance
    );
    birbs::app::run(config);
    Ok(())
}
