mod churn;
mod config;
mod headless;

use anyhow::Result;

use marduk_atlas::logging::{init_logging, LoggingConfig};

use crate::churn::Churn;
use crate::config::BenchConfig;
use crate::headless::HeadlessGpu;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = BenchConfig::from_env()?;
    log::info!("bench config: {config:?}");

    let mut churn = Churn::new(config.seed, config.capacity)?;
    let started = std::time::Instant::now();
    for frame in 0..config.frames {
        churn.step(frame)?;
    }
    let elapsed = started.elapsed();

    let stats = churn.stats();
    log::info!(
        "{} frames in {:.2?}: {} inserts, {} removes, {} reorders, {} touches",
        config.frames,
        elapsed,
        stats.inserts,
        stats.removes,
        stats.reorders,
        stats.touches
    );
    log::info!(
        "{} batches, {} quads drawn; {} live sprites, peak capacity {}",
        stats.draws,
        stats.quads_drawn,
        churn.manager().len(),
        stats.peak_capacity
    );

    if !config.gpu {
        return Ok(());
    }

    match pollster::block_on(HeadlessGpu::new()) {
        Ok(gpu) => gpu.render_frame(churn.manager_mut())?,
        Err(err) => log::warn!("skipping GPU frame: {err:#}"),
    }

    Ok(())
}
