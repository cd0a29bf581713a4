pub mod train;
pub mod watch;

pub use train::TrainMode;
pub use watch::WatchMode;

use crate::metrics::TrainingStats;
use crate::rl::{Arena, TickOutcome};

/// Feed one tick's per-agent results into the matching stats trackers
pub(crate) fn record_tick(stats: &mut [TrainingStats; 2], arena: &Arena, outcome: &TickOutcome) {
    for (idx, step) in outcome.agents.iter().enumerate() {
        if let Some(step) = step {
            stats[idx].record_step(step, arena.agent(idx).epsilon());
        }
    }
}
