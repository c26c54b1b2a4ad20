//! Backfill / Replay Engine
//!
//! Reconstructs a plausible month-by-month history for agents spawned
//! at a non-zero age. Because it drives the exact same
//! `advance_month` path as live simulation, a backfilled agent and a
//! continuously simulated agent sharing a seed end up in identical
//! final states.

use tracing::debug;

use crate::agent::Agent;
use crate::development::advance_month;

/// Per-month hook invoked after the developmental step, used to replay
/// infant events deterministically through the auto-resolve path.
pub type MonthCallback<'a> = &'a mut dyn FnMut(&mut Agent, u32);

/// Replays months from the agent's current age up to `target_age_months`.
///
/// Idempotent: a target at or below the current age simulates nothing.
/// Returns the number of months simulated.
pub fn backfill(
    agent: &mut Agent,
    target_age_months: u32,
    world_seed: u64,
    mut on_month: Option<MonthCallback<'_>>,
) -> u32 {
    if target_age_months <= agent.age_months {
        debug!(
            agent = %agent.id.0,
            age = agent.age_months,
            target = target_age_months,
            "backfill target already reached"
        );
        return 0;
    }

    let start = agent.age_months;
    while agent.age_months < target_age_months {
        advance_month(agent, world_seed);
        let month = agent.age_months;
        if let Some(callback) = on_month.as_mut() {
            callback(agent, month);
        }
    }

    let simulated = agent.age_months - start;
    debug!(agent = %agent.id.0, months = simulated, "backfill complete");
    simulated
}
