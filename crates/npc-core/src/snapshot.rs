//! Population Snapshots
//!
//! JSON-serializable projections of the population for logging and
//! external tooling. Snapshots are read-only views; nothing here
//! feeds back into simulation state.

use serde::Serialize;

use crate::agent::Agent;
use crate::development::{Development, TraitKind};

/// One agent's snapshot row.
#[derive(Debug, Clone, Serialize)]
pub struct AgentSnapshot {
    pub id: String,
    pub age_months: u32,
    pub alive: bool,
    pub stage: &'static str,
    pub health: f64,
    pub happiness: f64,
    /// Big-five trait means, present once crystallized.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traits: Option<[f64; 5]>,
    pub resolved_events: usize,
}

impl AgentSnapshot {
    pub fn of(agent: &Agent) -> Self {
        let (stage, traits) = match &agent.development {
            Development::Developing(_) => ("developing", None),
            Development::Crystallized(p) => (
                "crystallized",
                Some([
                    p.trait_score(TraitKind::Openness),
                    p.trait_score(TraitKind::Conscientiousness),
                    p.trait_score(TraitKind::Extraversion),
                    p.trait_score(TraitKind::Agreeableness),
                    p.trait_score(TraitKind::Neuroticism),
                ]),
            ),
        };
        Self {
            id: agent.id.0.clone(),
            age_months: agent.age_months,
            alive: agent.alive,
            stage,
            health: agent.stats.health,
            happiness: agent.stats.happiness,
            traits,
            resolved_events: agent.history.len(),
        }
    }
}

/// A whole-population snapshot at a given month.
#[derive(Debug, Clone, Serialize)]
pub struct PopulationSnapshot {
    pub month: u64,
    pub agents: Vec<AgentSnapshot>,
}

impl PopulationSnapshot {
    /// Captures the population in sorted-by-id order.
    pub fn capture(month: u64, population: &[Agent]) -> Self {
        let mut agents: Vec<AgentSnapshot> = population.iter().map(AgentSnapshot::of).collect();
        agents.sort_by(|a, b| a.id.cmp(&b.id));
        Self { month, agents }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentId;

    #[test]
    fn snapshot_orders_by_id_and_reports_stage() {
        let population = vec![
            Agent::with_random_personality(1, AgentId::new("npc-00000002"), 240),
            Agent::newborn(1, AgentId::new("npc-00000001"), None),
        ];
        let snapshot = PopulationSnapshot::capture(3, &population);
        assert_eq!(snapshot.agents[0].id, "npc-00000001");
        assert_eq!(snapshot.agents[0].stage, "developing");
        assert!(snapshot.agents[0].traits.is_none());
        assert_eq!(snapshot.agents[1].stage, "crystallized");
        assert!(snapshot.agents[1].traits.is_some());
        assert!(snapshot.to_json().is_ok());
    }
}
