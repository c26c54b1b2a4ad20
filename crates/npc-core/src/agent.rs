//! Agent Model
//!
//! The decision-relevant projection of an agent: identity, age in
//! months (the canonical time unit), dependent stats, the owned brain
//! profile, the one-way developmental state, a subject portfolio, and
//! the append-only history of resolved events.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use serde::{Deserialize, Serialize};

use npc_events::StatKind;

use crate::brain::{temperament_to_infant_params, BrainProfile};
use crate::development::{Development, Personality, Temperament};
use crate::rng;

/// Stable agent identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Dependent stats, each clamped to 0..=100 on every mutation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Stats {
    pub health: f64,
    pub happiness: f64,
    pub wealth: f64,
    pub relationship: f64,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            health: 100.0,
            happiness: 50.0,
            wealth: 50.0,
            relationship: 50.0,
        }
    }
}

impl Stats {
    /// Total lookup by stat kind.
    pub fn get(&self, kind: StatKind) -> f64 {
        match kind {
            StatKind::Health => self.health,
            StatKind::Happiness => self.happiness,
            StatKind::Wealth => self.wealth,
            StatKind::Relationship => self.relationship,
        }
    }

    /// Adds a delta, clamping the result to 0..=100.
    pub fn apply_delta(&mut self, kind: StatKind, delta: f64) {
        let next = (self.get(kind) + delta).clamp(0.0, 100.0);
        match kind {
            StatKind::Health => self.health = next,
            StatKind::Happiness => self.happiness = next,
            StatKind::Wealth => self.wealth = next,
            StatKind::Relationship => self.relationship = next,
        }
    }
}

/// One enrolled subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectRecord {
    pub grade: f64,
    pub active: bool,
}

/// The agent's enrolled subjects and grades.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubjectPortfolio {
    subjects: BTreeMap<String, SubjectRecord>,
}

impl SubjectPortfolio {
    /// Enrolls a subject at a starting grade, activating it.
    pub fn enroll(&mut self, name: impl Into<String>, grade: f64) {
        self.subjects.insert(
            name.into(),
            SubjectRecord {
                grade: grade.clamp(0.0, 100.0),
                active: true,
            },
        );
    }

    pub fn grade(&self, name: &str) -> Option<f64> {
        self.subjects.get(name).map(|s| s.grade)
    }

    pub fn active_subjects(&self) -> impl Iterator<Item = &str> {
        self.subjects
            .iter()
            .filter(|(_, record)| record.active)
            .map(|(name, _)| name.as_str())
    }

    pub fn active_count(&self) -> usize {
        self.subjects.values().filter(|r| r.active).count()
    }

    /// Applies a grade delta to a named subject, enrolling it at a
    /// neutral grade if it was unknown.
    pub fn apply_delta(&mut self, name: &str, delta: f64) {
        let record = self.subjects.entry(name.to_string()).or_insert(SubjectRecord {
            grade: 50.0,
            active: true,
        });
        record.grade = (record.grade + delta).clamp(0.0, 100.0);
    }

    /// Spreads a delta evenly across all active subjects.
    pub fn distribute_delta(&mut self, delta: f64) {
        let active = self.active_count();
        if active == 0 {
            return;
        }
        let share = delta / active as f64;
        for record in self.subjects.values_mut().filter(|r| r.active) {
            record.grade = (record.grade + share).clamp(0.0, 100.0);
        }
    }
}

/// Per-agent, append-only set of resolved event ids. Used solely to
/// enforce the once-per-lifetime constraint; never pruned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryStore {
    resolved: BTreeSet<String>,
}

impl HistoryStore {
    pub fn contains(&self, event_id: &str) -> bool {
        self.resolved.contains(event_id)
    }

    /// Records a resolution. Returns false if it was already present.
    pub fn mark_resolved(&mut self, event_id: &str) -> bool {
        self.resolved.insert(event_id.to_string())
    }

    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}

/// An autonomous agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    /// Canonical time unit; years are a derived integer division.
    pub age_months: u32,
    pub alive: bool,
    /// Whether this agent is the player's own character. Only the
    /// player's resolutions feed the style tracker.
    pub is_player: bool,
    pub stats: Stats,
    pub brain: BrainProfile,
    pub development: Development,
    pub subjects: SubjectPortfolio,
    pub history: HistoryStore,
}

impl Agent {
    /// Creates a newborn. Temperament comes from a pure Gaussian draw
    /// when no parents are given, otherwise from the heritable blend
    /// of both parents' facet-level personalities.
    pub fn newborn(
        world_seed: u64,
        id: AgentId,
        parents: Option<(&Personality, &Personality)>,
    ) -> Self {
        let mut birth = rng::stream(world_seed, id.as_str(), 0, "birth", "temperament");
        let temperament = match parents {
            Some((mother, father)) => Temperament::from_parents(mother, father, &mut birth),
            None => Temperament::gaussian(&mut birth),
        };
        let mut brain = BrainProfile::derive(world_seed, id.as_str());
        brain.infant = temperament_to_infant_params(&temperament);
        Self {
            id,
            age_months: 0,
            alive: true,
            is_player: false,
            stats: Stats::default(),
            brain,
            development: Development::Developing(temperament),
            subjects: SubjectPortfolio::default(),
            history: HistoryStore::default(),
        }
    }

    /// Creates an adult with a directly drawn personality, skipping
    /// infancy entirely. Used for seeding a world with grown agents
    /// whose early history is irrelevant.
    pub fn with_random_personality(world_seed: u64, id: AgentId, age_months: u32) -> Self {
        let mut birth = rng::stream(world_seed, id.as_str(), 0, "birth", "personality");
        let personality = Personality::random(&mut birth);
        let brain = BrainProfile::derive(world_seed, id.as_str());
        Self {
            id,
            age_months,
            alive: true,
            is_player: false,
            stats: Stats::default(),
            brain,
            development: Development::Crystallized(personality),
            subjects: SubjectPortfolio::default(),
            history: HistoryStore::default(),
        }
    }

    /// Age in whole years.
    pub fn age_years(&self) -> u32 {
        self.age_months / 12
    }
}
