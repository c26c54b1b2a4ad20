//! Life Simulation NPC Decision Core
//!
//! Reproducible, bounded, explainable decisions for a population of
//! autonomous agents whose psychological state evolves monthly. Every
//! decision is derivable purely from a seed, an agent identity, a time
//! index, and a domain tag; there is no centralized scheduler and no
//! untracked entropy source.

pub mod agent;
pub mod brain;
pub mod config;
pub mod development;
pub mod features;
pub mod lifecycle;
pub mod mimicry;
pub mod rng;
pub mod snapshot;

pub use agent::{Agent, AgentId, HistoryStore, Stats, SubjectPortfolio};
pub use brain::{BrainProfile, Decision, InfantBrain, NpcBrain};
pub use config::NpcBrainConfig;
pub use development::{advance_month, backfill, crystallize, Development, Personality, Temperament};
pub use features::{
    choice_to_features, choice_to_infant_appraisal, AppraisalVector, Feature, FeatureVector,
};
pub use lifecycle::{LifecycleManager, LifecycleError, Resolution};
pub use mimicry::PlayerStyleTracker;
