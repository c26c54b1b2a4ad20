//! Option Scoring Engines
//!
//! Two single-shot utility engines over externally supplied option
//! sets: `NpcBrain` for crystallized agents (linear weighted utility
//! over canonical features) and `InfantBrain` for developing agents
//! (appraisal utility with nonlinear safety and novelty terms). Both
//! sample through the same temperature-scaled softmax.

pub mod infant;
pub mod npc;
pub mod profile;

pub use infant::{temperament_to_infant_params, InfantBrain};
pub use npc::{sample_index, softmax, Decision, NpcBrain};
pub use profile::{BrainProfile, DecisionStyle, Drives, Homeostasis, InfantParams};
