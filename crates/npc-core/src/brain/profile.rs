//! Brain Profile
//!
//! Per-agent decision parameters, deterministically derived from
//! `(world_seed, agent_id)` at creation. Two agents with the same id
//! under the same world seed always get the same profile.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;
use crate::rng;

/// Six bounded drive scalars, all in 0..=1.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Drives {
    pub comfort: f64,
    pub stimulation: f64,
    pub social: f64,
    pub achievement: f64,
    pub safety: f64,
    pub autonomy: f64,
}

/// Softmax temperature bounds. The lower bound keeps the exponent
/// finite; the upper bound keeps sampling from degenerating to uniform.
pub const MIN_TEMPERATURE: f64 = 0.05;
pub const MAX_TEMPERATURE: f64 = 5.0;

/// Decision-style parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DecisionStyle {
    /// Softmax temperature; lower sharpens toward the best option.
    pub temperature: f64,
    /// Reluctance to deviate from prior behavior, 0..=1.
    pub inertia: f64,
    /// Residual decision noise, 0..=1.
    pub noise: f64,
}

/// Infant-specific parameters derived from temperament, all in 0..=1.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InfantParams {
    pub threat_sensitivity: f64,
    pub novelty_tolerance: f64,
    pub self_regulation: f64,
    pub soothability: f64,
    pub energy_budget: f64,
}

impl Default for InfantParams {
    fn default() -> Self {
        Self {
            threat_sensitivity: 0.5,
            novelty_tolerance: 0.5,
            self_regulation: 0.5,
            soothability: 0.5,
            energy_budget: 0.5,
        }
    }
}

/// Monthly retention factor for homeostasis deviations.
const HOMEOSTASIS_RETENTION: f64 = 0.85;
/// Resting point every homeostasis scalar decays toward.
const HOMEOSTASIS_SETPOINT: f64 = 0.5;

/// Small infant homeostasis state, five scalars in 0..=1 that decay
/// toward the setpoint each month.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Homeostasis {
    pub arousal: f64,
    pub fatigue: f64,
    pub hunger: f64,
    pub discomfort: f64,
    pub isolation: f64,
}

impl Default for Homeostasis {
    fn default() -> Self {
        Self {
            arousal: HOMEOSTASIS_SETPOINT,
            fatigue: HOMEOSTASIS_SETPOINT,
            hunger: HOMEOSTASIS_SETPOINT,
            discomfort: HOMEOSTASIS_SETPOINT,
            isolation: HOMEOSTASIS_SETPOINT,
        }
    }
}

impl Homeostasis {
    /// Decays each scalar toward the setpoint by the monthly retention
    /// factor, keeping everything in 0..=1.
    pub fn decay_monthly(&mut self) {
        for value in [
            &mut self.arousal,
            &mut self.fatigue,
            &mut self.hunger,
            &mut self.discomfort,
            &mut self.isolation,
        ] {
            let deviation = *value - HOMEOSTASIS_SETPOINT;
            *value = (HOMEOSTASIS_SETPOINT + deviation * HOMEOSTASIS_RETENTION).clamp(0.0, 1.0);
        }
    }
}

/// Shared default canonical weights, in schema order: happiness,
/// health, wealth, social, academic, risk, novelty, effort.
pub const DEFAULT_WEIGHTS: FeatureVector = FeatureVector([
    1.0, 0.8, 0.6, 0.7, 0.5, -0.6, 0.2, -0.3,
]);

/// Per-agent decision parameters, owned by the agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrainProfile {
    pub drives: Drives,
    pub style: DecisionStyle,
    /// Base canonical weight vector; shared defaults unless overridden.
    pub base_weights: FeatureVector,
    /// Mimicry blend factor, 0..=1; relationship overrides may replace it.
    pub mimic_alpha: f64,
    pub infant: InfantParams,
    pub homeostasis: Homeostasis,
}

impl BrainProfile {
    /// Derives a profile from the world seed and agent identity.
    ///
    /// Uses the `brain-init` stream at time step 0, so the profile is
    /// reproducible without any other agent state.
    pub fn derive(world_seed: u64, agent_id: &str) -> Self {
        let mut rng = rng::stream(world_seed, agent_id, 0, "brain-init", "profile");

        let drives = Drives {
            comfort: rng.gen(),
            stimulation: rng.gen(),
            social: rng.gen(),
            achievement: rng.gen(),
            safety: rng.gen(),
            autonomy: rng.gen(),
        };

        // Style follows the drives: stimulation loosens sampling,
        // safety tightens it, comfort resists change.
        let temperature = (0.3 + 0.9 * drives.stimulation - 0.4 * drives.safety
            + rng.gen_range(-0.1..0.1))
            .clamp(MIN_TEMPERATURE, MAX_TEMPERATURE);
        let style = DecisionStyle {
            temperature,
            inertia: (0.2 + 0.6 * drives.comfort).clamp(0.0, 1.0),
            noise: (0.05 + 0.25 * drives.autonomy).clamp(0.0, 1.0),
        };

        let mimic_alpha = rng.gen_range(0.0..0.35);

        Self {
            drives,
            style,
            base_weights: DEFAULT_WEIGHTS,
            mimic_alpha,
            infant: InfantParams::default(),
            homeostasis: Homeostasis::default(),
        }
    }
}
