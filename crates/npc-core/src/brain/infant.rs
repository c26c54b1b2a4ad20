//! InfantBrain — pre-crystallization option scoring
//!
//! Linear appraisal-weighted utility plus two nonlinear terms: a
//! safety penalty that compounds with `safety_risk · threat_sensitivity`,
//! and a novelty term whose sign flips around the agent's novelty
//! tolerance. Sampling is the same softmax as the adult engine.

use rand::Rng;
use tracing::debug;

use npc_events::AppraisalDim;

use crate::brain::npc::{sample_index, softmax, Decision};
use crate::brain::profile::InfantParams;
use crate::config::InfantBrainConfig;
use crate::development::Temperament;
use crate::features::AppraisalVector;

/// The infant scoring engine.
pub struct InfantBrain;

impl InfantBrain {
    /// Utility of a single appraised option for a given infant.
    pub fn score(
        appraisal: &AppraisalVector,
        params: &InfantParams,
        cfg: &InfantBrainConfig,
    ) -> f64 {
        let comfort = appraisal.get(AppraisalDim::ComfortDelta);
        let energy = appraisal.get(AppraisalDim::EnergyCost);
        let risk = appraisal.get(AppraisalDim::SafetyRisk);
        let novelty = appraisal.get(AppraisalDim::NoveltyLoad);
        let familiarity = appraisal.get(AppraisalDim::Familiarity);
        let soothing = appraisal.get(AppraisalDim::SocialSoothing);

        let mut utility = cfg.comfort_weight * comfort + cfg.familiarity_weight * familiarity
            + cfg.soothing_weight * soothing * params.soothability;

        // Energy spending hurts more when the budget is low.
        utility -= cfg.energy_cost_weight * energy * (1.5 - params.energy_budget);

        // Safety penalty grows superlinearly with perceived threat.
        let threat = risk * params.threat_sensitivity;
        utility -= cfg.safety_penalty_coeff * threat.powf(cfg.safety_penalty_exponent);

        // Novelty below tolerance is mildly rewarding; above it,
        // penalized harder the weaker the infant's self-regulation.
        if novelty <= params.novelty_tolerance {
            utility += cfg.novelty_reward * novelty;
        } else {
            let excess = novelty - params.novelty_tolerance;
            utility -= cfg.novelty_penalty * excess * (1.0 - params.self_regulation);
        }

        utility
    }

    /// Scores every appraised option, softmaxes, and samples one index.
    pub fn choose<R: Rng>(
        options: &[AppraisalVector],
        params: &InfantParams,
        cfg: &InfantBrainConfig,
        temperature: f64,
        rng: &mut R,
    ) -> Option<Decision> {
        if options.is_empty() {
            return None;
        }
        let scores: Vec<f64> = options
            .iter()
            .map(|o| Self::score(o, params, cfg))
            .collect();
        let probabilities = softmax(&scores, temperature);
        let index = sample_index(&probabilities, rng);
        debug!(?scores, ?probabilities, index, "infant choice");
        Some(Decision {
            index,
            scores,
            probabilities,
        })
    }
}

/// Derives the five infant parameters from temperament via fixed
/// linear combinations, clamped to 0..=1 regardless of out-of-range
/// input.
pub fn temperament_to_infant_params(t: &Temperament) -> InfantParams {
    // Work on the 0..=1 scale, clamping the input first.
    let u = |value: f64| (value / 100.0).clamp(0.0, 1.0);
    let activity = u(t.activity);
    let regularity = u(t.regularity);
    let approach = u(t.approach);
    let adaptability = u(t.adaptability);
    let threshold = u(t.threshold);
    let intensity = u(t.intensity);
    let mood = u(t.mood);
    let distractibility = u(t.distractibility);
    let persistence = u(t.persistence);

    let clamp01 = |value: f64| value.clamp(0.0, 1.0);
    InfantParams {
        threat_sensitivity: clamp01(0.6 * (1.0 - threshold) + 0.4 * intensity),
        novelty_tolerance: clamp01(0.5 * approach + 0.3 * adaptability + 0.2 * (1.0 - intensity)),
        self_regulation: clamp01(
            0.4 * persistence + 0.3 * regularity + 0.3 * (1.0 - distractibility),
        ),
        soothability: clamp01(0.4 * adaptability + 0.3 * mood + 0.3 * distractibility),
        energy_budget: clamp01(0.6 * activity + 0.4 * regularity),
    }
}
