//! NPCBrain — adult option scoring
//!
//! Linear weighted utility over the canonical feature schema followed
//! by temperature-scaled softmax sampling. One RNG draw per decision.

use rand::Rng;
use tracing::debug;

use crate::features::FeatureVector;

/// The outcome of a single scoring pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    /// Chosen index into the option set.
    pub index: usize,
    /// Raw utility per option.
    pub scores: Vec<f64>,
    /// Softmax probability per option; non-negative, sums to 1.
    pub probabilities: Vec<f64>,
}

/// Max-shifted softmax with a uniform fallback.
///
/// Shifting by the max keeps the exponent non-positive so the
/// normalizer cannot overflow; if it underflows to zero anyway the
/// result falls back to a uniform distribution instead of dividing
/// by zero.
pub fn softmax(scores: &[f64], temperature: f64) -> Vec<f64> {
    if scores.is_empty() {
        return Vec::new();
    }
    let t = temperature.max(f64::EPSILON);
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| ((s - max) / t).exp()).collect();
    let normalizer: f64 = exps.iter().sum();
    if normalizer <= 0.0 || !normalizer.is_finite() {
        let uniform = 1.0 / scores.len() as f64;
        return vec![uniform; scores.len()];
    }
    exps.into_iter().map(|e| e / normalizer).collect()
}

/// Samples an index from a probability vector using one RNG draw.
pub fn sample_index<R: Rng>(probabilities: &[f64], rng: &mut R) -> usize {
    let roll: f64 = rng.gen();
    let mut cumulative = 0.0;
    for (i, &p) in probabilities.iter().enumerate() {
        cumulative += p;
        if roll < cumulative {
            return i;
        }
    }
    // Floating error can leave the cumulative a hair under 1.0.
    probabilities.len() - 1
}

/// The adult scoring engine.
pub struct NpcBrain;

impl NpcBrain {
    /// Linear utility: `Σ weight[d] · feature[d]` over the 8 dimensions.
    pub fn score(features: &FeatureVector, weights: &FeatureVector) -> f64 {
        features.dot(weights)
    }

    /// Scores every option, softmaxes at the given temperature, and
    /// samples one index. Returns `None` for an empty option set.
    pub fn choose<R: Rng>(
        options: &[FeatureVector],
        weights: &FeatureVector,
        temperature: f64,
        rng: &mut R,
    ) -> Option<Decision> {
        if options.is_empty() {
            return None;
        }
        let scores: Vec<f64> = options.iter().map(|o| Self::score(o, weights)).collect();
        let probabilities = softmax(&scores, temperature);
        let index = sample_index(&probabilities, rng);
        debug!(?scores, ?probabilities, index, "npc choice");
        Some(Decision {
            index,
            scores,
            probabilities,
        })
    }

    /// Deterministic top-k selection by score, ties broken by original
    /// index. Used for multi-select events; no sampling is involved.
    pub fn choose_multi(scores: &[f64], k: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });
        let mut picked: Vec<usize> = order.into_iter().take(k).collect();
        picked.sort_unstable();
        picked
    }
}
