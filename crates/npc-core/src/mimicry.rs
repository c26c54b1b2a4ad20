//! Player-Style Tracker & Weight Blending
//!
//! A single process-wide EMA of the canonical features the player's
//! own choices exhibit, and the bounded blend that lets NPC weights
//! drift toward it. The blend is recomputed on demand so it always
//! reflects the latest tracker state; nothing here is cached.

use serde::{Deserialize, Serialize};

use crate::brain::BrainProfile;
use crate::config::NpcBrainConfig;
use crate::features::{FeatureVector, FEATURE_COUNT};

/// Hard bound on every blended weight component.
pub const WEIGHT_BOUND: f64 = 2.0;

/// Exponential-moving-average accumulator of the player's observed
/// choice features. Updated only by the player's own resolutions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerStyleTracker {
    /// EMA decay factor in (0, 1].
    beta: f64,
    ema: FeatureVector,
    observations: u64,
}

impl PlayerStyleTracker {
    pub fn new(beta: f64) -> Self {
        Self {
            beta: beta.clamp(f64::EPSILON, 1.0),
            ema: FeatureVector::default(),
            observations: 0,
        }
    }

    /// Folds one observed choice into the EMA:
    /// `weight <- weight + beta * (observed - weight)` per dimension.
    pub fn update(&mut self, observed: &FeatureVector) {
        for i in 0..FEATURE_COUNT {
            self.ema.0[i] += self.beta * (observed.0[i] - self.ema.0[i]);
        }
        self.observations += 1;
    }

    pub fn style(&self) -> &FeatureVector {
        &self.ema
    }

    pub fn observations(&self) -> u64 {
        self.observations
    }
}

/// Bounded per-dimension interpolation:
/// `clamp((1 - alpha) * base + alpha * style, -2, 2)`.
pub fn blend(base: &FeatureVector, style: &FeatureVector, alpha: f64) -> FeatureVector {
    let alpha = alpha.clamp(0.0, 1.0);
    let mut out = FeatureVector::default();
    for i in 0..FEATURE_COUNT {
        let mixed = (1.0 - alpha) * base.0[i] + alpha * style.0[i];
        out.0[i] = mixed.clamp(-WEIGHT_BOUND, WEIGHT_BOUND);
    }
    out
}

/// The weights a deciding NPC actually scores with: base weights
/// blended toward the tracker's current style by the effective alpha
/// for this agent and relationship.
pub fn effective_weights(
    profile: &BrainProfile,
    tracker: &PlayerStyleTracker,
    relationship: Option<&str>,
    cfg: &NpcBrainConfig,
) -> FeatureVector {
    let alpha = cfg.mimic_alpha(profile.mimic_alpha, relationship);
    blend(&profile.base_weights, tracker.style(), alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::Feature;

    fn vector(happiness: f64) -> FeatureVector {
        let mut v = FeatureVector::default();
        v.set(Feature::HappinessDelta, happiness);
        v
    }

    #[test]
    fn ema_converges_toward_repeated_observations() {
        let mut tracker = PlayerStyleTracker::new(0.15);
        for _ in 0..60 {
            tracker.update(&vector(1.0));
        }
        assert!(tracker.style().get(Feature::HappinessDelta) > 0.99);
        assert_eq!(tracker.observations(), 60);
    }

    #[test]
    fn blend_is_convex_and_bounded() {
        let base = vector(1.0);
        let style = vector(-1.0);
        let mixed = blend(&base, &style, 0.25);
        assert!((mixed.get(Feature::HappinessDelta) - 0.5).abs() < 1e-12);

        let extreme_base = vector(5.0);
        let clamped = blend(&extreme_base, &style, 0.0);
        assert_eq!(clamped.get(Feature::HappinessDelta), WEIGHT_BOUND);
    }

    #[test]
    fn alpha_zero_keeps_base_weights() {
        let base = vector(0.8);
        let style = vector(-0.8);
        assert_eq!(blend(&base, &style, 0.0), base);
    }

    #[test]
    fn disabled_mimicry_ignores_tracker_state() {
        let profile = crate::brain::BrainProfile::derive(1, "npc-00000001");
        let mut tracker = PlayerStyleTracker::new(0.5);
        tracker.update(&vector(-1.0));

        let cfg = NpcBrainConfig::default();
        assert!(!cfg.player_mimic_enabled);
        let weights = effective_weights(&profile, &tracker, Some("mother"), &cfg);
        assert_eq!(weights, profile.base_weights);
    }

    #[test]
    fn tuned_default_alpha_changes_effective_weights() {
        let profile = crate::brain::BrainProfile::derive(1, "npc-00000001");
        let mut tracker = PlayerStyleTracker::new(1.0);
        tracker.update(&vector(-1.0));

        let mut cfg = NpcBrainConfig::default();
        cfg.player_mimic_enabled = true;

        cfg.mimicry.default_alpha = 0.0;
        let detached = effective_weights(&profile, &tracker, None, &cfg);
        cfg.mimicry.default_alpha = 1.0;
        let attracted = effective_weights(&profile, &tracker, None, &cfg);

        assert_ne!(detached, attracted);
        // The higher default pulls the happiness weight toward the
        // tracker's negative style.
        assert!(
            attracted.get(Feature::HappinessDelta) < detached.get(Feature::HappinessDelta)
        );
    }

    #[test]
    fn relationship_override_changes_the_blend() {
        let profile = crate::brain::BrainProfile::derive(1, "npc-00000001");
        let mut tracker = PlayerStyleTracker::new(1.0);
        tracker.update(&vector(-1.0));

        let mut cfg = NpcBrainConfig::default();
        cfg.player_mimic_enabled = true;
        cfg.mimicry.relationship_alpha.insert("mother".into(), 1.0);

        let as_mother = effective_weights(&profile, &tracker, Some("mother"), &cfg);
        assert_eq!(as_mother, *tracker.style());

        let as_stranger = effective_weights(&profile, &tracker, Some("stranger"), &cfg);
        assert_ne!(as_stranger, as_mother);
    }
}
