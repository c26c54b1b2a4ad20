//! Canonical Feature / Appraisal Extraction
//!
//! Two fixed, ordered schemas are the only vocabulary option scoring
//! understands: 8 canonical dimensions for adult choices and 6
//! appraisal dimensions for infant choices. Extraction is total;
//! every choice yields a fully populated vector no matter how tersely
//! it was authored.

use serde::{Deserialize, Serialize};

use npc_events::{AppraisalDim, Choice, StatKind};

/// The eight canonical decision dimensions, in schema order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    HappinessDelta,
    HealthDelta,
    WealthDelta,
    SocialDelta,
    AcademicDelta,
    RiskLevel,
    NoveltyLevel,
    EffortCost,
}

pub const FEATURE_COUNT: usize = 8;
pub const APPRAISAL_COUNT: usize = 6;

impl Feature {
    /// Returns all features in schema order.
    pub fn all() -> &'static [Feature] {
        &[
            Feature::HappinessDelta,
            Feature::HealthDelta,
            Feature::WealthDelta,
            Feature::SocialDelta,
            Feature::AcademicDelta,
            Feature::RiskLevel,
            Feature::NoveltyLevel,
            Feature::EffortCost,
        ]
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Fixed-size vector over the canonical feature schema.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn get(&self, feature: Feature) -> f64 {
        self.0[feature.index()]
    }

    pub fn set(&mut self, feature: Feature, value: f64) {
        self.0[feature.index()] = value;
    }

    /// Dot product against a weight vector of the same schema.
    pub fn dot(&self, weights: &FeatureVector) -> f64 {
        self.0
            .iter()
            .zip(weights.0.iter())
            .map(|(a, b)| a * b)
            .sum()
    }

    /// Clamps every component into the given closed range.
    pub fn clamped(mut self, min: f64, max: f64) -> Self {
        for value in &mut self.0 {
            *value = value.clamp(min, max);
        }
        self
    }
}

/// Fixed-size vector over the infant appraisal schema.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AppraisalVector(pub [f64; APPRAISAL_COUNT]);

impl AppraisalVector {
    pub fn get(&self, dim: AppraisalDim) -> f64 {
        self.0[dim as usize]
    }

    pub fn set(&mut self, dim: AppraisalDim, value: f64) {
        self.0[dim as usize] = value.clamp(0.0, 1.0);
    }
}

/// Scale dividing raw stat deltas (authored roughly in -20..20) down
/// to the unit feature range.
const STAT_SCALE: f64 = 20.0;
/// Scale dividing raw temperament deltas (authored roughly in -5..5).
const TEMPERAMENT_SCALE: f64 = 5.0;

/// Maps a choice's effect bundle into the canonical adult vector.
///
/// Each component is independently clamped to [-1, 1]. Stat references
/// resolve through the total `StatKind` match; there is no silent
/// fallthrough for unknown labels.
pub fn choice_to_features(choice: &Choice) -> FeatureVector {
    let effects = &choice.effects;
    let mut features = FeatureVector::default();

    let stat = |kind: StatKind| effects.stats.get(&kind).copied().unwrap_or(0.0);
    features.set(Feature::HappinessDelta, stat(StatKind::Happiness) / STAT_SCALE);
    features.set(Feature::HealthDelta, stat(StatKind::Health) / STAT_SCALE);
    features.set(Feature::WealthDelta, stat(StatKind::Wealth) / STAT_SCALE);
    features.set(Feature::SocialDelta, stat(StatKind::Relationship) / STAT_SCALE);

    let academic: f64 = effects.subjects.values().sum();
    features.set(Feature::AcademicDelta, academic / STAT_SCALE);

    use npc_events::TemperamentTrait as T;
    let temp = |t: T| effects.temperament.get(&t).copied().unwrap_or(0.0);

    // Risk reads from the choice's physical downside plus how much
    // arousal it carries.
    let health_downside = (-stat(StatKind::Health)).max(0.0) / STAT_SCALE;
    let arousal = (temp(T::Intensity).abs() + temp(T::Activity).abs()) / (2.0 * TEMPERAMENT_SCALE);
    features.set(Feature::RiskLevel, health_downside + 0.5 * arousal);

    let novelty = (temp(T::Approach) + 0.5 * temp(T::Adaptability)) / TEMPERAMENT_SCALE;
    features.set(Feature::NoveltyLevel, novelty);

    let effort = (temp(T::Persistence).max(0.0) + temp(T::Regularity).max(0.0)
        + temp(T::Activity).max(0.0))
        / (2.0 * TEMPERAMENT_SCALE);
    features.set(Feature::EffortCost, effort);

    features.clamped(-1.0, 1.0)
}

/// Maps a choice into the six-dimensional infant appraisal vector.
///
/// Explicit `infant_appraisal` values pass through (clamped to [0,1]);
/// every missing dimension is derived from the aggregate magnitude and
/// signed mean of the choice's temperament deltas, so tersely authored
/// choices still score on all six dimensions.
pub fn choice_to_infant_appraisal(choice: &Choice) -> AppraisalVector {
    let effects = &choice.effects;

    // Aggregate temperament signal: magnitude in [0,1], signed mean in [-1,1].
    let deltas: Vec<f64> = effects.temperament.values().copied().collect();
    let (magnitude, signed_mean) = if deltas.is_empty() {
        (0.0, 0.0)
    } else {
        let n = deltas.len() as f64;
        let mag = deltas.iter().map(|d| d.abs()).sum::<f64>() / (n * TEMPERAMENT_SCALE);
        let mean = deltas.iter().sum::<f64>() / (n * TEMPERAMENT_SCALE);
        (mag.clamp(0.0, 1.0), mean.clamp(-1.0, 1.0))
    };

    let derived = |dim: AppraisalDim| -> f64 {
        match dim {
            AppraisalDim::ComfortDelta => 0.5 + 0.5 * signed_mean,
            AppraisalDim::EnergyCost => 0.6 * magnitude,
            AppraisalDim::SafetyRisk => 0.4 * magnitude,
            AppraisalDim::NoveltyLoad => 0.7 * magnitude,
            AppraisalDim::Familiarity => 1.0 - magnitude,
            AppraisalDim::SocialSoothing => 0.3 + 0.4 * signed_mean.max(0.0),
        }
    };

    let mut appraisal = AppraisalVector::default();
    for &dim in AppraisalDim::all() {
        let value = effects
            .infant_appraisal
            .get(&dim)
            .copied()
            .unwrap_or_else(|| derived(dim));
        appraisal.set(dim, value);
    }
    appraisal
}

#[cfg(test)]
mod tests {
    use super::*;
    use npc_events::{Effects, TemperamentTrait};

    fn choice_with(effects: Effects) -> Choice {
        Choice::new("test").with_effects(effects)
    }

    #[test]
    fn stat_deltas_map_to_their_dimensions() {
        let mut effects = Effects::default();
        effects.stats.insert(StatKind::Happiness, 10.0);
        effects.stats.insert(StatKind::Health, -4.0);
        effects.stats.insert(StatKind::Wealth, 20.0);
        let features = choice_to_features(&choice_with(effects));
        assert_eq!(features.get(Feature::HappinessDelta), 0.5);
        assert_eq!(features.get(Feature::HealthDelta), -0.2);
        assert_eq!(features.get(Feature::WealthDelta), 1.0);
        // Health downside feeds risk.
        assert!(features.get(Feature::RiskLevel) > 0.0);
    }

    #[test]
    fn components_clamp_to_unit_range() {
        let mut effects = Effects::default();
        effects.stats.insert(StatKind::Happiness, 500.0);
        effects.stats.insert(StatKind::Health, -500.0);
        let features = choice_to_features(&choice_with(effects));
        assert_eq!(features.get(Feature::HappinessDelta), 1.0);
        assert_eq!(features.get(Feature::HealthDelta), -1.0);
        assert_eq!(features.get(Feature::RiskLevel), 1.0);
    }

    #[test]
    fn temperament_only_choice_still_fills_all_appraisals() {
        // A choice whose only stated effect is Intensity +3 must still
        // produce a fully populated six-key appraisal.
        let mut effects = Effects::default();
        effects.temperament.insert(TemperamentTrait::Intensity, 3.0);
        let appraisal = choice_to_infant_appraisal(&choice_with(effects));
        for &dim in AppraisalDim::all() {
            let value = appraisal.get(dim);
            assert!(
                (0.0..=1.0).contains(&value),
                "{dim:?} out of range: {value}"
            );
        }
        assert!(appraisal.get(AppraisalDim::NoveltyLoad) > 0.0);
        assert!(appraisal.get(AppraisalDim::Familiarity) < 1.0);
    }

    #[test]
    fn explicit_appraisals_pass_through_clamped() {
        let mut effects = Effects::default();
        effects
            .infant_appraisal
            .insert(AppraisalDim::SafetyRisk, 0.9);
        effects
            .infant_appraisal
            .insert(AppraisalDim::ComfortDelta, 7.0);
        let appraisal = choice_to_infant_appraisal(&choice_with(effects));
        assert_eq!(appraisal.get(AppraisalDim::SafetyRisk), 0.9);
        assert_eq!(appraisal.get(AppraisalDim::ComfortDelta), 1.0);
    }

    #[test]
    fn empty_choice_yields_neutral_vectors() {
        let features = choice_to_features(&Choice::new("nothing"));
        assert_eq!(features, FeatureVector::default());

        let appraisal = choice_to_infant_appraisal(&Choice::new("nothing"));
        assert_eq!(appraisal.get(AppraisalDim::ComfortDelta), 0.5);
        assert_eq!(appraisal.get(AppraisalDim::Familiarity), 1.0);
        assert_eq!(appraisal.get(AppraisalDim::EnergyCost), 0.0);
    }
}
