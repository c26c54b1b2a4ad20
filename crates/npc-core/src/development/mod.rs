//! Temperament / Personality Developmental Model
//!
//! Infants carry a nine-dimensional `Temperament` that drifts monthly;
//! at month 36 it crystallizes, once and irreversibly, into a
//! five-trait, thirty-facet `Personality` that afterwards only drifts
//! slightly per simulated year. The `Development` enum makes the
//! mutual exclusivity a type-level fact rather than a convention.

pub mod backfill;
pub mod crystallize;

pub use backfill::backfill;
pub use crystallize::crystallize;

use rand::Rng;
use serde::{Deserialize, Serialize};

use npc_events::TemperamentTrait;

use crate::agent::Agent;
use crate::brain::temperament_to_infant_params;
use crate::rng;

/// Age at which temperament crystallizes into personality.
pub const CRYSTALLIZATION_AGE_MONTHS: u32 = 36;

/// Nine temperament scalars, each in 0..=100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Temperament {
    pub activity: f64,
    pub regularity: f64,
    pub approach: f64,
    pub adaptability: f64,
    pub threshold: f64,
    pub intensity: f64,
    pub mood: f64,
    pub distractibility: f64,
    pub persistence: f64,
}

impl Temperament {
    /// Pure Gaussian draw for agents without parent inputs.
    pub fn gaussian<R: Rng>(rng: &mut R) -> Self {
        let mut draw = || rng::gaussian(rng, 50.0, 15.0).clamp(0.0, 100.0);
        Self {
            activity: draw(),
            regularity: draw(),
            approach: draw(),
            adaptability: draw(),
            threshold: draw(),
            intensity: draw(),
            mood: draw(),
            distractibility: draw(),
            persistence: draw(),
        }
    }

    /// Heritable blend of both parents' facet-level personality values
    /// plus independent developmental noise (70/30 split).
    pub fn from_parents<R: Rng>(mother: &Personality, father: &Personality, rng: &mut R) -> Self {
        let ma = heritable_projection(mother);
        let fa = heritable_projection(father);
        let mut result = Self::neutral();
        for (i, &t) in TemperamentTrait::all().iter().enumerate() {
            let midpoint = (ma[i] + fa[i]) / 2.0;
            let noise = rng::gaussian(rng, 50.0, 15.0);
            result.set(t, 0.7 * midpoint + 0.3 * noise);
        }
        result
    }

    fn neutral() -> Self {
        Self {
            activity: 50.0,
            regularity: 50.0,
            approach: 50.0,
            adaptability: 50.0,
            threshold: 50.0,
            intensity: 50.0,
            mood: 50.0,
            distractibility: 50.0,
            persistence: 50.0,
        }
    }

    /// Total lookup; no string-keyed fallthrough.
    pub fn get(&self, t: TemperamentTrait) -> f64 {
        match t {
            TemperamentTrait::Activity => self.activity,
            TemperamentTrait::Regularity => self.regularity,
            TemperamentTrait::Approach => self.approach,
            TemperamentTrait::Adaptability => self.adaptability,
            TemperamentTrait::Threshold => self.threshold,
            TemperamentTrait::Intensity => self.intensity,
            TemperamentTrait::Mood => self.mood,
            TemperamentTrait::Distractibility => self.distractibility,
            TemperamentTrait::Persistence => self.persistence,
        }
    }

    /// Sets a trait, clamped to 0..=100.
    pub fn set(&mut self, t: TemperamentTrait, value: f64) {
        let value = value.clamp(0.0, 100.0);
        match t {
            TemperamentTrait::Activity => self.activity = value,
            TemperamentTrait::Regularity => self.regularity = value,
            TemperamentTrait::Approach => self.approach = value,
            TemperamentTrait::Adaptability => self.adaptability = value,
            TemperamentTrait::Threshold => self.threshold = value,
            TemperamentTrait::Intensity => self.intensity = value,
            TemperamentTrait::Mood => self.mood = value,
            TemperamentTrait::Distractibility => self.distractibility = value,
            TemperamentTrait::Persistence => self.persistence = value,
        }
    }

    /// Adds a (possibly plasticity-scaled) delta, staying in bounds.
    pub fn apply_delta(&mut self, t: TemperamentTrait, delta: f64) {
        self.set(t, self.get(t) + delta);
    }

    /// Trait value normalized to -1..=1.
    pub fn normalized(&self, t: TemperamentTrait) -> f64 {
        (self.get(t) - 50.0) / 50.0
    }

    /// One month of random-walk drift for a single trait.
    pub fn drift_trait<R: Rng>(&mut self, t: TemperamentTrait, rng: &mut R, plasticity: f64) {
        let step = rng::gaussian(rng, 0.0, 1.5) * plasticity;
        self.apply_delta(t, step);
    }
}

/// Developmental plasticity: 1.0 at birth, decaying linearly to a
/// floor of 0.25 at the crystallization boundary.
pub fn plasticity(age_months: u32) -> f64 {
    let progress = (age_months as f64 / CRYSTALLIZATION_AGE_MONTHS as f64).min(1.0);
    1.0 - 0.75 * progress
}

/// The five broad personality traits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraitKind {
    Openness,
    Conscientiousness,
    Extraversion,
    Agreeableness,
    Neuroticism,
}

impl TraitKind {
    pub fn all() -> &'static [TraitKind] {
        &[
            TraitKind::Openness,
            TraitKind::Conscientiousness,
            TraitKind::Extraversion,
            TraitKind::Agreeableness,
            TraitKind::Neuroticism,
        ]
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

pub const FACETS_PER_TRAIT: usize = 6;

/// Five traits, six facets each, every facet an integer in 1..=20.
///
/// Structurally immutable after creation; facet values may still
/// drift per simulated year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personality {
    facets: [[u8; FACETS_PER_TRAIT]; 5],
}

impl Personality {
    /// Direct random draw for agents that skip infancy.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let mut facets = [[10u8; FACETS_PER_TRAIT]; 5];
        for row in &mut facets {
            for facet in row.iter_mut() {
                *facet = rng.gen_range(1..=20);
            }
        }
        Self { facets }
    }

    pub fn from_facets(facets: [[u8; FACETS_PER_TRAIT]; 5]) -> Self {
        let mut p = Self { facets };
        for row in &mut p.facets {
            for facet in row.iter_mut() {
                *facet = (*facet).clamp(1, 20);
            }
        }
        p
    }

    pub fn facet(&self, t: TraitKind, facet: usize) -> u8 {
        self.facets[t.index()][facet]
    }

    pub fn set_facet(&mut self, t: TraitKind, facet: usize, value: u8) {
        self.facets[t.index()][facet] = value.clamp(1, 20);
    }

    /// Mean of the six facet values for a broad trait.
    pub fn trait_score(&self, t: TraitKind) -> f64 {
        let row = &self.facets[t.index()];
        row.iter().map(|&f| f as f64).sum::<f64>() / FACETS_PER_TRAIT as f64
    }

    /// One simulated year of bounded mean-reversion drift.
    ///
    /// The rate decays with age; the structure (5x6 facets) never
    /// changes, only values move, and they stay in 1..=20.
    pub fn yearly_drift<R: Rng>(&mut self, rng: &mut R, age_years: u32) {
        let rate = drift_rate(age_years);
        for row in &mut self.facets {
            for facet in row.iter_mut() {
                let current = *facet as f64;
                let reversion = 0.35 * (10.5 - current);
                let noise = rng::gaussian(rng, 0.0, 2.0);
                let next = current + rate * (reversion + noise);
                *facet = next.round().clamp(1.0, 20.0) as u8;
            }
        }
    }
}

/// Annual drift rate by age: 20% through age 6 down to 2% past 40.
pub fn drift_rate(age_years: u32) -> f64 {
    match age_years {
        0..=6 => 0.20,
        7..=13 => 0.12,
        14..=25 => 0.08,
        26..=40 => 0.04,
        _ => 0.02,
    }
}

/// Projects a parent's facet-level personality onto the nine
/// temperament dimensions, 0..=100 scale.
fn heritable_projection(p: &Personality) -> [f64; 9] {
    // Facet value 1..=20 mapped to 0..=100.
    let pct = |t: TraitKind, facet: usize| (p.facet(t, facet) as f64 - 1.0) / 19.0 * 100.0;
    use TraitKind::*;
    [
        // Activity <- extraversion activity-level, excitement-seeking
        0.7 * pct(Extraversion, 3) + 0.3 * pct(Extraversion, 4),
        // Regularity <- conscientiousness orderliness, self-discipline
        0.5 * pct(Conscientiousness, 1) + 0.5 * pct(Conscientiousness, 4),
        // Approach <- extraversion gregariousness, openness adventurousness
        0.5 * pct(Extraversion, 1) + 0.5 * pct(Openness, 3),
        // Adaptability <- agreeableness cooperation, low neuroticism anger
        0.6 * pct(Agreeableness, 3) + 0.4 * (100.0 - pct(Neuroticism, 1)),
        // Threshold <- low neuroticism vulnerability, low openness emotionality
        0.6 * (100.0 - pct(Neuroticism, 5)) + 0.4 * (100.0 - pct(Openness, 2)),
        // Intensity <- neuroticism anger, extraversion assertiveness
        0.5 * pct(Neuroticism, 1) + 0.5 * pct(Extraversion, 2),
        // Mood <- extraversion cheerfulness, low neuroticism depression
        0.6 * pct(Extraversion, 5) + 0.4 * (100.0 - pct(Neuroticism, 2)),
        // Distractibility <- low conscientiousness self-discipline, immoderation
        0.5 * (100.0 - pct(Conscientiousness, 4)) + 0.5 * pct(Neuroticism, 4),
        // Persistence <- conscientiousness achievement-striving, self-efficacy
        0.6 * pct(Conscientiousness, 3) + 0.4 * pct(Conscientiousness, 0),
    ]
}

/// The one-way developmental state of an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "stage", content = "value")]
pub enum Development {
    Developing(Temperament),
    Crystallized(Personality),
}

impl Development {
    pub fn is_developing(&self) -> bool {
        matches!(self, Development::Developing(_))
    }

    pub fn temperament(&self) -> Option<&Temperament> {
        match self {
            Development::Developing(t) => Some(t),
            Development::Crystallized(_) => None,
        }
    }

    pub fn personality(&self) -> Option<&Personality> {
        match self {
            Development::Developing(_) => None,
            Development::Crystallized(p) => Some(p),
        }
    }
}

/// Advances an agent's developmental state by one month.
///
/// This is the single code path for both live simulation and
/// backfill, which is what makes a backfilled agent bit-identical to
/// a continuously simulated one under the same seed.
pub fn advance_month(agent: &mut Agent, world_seed: u64) {
    agent.age_months += 1;
    let month = agent.age_months;
    let agent_id = agent.id.0.clone();

    match &mut agent.development {
        Development::Developing(temperament) => {
            if month < CRYSTALLIZATION_AGE_MONTHS {
                let p = plasticity(month);
                for &t in TemperamentTrait::all() {
                    let mut stream =
                        rng::month_stream(world_seed, &agent_id, month as u64, t.stream_tag());
                    temperament.drift_trait(t, &mut stream, p);
                }
                agent.brain.infant = temperament_to_infant_params(temperament);
                agent.brain.homeostasis.decay_monthly();
            } else {
                // Month-36 boundary: one-shot, irreversible.
                let personality = crystallize(temperament);
                agent.development = Development::Crystallized(personality);
            }
        }
        Development::Crystallized(personality) => {
            if month > CRYSTALLIZATION_AGE_MONTHS && month % 12 == 0 {
                let year = (month / 12) as u64;
                let mut stream = rng::stream(world_seed, &agent_id, year, "drift", "big5");
                personality.yearly_drift(&mut stream, year as u32);
            }
        }
    }
}
