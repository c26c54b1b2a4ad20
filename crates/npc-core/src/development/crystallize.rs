//! Temperament → Personality Crystallization
//!
//! One-shot, pure, deterministic transform taken at the month-36
//! boundary. Four latent factors are fixed linear combinations of the
//! normalized temperament dimensions; each of the 30 facets is a
//! further fixed combination of latents and raw temperament terms,
//! squashed onto 1..=20. The transform is total: every facet always
//! receives a numeric contribution.

use npc_events::TemperamentTrait;

use super::{Personality, Temperament, FACETS_PER_TRAIT};

/// The four latent developmental factors.
#[derive(Debug, Clone, Copy)]
struct Latents {
    surgency: f64,
    effortful_control: f64,
    negative_affect: f64,
    orientation: f64,
}

fn latents(t: &Temperament) -> Latents {
    let n = |dim: TemperamentTrait| t.normalized(dim);
    use TemperamentTrait::*;
    Latents {
        surgency: 0.45 * n(Activity) + 0.35 * n(Approach) + 0.20 * n(Intensity),
        effortful_control: 0.40 * n(Persistence) + 0.35 * n(Regularity) - 0.25 * n(Distractibility),
        negative_affect: 0.40 * n(Intensity) - 0.35 * n(Mood) - 0.25 * n(Adaptability),
        orientation: 0.35 * n(Approach) + 0.35 * n(Adaptability) - 0.30 * n(Threshold),
    }
}

/// Per-facet raw temperament contribution: (dimension, weight, offset).
///
/// Rows follow `TraitKind` order (openness, conscientiousness,
/// extraversion, agreeableness, neuroticism); columns are the six
/// facets of each trait.
const FACET_RAW: [[(TemperamentTrait, f64, f64); FACETS_PER_TRAIT]; 5] = {
    use TemperamentTrait::*;
    [
        // Openness: imagination, artistic interest, emotionality,
        // adventurousness, intellect, liberalism
        [
            (Approach, 0.30, 0.00),
            (Mood, 0.20, -0.05),
            (Intensity, 0.30, 0.00),
            (Activity, 0.30, 0.05),
            (Persistence, 0.20, 0.00),
            (Adaptability, 0.20, -0.10),
        ],
        // Conscientiousness: self-efficacy, orderliness, dutifulness,
        // achievement striving, self-discipline, cautiousness
        [
            (Persistence, 0.30, 0.05),
            (Regularity, 0.40, 0.00),
            (Regularity, 0.20, 0.00),
            (Persistence, 0.30, 0.00),
            (Distractibility, -0.35, 0.00),
            (Threshold, 0.20, -0.05),
        ],
        // Extraversion: friendliness, gregariousness, assertiveness,
        // activity level, excitement seeking, cheerfulness
        [
            (Mood, 0.30, 0.05),
            (Approach, 0.30, 0.00),
            (Intensity, 0.20, 0.00),
            (Activity, 0.40, 0.00),
            (Distractibility, 0.20, -0.05),
            (Mood, 0.40, 0.00),
        ],
        // Agreeableness: trust, morality, altruism, cooperation,
        // modesty, sympathy
        [
            (Mood, 0.20, 0.05),
            (Regularity, 0.20, 0.00),
            (Approach, 0.20, 0.00),
            (Adaptability, 0.30, 0.00),
            (Intensity, -0.25, 0.00),
            (Threshold, -0.20, 0.05),
        ],
        // Neuroticism: anxiety, anger, depression, self-consciousness,
        // immoderation, vulnerability
        [
            (Threshold, -0.30, 0.00),
            (Intensity, 0.30, 0.00),
            (Mood, -0.40, 0.00),
            (Approach, -0.20, 0.00),
            (Distractibility, 0.30, -0.05),
            (Adaptability, -0.30, 0.00),
        ],
    ]
};

/// Logistic squash of a roughly -2..2 signal onto the 1..=20 facet range.
fn squash(x: f64) -> u8 {
    let logistic = 1.0 / (1.0 + (-1.6 * x).exp());
    (1.0 + 19.0 * logistic).round().clamp(1.0, 20.0) as u8
}

/// Converts a final temperament snapshot into a full personality.
pub fn crystallize(t: &Temperament) -> Personality {
    let l = latents(t);
    let trait_base = [
        // Openness
        0.70 * l.orientation + 0.20 * l.surgency,
        // Conscientiousness
        0.90 * l.effortful_control,
        // Extraversion
        0.90 * l.surgency,
        // Agreeableness
        -0.40 * l.negative_affect + 0.30 * l.orientation + 0.20 * l.effortful_control,
        // Neuroticism
        0.90 * l.negative_affect,
    ];

    let mut facets = [[10u8; FACETS_PER_TRAIT]; 5];
    for (trait_idx, row) in FACET_RAW.iter().enumerate() {
        for (facet_idx, &(dim, weight, offset)) in row.iter().enumerate() {
            let signal = trait_base[trait_idx] + weight * t.normalized(dim) + offset;
            facets[trait_idx][facet_idx] = squash(signal);
        }
    }
    Personality::from_facets(facets)
}
