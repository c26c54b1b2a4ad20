//! Deterministic RNG Factory
//!
//! Every stochastic call in the core routes through a stream derived
//! from `(world_seed, agent_id, time_step, domain, decision_key)`.
//! Identical inputs give bit-identical sequences across runs and
//! process restarts; distinct decision keys give independent streams.
//! There is no other entropy source anywhere in the engine.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Derives an independent pseudo-random stream from the five-part key.
///
/// The key is canonicalized as
/// `"{world_seed}:{agent_id}:{time_step}:{domain}:{decision_key}"`,
/// hashed with FNV-1a (stable across platforms and releases, unlike
/// `DefaultHasher`), and expanded to a full ChaCha seed via SplitMix64.
pub fn stream(
    world_seed: u64,
    agent_id: &str,
    time_step: u64,
    domain: &str,
    decision_key: &str,
) -> ChaCha8Rng {
    let key = format!("{world_seed}:{agent_id}:{time_step}:{domain}:{decision_key}");
    from_key(&key)
}

/// Stream for a developmental random walk at a given month.
///
/// Keyed per trait so temperament dimensions evolve independently.
pub fn month_stream(world_seed: u64, agent_id: &str, month: u64, tag: &str) -> ChaCha8Rng {
    stream(world_seed, agent_id, month, "development", tag)
}

fn from_key(key: &str) -> ChaCha8Rng {
    let mut state = fnv1a_64(key.as_bytes());
    let mut seed = [0u8; 32];
    for chunk in seed.chunks_exact_mut(8) {
        chunk.copy_from_slice(&splitmix64(&mut state).to_le_bytes());
    }
    ChaCha8Rng::from_seed(seed)
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    for &byte in bytes {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Samples a normal deviate via the Box-Muller polar method.
pub fn gaussian<R: Rng>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    loop {
        let u: f64 = rng.gen_range(-1.0..1.0);
        let v: f64 = rng.gen_range(-1.0..1.0);
        let s = u * u + v * v;
        if s > 0.0 && s < 1.0 {
            let factor = (-2.0 * s.ln() / s).sqrt();
            return mean + std_dev * u * factor;
        }
    }
}
