//! End-to-end determinism and sampling-behavior checks.
//!
//! Everything here runs the public surface the way an embedding game
//! would: spawn a population, tick months, auto-resolve events, and
//! compare serialized outcomes across runs.

use rand::Rng;

use npc_core::agent::{Agent, AgentId};
use npc_core::brain::profile::DEFAULT_WEIGHTS;
use npc_core::brain::{sample_index, softmax, NpcBrain};
use npc_core::config::NpcBrainConfig;
use npc_core::development::advance_month;
use npc_core::features::{Feature, FeatureVector};
use npc_core::lifecycle::LifecycleManager;
use npc_core::rng;
use npc_core::snapshot::PopulationSnapshot;
use npc_events::fixtures;

fn simulate(seed: u64, months: u64, ids: &[&str]) -> String {
    let mut manager =
        LifecycleManager::new(NpcBrainConfig::default(), fixtures::sample_library());
    let mut population: Vec<Agent> = ids
        .iter()
        .map(|id| Agent::newborn(seed, AgentId::new(*id), None))
        .collect();

    for _ in 0..months {
        for agent in &mut population {
            advance_month(agent, seed);
        }
        manager.auto_resolve_all(&mut population, seed);
    }

    PopulationSnapshot::capture(months, &population)
        .to_json()
        .expect("snapshot serializes")
}

const IDS: [&str; 6] = [
    "npc-00000001",
    "npc-00000002",
    "npc-00000003",
    "npc-00000004",
    "npc-00000005",
    "npc-00000006",
];

#[test]
fn identical_seeds_reproduce_the_population_bit_for_bit() {
    assert_eq!(simulate(42, 48, &IDS), simulate(42, 48, &IDS));
}

#[test]
fn different_world_seeds_diverge() {
    assert_ne!(simulate(42, 48, &IDS), simulate(43, 48, &IDS));
}

#[test]
fn population_insertion_order_does_not_matter() {
    let mut reversed = IDS;
    reversed.reverse();
    // Snapshots sort by id, so any difference here would come from
    // iteration order leaking into the per-agent streams.
    assert_eq!(simulate(42, 48, &IDS), simulate(42, 48, &reversed));
}

#[test]
fn streams_are_independent_per_agent() {
    let alone = simulate(42, 24, &["npc-00000001"]);
    let crowded = simulate(42, 24, &IDS);

    let alone: serde_json::Value = serde_json::from_str(&alone).unwrap();
    let crowded: serde_json::Value = serde_json::from_str(&crowded).unwrap();
    // Agent 1's row must be identical whether or not others exist.
    assert_eq!(alone["agents"][0], crowded["agents"][0]);
}

#[test]
fn lower_temperature_concentrates_on_the_best_option() {
    let better = {
        let mut v = FeatureVector::default();
        v.set(Feature::HappinessDelta, 0.8);
        v
    };
    let worse = {
        let mut v = FeatureVector::default();
        v.set(Feature::HappinessDelta, 0.2);
        v
    };
    let options = [better, worse];

    let best_picks = |temperature: f64| -> usize {
        (0..400)
            .filter(|&key| {
                let mut stream =
                    rng::stream(11, "npc-00000001", key, "event_choice", "EVT_TEMP");
                let decision =
                    NpcBrain::choose(&options, &DEFAULT_WEIGHTS, temperature, &mut stream)
                        .unwrap();
                decision.index == 0
            })
            .count()
    };

    let sharp = best_picks(0.15);
    let loose = best_picks(2.0);
    assert!(
        sharp > loose,
        "T=0.15 picked best {sharp}/400, T=2.0 picked best {loose}/400"
    );
    // At T=0.15 the 0.6-utility gap should be near-decisive.
    assert!(sharp > 380, "sharp sampling picked best only {sharp}/400");
}

#[test]
fn sampling_tracks_the_probability_mass() {
    let probabilities = [0.9, 0.1];
    let mut stream = rng::stream(5, "npc-00000002", 0, "event_choice", "EVT_MASS");
    let heavy = (0..500)
        .filter(|_| sample_index(&probabilities, &mut stream) == 0)
        .count();
    assert!(heavy > 400, "index 0 sampled {heavy}/500");
}

#[test]
fn softmax_is_valid_for_arbitrary_scores() {
    let mut stream = rng::stream(13, "scores", 0, "test", "softmax");
    for _ in 0..50 {
        let n = stream.gen_range(1..=8);
        let scores: Vec<f64> = (0..n).map(|_| stream.gen_range(-50.0..50.0)).collect();
        for temperature in [0.05, 0.5, 1.0, 5.0] {
            let probs = softmax(&scores, temperature);
            assert_eq!(probs.len(), scores.len());
            assert!(probs.iter().all(|&p| (0.0..=1.0).contains(&p)));
            let sum: f64 = probs.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9, "sum {sum} at T={temperature}");
        }
    }
}

#[test]
fn auto_resolution_history_is_reproducible() {
    let run = || {
        let mut manager =
            LifecycleManager::new(NpcBrainConfig::default(), fixtures::sample_library());
        let mut agent = Agent::newborn(42, AgentId::new("npc-00000001"), None);
        let mut resolutions = Vec::new();
        for _ in 0..240 {
            advance_month(&mut agent, 42);
            if let Ok(Some(resolution)) = manager.auto_resolve(&mut agent, 42) {
                resolutions.push((agent.age_months, resolution.event_id, resolution.applied));
            }
        }
        resolutions
    };
    let first = run();
    assert_eq!(first, run());
    assert!(!first.is_empty(), "twenty years should hit some events");
}
