//! Life Simulation Demo Binary
//!
//! Runs a small population through monthly ticks: developmental
//! drift, event auto-resolution for NPCs, and a trivially scripted
//! player. Useful for eyeballing determinism and population texture.

use std::path::PathBuf;

use clap::Parser;

use npc_core::agent::{Agent, AgentId};
use npc_core::config::{NpcBrainConfig, DEFAULT_TUNING_PATH};
use npc_core::development::{advance_month, backfill};
use npc_core::lifecycle::LifecycleManager;
use npc_core::snapshot::PopulationSnapshot;
use npc_events::EventLibrary;

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "life_sim")]
#[command(about = "A deterministic life-simulation decision core demo")]
struct Args {
    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of agents (including the player)
    #[arg(long, default_value_t = 20)]
    agents: usize,

    /// Number of months to simulate
    #[arg(long, default_value_t = 120)]
    months: u64,

    /// Path to the npc_brain tuning file
    #[arg(long, default_value = DEFAULT_TUNING_PATH)]
    tuning: String,

    /// Path to a JSON event definition file (no events when omitted)
    #[arg(long)]
    events: Option<PathBuf>,

    /// Interval between population snapshots (in months)
    #[arg(long, default_value_t = 12)]
    snapshot_interval: u64,
}

fn main() {
    let args = Args::parse();

    println!("Life Simulation Decision Core");
    println!("=============================");
    println!("Seed: {}", args.seed);
    println!("Agents: {}", args.agents);
    println!("Months: {}", args.months);
    println!();

    let config = NpcBrainConfig::load(&args.tuning).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load {}: {}. Using defaults.", args.tuning, e);
        NpcBrainConfig::default()
    });

    let library = match &args.events {
        Some(path) => EventLibrary::from_file(path).unwrap_or_else(|e| {
            eprintln!("Error loading events from {}: {}", path.display(), e);
            std::process::exit(1);
        }),
        None => EventLibrary::default(),
    };
    println!("Loaded {} event definitions", library.len());

    let mut manager = LifecycleManager::new(config, library);
    let mut population = build_population(args.seed, args.agents);

    for month in 1..=args.months {
        for agent in &mut population {
            advance_month(agent, args.seed);
        }

        // The demo player always takes the first choice of whatever
        // is offered, which still exercises the tracker path.
        let player_index = population.iter().position(|a| a.is_player);
        if let Some(i) = player_index {
            if let Some(event_id) = manager.offer_player(&population[i]) {
                if let Err(e) = manager.resolve(&mut population[i], &event_id, &[0]) {
                    eprintln!("Warning: player resolution failed: {e}");
                }
            }
        }

        let resolved = manager.auto_resolve_all(&mut population, args.seed);

        if month % args.snapshot_interval == 0 {
            let snapshot = PopulationSnapshot::capture(month, &population);
            let crystallized = snapshot
                .agents
                .iter()
                .filter(|a| a.stage == "crystallized")
                .count();
            println!(
                "month {:>4}: {} resolved this tick, {}/{} crystallized",
                month,
                resolved,
                crystallized,
                snapshot.agents.len()
            );
        }
    }

    let final_snapshot = PopulationSnapshot::capture(args.months, &population);
    match final_snapshot.to_json() {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Error serializing final snapshot: {e}"),
    }
}

/// Builds the demo population: a newborn player, plus NPCs of which
/// every third spawns mid-life and is backfilled to a plausible age.
fn build_population(seed: u64, count: usize) -> Vec<Agent> {
    let mut population = Vec::with_capacity(count);

    let mut player = Agent::newborn(seed, AgentId::new("npc-00000000"), None);
    player.is_player = true;
    population.push(player);

    for i in 1..count {
        let id = AgentId::new(format!("npc-{i:08}"));
        let mut agent = Agent::newborn(seed, id, None);
        if i % 3 == 0 {
            let target_age_months = (12 + (i as u32 * 7) % 480) as u32;
            backfill(&mut agent, target_age_months, seed, None);
        }
        population.push(agent);
    }
    population
}
