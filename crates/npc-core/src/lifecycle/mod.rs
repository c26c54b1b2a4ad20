//! Event Lifecycle Manager
//!
//! Per agent per month: Idle -> Evaluate -> (Pending | Idle) ->
//! Resolve -> Idle. Evaluation scans definitions in a stable order;
//! resolution routes through exactly one scoring engine and applies
//! effects atomically. The player's modal slot and the style tracker
//! are touched only by the player's own path.

pub mod subjects;

use thiserror::Error;
use tracing::{debug, warn};

use npc_events::{EventDef, EventLibrary, TemperamentTrait, UiType};

use crate::agent::Agent;
use crate::brain::{InfantBrain, NpcBrain};
use crate::config::NpcBrainConfig;
use crate::development::{plasticity, Development};
use crate::features::{choice_to_features, choice_to_infant_appraisal, FeatureVector};
use crate::mimicry::{effective_weights, PlayerStyleTracker};

use subjects::{Curriculum, SubjectTrackStrategy};

/// Which engine scores an event for a given agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    Npc,
    Infant,
}

/// The outcome of one resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub event_id: String,
    /// Choice indices whose effects were applied, in ascending order.
    pub applied: Vec<usize>,
}

/// Errors surfaced by the resolution paths.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("unknown event '{0}'")]
    UnknownEvent(String),
    #[error("event '{0}': no valid choice indices remained")]
    NoValidChoices(String),
    #[error("event '{event}': {selected} choices selected, expected between {min} and {max}")]
    SelectionCount {
        event: String,
        selected: usize,
        min: usize,
        max: usize,
    },
    /// Validation failure on a quota-checked event. Nothing was
    /// applied and the event stays re-offerable.
    #[error("event '{event}': {message}")]
    QuotaViolation { event: String, message: String },
}

/// Drives the monthly event lifecycle for a population.
#[derive(Debug)]
pub struct LifecycleManager {
    config: NpcBrainConfig,
    library: EventLibrary,
    tracker: PlayerStyleTracker,
    subject_strategy: SubjectTrackStrategy,
    /// The player's modal slot: the event id currently awaiting the
    /// player's input, if any. NPC resolutions never touch this.
    pub pending_event: Option<String>,
}

impl LifecycleManager {
    pub fn new(config: NpcBrainConfig, library: EventLibrary) -> Self {
        let tracker = PlayerStyleTracker::new(config.mimicry.ema_beta);
        Self {
            config,
            library,
            tracker,
            subject_strategy: SubjectTrackStrategy::default(),
            pending_event: None,
        }
    }

    pub fn config(&self) -> &NpcBrainConfig {
        &self.config
    }

    pub fn tracker(&self) -> &PlayerStyleTracker {
        &self.tracker
    }

    pub fn library(&self) -> &EventLibrary {
        &self.library
    }

    /// Rebuilds the subject-track event from fresh curriculum data,
    /// splicing it into the library (or appending it if absent). The
    /// rebuilt event goes through full library validation; a rejected
    /// rebuild keeps the previous definitions.
    pub fn refresh_subject_tracks(
        &mut self,
        curriculum: Curriculum,
        window: npc_events::Trigger,
    ) {
        let previous = self.subject_strategy.clone();
        let event = self.subject_strategy.install(curriculum, window);
        // Definition order stays stable: an existing id keeps its
        // position, new special events append.
        let mut candidate: Vec<EventDef> = self.library.iter().cloned().collect();
        match candidate.iter_mut().find(|e| e.id == event.id) {
            Some(slot) => *slot = event,
            None => candidate.push(event),
        }
        match EventLibrary::new(candidate) {
            Ok(library) => self.library = library,
            Err(e) => {
                self.subject_strategy = previous;
                warn!("keeping previous subject-track definition: {e}");
            }
        }
    }

    /// Scans definitions in stable order and returns the first event
    /// the agent is eligible for this month. "No event" is a normal
    /// empty result, not an error.
    pub fn evaluate(&self, agent: &Agent) -> Option<&EventDef> {
        if !self.config.events_enabled || !agent.alive {
            return None;
        }
        self.library.iter().find(|event| {
            if event.once_per_lifetime && agent.history.contains(&event.id) {
                return false;
            }
            event.trigger.contains(agent.age_months)
        })
    }

    /// Evaluates for the player and parks the event in the modal slot.
    pub fn offer_player(&mut self, agent: &Agent) -> Option<String> {
        let event_id = self.evaluate(agent).map(|e| e.id.clone());
        self.pending_event = event_id.clone();
        event_id
    }

    /// Routing rule: infant engine if and only if infant-brain-v2 is
    /// enabled, the agent is at most 35 months old, the agent still
    /// holds a temperament, and the event is infant-tagged or
    /// infant-windowed. Total and exhaustive; everything else scores
    /// through the adult engine.
    pub fn route(&self, agent: &Agent, event: &EventDef) -> Engine {
        let infant = self.config.infant_brain_v2_enabled
            && agent.age_months <= 35
            && agent.development.is_developing()
            && (event.has_tag("infant") || event.infant_windowed());
        if infant {
            Engine::Infant
        } else {
            Engine::Npc
        }
    }

    /// Player path: external caller supplies selected choice indices.
    ///
    /// Out-of-range indices are dropped with a warning; the resolution
    /// continues with the remaining valid ones. The style tracker is
    /// updated only here, and only when the agent is the player.
    pub fn resolve(
        &mut self,
        agent: &mut Agent,
        event_id: &str,
        selected: &[usize],
    ) -> Result<Resolution, LifecycleError> {
        let event = self
            .library
            .get(event_id)
            .ok_or_else(|| LifecycleError::UnknownEvent(event_id.to_string()))?
            .clone();

        let mut valid: Vec<usize> = Vec::new();
        for &index in selected {
            if index < event.choices.len() {
                if !valid.contains(&index) {
                    valid.push(index);
                }
            } else {
                warn!(
                    event = %event.id,
                    index,
                    choices = event.choices.len(),
                    "dropping out-of-range choice index"
                );
            }
        }
        if valid.is_empty() {
            return Err(LifecycleError::NoValidChoices(event.id.clone()));
        }
        valid.sort_unstable();

        if SubjectTrackStrategy::applies_to(&event.id) {
            if let Err(message) = self.subject_strategy.validate(&event, &valid) {
                // Abort entirely: no effects, no history entry, so the
                // event stays re-offerable.
                return Err(LifecycleError::QuotaViolation {
                    event: event.id.clone(),
                    message,
                });
            }
        } else {
            let (min, max) = event.selection_bounds();
            if valid.len() < min || valid.len() > max {
                return Err(LifecycleError::SelectionCount {
                    event: event.id.clone(),
                    selected: valid.len(),
                    min,
                    max,
                });
            }
        }

        apply_effects(agent, &event, &valid);
        agent.history.mark_resolved(&event.id);

        if agent.is_player {
            for &index in &valid {
                let observed = choice_to_features(&event.choices[index]);
                self.tracker.update(&observed);
            }
            if self.pending_event.as_deref() == Some(event.id.as_str()) {
                self.pending_event = None;
            }
        }

        Ok(Resolution {
            event_id: event.id,
            applied: valid,
        })
    }

    /// NPC path: evaluates and, when eligible, resolves one event for
    /// the agent using the routed engine. Never touches the player's
    /// modal slot or the style tracker.
    pub fn auto_resolve(
        &mut self,
        agent: &mut Agent,
        world_seed: u64,
    ) -> Result<Option<Resolution>, LifecycleError> {
        if !self.config.enabled {
            return Ok(None);
        }
        let Some(event) = self.evaluate(agent) else {
            return Ok(None);
        };
        if !event.npc_auto {
            return Ok(None);
        }
        let event = event.clone();
        let engine = self.route(agent, &event);

        let weights = effective_weights(&agent.brain, &self.tracker, None, &self.config);
        let mut scores = self.score_choices(agent, &event, engine, &weights);

        let selected: Vec<usize> = match event.ui_type {
            UiType::SingleSelect => {
                let probabilities =
                    crate::brain::softmax(&scores, agent.brain.style.temperature);
                let mut rng = crate::rng::stream(
                    world_seed,
                    agent.id.as_str(),
                    agent.age_months as u64,
                    "event_choice",
                    &event.id,
                );
                let index = crate::brain::sample_index(&probabilities, &mut rng);
                if self.config.log_decisions {
                    debug!(
                        agent = %agent.id.0,
                        event = %event.id,
                        ?engine,
                        ?scores,
                        ?probabilities,
                        index,
                        "auto-resolve decision"
                    );
                }
                vec![index]
            }
            UiType::MultiSelect => {
                let (_, k) = event.selection_bounds();
                if SubjectTrackStrategy::applies_to(&event.id) {
                    self.subject_strategy.adjust_scores(&event, &mut scores);
                    SubjectTrackStrategy::choose_with_quotas(&event, &scores, k)
                } else {
                    NpcBrain::choose_multi(&scores, k)
                }
            }
        };

        apply_effects(agent, &event, &selected);
        agent.history.mark_resolved(&event.id);

        Ok(Some(Resolution {
            event_id: event.id,
            applied: selected,
        }))
    }

    /// Auto-resolves at most one event for every living NPC in the
    /// population, in sorted-by-id order for log reproducibility.
    /// Returns the number of resolutions.
    pub fn auto_resolve_all(&mut self, population: &mut [Agent], world_seed: u64) -> usize {
        let mut order: Vec<usize> = (0..population.len()).collect();
        order.sort_by(|&a, &b| population[a].id.cmp(&population[b].id));

        let mut resolved = 0;
        for i in order {
            let agent = &mut population[i];
            if agent.is_player || !agent.alive {
                continue;
            }
            match self.auto_resolve(agent, world_seed) {
                Ok(Some(_)) => resolved += 1,
                Ok(None) => {}
                Err(e) => warn!(agent = %agent.id.0, "auto-resolve failed: {e}"),
            }
        }
        resolved
    }

    /// The weights an NPC would score with right now, honoring the
    /// relationship-specific mimicry override. Recomputed on demand.
    pub fn get_effective_weights(
        &self,
        agent: &Agent,
        relationship: Option<&str>,
    ) -> FeatureVector {
        effective_weights(&agent.brain, &self.tracker, relationship, &self.config)
    }

    fn score_choices(
        &self,
        agent: &Agent,
        event: &EventDef,
        engine: Engine,
        weights: &FeatureVector,
    ) -> Vec<f64> {
        match engine {
            Engine::Npc => event
                .choices
                .iter()
                .map(|choice| NpcBrain::score(&choice_to_features(choice), weights))
                .collect(),
            Engine::Infant => event
                .choices
                .iter()
                .map(|choice| {
                    InfantBrain::score(
                        &choice_to_infant_appraisal(choice),
                        &agent.brain.infant,
                        &self.config.infant,
                    )
                })
                .collect(),
        }
    }
}

/// Applies the effect bundles of the selected choices.
///
/// Stats clamp to 0..=100; temperament deltas are scaled by the
/// agent's current plasticity before being added (and are ignored once
/// crystallized); subject deltas go to named subjects, or spread
/// evenly across active ones under the reserved `"*"` key.
fn apply_effects(agent: &mut Agent, event: &EventDef, selected: &[usize]) {
    for &index in selected {
        let effects = &event.choices[index].effects;

        for (&kind, &delta) in &effects.stats {
            agent.stats.apply_delta(kind, delta);
        }

        if let Development::Developing(temperament) = &mut agent.development {
            let scale = plasticity(agent.age_months);
            for &t in TemperamentTrait::all() {
                if let Some(&delta) = effects.temperament.get(&t) {
                    temperament.apply_delta(t, delta * scale);
                }
            }
        }

        for (subject, &delta) in &effects.subjects {
            if subject == "*" {
                agent.subjects.distribute_delta(delta);
            } else {
                agent.subjects.apply_delta(subject, delta);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentId;
    use npc_events::fixtures;

    fn manager() -> LifecycleManager {
        LifecycleManager::new(NpcBrainConfig::default(), fixtures::sample_library())
    }

    fn infant(seed: u64, id: &str, age_months: u32) -> Agent {
        let mut agent = Agent::newborn(seed, AgentId::new(id), None);
        agent.age_months = age_months;
        agent
    }

    fn adult(seed: u64, id: &str, age_years: u32) -> Agent {
        Agent::with_random_personality(seed, AgentId::new(id), age_years * 12)
    }

    #[test]
    fn evaluate_returns_first_eligible_in_stable_order() {
        let manager = manager();
        let agent = infant(42, "npc-00000001", 10);
        // Months 10: vacuum (2..18), food (6..24), steps (9..20) all
        // match; the first in definition order wins.
        assert_eq!(manager.evaluate(&agent).unwrap().id, "EVT_LOUD_VACUUM");
    }

    #[test]
    fn once_per_lifetime_is_skipped_after_resolution() {
        let manager = manager();
        let mut agent = infant(42, "npc-00000002", 15);
        agent.history.mark_resolved("EVT_LOUD_VACUUM");
        agent.history.mark_resolved("EVT_NEW_FOOD");
        assert_eq!(manager.evaluate(&agent).unwrap().id, "EVT_FIRST_STEPS");
        agent.history.mark_resolved("EVT_FIRST_STEPS");
        assert!(manager.evaluate(&agent).is_none());
    }

    #[test]
    fn history_is_isolated_per_agent() {
        let manager = manager();
        let mut a = infant(42, "npc-00000003", 12);
        let b = infant(42, "npc-00000004", 12);
        a.history.mark_resolved("EVT_FIRST_STEPS");
        a.history.mark_resolved("EVT_LOUD_VACUUM");
        a.history.mark_resolved("EVT_NEW_FOOD");
        assert!(manager.evaluate(&a).is_none());
        assert_eq!(manager.evaluate(&b).unwrap().id, "EVT_LOUD_VACUUM");
    }

    #[test]
    fn routing_is_total_and_exhaustive() {
        let manager = manager();
        let library = fixtures::sample_library();
        let infant_agent = infant(1, "npc-00000005", 10);
        let adult_agent = adult(1, "npc-00000006", 20);

        for event in library.iter() {
            // Every (agent, event) pair routes to exactly one engine.
            let for_infant = manager.route(&infant_agent, event);
            let for_adult = manager.route(&adult_agent, event);
            assert!(matches!(for_infant, Engine::Npc | Engine::Infant));
            assert_eq!(for_adult, Engine::Npc, "crystallized agents never route infant");
        }

        let vacuum = library.get("EVT_LOUD_VACUUM").unwrap();
        assert_eq!(manager.route(&infant_agent, vacuum), Engine::Infant);
    }

    #[test]
    fn routing_respects_the_v2_toggle() {
        let mut config = NpcBrainConfig::default();
        config.infant_brain_v2_enabled = false;
        let manager = LifecycleManager::new(config, fixtures::sample_library());
        let agent = infant(1, "npc-00000007", 10);
        let vacuum = manager.library().get("EVT_LOUD_VACUUM").unwrap();
        assert_eq!(manager.route(&agent, vacuum), Engine::Npc);
    }

    #[test]
    fn invalid_indices_are_dropped_not_fatal() {
        let mut manager = manager();
        let mut agent = adult(42, "npc-00000008", 25);
        let resolution = manager.resolve(&mut agent, "EVT_WINDFALL", &[99, 1]).unwrap();
        assert_eq!(resolution.applied, vec![1]);
        assert!(agent.history.contains("EVT_WINDFALL"));
    }

    #[test]
    fn all_invalid_indices_reject_the_resolution() {
        let mut manager = manager();
        let mut agent = adult(42, "npc-00000009", 25);
        let result = manager.resolve(&mut agent, "EVT_WINDFALL", &[99, 100]);
        assert!(matches!(result, Err(LifecycleError::NoValidChoices(_))));
        assert!(!agent.history.contains("EVT_WINDFALL"));
    }

    #[test]
    fn effects_apply_with_clamping() {
        let mut manager = manager();
        let mut agent = adult(42, "npc-00000010", 25);
        agent.stats.happiness = 95.0;
        // Windfall choice 1: happiness +10, relationship +6, wealth -4.
        manager.resolve(&mut agent, "EVT_WINDFALL", &[1]).unwrap();
        assert_eq!(agent.stats.happiness, 100.0);
        assert_eq!(agent.stats.relationship, 56.0);
        assert_eq!(agent.stats.wealth, 46.0);
    }

    #[test]
    fn temperament_deltas_are_plasticity_scaled() {
        let mut manager = manager();
        let mut agent = infant(42, "npc-00000011", 12);
        let before = agent.development.temperament().unwrap().approach;
        // EVT_NEW_FOOD choice 0: approach +1, adaptability +1.
        manager.resolve(&mut agent, "EVT_NEW_FOOD", &[0]).unwrap();
        let after = agent.development.temperament().unwrap().approach;
        let expected = (before + 1.0 * plasticity(12)).clamp(0.0, 100.0);
        assert!((after - expected).abs() < 1e-9);
    }

    #[test]
    fn starred_subject_delta_spreads_evenly() {
        let mut manager = manager();
        let mut agent = adult(42, "npc-00000012", 15);
        agent.subjects.enroll("History", 50.0);
        agent.subjects.enroll("Physics", 50.0);
        // Exam crunch choice 0: all subjects +4 (and stat costs).
        manager.resolve(&mut agent, "EVT_EXAM_CRUNCH", &[0]).unwrap();
        assert_eq!(agent.subjects.grade("History"), Some(52.0));
        assert_eq!(agent.subjects.grade("Physics"), Some(52.0));
    }

    #[test]
    fn quota_violation_applies_nothing_and_stays_reofferable() {
        let mut manager = manager();
        manager.refresh_subject_tracks(
            subjects::Curriculum {
                subjects: vec![
                    subjects::CurriculumSubject {
                        name: "Physics".into(),
                        category: "science".into(),
                        classmate_affinity: 0.0,
                    },
                    subjects::CurriculumSubject {
                        name: "History".into(),
                        category: "humanities".into(),
                        classmate_affinity: 0.0,
                    },
                ],
                picks_required: 2,
            },
            npc_events::Trigger {
                min_age: Some(12),
                max_age: Some(14),
                ..Default::default()
            },
        );

        let mut agent = adult(42, "npc-00000013", 13);
        let before = agent.subjects.grade("Physics");
        let result = manager.resolve(&mut agent, "EVT_SUBJECT_TRACKS", &[0]);
        assert!(matches!(result, Err(LifecycleError::QuotaViolation { .. })));
        assert_eq!(agent.subjects.grade("Physics"), before);
        assert!(!agent.history.contains("EVT_SUBJECT_TRACKS"));

        // A conforming selection still works afterwards.
        let resolution = manager.resolve(&mut agent, "EVT_SUBJECT_TRACKS", &[0, 1]).unwrap();
        assert_eq!(resolution.applied, vec![0, 1]);
        assert!(agent.history.contains("EVT_SUBJECT_TRACKS"));
    }

    #[test]
    fn single_select_rejects_multiple_choices() {
        let mut manager = manager();
        let mut agent = adult(42, "npc-00000017", 25);
        let result = manager.resolve(&mut agent, "EVT_WINDFALL", &[0, 1]);
        assert!(matches!(result, Err(LifecycleError::SelectionCount { .. })));
        assert!(!agent.history.contains("EVT_WINDFALL"));
    }

    #[test]
    fn multi_select_enforces_the_max_bound() {
        let hobby = |text: &str| npc_events::Choice::new(text);
        let event = EventDef {
            id: "EVT_HOBBY_FAIR".to_string(),
            title: "Hobby Fair".to_string(),
            description: String::new(),
            trigger: npc_events::Trigger {
                min_age: Some(8),
                max_age: Some(12),
                ..Default::default()
            },
            ui_type: UiType::MultiSelect,
            choices: vec![hobby("Chess"), hobby("Football"), hobby("Choir"), hobby("Scouts")],
            once_per_lifetime: false,
            ui_config: Some(npc_events::UiConfig {
                min_selections: 1,
                max_selections: 2,
            }),
            npc_auto: true,
            tags: vec![],
        };
        let mut manager = LifecycleManager::new(
            NpcBrainConfig::default(),
            EventLibrary::new(vec![event]).unwrap(),
        );

        let mut agent = adult(42, "npc-00000018", 10);
        let result = manager.resolve(&mut agent, "EVT_HOBBY_FAIR", &[0, 1, 2]);
        assert!(matches!(result, Err(LifecycleError::SelectionCount { .. })));
        assert!(!agent.history.contains("EVT_HOBBY_FAIR"));

        let resolution = manager.resolve(&mut agent, "EVT_HOBBY_FAIR", &[0, 2]).unwrap();
        assert_eq!(resolution.applied, vec![0, 2]);
    }

    #[test]
    fn invalid_curriculum_keeps_the_previous_definition() {
        let mut manager = manager();
        let window = || npc_events::Trigger {
            min_age: Some(12),
            max_age: Some(14),
            ..Default::default()
        };
        let before = manager
            .library()
            .get("EVT_SUBJECT_TRACKS")
            .unwrap()
            .choices
            .len();

        // An empty curriculum rebuilds to an event with no choices.
        manager.refresh_subject_tracks(
            subjects::Curriculum {
                subjects: vec![],
                picks_required: 2,
            },
            window(),
        );
        let kept = manager.library().get("EVT_SUBJECT_TRACKS").unwrap();
        assert_eq!(kept.choices.len(), before);

        // More required picks than offered subjects is also rejected.
        manager.refresh_subject_tracks(
            subjects::Curriculum {
                subjects: vec![subjects::CurriculumSubject {
                    name: "Physics".into(),
                    category: "science".into(),
                    classmate_affinity: 0.0,
                }],
                picks_required: 3,
            },
            window(),
        );
        let kept = manager.library().get("EVT_SUBJECT_TRACKS").unwrap();
        assert_eq!(kept.choices.len(), before);
    }

    #[test]
    fn npc_resolution_leaves_player_state_alone() {
        let mut manager = manager();
        manager.pending_event = Some("EVT_WINDFALL".to_string());

        let mut player = adult(42, "npc-00000001", 25);
        player.is_player = true;
        let player_history_len = player.history.len();

        let mut npc = adult(42, "npc-00000014", 25);
        let resolution = manager.auto_resolve(&mut npc, 42).unwrap().unwrap();
        assert_eq!(resolution.event_id, "EVT_WINDFALL");

        assert_eq!(manager.pending_event.as_deref(), Some("EVT_WINDFALL"));
        assert_eq!(manager.tracker().observations(), 0);
        assert_eq!(player.history.len(), player_history_len);
        assert!(npc.history.contains("EVT_WINDFALL"));
    }

    #[test]
    fn player_resolution_feeds_tracker_and_clears_modal() {
        let mut manager = manager();
        let mut player = adult(42, "npc-00000001", 25);
        player.is_player = true;
        manager.offer_player(&player);
        assert_eq!(manager.pending_event.as_deref(), Some("EVT_WINDFALL"));

        manager.resolve(&mut player, "EVT_WINDFALL", &[0]).unwrap();
        assert!(manager.pending_event.is_none());
        assert_eq!(manager.tracker().observations(), 1);
    }

    #[test]
    fn auto_resolve_is_deterministic() {
        let run = || {
            let mut manager = manager();
            let mut agent = infant(42, "npc-00000015", 10);
            manager.auto_resolve(&mut agent, 42).unwrap().unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn auto_resolve_all_skips_player_and_dead() {
        let mut manager = manager();
        let mut player = adult(42, "npc-00000001", 25);
        player.is_player = true;
        let mut dead = adult(42, "npc-00000002", 25);
        dead.alive = false;
        let npc = adult(42, "npc-00000003", 25);

        let mut population = vec![player, dead, npc];
        let resolved = manager.auto_resolve_all(&mut population, 42);
        assert_eq!(resolved, 1);
        assert!(population[2].history.contains("EVT_WINDFALL"));
        assert!(population[0].history.is_empty());
        assert!(population[1].history.is_empty());
    }

    #[test]
    fn npc_auto_false_blocks_the_auto_path() {
        let mut events: Vec<EventDef> =
            fixtures::sample_library().iter().cloned().collect();
        for event in &mut events {
            event.npc_auto = false;
        }
        let mut manager = LifecycleManager::new(
            NpcBrainConfig::default(),
            EventLibrary::new(events).unwrap(),
        );
        let mut agent = adult(42, "npc-00000016", 25);
        assert!(manager.auto_resolve(&mut agent, 42).unwrap().is_none());
    }
}
