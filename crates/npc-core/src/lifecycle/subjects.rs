//! Subject-Track Selection Strategy
//!
//! The one special-cased event in the lifecycle: subject-track
//! selection is rebuilt from external curriculum data before being
//! offered, validates category quotas on resolution, and biases NPC
//! scores by classroom affinity. Keeping it behind an explicit
//! strategy keeps the general resolution path a clean total function.

use npc_events::{Choice, Effects, EventDef, Trigger, UiConfig, UiType};

/// Event id this strategy owns.
pub const SUBJECT_TRACK_EVENT_ID: &str = "EVT_SUBJECT_TRACKS";

/// Flat score modifier for same-classroom affinity. The magnitude is
/// exactly 10 regardless of how strong the affinity is; only the sign
/// of the affinity matters.
pub const FORM_MODIFIER: f64 = 10.0;

/// Grade head start granted by picking a track.
const TRACK_GRADE_BONUS: f64 = 5.0;

/// One offerable subject from the school system.
#[derive(Debug, Clone)]
pub struct CurriculumSubject {
    pub name: String,
    pub category: String,
    /// Net affinity toward classmates already in this track's form;
    /// only the sign is used (see `FORM_MODIFIER`).
    pub classmate_affinity: f64,
}

/// External curriculum data consumed when rebuilding the event.
#[derive(Debug, Clone)]
pub struct Curriculum {
    pub subjects: Vec<CurriculumSubject>,
    /// How many tracks a student must pick.
    pub picks_required: usize,
}

/// Isolated strategy for the subject-track event, selected by id.
#[derive(Debug, Clone, Default)]
pub struct SubjectTrackStrategy {
    curriculum: Option<Curriculum>,
}

impl SubjectTrackStrategy {
    pub fn applies_to(event_id: &str) -> bool {
        event_id == SUBJECT_TRACK_EVENT_ID
    }

    /// Installs fresh curriculum data and returns the rebuilt event
    /// definition to splice into the library.
    pub fn install(&mut self, curriculum: Curriculum, window: Trigger) -> EventDef {
        let choices: Vec<Choice> = curriculum
            .subjects
            .iter()
            .map(|subject| {
                let mut effects = Effects::default();
                effects
                    .subjects
                    .insert(subject.name.clone(), TRACK_GRADE_BONUS);
                Choice::new(subject.name.clone())
                    .with_effects(effects)
                    .with_category(subject.category.clone())
            })
            .collect();
        let picks = curriculum.picks_required;
        self.curriculum = Some(curriculum);
        EventDef {
            id: SUBJECT_TRACK_EVENT_ID.to_string(),
            title: "Choose Your Subject Tracks".to_string(),
            description: "Pick your tracks for the coming school years.".to_string(),
            trigger: window,
            ui_type: UiType::MultiSelect,
            choices,
            once_per_lifetime: true,
            ui_config: Some(UiConfig {
                min_selections: picks,
                max_selections: picks,
            }),
            npc_auto: true,
            tags: vec![],
        }
    }

    /// Validates a selection against the selection bounds and the
    /// category quota: every category offered by the event must be
    /// represented at least once. Returns a user-facing message on
    /// violation; the caller aborts the whole resolution.
    pub fn validate(&self, event: &EventDef, selected: &[usize]) -> Result<(), String> {
        let (min, max) = event.selection_bounds();
        if selected.len() < min || selected.len() > max {
            return Err(format!(
                "Select between {min} and {max} tracks ({} chosen).",
                selected.len()
            ));
        }

        let offered: Vec<&str> = distinct_categories(event);
        for category in offered {
            let covered = selected.iter().any(|&i| {
                event.choices[i]
                    .category
                    .as_deref()
                    .is_some_and(|c| c == category)
            });
            if !covered {
                return Err(format!("Pick at least one {category} track."));
            }
        }
        Ok(())
    }

    /// Adds the flat classroom-affinity modifier to each choice's
    /// score. Choices without curriculum data are left untouched.
    pub fn adjust_scores(&self, event: &EventDef, scores: &mut [f64]) {
        let Some(curriculum) = &self.curriculum else {
            return;
        };
        for (i, choice) in event.choices.iter().enumerate() {
            let Some(subject) = curriculum.subjects.iter().find(|s| s.name == choice.text) else {
                continue;
            };
            if subject.classmate_affinity > 0.0 {
                scores[i] += FORM_MODIFIER;
            } else if subject.classmate_affinity < 0.0 {
                scores[i] -= FORM_MODIFIER;
            }
        }
    }

    /// Deterministic quota-respecting top-k: the best choice of each
    /// offered category is taken first, remaining slots fill by global
    /// score, ties broken by original index. Returns sorted indices.
    pub fn choose_with_quotas(event: &EventDef, scores: &[f64], k: usize) -> Vec<usize> {
        let mut picked: Vec<usize> = Vec::new();

        for category in distinct_categories(event) {
            let best = event
                .choices
                .iter()
                .enumerate()
                .filter(|(_, c)| c.category.as_deref() == Some(category))
                .max_by(|(a, _), (b, _)| {
                    scores[*a]
                        .partial_cmp(&scores[*b])
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then(b.cmp(a))
                })
                .map(|(i, _)| i);
            if let Some(i) = best {
                if picked.len() < k && !picked.contains(&i) {
                    picked.push(i);
                }
            }
        }

        let mut rest: Vec<usize> = (0..scores.len()).filter(|i| !picked.contains(i)).collect();
        rest.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });
        picked.extend(rest.into_iter().take(k.saturating_sub(picked.len())));
        picked.sort_unstable();
        picked
    }
}

/// Categories offered by the event, in first-appearance order.
fn distinct_categories(event: &EventDef) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for choice in &event.choices {
        if let Some(category) = choice.category.as_deref() {
            if !seen.contains(&category) {
                seen.push(category);
            }
        }
    }
    seen
}
