//! Event Definition Types
//!
//! Serde types matching the externally-authored event schema.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Dependent stats an effect bundle may touch.
///
/// Stat references are resolved through this enum at load time; there
/// is no lookup-by-arbitrary-string path at resolution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    Health,
    Happiness,
    Wealth,
    Relationship,
}

impl StatKind {
    /// Returns all stat kinds in canonical order.
    pub fn all() -> &'static [StatKind] {
        &[
            StatKind::Health,
            StatKind::Happiness,
            StatKind::Wealth,
            StatKind::Relationship,
        ]
    }
}

/// The nine temperament dimensions of an infant agent.
///
/// Values live in 0..=100 on the agent; effect bundles carry signed
/// deltas keyed by these names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperamentTrait {
    Activity,
    Regularity,
    Approach,
    Adaptability,
    Threshold,
    Intensity,
    Mood,
    Distractibility,
    Persistence,
}

impl TemperamentTrait {
    /// Returns all nine traits in canonical order.
    pub fn all() -> &'static [TemperamentTrait] {
        &[
            TemperamentTrait::Activity,
            TemperamentTrait::Regularity,
            TemperamentTrait::Approach,
            TemperamentTrait::Adaptability,
            TemperamentTrait::Threshold,
            TemperamentTrait::Intensity,
            TemperamentTrait::Mood,
            TemperamentTrait::Distractibility,
            TemperamentTrait::Persistence,
        ]
    }

    /// Stable stream tag for this trait's developmental random walk.
    pub fn stream_tag(&self) -> &'static str {
        match self {
            TemperamentTrait::Activity => "temp-activity",
            TemperamentTrait::Regularity => "temp-regularity",
            TemperamentTrait::Approach => "temp-approach",
            TemperamentTrait::Adaptability => "temp-adaptability",
            TemperamentTrait::Threshold => "temp-threshold",
            TemperamentTrait::Intensity => "temp-intensity",
            TemperamentTrait::Mood => "temp-mood",
            TemperamentTrait::Distractibility => "temp-distractibility",
            TemperamentTrait::Persistence => "temp-persistence",
        }
    }
}

/// The six appraisal dimensions infant scoring understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppraisalDim {
    ComfortDelta,
    EnergyCost,
    SafetyRisk,
    NoveltyLoad,
    Familiarity,
    SocialSoothing,
}

impl AppraisalDim {
    /// Returns all six dimensions in canonical order.
    pub fn all() -> &'static [AppraisalDim] {
        &[
            AppraisalDim::ComfortDelta,
            AppraisalDim::EnergyCost,
            AppraisalDim::SafetyRisk,
            AppraisalDim::NoveltyLoad,
            AppraisalDim::Familiarity,
            AppraisalDim::SocialSoothing,
        ]
    }
}

/// How the event is presented and how many choices it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiType {
    SingleSelect,
    MultiSelect,
}

/// Selection bounds for multi-select events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_selection_count")]
    pub min_selections: usize,
    #[serde(default = "default_selection_count")]
    pub max_selections: usize,
}

fn default_selection_count() -> usize {
    1
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            min_selections: 1,
            max_selections: 1,
        }
    }
}

/// Age window in which an event may fire.
///
/// Authors may write the window in years (`min_age`/`max_age`) or in
/// months (`min_age_months`/`max_age_months`). Months take precedence
/// when both are present.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Trigger {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_age_months: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age_months: Option<u32>,
}

impl Trigger {
    /// Returns the trigger window in months, `(min, max)` inclusive.
    ///
    /// A year-based bound covers the whole year: `max_age = 5` means
    /// "through month 71". Missing bounds are open (0 / `u32::MAX`).
    pub fn month_window(&self) -> (u32, u32) {
        let min = self
            .min_age_months
            .or_else(|| self.min_age.map(|y| y.saturating_mul(12)))
            .unwrap_or(0);
        let max = self
            .max_age_months
            .or_else(|| {
                self.max_age
                    .map(|y| y.saturating_mul(12).saturating_add(11))
            })
            .unwrap_or(u32::MAX);
        (min, max)
    }

    /// Whether an agent of the given age (in months) is inside the window.
    pub fn contains(&self, age_months: u32) -> bool {
        let (min, max) = self.month_window();
        age_months >= min && age_months <= max
    }
}

/// Bundle of effects a single choice applies when selected.
///
/// All sections are optional; an absent section applies nothing.
/// Maps are `BTreeMap` so application order is stable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Effects {
    /// Signed deltas to dependent stats.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub stats: BTreeMap<StatKind, f64>,
    /// Signed deltas to temperament traits (plasticity-scaled on apply).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub temperament: BTreeMap<TemperamentTrait, f64>,
    /// Signed grade deltas, keyed by subject name. The reserved key
    /// `"*"` distributes the delta evenly across all active subjects.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub subjects: BTreeMap<String, f64>,
    /// Explicit infant appraisal values in 0..=1. Any dimension left
    /// out here is derived from the temperament deltas at scoring time.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub infant_appraisal: BTreeMap<AppraisalDim, f64>,
}

impl Effects {
    /// True when no section carries any entry.
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
            && self.temperament.is_empty()
            && self.subjects.is_empty()
            && self.infant_appraisal.is_empty()
    }
}

/// One selectable option on an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub text: String,
    #[serde(default)]
    pub effects: Effects,
    /// Optional grouping label, used by quota-validated events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Choice {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            effects: Effects::default(),
            category: None,
        }
    }

    pub fn with_effects(mut self, effects: Effects) -> Self {
        self.effects = effects;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// An immutable event definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDef {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub trigger: Trigger,
    pub ui_type: UiType,
    pub choices: Vec<Choice>,
    /// Fires at most once per agent lifetime when set.
    #[serde(default)]
    pub once_per_lifetime: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_config: Option<UiConfig>,
    /// Whether NPCs may resolve this event automatically.
    #[serde(default = "default_npc_auto")]
    pub npc_auto: bool,
    /// Free-form tags; the `infant` tag routes scoring to the infant
    /// engine for eligible agents.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

fn default_npc_auto() -> bool {
    true
}

impl EventDef {
    /// Selection bounds, defaulting to exactly one choice.
    pub fn selection_bounds(&self) -> (usize, usize) {
        match (self.ui_type, self.ui_config) {
            (UiType::MultiSelect, Some(cfg)) => (cfg.min_selections, cfg.max_selections),
            _ => (1, 1),
        }
    }

    /// Whether this event carries the given tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Whether the whole trigger window sits inside infancy (months 0..=35).
    pub fn infant_windowed(&self) -> bool {
        let (_, max) = self.trigger.month_window();
        max <= 35
    }
}
