//! Event Library
//!
//! Ordered collection of event definitions with load-time validation.
//! Malformed numeric values are coerced to zero with a warning;
//! structural problems (duplicate ids, empty choice lists, inverted
//! windows) reject the whole library.

use std::collections::HashSet;
use std::path::Path;

use thiserror::Error;
use tracing::warn;

use crate::event::{EventDef, UiType};

/// Errors surfaced while loading a library of event definitions.
#[derive(Debug, Error)]
pub enum EventLoadError {
    #[error("failed to read event file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse event JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate event id '{0}'")]
    DuplicateId(String),
    #[error("event '{0}' has no choices")]
    EmptyChoices(String),
    #[error("event '{0}' has an inverted trigger window ({1}..{2} months)")]
    InvalidWindow(String, u32, u32),
    #[error("event '{0}' has invalid selection bounds (min {1}, max {2}, {3} choices)")]
    InvalidSelectionBounds(String, usize, usize, usize),
}

/// An ordered, validated set of event definitions.
///
/// Definition order is the evaluation order; it is preserved exactly
/// as authored.
#[derive(Debug, Clone, Default)]
pub struct EventLibrary {
    events: Vec<EventDef>,
}

impl EventLibrary {
    /// Builds a library from already-parsed definitions.
    pub fn new(events: Vec<EventDef>) -> Result<Self, EventLoadError> {
        let mut library = Self { events };
        library.validate()?;
        Ok(library)
    }

    /// Parses and validates a JSON array of event definitions.
    pub fn from_json(json: &str) -> Result<Self, EventLoadError> {
        let events: Vec<EventDef> = serde_json::from_str(json)?;
        Self::new(events)
    }

    /// Loads a library from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EventLoadError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Events in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &EventDef> {
        self.events.iter()
    }

    /// Looks up an event by id.
    pub fn get(&self, id: &str) -> Option<&EventDef> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn validate(&mut self) -> Result<(), EventLoadError> {
        let mut seen = HashSet::new();
        for event in &mut self.events {
            if !seen.insert(event.id.clone()) {
                return Err(EventLoadError::DuplicateId(event.id.clone()));
            }
            if event.choices.is_empty() {
                return Err(EventLoadError::EmptyChoices(event.id.clone()));
            }

            let (min, max) = event.trigger.month_window();
            if min > max {
                return Err(EventLoadError::InvalidWindow(event.id.clone(), min, max));
            }

            if event.ui_type == UiType::MultiSelect {
                let (lo, hi) = event.selection_bounds();
                if lo == 0 || lo > hi || hi > event.choices.len() {
                    return Err(EventLoadError::InvalidSelectionBounds(
                        event.id.clone(),
                        lo,
                        hi,
                        event.choices.len(),
                    ));
                }
            }

            // Numeric hygiene: non-finite effect values become zero.
            for choice in &mut event.choices {
                sanitize(&event.id, choice.effects.stats.values_mut());
                sanitize(&event.id, choice.effects.temperament.values_mut());
                sanitize(&event.id, choice.effects.subjects.values_mut());
                for value in choice.effects.infant_appraisal.values_mut() {
                    if !value.is_finite() {
                        warn!(event = %event.id, "non-finite appraisal value coerced to 0");
                        *value = 0.0;
                    } else {
                        *value = value.clamp(0.0, 1.0);
                    }
                }
            }
        }
        Ok(())
    }
}

fn sanitize<'a>(event_id: &str, values: impl Iterator<Item = &'a mut f64>) {
    for value in values {
        if !value.is_finite() {
            warn!(event = %event_id, "non-finite effect value coerced to 0");
            *value = 0.0;
        }
    }
}
