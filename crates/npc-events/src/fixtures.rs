//! Sample event definitions for testing.
//!
//! This module provides a ready-made event library for other crates
//! to use. Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // npc-events = { path = "../npc-events", features = ["test-fixtures"] }
//!
//! use npc_events::fixtures;
//!
//! let library = fixtures::sample_library();
//! ```

use crate::{EventDef, EventLibrary};

/// Returns the sample event library from the fixtures file.
///
/// Contains 8 events spanning the whole lifespan:
/// - 3 infant events (one a once-per-lifetime milestone)
/// - 1 childhood event
/// - the multi-select subject-track selection event (3-of-6, quota-checked)
/// - 1 school event touching all active subjects
/// - 2 adult events (one once-per-lifetime)
pub fn sample_library() -> EventLibrary {
    let json = include_str!("../tests/fixtures/sample_events.json");
    EventLibrary::from_json(json).expect("Failed to parse sample_events.json")
}

/// Returns a specific event by id from the sample library.
pub fn get_event(event_id: &str) -> Option<EventDef> {
    sample_library().get(event_id).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_library_parses() {
        let library = sample_library();
        assert_eq!(library.len(), 8);
        assert!(library.get("EVT_SUBJECT_TRACKS").is_some());
    }

    #[test]
    fn infant_events_are_tagged() {
        let event = get_event("EVT_LOUD_VACUUM").unwrap();
        assert!(event.has_tag("infant"));
        assert!(event.infant_windowed());
    }
}
