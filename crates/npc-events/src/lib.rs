//! Event definition format for the life simulation.
//!
//! Events are authored externally as an ordered list of records and
//! consumed by the decision core. This crate owns the serde types for
//! events, triggers, choices and effect bundles, plus the validating
//! loader (`EventLibrary`).

pub mod event;
pub mod library;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;

pub use event::{
    AppraisalDim, Choice, Effects, EventDef, StatKind, TemperamentTrait, Trigger, UiConfig, UiType,
};
pub use library::{EventLibrary, EventLoadError};
