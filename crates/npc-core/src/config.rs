//! Configuration System
//!
//! Loads the `npc_brain` tuning block from a TOML file so behavior can
//! be adjusted without recompiling. Every field has a default; a
//! missing or unreadable file falls back to defaults with a warning.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::warn;

/// Default tuning file path
pub const DEFAULT_TUNING_PATH: &str = "npc_brain.toml";

/// Top-level NPC brain configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpcBrainConfig {
    /// Master switch for automatic NPC decisions.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Whether the event lifecycle runs at all.
    #[serde(default = "default_true")]
    pub events_enabled: bool,
    /// Passthrough toggle for the action-point surface owned by the
    /// UI layer; the core carries it but does not interpret it.
    #[serde(default = "default_true")]
    pub ap_enabled: bool,
    /// Whether NPC weights blend toward the player's observed style.
    #[serde(default)]
    pub player_mimic_enabled: bool,
    /// Routes eligible infant events through the infant engine.
    #[serde(default = "default_true")]
    pub infant_brain_v2_enabled: bool,
    /// Emit a debug log line per decision (scores, probabilities, pick).
    #[serde(default)]
    pub log_decisions: bool,
    #[serde(default)]
    pub mimicry: MimicryConfig,
    #[serde(default)]
    pub infant: InfantBrainConfig,
}

fn default_true() -> bool {
    true
}

/// Player-style mimicry tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MimicryConfig {
    /// EMA decay factor for observed player choices, in (0, 1].
    pub ema_beta: f64,
    /// Baseline blend factor when no relationship override matches;
    /// averaged with the deciding agent's own drawn factor.
    pub default_alpha: f64,
    /// Per-relationship-type overrides of the blend factor
    /// (e.g. "mother" can mimic harder than "classmate").
    #[serde(default)]
    pub relationship_alpha: BTreeMap<String, f64>,
}

impl Default for MimicryConfig {
    fn default() -> Self {
        Self {
            ema_beta: 0.15,
            default_alpha: 0.2,
            relationship_alpha: BTreeMap::new(),
        }
    }
}

/// Infant engine utility weights and penalty coefficients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfantBrainConfig {
    pub comfort_weight: f64,
    pub energy_cost_weight: f64,
    pub familiarity_weight: f64,
    pub soothing_weight: f64,
    /// Coefficient of the superlinear safety penalty.
    pub safety_penalty_coeff: f64,
    /// Exponent of the safety penalty; > 1 so risk compounds.
    pub safety_penalty_exponent: f64,
    /// Reward slope for novelty below the agent's tolerance.
    pub novelty_reward: f64,
    /// Penalty slope for novelty above tolerance.
    pub novelty_penalty: f64,
}

impl Default for InfantBrainConfig {
    fn default() -> Self {
        Self {
            comfort_weight: 1.0,
            energy_cost_weight: 0.6,
            familiarity_weight: 0.4,
            soothing_weight: 0.8,
            safety_penalty_coeff: 2.0,
            safety_penalty_exponent: 2.0,
            novelty_reward: 0.5,
            novelty_penalty: 1.2,
        }
    }
}

impl Default for NpcBrainConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            events_enabled: true,
            ap_enabled: true,
            player_mimic_enabled: false,
            infant_brain_v2_enabled: true,
            log_decisions: false,
            mimicry: MimicryConfig::default(),
            infant: InfantBrainConfig::default(),
        }
    }
}

impl NpcBrainConfig {
    /// Loads configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }

    /// Loads from the default path, or uses defaults if not found.
    pub fn load_or_default() -> Self {
        Self::load(DEFAULT_TUNING_PATH).unwrap_or_else(|e| {
            warn!("Could not load {DEFAULT_TUNING_PATH}: {e}. Using defaults.");
            Self::default()
        })
    }

    /// Blend factor for a deciding NPC. A relationship override
    /// applies exactly; otherwise the tuned default and the agent's
    /// own drawn factor split the difference. Zero when mimicry is off.
    pub fn mimic_alpha(&self, profile_alpha: f64, relationship: Option<&str>) -> f64 {
        if !self.player_mimic_enabled {
            return 0.0;
        }
        match relationship.and_then(|r| self.mimicry.relationship_alpha.get(r).copied()) {
            Some(alpha) => alpha.clamp(0.0, 1.0),
            None => (0.5 * (self.mimicry.default_alpha + profile_alpha)).clamp(0.0, 1.0),
        }
    }
}

/// Errors surfaced while loading the tuning file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read tuning file: {0}")]
    Io(std::io::Error),
    #[error("failed to parse tuning file: {0}")]
    Parse(toml::de::Error),
}
