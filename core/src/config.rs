//! Engine configuration.
//!
//! All tunables live here as one serde struct with sensible defaults,
//! loadable from a JSON file. Nothing else in the engine reads files
//! or environment variables.

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the engine treats ledger rows whose foreign keys resolve to nothing.
///
/// Lenient (the default) silently excludes them from every aggregate;
/// Strict makes `OrgSnapshot::verify_integrity` fail instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrityMode {
    Lenient,
    Strict,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub integrity_mode: IntegrityMode,

    /// Call cycles at or above this adherence percentage count as active.
    /// Below it they are pending. 70.0 means adherence 70 is active.
    pub adherence_active_threshold: f64,

    pub seed: SeedConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            integrity_mode: IntegrityMode::Lenient,
            adherence_active_threshold: crate::ledger::ADHERENCE_ACTIVE_THRESHOLD,
            seed: SeedConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file. Missing keys take defaults.
    pub fn load(path: &Path) -> EngineResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            EngineError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: EngineConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if !(0.0..=100.0).contains(&self.adherence_active_threshold) {
            return Err(EngineError::Config(format!(
                "adherence_active_threshold must be in 0..=100, got {}",
                self.adherence_active_threshold
            )));
        }
        self.seed.validate()
    }
}

/// Population sizing for the deterministic demo-data seeder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub tenants: usize,
    pub regions_per_tenant: usize,
    pub areas_per_region: usize,
    pub teams_per_area: usize,
    pub agents_per_team: usize,
    pub locations_per_tenant: usize,
    pub visits_per_agent: usize,

    /// Share of seeded visits that are consumer visits (rest are shop).
    pub consumer_visit_share: f64,
    /// Probability a seeded visit is completed (rest split pending/cancelled).
    pub completion_probability: f64,
    /// Probability a completed consumer visit converted.
    pub conversion_probability: f64,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            tenants: 1,
            regions_per_tenant: 2,
            areas_per_region: 2,
            teams_per_area: 2,
            agents_per_team: 4,
            locations_per_tenant: 24,
            visits_per_agent: 8,
            consumer_visit_share: 0.6,
            completion_probability: 0.75,
            conversion_probability: 0.4,
        }
    }
}

impl SeedConfig {
    pub fn validate(&self) -> EngineResult<()> {
        for (name, p) in [
            ("consumer_visit_share", self.consumer_visit_share),
            ("completion_probability", self.completion_probability),
            ("conversion_probability", self.conversion_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(EngineError::Config(format!(
                    "{name} must be a probability in 0..=1, got {p}"
                )));
            }
        }
        if self.locations_per_tenant == 0 && self.visits_per_agent > 0 {
            return Err(EngineError::Config(
                "visits_per_agent > 0 requires locations_per_tenant > 0".into(),
            ));
        }
        Ok(())
    }
}
