//! Query layer: thin per-tier KPI accessors over one snapshot.
//!
//! Dashboards render an empty state for unknown ids, so every accessor
//! returns Option instead of an error. Anything other than a missing
//! id cannot occur here — aggregation is a pure fold.

use crate::aggregator::{
    AgentKpi, Aggregator, AreaKpi, NationalKpi, RegionKpi, SystemKpi, TeamKpi,
};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::store::{OrgSnapshot, OrgStore};

pub struct Analytics {
    snapshot: OrgSnapshot,
    config: EngineConfig,
}

impl Analytics {
    pub fn new(snapshot: OrgSnapshot, config: EngineConfig) -> Self {
        Self { snapshot, config }
    }

    /// Take one immutable snapshot from a store and serve all queries
    /// from it. Re-snapshot (build a new Analytics) to observe later
    /// mutations.
    pub fn from_store(store: &dyn OrgStore, config: EngineConfig) -> EngineResult<Self> {
        let snapshot = store.snapshot()?;
        snapshot.verify_integrity(config.integrity_mode)?;
        Ok(Self::new(snapshot, config))
    }

    pub fn snapshot(&self) -> &OrgSnapshot {
        &self.snapshot
    }

    fn aggregator(&self) -> Aggregator<'_> {
        Aggregator::new(&self.snapshot, &self.config)
    }

    fn absent<T>(tier: &'static str, id: &str, result: EngineResult<T>) -> Option<T> {
        match result {
            Ok(kpi) => Some(kpi),
            Err(EngineError::NotFound { kind, id: missing }) => {
                log::debug!("{tier} analytics for '{id}': no {kind} '{missing}'");
                None
            }
            Err(e) => {
                // Unreachable for a validated snapshot; surface it
                // as an empty dashboard rather than a crash.
                log::error!("{tier} analytics for '{id}' failed: {e}");
                None
            }
        }
    }

    pub fn agent_analytics(&self, agent_id: &str) -> Option<AgentKpi> {
        Self::absent("agent", agent_id, self.aggregator().agent_kpi(agent_id))
    }

    pub fn team_analytics(&self, team_id: &str) -> Option<TeamKpi> {
        Self::absent("team", team_id, self.aggregator().team_kpi(team_id))
    }

    pub fn area_analytics(&self, area_id: &str) -> Option<AreaKpi> {
        Self::absent("area", area_id, self.aggregator().area_kpi(area_id))
    }

    pub fn region_analytics(&self, region_id: &str) -> Option<RegionKpi> {
        Self::absent("region", region_id, self.aggregator().region_kpi(region_id))
    }

    pub fn national_analytics(&self, tenant_id: &str) -> Option<NationalKpi> {
        Self::absent("national", tenant_id, self.aggregator().national_kpi(tenant_id))
    }

    pub fn system_analytics(&self, tenant_id: &str) -> Option<SystemKpi> {
        Self::absent("system", tenant_id, self.aggregator().system_kpi(tenant_id))
    }
}
