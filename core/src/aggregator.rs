//! KPI aggregation — the hierarchical roll-up core.
//!
//! The same fold runs at every tier; only the membership set and the
//! scope containment test change:
//!   1. membership set of agent ids from the graph
//!   2. visit filter + partition (consumer/shop, completed, converted)
//!   3. rate computation, zero-guarded at every division site
//!   4. goal filter by subtree containment, fold to counts
//!   5. call-cycle filter likewise, fold to counts + mean adherence
//!   6. per-child breakdown for non-leaf tiers via the same recipe
//!
//! RULES:
//!   - Aggregation is read-only over one immutable snapshot.
//!   - A ledger row with a dangling FK is excluded, never an error.
//!   - An empty denominator yields 0, never NaN or infinity.
//!   - Nothing here ever crosses a tenant boundary: every row folded
//!     into a unit's KPI carries that unit's tenant id.

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::ledger::CycleStatus;
use crate::org::OrgUnit;
use crate::store::OrgSnapshot;
use crate::types::{EntityId, TenantId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ── KPI record shapes ────────────────────────────────────────────────────────

/// Metrics common to every tier. Derived on every read; never stored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KpiCore {
    pub total_visits: u64,
    pub consumer_visits: u64,
    pub shop_visits: u64,
    pub completed_visits: u64,
    /// completed / total, percent. 0 when there are no visits.
    pub completion_rate: f64,
    pub conversions: u64,
    /// conversions / consumer visits, percent. 0 when there are none.
    pub conversion_rate: f64,
    /// Mean shelf share over shop visits. 0 when there are none.
    pub average_shelf_share: f64,
    pub shops_trained: u64,
    pub goals_assigned: u64,
    pub goals_completed: u64,
    pub goal_completion_rate: f64,
    pub call_cycles_assigned: u64,
    pub call_cycles_active: u64,
    pub average_adherence_rate: f64,
}

/// One row of a parent tier's child breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberPerformance {
    pub id: EntityId,
    pub name: String,
    pub total_visits: u64,
    pub conversions: u64,
    pub average_adherence_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentKpi {
    pub agent_id: EntityId,
    pub agent_name: String,
    pub core: KpiCore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamKpi {
    pub team_id: EntityId,
    pub team_name: String,
    pub agent_count: u64,
    pub visits_per_agent: f64,
    pub core: KpiCore,
    pub by_agent: Vec<MemberPerformance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaKpi {
    pub area_id: EntityId,
    pub area_name: String,
    pub team_count: u64,
    pub agent_count: u64,
    pub visits_per_team: f64,
    pub core: KpiCore,
    pub by_team: Vec<MemberPerformance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionKpi {
    pub region_id: EntityId,
    pub region_name: String,
    pub area_count: u64,
    pub team_count: u64,
    pub agent_count: u64,
    pub visits_per_area: f64,
    pub core: KpiCore,
    pub by_area: Vec<MemberPerformance>,
}

/// National tier: every agent of the tenant. National managers carry
/// no further FK, so scoping is by tenant id alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NationalKpi {
    pub tenant_id: TenantId,
    pub region_count: u64,
    pub area_count: u64,
    pub team_count: u64,
    pub agent_count: u64,
    pub visits_per_region: f64,
    pub core: KpiCore,
    pub by_region: Vec<MemberPerformance>,
}

/// Tenant-admin view: the national KPI plus whole-organization counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemKpi {
    pub tenant_id: TenantId,
    pub tenant_name: String,
    pub location_count: u64,
    pub manager_count: u64,
    pub national: NationalKpi,
}

// ── Zero-guarded arithmetic ──────────────────────────────────────────────────

/// part / whole as a percentage; 0 when the denominator is empty.
fn pct(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// total / denom as a plain ratio; 0 when the denominator is empty.
fn per(total: u64, denom: u64) -> f64 {
    if denom == 0 {
        0.0
    } else {
        total as f64 / denom as f64
    }
}

/// sum / count; 0 when nothing was summed.
fn mean(sum: f64, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

// ── Aggregator ───────────────────────────────────────────────────────────────

pub struct Aggregator<'a> {
    snapshot: &'a OrgSnapshot,
    config: &'a EngineConfig,
}

impl<'a> Aggregator<'a> {
    pub fn new(snapshot: &'a OrgSnapshot, config: &'a EngineConfig) -> Self {
        Self { snapshot, config }
    }

    /// The tier-independent fold. Fails only when the unit id itself
    /// is unknown; ledger rows never fail it.
    pub fn fold_core(&self, unit: &OrgUnit) -> EngineResult<KpiCore> {
        let graph = &self.snapshot.graph;
        let tenant_id = graph.tenant_of_unit(unit)?.to_string();
        let membership: BTreeSet<&str> = graph.membership(unit)?;

        let mut core = KpiCore::default();
        let mut shelf_share_sum = 0.0;

        for v in &self.snapshot.visits {
            // Membership already implies the tenant, but a row whose
            // own tenant tag disagrees is corrupt: exclude it.
            if v.tenant_id != tenant_id || !membership.contains(v.agent_id.as_str()) {
                continue;
            }
            core.total_visits += 1;
            if v.is_completed() {
                core.completed_visits += 1;
            }
            if v.is_consumer() {
                core.consumer_visits += 1;
                if v.converted() {
                    core.conversions += 1;
                }
            } else {
                core.shop_visits += 1;
                if let Some(share) = v.shelf_share() {
                    shelf_share_sum += share;
                }
                if v.shop_trained() {
                    core.shops_trained += 1;
                }
            }
        }
        core.completion_rate = pct(core.completed_visits, core.total_visits);
        core.conversion_rate = pct(core.conversions, core.consumer_visits);
        core.average_shelf_share = mean(shelf_share_sum, core.shop_visits);

        for g in &self.snapshot.goals {
            if g.tenant_id != tenant_id || !graph.unit_contains(unit, &g.scope.as_unit()) {
                continue;
            }
            core.goals_assigned += 1;
            if g.is_completed() {
                core.goals_completed += 1;
            }
        }
        core.goal_completion_rate = pct(core.goals_completed, core.goals_assigned);

        let mut adherence_sum = 0.0;
        for c in &self.snapshot.call_cycles {
            if c.tenant_id != tenant_id || !graph.unit_contains(unit, &c.scope.as_unit()) {
                continue;
            }
            core.call_cycles_assigned += 1;
            adherence_sum += c.adherence_rate_pct;
            if c.status_with(self.config.adherence_active_threshold) == CycleStatus::Active {
                core.call_cycles_active += 1;
            }
        }
        core.average_adherence_rate = mean(adherence_sum, core.call_cycles_assigned);

        Ok(core)
    }

    fn member_performance(&self, id: &str, name: &str, unit: &OrgUnit) -> EngineResult<MemberPerformance> {
        let core = self.fold_core(unit)?;
        Ok(MemberPerformance {
            id: id.to_string(),
            name: name.to_string(),
            total_visits: core.total_visits,
            conversions: core.conversions,
            average_adherence_rate: core.average_adherence_rate,
        })
    }

    pub fn agent_kpi(&self, agent_id: &str) -> EngineResult<AgentKpi> {
        let chain = self.snapshot.graph.ancestor_chain(agent_id)?;
        let core = self.fold_core(&OrgUnit::Agent(agent_id.to_string()))?;
        Ok(AgentKpi {
            agent_id: agent_id.to_string(),
            agent_name: chain.agent.name.clone(),
            core,
        })
    }

    pub fn team_kpi(&self, team_id: &str) -> EngineResult<TeamKpi> {
        let graph = &self.snapshot.graph;
        let agents = graph.agents_of(team_id)?;
        let team = graph.team(team_id).ok_or_else(|| crate::error::EngineError::NotFound {
            kind: "team",
            id: team_id.to_string(),
        })?;

        let core = self.fold_core(&OrgUnit::Team(team_id.to_string()))?;
        let by_agent = agents
            .iter()
            .map(|a| {
                self.member_performance(&a.agent_id, &a.name, &OrgUnit::Agent(a.agent_id.clone()))
            })
            .collect::<EngineResult<Vec<_>>>()?;

        Ok(TeamKpi {
            team_id: team_id.to_string(),
            team_name: team.name.clone(),
            agent_count: agents.len() as u64,
            visits_per_agent: per(core.total_visits, agents.len() as u64),
            core,
            by_agent,
        })
    }

    pub fn area_kpi(&self, area_id: &str) -> EngineResult<AreaKpi> {
        let graph = &self.snapshot.graph;
        let teams = graph.teams_of(area_id)?;
        let area = graph.area(area_id).ok_or_else(|| crate::error::EngineError::NotFound {
            kind: "area",
            id: area_id.to_string(),
        })?;

        let unit = OrgUnit::Area(area_id.to_string());
        let core = self.fold_core(&unit)?;
        let agent_count = graph.membership(&unit)?.len() as u64;
        let by_team = teams
            .iter()
            .map(|t| {
                self.member_performance(&t.team_id, &t.name, &OrgUnit::Team(t.team_id.clone()))
            })
            .collect::<EngineResult<Vec<_>>>()?;

        Ok(AreaKpi {
            area_id: area_id.to_string(),
            area_name: area.name.clone(),
            team_count: teams.len() as u64,
            agent_count,
            visits_per_team: per(core.total_visits, teams.len() as u64),
            core,
            by_team,
        })
    }

    pub fn region_kpi(&self, region_id: &str) -> EngineResult<RegionKpi> {
        let graph = &self.snapshot.graph;
        let areas = graph.areas_of(region_id)?;
        let region = graph.region(region_id).ok_or_else(|| crate::error::EngineError::NotFound {
            kind: "region",
            id: region_id.to_string(),
        })?;

        let unit = OrgUnit::Region(region_id.to_string());
        let core = self.fold_core(&unit)?;
        let agent_count = graph.membership(&unit)?.len() as u64;
        let team_count: usize = areas
            .iter()
            .map(|a| graph.teams_of(&a.area_id).map(|t| t.len()))
            .sum::<EngineResult<usize>>()?;
        let by_area = areas
            .iter()
            .map(|a| {
                self.member_performance(&a.area_id, &a.name, &OrgUnit::Area(a.area_id.clone()))
            })
            .collect::<EngineResult<Vec<_>>>()?;

        Ok(RegionKpi {
            region_id: region_id.to_string(),
            region_name: region.name.clone(),
            area_count: areas.len() as u64,
            team_count: team_count as u64,
            agent_count,
            visits_per_area: per(core.total_visits, areas.len() as u64),
            core,
            by_area,
        })
    }

    pub fn national_kpi(&self, tenant_id: &str) -> EngineResult<NationalKpi> {
        let graph = &self.snapshot.graph;
        let regions = graph.regions_of(tenant_id)?;

        let unit = OrgUnit::Tenant(tenant_id.to_string());
        let core = self.fold_core(&unit)?;
        let agent_count = graph.membership(&unit)?.len() as u64;

        let mut area_count = 0u64;
        let mut team_count = 0u64;
        for region in &regions {
            let areas = graph.areas_of(&region.region_id)?;
            area_count += areas.len() as u64;
            for area in areas {
                team_count += graph.teams_of(&area.area_id)?.len() as u64;
            }
        }

        let by_region = regions
            .iter()
            .map(|r| {
                self.member_performance(&r.region_id, &r.name, &OrgUnit::Region(r.region_id.clone()))
            })
            .collect::<EngineResult<Vec<_>>>()?;

        Ok(NationalKpi {
            tenant_id: tenant_id.to_string(),
            region_count: regions.len() as u64,
            area_count,
            team_count,
            agent_count,
            visits_per_region: per(core.total_visits, regions.len() as u64),
            core,
            by_region,
        })
    }

    pub fn system_kpi(&self, tenant_id: &str) -> EngineResult<SystemKpi> {
        let national = self.national_kpi(tenant_id)?;
        let tenant = self.snapshot.graph.tenant(tenant_id).ok_or_else(|| {
            crate::error::EngineError::NotFound {
                kind: "tenant",
                id: tenant_id.to_string(),
            }
        })?;
        let location_count = self
            .snapshot
            .locations
            .iter()
            .filter(|l| l.tenant_id == tenant_id)
            .count() as u64;

        Ok(SystemKpi {
            tenant_id: tenant_id.to_string(),
            tenant_name: tenant.name.clone(),
            location_count,
            manager_count: self.snapshot.graph.manager_count(tenant_id) as u64,
            national,
        })
    }
}
