//! The organizational graph: validated hierarchy plus membership lookups.
//!
//! RULE: the graph is validated once at construction and immutable
//! afterwards. Every non-root entity must name an existing parent in
//! the same tenant; violations fail the build, they are never dropped
//! silently. Ledger leniency (dangling visit/goal/cycle FKs) lives in
//! the aggregator, not here.

use crate::error::{EngineError, EngineResult};
use crate::org::{Agent, Area, Manager, OrgUnit, Region, ScopeKind, Team, Tenant};
use crate::types::EntityId;
use std::collections::{BTreeMap, BTreeSet};

/// Full parent chain of an agent, resolved in one lookup.
#[derive(Debug, Clone, Copy)]
pub struct AncestorChain<'a> {
    pub agent: &'a Agent,
    pub team: &'a Team,
    pub area: &'a Area,
    pub region: &'a Region,
    pub tenant: &'a Tenant,
}

/// Lineage of a scoped assignment, used for subtree containment.
/// Fields above the scope's own tier are populated; below it they stay
/// `None` (a team scope has no single agent).
#[derive(Debug, Clone, Copy, Default)]
struct Lineage<'a> {
    agent: Option<&'a str>,
    team: Option<&'a str>,
    area: Option<&'a str>,
    region: Option<&'a str>,
    tenant: Option<&'a str>,
}

#[derive(Debug)]
pub struct OrgGraph {
    tenants: BTreeMap<EntityId, Tenant>,
    regions: BTreeMap<EntityId, Region>,
    areas: BTreeMap<EntityId, Area>,
    teams: BTreeMap<EntityId, Team>,
    agents: BTreeMap<EntityId, Agent>,
    managers: BTreeMap<EntityId, Manager>,

    // Child indexes in insertion order.
    regions_by_tenant: BTreeMap<EntityId, Vec<EntityId>>,
    areas_by_region: BTreeMap<EntityId, Vec<EntityId>>,
    teams_by_area: BTreeMap<EntityId, Vec<EntityId>>,
    agents_by_team: BTreeMap<EntityId, Vec<EntityId>>,
}

impl OrgGraph {
    /// Build and validate the graph. Fails fast on the first duplicate
    /// id, unknown parent, cross-tenant reference, or manager whose FK
    /// shape contradicts its role.
    pub fn build(
        tenants: Vec<Tenant>,
        regions: Vec<Region>,
        areas: Vec<Area>,
        teams: Vec<Team>,
        agents: Vec<Agent>,
        managers: Vec<Manager>,
    ) -> EngineResult<Self> {
        let mut graph = OrgGraph {
            tenants: BTreeMap::new(),
            regions: BTreeMap::new(),
            areas: BTreeMap::new(),
            teams: BTreeMap::new(),
            agents: BTreeMap::new(),
            managers: BTreeMap::new(),
            regions_by_tenant: BTreeMap::new(),
            areas_by_region: BTreeMap::new(),
            teams_by_area: BTreeMap::new(),
            agents_by_team: BTreeMap::new(),
        };

        for t in tenants {
            if graph.tenants.contains_key(&t.tenant_id) {
                return Err(duplicate("tenant", &t.tenant_id));
            }
            graph.regions_by_tenant.insert(t.tenant_id.clone(), Vec::new());
            graph.tenants.insert(t.tenant_id.clone(), t);
        }

        for r in regions {
            if graph.regions.contains_key(&r.region_id) {
                return Err(duplicate("region", &r.region_id));
            }
            match graph.tenants.get(&r.tenant_id) {
                Some(_) => {}
                None => {
                    return Err(EngineError::UnknownParent {
                        child_kind: "region",
                        child_id: r.region_id.clone(),
                        parent_kind: "tenant",
                        parent_id: r.tenant_id.clone(),
                    })
                }
            }
            graph
                .regions_by_tenant
                .entry(r.tenant_id.clone())
                .or_default()
                .push(r.region_id.clone());
            graph.areas_by_region.insert(r.region_id.clone(), Vec::new());
            graph.regions.insert(r.region_id.clone(), r);
        }

        for a in areas {
            if graph.areas.contains_key(&a.area_id) {
                return Err(duplicate("area", &a.area_id));
            }
            let region = graph.regions.get(&a.region_id).ok_or_else(|| {
                EngineError::UnknownParent {
                    child_kind: "area",
                    child_id: a.area_id.clone(),
                    parent_kind: "region",
                    parent_id: a.region_id.clone(),
                }
            })?;
            if region.tenant_id != a.tenant_id {
                return Err(cross_tenant("area", &a.area_id, &a.tenant_id, "region", region.region_id.as_str(), &region.tenant_id));
            }
            graph
                .areas_by_region
                .entry(a.region_id.clone())
                .or_default()
                .push(a.area_id.clone());
            graph.teams_by_area.insert(a.area_id.clone(), Vec::new());
            graph.areas.insert(a.area_id.clone(), a);
        }

        for t in teams {
            if graph.teams.contains_key(&t.team_id) {
                return Err(duplicate("team", &t.team_id));
            }
            let area = graph.areas.get(&t.area_id).ok_or_else(|| {
                EngineError::UnknownParent {
                    child_kind: "team",
                    child_id: t.team_id.clone(),
                    parent_kind: "area",
                    parent_id: t.area_id.clone(),
                }
            })?;
            if area.tenant_id != t.tenant_id {
                return Err(cross_tenant("team", &t.team_id, &t.tenant_id, "area", area.area_id.as_str(), &area.tenant_id));
            }
            graph
                .teams_by_area
                .entry(t.area_id.clone())
                .or_default()
                .push(t.team_id.clone());
            graph.agents_by_team.insert(t.team_id.clone(), Vec::new());
            graph.teams.insert(t.team_id.clone(), t);
        }

        for a in agents {
            if graph.agents.contains_key(&a.agent_id) {
                return Err(duplicate("agent", &a.agent_id));
            }
            let team = graph.teams.get(&a.team_id).ok_or_else(|| {
                EngineError::UnknownParent {
                    child_kind: "agent",
                    child_id: a.agent_id.clone(),
                    parent_kind: "team",
                    parent_id: a.team_id.clone(),
                }
            })?;
            if team.tenant_id != a.tenant_id {
                return Err(cross_tenant("agent", &a.agent_id, &a.tenant_id, "team", team.team_id.as_str(), &team.tenant_id));
            }
            graph
                .agents_by_team
                .entry(a.team_id.clone())
                .or_default()
                .push(a.agent_id.clone());
            graph.agents.insert(a.agent_id.clone(), a);
        }

        for m in managers {
            if graph.managers.contains_key(&m.manager_id) {
                return Err(duplicate("manager", &m.manager_id));
            }
            graph.validate_manager(&m)?;
            graph.managers.insert(m.manager_id.clone(), m);
        }

        log::debug!(
            "org graph built: {} tenants, {} regions, {} areas, {} teams, {} agents, {} managers",
            graph.tenants.len(),
            graph.regions.len(),
            graph.areas.len(),
            graph.teams.len(),
            graph.agents.len(),
            graph.managers.len(),
        );
        Ok(graph)
    }

    fn validate_manager(&self, m: &Manager) -> EngineResult<()> {
        if !self.tenants.contains_key(&m.tenant_id) {
            return Err(EngineError::UnknownParent {
                child_kind: "manager",
                child_id: m.manager_id.clone(),
                parent_kind: "tenant",
                parent_id: m.tenant_id.clone(),
            });
        }
        if !m.scope_matches_role() {
            return Err(EngineError::DataIntegrity(format!(
                "manager '{}' with role {} carries the wrong scope FK shape",
                m.manager_id,
                m.role.label(),
            )));
        }
        let scope = match m.role.scope_kind() {
            ScopeKind::Team => m.team_id.as_deref().map(|id| {
                ("team", id, self.teams.get(id).map(|t| t.tenant_id.as_str()))
            }),
            ScopeKind::Area => m.area_id.as_deref().map(|id| {
                ("area", id, self.areas.get(id).map(|a| a.tenant_id.as_str()))
            }),
            ScopeKind::Region => m.region_id.as_deref().map(|id| {
                ("region", id, self.regions.get(id).map(|r| r.tenant_id.as_str()))
            }),
            ScopeKind::Tenant | ScopeKind::OwnRecords => None,
        };
        if let Some((kind, id, tenant)) = scope {
            match tenant {
                None => {
                    return Err(EngineError::UnknownParent {
                        child_kind: "manager",
                        child_id: m.manager_id.clone(),
                        parent_kind: kind,
                        parent_id: id.to_string(),
                    })
                }
                Some(node_tenant) if node_tenant != m.tenant_id => {
                    return Err(cross_tenant(
                        "manager",
                        &m.manager_id,
                        &m.tenant_id,
                        kind,
                        id,
                        node_tenant,
                    ))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    // ── Lookups ──────────────────────────────────────────────────────────────

    pub fn tenant(&self, id: &str) -> Option<&Tenant> {
        self.tenants.get(id)
    }

    pub fn region(&self, id: &str) -> Option<&Region> {
        self.regions.get(id)
    }

    pub fn area(&self, id: &str) -> Option<&Area> {
        self.areas.get(id)
    }

    pub fn team(&self, id: &str) -> Option<&Team> {
        self.teams.get(id)
    }

    pub fn agent(&self, id: &str) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn manager(&self, id: &str) -> Option<&Manager> {
        self.managers.get(id)
    }

    pub fn tenants(&self) -> impl Iterator<Item = &Tenant> {
        self.tenants.values()
    }

    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    pub fn managers(&self) -> impl Iterator<Item = &Manager> {
        self.managers.values()
    }

    pub fn manager_count(&self, tenant_id: &str) -> usize {
        self.managers
            .values()
            .filter(|m| m.tenant_id == tenant_id)
            .count()
    }

    // ── Children ─────────────────────────────────────────────────────────────

    /// Regions of a tenant in insertion order. NotFound for an unknown
    /// tenant, empty vec for a childless one.
    pub fn regions_of(&self, tenant_id: &str) -> EngineResult<Vec<&Region>> {
        let ids = self
            .regions_by_tenant
            .get(tenant_id)
            .ok_or_else(|| not_found("tenant", tenant_id))?;
        Ok(ids.iter().map(|id| &self.regions[id]).collect())
    }

    pub fn areas_of(&self, region_id: &str) -> EngineResult<Vec<&Area>> {
        let ids = self
            .areas_by_region
            .get(region_id)
            .ok_or_else(|| not_found("region", region_id))?;
        Ok(ids.iter().map(|id| &self.areas[id]).collect())
    }

    pub fn teams_of(&self, area_id: &str) -> EngineResult<Vec<&Team>> {
        let ids = self
            .teams_by_area
            .get(area_id)
            .ok_or_else(|| not_found("area", area_id))?;
        Ok(ids.iter().map(|id| &self.teams[id]).collect())
    }

    pub fn agents_of(&self, team_id: &str) -> EngineResult<Vec<&Agent>> {
        let ids = self
            .agents_by_team
            .get(team_id)
            .ok_or_else(|| not_found("team", team_id))?;
        Ok(ids.iter().map(|id| &self.agents[id]).collect())
    }

    // ── Ancestry & membership ────────────────────────────────────────────────

    /// Resolve an agent's full parent chain. Build-time validation
    /// guarantees every link exists, so any gap is a NotFound on the
    /// agent itself.
    pub fn ancestor_chain(&self, agent_id: &str) -> EngineResult<AncestorChain<'_>> {
        let agent = self
            .agents
            .get(agent_id)
            .ok_or_else(|| not_found("agent", agent_id))?;
        let team = &self.teams[&agent.team_id];
        let area = &self.areas[&team.area_id];
        let region = &self.regions[&area.region_id];
        let tenant = &self.tenants[&region.tenant_id];
        Ok(AncestorChain {
            agent,
            team,
            area,
            region,
            tenant,
        })
    }

    /// Agent ids in a node's subtree: the membership set every roll-up
    /// filter is built from. Singleton for an agent, the whole tenant
    /// for the national tier.
    pub fn membership(&self, unit: &OrgUnit) -> EngineResult<BTreeSet<&str>> {
        let mut members = BTreeSet::new();
        match unit {
            OrgUnit::Agent(id) => {
                let agent = self.agents.get(id).ok_or_else(|| not_found("agent", id))?;
                members.insert(agent.agent_id.as_str());
            }
            OrgUnit::Team(id) => {
                for agent in self.agents_of(id)? {
                    members.insert(agent.agent_id.as_str());
                }
            }
            OrgUnit::Area(id) => {
                for team in self.teams_of(id)? {
                    for agent in self.agents_of(&team.team_id)? {
                        members.insert(agent.agent_id.as_str());
                    }
                }
            }
            OrgUnit::Region(id) => {
                for area in self.areas_of(id)? {
                    for team in self.teams_of(&area.area_id)? {
                        for agent in self.agents_of(&team.team_id)? {
                            members.insert(agent.agent_id.as_str());
                        }
                    }
                }
            }
            OrgUnit::Tenant(id) => {
                if !self.tenants.contains_key(id.as_str()) {
                    return Err(not_found("tenant", id));
                }
                for agent in self.agents.values() {
                    if agent.tenant_id == *id {
                        members.insert(agent.agent_id.as_str());
                    }
                }
            }
        }
        Ok(members)
    }

    /// Tenant owning a unit. NotFound if the unit id is unknown.
    pub fn tenant_of_unit(&self, unit: &OrgUnit) -> EngineResult<&str> {
        let tenant = match unit {
            OrgUnit::Agent(id) => {
                &self.agents.get(id).ok_or_else(|| not_found("agent", id))?.tenant_id
            }
            OrgUnit::Team(id) => {
                &self.teams.get(id).ok_or_else(|| not_found("team", id))?.tenant_id
            }
            OrgUnit::Area(id) => {
                &self.areas.get(id).ok_or_else(|| not_found("area", id))?.tenant_id
            }
            OrgUnit::Region(id) => {
                &self.regions.get(id).ok_or_else(|| not_found("region", id))?.tenant_id
            }
            OrgUnit::Tenant(id) => {
                &self
                    .tenants
                    .get(id.as_str())
                    .ok_or_else(|| not_found("tenant", id))?
                    .tenant_id
            }
        };
        Ok(tenant)
    }

    /// True when the assignment's node sits inside the unit's subtree.
    /// A dangling assignment resolves to false — the caller excludes
    /// it, matching ledger leniency.
    pub fn unit_contains(&self, unit: &OrgUnit, scope_unit: &OrgUnit) -> bool {
        let Some(lineage) = self.lineage(scope_unit) else {
            return false;
        };
        match unit {
            OrgUnit::Agent(id) => lineage.agent == Some(id.as_str()),
            OrgUnit::Team(id) => lineage.team == Some(id.as_str()),
            OrgUnit::Area(id) => lineage.area == Some(id.as_str()),
            OrgUnit::Region(id) => lineage.region == Some(id.as_str()),
            OrgUnit::Tenant(id) => lineage.tenant == Some(id.as_str()),
        }
    }

    fn lineage<'a>(&'a self, unit: &'a OrgUnit) -> Option<Lineage<'a>> {
        let mut lineage = Lineage::default();
        match unit {
            OrgUnit::Agent(id) => {
                let agent = self.agents.get(id)?;
                lineage.agent = Some(agent.agent_id.as_str());
                lineage.team = Some(agent.team_id.as_str());
            }
            OrgUnit::Team(id) => {
                self.teams.get(id)?;
                lineage.team = Some(id.as_str());
            }
            OrgUnit::Area(id) => {
                self.areas.get(id)?;
                lineage.area = Some(id.as_str());
            }
            OrgUnit::Region(id) => {
                self.regions.get(id)?;
                lineage.region = Some(id.as_str());
            }
            OrgUnit::Tenant(id) => {
                self.tenants.get(id.as_str())?;
                lineage.tenant = Some(id.as_str());
            }
        }
        if let (Some(team_id), None) = (lineage.team, lineage.area) {
            lineage.area = Some(self.teams.get(team_id)?.area_id.as_str());
        }
        if let (Some(area_id), None) = (lineage.area, lineage.region) {
            lineage.region = Some(self.areas.get(area_id)?.region_id.as_str());
        }
        if let (Some(region_id), None) = (lineage.region, lineage.tenant) {
            lineage.tenant = Some(self.regions.get(region_id)?.tenant_id.as_str());
        }
        Some(lineage)
    }
}

fn not_found(kind: &'static str, id: &str) -> EngineError {
    EngineError::NotFound {
        kind,
        id: id.to_string(),
    }
}

fn duplicate(kind: &str, id: &str) -> EngineError {
    EngineError::DataIntegrity(format!("duplicate {kind} id '{id}'"))
}

fn cross_tenant(
    child_kind: &'static str,
    child_id: &str,
    child_tenant: &str,
    parent_kind: &'static str,
    parent_id: &str,
    parent_tenant: &str,
) -> EngineError {
    EngineError::CrossTenant {
        child_kind,
        child_id: child_id.to_string(),
        child_tenant: child_tenant.to_string(),
        parent_kind,
        parent_id: parent_id.to_string(),
        parent_tenant: parent_tenant.to_string(),
    }
}
