//! Repository layer: snapshot contract plus the two backends.
//!
//! RULE: only this module talks to the database. The aggregator and
//! query layer never see a connection or a mutable collection — they
//! consume an immutable OrgSnapshot produced by an OrgStore, so
//! UI-layer mutation can never alias into an in-flight aggregation
//! pass.

mod ledger;
mod org;

use crate::config::IntegrityMode;
use crate::error::{EngineError, EngineResult};
use crate::graph::OrgGraph;
use crate::ledger::{CallCycle, Goal, Location, Visit, VisitOutcome, VisitStatus};
use crate::org::{Agent, Area, Manager, Region, Team, Tenant};
use crate::types::EntityId;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::collections::BTreeSet;
use uuid::Uuid;

// ── Snapshot ─────────────────────────────────────────────────────────────────

/// One immutable view of the organization and its ledgers. Every KPI
/// is a pure function of a snapshot; recomputing over an unchanged
/// snapshot yields identical output.
pub struct OrgSnapshot {
    pub graph: OrgGraph,
    pub locations: Vec<Location>,
    pub visits: Vec<Visit>,
    pub goals: Vec<Goal>,
    pub call_cycles: Vec<CallCycle>,
}

impl OrgSnapshot {
    /// Check every ledger row's foreign keys. Lenient mode logs and
    /// returns the findings; strict mode fails on them instead.
    /// Aggregation itself never calls this — it skips dangling rows
    /// unconditionally.
    pub fn verify_integrity(&self, mode: IntegrityMode) -> EngineResult<Vec<String>> {
        let mut findings = Vec::new();
        let location_ids: BTreeSet<&str> = self
            .locations
            .iter()
            .map(|l| l.location_id.as_str())
            .collect();

        for v in &self.visits {
            match self.graph.agent(&v.agent_id) {
                None => findings.push(format!(
                    "visit '{}' references unknown agent '{}'",
                    v.visit_id, v.agent_id
                )),
                Some(agent) if agent.tenant_id != v.tenant_id => findings.push(format!(
                    "visit '{}' carries tenant '{}' but its agent belongs to tenant '{}'",
                    v.visit_id, v.tenant_id, agent.tenant_id
                )),
                Some(_) => {}
            }
            if !location_ids.contains(v.location_id.as_str()) {
                findings.push(format!(
                    "visit '{}' references unknown location '{}'",
                    v.visit_id, v.location_id
                ));
            }
        }

        for g in &self.goals {
            let scope_unit = g.scope.as_unit();
            match self.graph.tenant_of_unit(&scope_unit) {
                Err(_) => findings.push(format!(
                    "goal '{}' references unknown {} '{}'",
                    g.goal_id,
                    g.scope.level(),
                    g.scope.id()
                )),
                Ok(tenant) if tenant != g.tenant_id => findings.push(format!(
                    "goal '{}' carries tenant '{}' but its scope belongs to tenant '{tenant}'",
                    g.goal_id, g.tenant_id
                )),
                Ok(_) => {}
            }
        }

        for c in &self.call_cycles {
            let scope_unit = c.scope.as_unit();
            match self.graph.tenant_of_unit(&scope_unit) {
                Err(_) => findings.push(format!(
                    "call cycle '{}' references unknown {} '{}'",
                    c.cycle_id,
                    c.scope.level(),
                    c.scope.id()
                )),
                Ok(tenant) if tenant != c.tenant_id => findings.push(format!(
                    "call cycle '{}' carries tenant '{}' but its scope belongs to tenant '{tenant}'",
                    c.cycle_id, c.tenant_id
                )),
                Ok(_) => {}
            }
            for stop in &c.stops {
                if !location_ids.contains(stop.as_str()) {
                    findings.push(format!(
                        "call cycle '{}' routes through unknown location '{stop}'",
                        c.cycle_id
                    ));
                }
            }
        }

        match mode {
            IntegrityMode::Strict if !findings.is_empty() => {
                Err(EngineError::DataIntegrity(findings.join("; ")))
            }
            _ => {
                for finding in &findings {
                    log::warn!("integrity: {finding}");
                }
                Ok(findings)
            }
        }
    }
}

/// The repository contract the query layer depends on. Backends:
/// MemoryStore (fixtures, tests) and SqliteStore (persisted mode).
pub trait OrgStore {
    fn snapshot(&self) -> EngineResult<OrgSnapshot>;
}

fn mint_id(prefix: &str) -> EntityId {
    format!("{prefix}-{}", Uuid::new_v4())
}

// ── In-memory backend ────────────────────────────────────────────────────────

/// Plain-vector backend. Mutations go through its methods; readers
/// only ever see snapshots.
#[derive(Default)]
pub struct MemoryStore {
    tenants: Vec<Tenant>,
    regions: Vec<Region>,
    areas: Vec<Area>,
    teams: Vec<Team>,
    agents: Vec<Agent>,
    managers: Vec<Manager>,
    locations: Vec<Location>,
    visits: Vec<Visit>,
    goals: Vec<Goal>,
    call_cycles: Vec<CallCycle>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_tenant(&mut self, t: Tenant) {
        self.tenants.push(t);
    }

    pub fn insert_region(&mut self, r: Region) {
        self.regions.push(r);
    }

    pub fn insert_area(&mut self, a: Area) {
        self.areas.push(a);
    }

    pub fn insert_team(&mut self, t: Team) {
        self.teams.push(t);
    }

    pub fn insert_agent(&mut self, a: Agent) {
        self.agents.push(a);
    }

    pub fn insert_manager(&mut self, m: Manager) {
        self.managers.push(m);
    }

    pub fn insert_location(&mut self, l: Location) {
        self.locations.push(l);
    }

    pub fn insert_visit(&mut self, v: Visit) {
        self.visits.push(v);
    }

    pub fn insert_goal(&mut self, mut g: Goal) {
        g.progress_pct = g.progress_pct.clamp(0.0, 100.0);
        self.goals.push(g);
    }

    pub fn insert_call_cycle(&mut self, mut c: CallCycle) {
        c.adherence_rate_pct = c.adherence_rate_pct.clamp(0.0, 100.0);
        self.call_cycles.push(c);
    }

    /// Record a visit captured by an agent, minting the id.
    pub fn create_visit(
        &mut self,
        agent_id: &str,
        tenant_id: &str,
        location_id: &str,
        visited_at: DateTime<Utc>,
        status: VisitStatus,
        outcome: VisitOutcome,
    ) -> EntityId {
        let visit_id = mint_id("visit");
        self.visits.push(Visit {
            visit_id: visit_id.clone(),
            agent_id: agent_id.to_string(),
            tenant_id: tenant_id.to_string(),
            location_id: location_id.to_string(),
            visited_at,
            status,
            outcome,
        });
        visit_id
    }

    pub fn complete_visit(&mut self, visit_id: &str) -> EngineResult<()> {
        let visit = self
            .visits
            .iter_mut()
            .find(|v| v.visit_id == visit_id)
            .ok_or_else(|| EngineError::NotFound {
                kind: "visit",
                id: visit_id.to_string(),
            })?;
        visit.status = VisitStatus::Completed;
        Ok(())
    }

    pub fn set_goal_progress(
        &mut self,
        goal_id: &str,
        progress_pct: f64,
        status: crate::ledger::GoalStatus,
    ) -> EngineResult<()> {
        let goal = self
            .goals
            .iter_mut()
            .find(|g| g.goal_id == goal_id)
            .ok_or_else(|| EngineError::NotFound {
                kind: "goal",
                id: goal_id.to_string(),
            })?;
        goal.progress_pct = progress_pct.clamp(0.0, 100.0);
        goal.status = status;
        Ok(())
    }

    /// Adherence updates are the reason cycle status is derived:
    /// nothing else needs recomputing here.
    pub fn set_cycle_adherence(&mut self, cycle_id: &str, adherence_pct: f64) -> EngineResult<()> {
        let cycle = self
            .call_cycles
            .iter_mut()
            .find(|c| c.cycle_id == cycle_id)
            .ok_or_else(|| EngineError::NotFound {
                kind: "call_cycle",
                id: cycle_id.to_string(),
            })?;
        cycle.adherence_rate_pct = adherence_pct.clamp(0.0, 100.0);
        Ok(())
    }

    /// Copy everything into a SQLite backend (used by the CLI to
    /// persist a seeded organization).
    pub fn dump_into(&self, sink: &SqliteStore) -> EngineResult<()> {
        for t in &self.tenants {
            sink.insert_tenant(t)?;
        }
        for r in &self.regions {
            sink.insert_region(r)?;
        }
        for a in &self.areas {
            sink.insert_area(a)?;
        }
        for t in &self.teams {
            sink.insert_team(t)?;
        }
        for a in &self.agents {
            sink.insert_agent(a)?;
        }
        for m in &self.managers {
            sink.insert_manager(m)?;
        }
        for l in &self.locations {
            sink.insert_location(l)?;
        }
        for v in &self.visits {
            sink.insert_visit(v)?;
        }
        for g in &self.goals {
            sink.insert_goal(g)?;
        }
        for c in &self.call_cycles {
            sink.insert_call_cycle(c)?;
        }
        Ok(())
    }
}

impl OrgStore for MemoryStore {
    fn snapshot(&self) -> EngineResult<OrgSnapshot> {
        let graph = OrgGraph::build(
            self.tenants.clone(),
            self.regions.clone(),
            self.areas.clone(),
            self.teams.clone(),
            self.agents.clone(),
            self.managers.clone(),
        )?;
        // Snapshots are id-ordered regardless of insertion order, so
        // both backends fold rows (and sum floats) identically.
        let mut locations = self.locations.clone();
        locations.sort_by(|a, b| a.location_id.cmp(&b.location_id));
        let mut visits = self.visits.clone();
        visits.sort_by(|a, b| a.visit_id.cmp(&b.visit_id));
        let mut goals = self.goals.clone();
        goals.sort_by(|a, b| a.goal_id.cmp(&b.goal_id));
        let mut call_cycles = self.call_cycles.clone();
        call_cycles.sort_by(|a, b| a.cycle_id.cmp(&b.cycle_id));
        Ok(OrgSnapshot {
            graph,
            locations,
            visits,
            goals,
            call_cycles,
        })
    }
}

// ── SQLite backend ───────────────────────────────────────────────────────────

/// rusqlite-backed store. Insert and load methods live in the
/// `org` and `ledger` submodules; nothing outside this layer runs SQL.
pub struct SqliteStore {
    pub(crate) conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &str) -> EngineResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only matters for real files; :memory: ignores it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> EngineResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> EngineResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        Ok(())
    }
}

impl OrgStore for SqliteStore {
    fn snapshot(&self) -> EngineResult<OrgSnapshot> {
        let graph = OrgGraph::build(
            self.load_tenants()?,
            self.load_regions()?,
            self.load_areas()?,
            self.load_teams()?,
            self.load_agents()?,
            self.load_managers()?,
        )?;
        Ok(OrgSnapshot {
            graph,
            locations: self.load_locations()?,
            visits: self.load_visits()?,
            goals: self.load_goals()?,
            call_cycles: self.load_call_cycles()?,
        })
    }
}
