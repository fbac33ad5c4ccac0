//! SQLite persistence for the organizational hierarchy.

use super::SqliteStore;
use crate::error::{EngineError, EngineResult};
use crate::ledger::{Location, LocationKind};
use crate::org::{Agent, Area, Manager, Region, Role, Team, Tenant};
use rusqlite::params;

fn bad_column(table: &str, column: &str, value: &str) -> EngineError {
    EngineError::DataIntegrity(format!("{table}.{column} holds unknown value '{value}'"))
}

impl SqliteStore {
    // ── Tenant ────────────────────────────────────────────────────

    pub fn insert_tenant(&self, t: &Tenant) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO tenant (tenant_id, name, logo_ref) VALUES (?1, ?2, ?3)",
            params![&t.tenant_id, &t.name, &t.logo_ref],
        )?;
        Ok(())
    }

    pub fn load_tenants(&self) -> EngineResult<Vec<Tenant>> {
        let mut stmt = self
            .conn
            .prepare("SELECT tenant_id, name, logo_ref FROM tenant ORDER BY tenant_id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Tenant {
                tenant_id: row.get(0)?,
                name: row.get(1)?,
                logo_ref: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ── Region ────────────────────────────────────────────────────

    pub fn insert_region(&self, r: &Region) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO region (region_id, tenant_id, manager_id, name)
             VALUES (?1, ?2, ?3, ?4)",
            params![&r.region_id, &r.tenant_id, &r.manager_id, &r.name],
        )?;
        Ok(())
    }

    pub fn load_regions(&self) -> EngineResult<Vec<Region>> {
        let mut stmt = self.conn.prepare(
            "SELECT region_id, tenant_id, manager_id, name FROM region ORDER BY region_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Region {
                region_id: row.get(0)?,
                tenant_id: row.get(1)?,
                manager_id: row.get(2)?,
                name: row.get(3)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ── Area ──────────────────────────────────────────────────────

    pub fn insert_area(&self, a: &Area) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO area (area_id, region_id, tenant_id, manager_id, name)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![&a.area_id, &a.region_id, &a.tenant_id, &a.manager_id, &a.name],
        )?;
        Ok(())
    }

    pub fn load_areas(&self) -> EngineResult<Vec<Area>> {
        let mut stmt = self.conn.prepare(
            "SELECT area_id, region_id, tenant_id, manager_id, name FROM area ORDER BY area_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Area {
                area_id: row.get(0)?,
                region_id: row.get(1)?,
                tenant_id: row.get(2)?,
                manager_id: row.get(3)?,
                name: row.get(4)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ── Team ──────────────────────────────────────────────────────

    pub fn insert_team(&self, t: &Team) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO team (team_id, area_id, tenant_id, leader_id, name)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![&t.team_id, &t.area_id, &t.tenant_id, &t.leader_id, &t.name],
        )?;
        Ok(())
    }

    pub fn load_teams(&self) -> EngineResult<Vec<Team>> {
        let mut stmt = self.conn.prepare(
            "SELECT team_id, area_id, tenant_id, leader_id, name FROM team ORDER BY team_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Team {
                team_id: row.get(0)?,
                area_id: row.get(1)?,
                tenant_id: row.get(2)?,
                leader_id: row.get(3)?,
                name: row.get(4)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ── Agent ─────────────────────────────────────────────────────

    pub fn insert_agent(&self, a: &Agent) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO agent (agent_id, team_id, tenant_id, name) VALUES (?1, ?2, ?3, ?4)",
            params![&a.agent_id, &a.team_id, &a.tenant_id, &a.name],
        )?;
        Ok(())
    }

    pub fn load_agents(&self) -> EngineResult<Vec<Agent>> {
        let mut stmt = self
            .conn
            .prepare("SELECT agent_id, team_id, tenant_id, name FROM agent ORDER BY agent_id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Agent {
                agent_id: row.get(0)?,
                team_id: row.get(1)?,
                tenant_id: row.get(2)?,
                name: row.get(3)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ── Manager ───────────────────────────────────────────────────

    pub fn insert_manager(&self, m: &Manager) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO manager (manager_id, tenant_id, role, team_id, area_id, region_id, name)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &m.manager_id,
                &m.tenant_id,
                m.role.label(),
                &m.team_id,
                &m.area_id,
                &m.region_id,
                &m.name
            ],
        )?;
        Ok(())
    }

    pub fn load_managers(&self) -> EngineResult<Vec<Manager>> {
        let mut stmt = self.conn.prepare(
            "SELECT manager_id, tenant_id, role, team_id, area_id, region_id, name
             FROM manager ORDER BY manager_id",
        )?;
        let raw = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, String>(6)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        raw.into_iter()
            .map(|(manager_id, tenant_id, role, team_id, area_id, region_id, name)| {
                let role = Role::parse(&role).ok_or_else(|| bad_column("manager", "role", &role))?;
                Ok(Manager {
                    manager_id,
                    tenant_id,
                    role,
                    team_id,
                    area_id,
                    region_id,
                    name,
                })
            })
            .collect()
    }

    // ── Location ──────────────────────────────────────────────────

    pub fn insert_location(&self, l: &Location) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO location (location_id, tenant_id, name, address, lat, lng, kind)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &l.location_id,
                &l.tenant_id,
                &l.name,
                &l.address,
                l.lat,
                l.lng,
                l.kind.as_str()
            ],
        )?;
        Ok(())
    }

    pub fn load_locations(&self) -> EngineResult<Vec<Location>> {
        let mut stmt = self.conn.prepare(
            "SELECT location_id, tenant_id, name, address, lat, lng, kind
             FROM location ORDER BY location_id",
        )?;
        let raw = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, f64>(4)?,
                    row.get::<_, f64>(5)?,
                    row.get::<_, String>(6)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        raw.into_iter()
            .map(|(location_id, tenant_id, name, address, lat, lng, kind)| {
                let kind = LocationKind::parse(&kind)
                    .ok_or_else(|| bad_column("location", "kind", &kind))?;
                Ok(Location {
                    location_id,
                    tenant_id,
                    name,
                    address,
                    lat,
                    lng,
                    kind,
                })
            })
            .collect()
    }
}
