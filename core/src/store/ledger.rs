//! SQLite persistence for the visit, goal and call-cycle ledgers.
//!
//! Enum columns are stored as their snake_case text labels; the visit
//! outcome payload is one JSON column, matching its tagged serde shape.

use super::SqliteStore;
use crate::error::{EngineError, EngineResult};
use crate::ledger::{
    AssignmentScope, CallCycle, CycleFrequency, Goal, GoalMetric, GoalPeriod, GoalStatus, Visit,
    VisitStatus,
};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::params;

fn bad_column(table: &str, column: &str, value: &str) -> EngineError {
    EngineError::DataIntegrity(format!("{table}.{column} holds unknown value '{value}'"))
}

impl SqliteStore {
    // ── Visit ─────────────────────────────────────────────────────

    pub fn insert_visit(&self, v: &Visit) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO visit (visit_id, agent_id, tenant_id, location_id, visited_at, status, outcome_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &v.visit_id,
                &v.agent_id,
                &v.tenant_id,
                &v.location_id,
                v.visited_at.to_rfc3339(),
                v.status.as_str(),
                serde_json::to_string(&v.outcome)?,
            ],
        )?;
        Ok(())
    }

    pub fn load_visits(&self) -> EngineResult<Vec<Visit>> {
        let mut stmt = self.conn.prepare(
            "SELECT visit_id, agent_id, tenant_id, location_id, visited_at, status, outcome_json
             FROM visit ORDER BY visit_id",
        )?;
        let raw = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        raw.into_iter()
            .map(
                |(visit_id, agent_id, tenant_id, location_id, visited_at, status, outcome)| {
                    let visited_at = DateTime::parse_from_rfc3339(&visited_at)
                        .map_err(|_| bad_column("visit", "visited_at", &visited_at))?
                        .with_timezone(&Utc);
                    let status = VisitStatus::parse(&status)
                        .ok_or_else(|| bad_column("visit", "status", &status))?;
                    Ok(Visit {
                        visit_id,
                        agent_id,
                        tenant_id,
                        location_id,
                        visited_at,
                        status,
                        outcome: serde_json::from_str(&outcome)?,
                    })
                },
            )
            .collect()
    }

    // ── Goal ──────────────────────────────────────────────────────

    pub fn insert_goal(&self, g: &Goal) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO goal (goal_id, tenant_id, period, metric, target, progress_pct,
                               status, assigned_to, scope_level, scope_id, due_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                &g.goal_id,
                &g.tenant_id,
                g.period.as_str(),
                g.metric.as_str(),
                g.target,
                g.progress_pct.clamp(0.0, 100.0),
                g.status.as_str(),
                &g.assigned_to,
                g.scope.level(),
                g.scope.id(),
                g.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
            ],
        )?;
        Ok(())
    }

    pub fn load_goals(&self) -> EngineResult<Vec<Goal>> {
        let mut stmt = self.conn.prepare(
            "SELECT goal_id, tenant_id, period, metric, target, progress_pct,
                    status, assigned_to, scope_level, scope_id, due_date
             FROM goal ORDER BY goal_id",
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
                    row.get::<_, String>(7)?,
                    row.get::<_, String>(8)?,
                    row.get::<_, String>(9)?,
                    row.get::<_, Option<String>>(10)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        raw.into_iter()
            .map(
                |(
                    goal_id,
                    tenant_id,
                    period,
                    metric,
                    target,
                    progress_pct,
                    status,
                    assigned_to,
                    scope_level,
                    scope_id,
                    due_date,
                )| {
                    let period = GoalPeriod::parse(&period)
                        .ok_or_else(|| bad_column("goal", "period", &period))?;
                    let metric = GoalMetric::parse(&metric)
                        .ok_or_else(|| bad_column("goal", "metric", &metric))?;
                    let status = GoalStatus::parse(&status)
                        .ok_or_else(|| bad_column("goal", "status", &status))?;
                    let scope = AssignmentScope::from_parts(&scope_level, &scope_id)
                        .ok_or_else(|| bad_column("goal", "scope_level", &scope_level))?;
                    let due_date = due_date
                        .map(|d| {
                            NaiveDate::parse_from_str(&d, "%Y-%m-%d")
                                .map_err(|_| bad_column("goal", "due_date", &d))
                        })
                        .transpose()?;
                    Ok(Goal {
                        goal_id,
                        tenant_id,
                        period,
                        metric,
                        target,
                        progress_pct,
                        status,
                        assigned_to,
                        scope,
                        due_date,
                    })
                },
            )
            .collect()
    }

    // ── Call cycle ────────────────────────────────────────────────

    pub fn insert_call_cycle(&self, c: &CallCycle) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO call_cycle (cycle_id, tenant_id, frequency, scope_level, scope_id,
                                     adherence_rate_pct, completed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &c.cycle_id,
                &c.tenant_id,
                c.frequency.as_str(),
                c.scope.level(),
                c.scope.id(),
                c.adherence_rate_pct.clamp(0.0, 100.0),
                if c.completed { 1 } else { 0 },
            ],
        )?;
        for (seq, location_id) in c.stops.iter().enumerate() {
            self.conn.execute(
                "INSERT INTO call_cycle_stop (cycle_id, seq, location_id) VALUES (?1, ?2, ?3)",
                params![&c.cycle_id, seq as i64, location_id],
            )?;
        }
        Ok(())
    }

    pub fn load_call_cycles(&self) -> EngineResult<Vec<CallCycle>> {
        let mut stmt = self.conn.prepare(
            "SELECT cycle_id, tenant_id, frequency, scope_level, scope_id,
                    adherence_rate_pct, completed
             FROM call_cycle ORDER BY cycle_id",
        )?;
        let raw = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, f64>(5)?,
                    row.get::<_, i64>(6)? != 0,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut cycles = raw
            .into_iter()
            .map(
                |(cycle_id, tenant_id, frequency, scope_level, scope_id, adherence, completed)| {
                    let frequency = CycleFrequency::parse(&frequency)
                        .ok_or_else(|| bad_column("call_cycle", "frequency", &frequency))?;
                    let scope = AssignmentScope::from_parts(&scope_level, &scope_id)
                        .ok_or_else(|| bad_column("call_cycle", "scope_level", &scope_level))?;
                    Ok(CallCycle {
                        cycle_id,
                        tenant_id,
                        frequency,
                        scope,
                        stops: Vec::new(),
                        adherence_rate_pct: adherence,
                        completed,
                    })
                },
            )
            .collect::<EngineResult<Vec<_>>>()?;

        let mut stop_stmt = self.conn.prepare(
            "SELECT cycle_id, location_id FROM call_cycle_stop ORDER BY cycle_id, seq",
        )?;
        let stops = stop_stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        for (cycle_id, location_id) in stops {
            if let Some(cycle) = cycles.iter_mut().find(|c| c.cycle_id == cycle_id) {
                cycle.stops.push(location_id);
            }
        }
        Ok(cycles)
    }
}
