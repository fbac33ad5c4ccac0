use chrono::{TimeZone, Utc};
use fieldpulse_core::ledger::{
    AssignmentScope, CallCycle, CycleFrequency, Goal, GoalMetric, GoalPeriod, GoalStatus, Visit,
    VisitOutcome, VisitStatus,
};
use fieldpulse_core::org::{Agent, Area, Region, Team, Tenant};
use fieldpulse_core::{Analytics, EngineConfig, MemoryStore};

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Two tenants with the same shape: one region/area/team and a single
/// agent each. t1's agent has 4 visits, t2's has 1.
fn two_tenant_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    for (t, visits) in [("t1", 4u32), ("t2", 1u32)] {
        store.insert_tenant(Tenant {
            tenant_id: t.into(),
            name: format!("Tenant {t}"),
            logo_ref: None,
        });
        store.insert_region(Region {
            region_id: format!("{t}-r1"),
            tenant_id: t.into(),
            manager_id: format!("{t}-r1-mgr"),
            name: "North".into(),
        });
        store.insert_area(Area {
            area_id: format!("{t}-a1"),
            region_id: format!("{t}-r1"),
            tenant_id: t.into(),
            manager_id: format!("{t}-a1-mgr"),
            name: "Metro".into(),
        });
        store.insert_team(Team {
            team_id: format!("{t}-tm1"),
            area_id: format!("{t}-a1"),
            tenant_id: t.into(),
            leader_id: format!("{t}-tm1-lead"),
            name: "Alpha".into(),
        });
        store.insert_agent(Agent {
            agent_id: format!("{t}-ag1"),
            team_id: format!("{t}-tm1"),
            tenant_id: t.into(),
            name: format!("Agent of {t}"),
        });
        for v in 0..visits {
            store.insert_visit(Visit {
                visit_id: format!("{t}-v{v}"),
                agent_id: format!("{t}-ag1"),
                tenant_id: t.into(),
                location_id: format!("{t}-loc1"),
                visited_at: Utc.with_ymd_and_hms(2026, 8, 5, 10 + v, 0, 0).unwrap(),
                status: VisitStatus::Completed,
                outcome: VisitOutcome::Consumer {
                    converted: true,
                    voucher_issued: false,
                },
            });
        }
        store.insert_goal(Goal {
            goal_id: format!("{t}-g1"),
            tenant_id: t.into(),
            period: GoalPeriod::Weekly,
            metric: GoalMetric::Visits,
            target: 10.0,
            progress_pct: 100.0,
            status: GoalStatus::Completed,
            assigned_to: format!("{t}-ag1"),
            scope: AssignmentScope::Agent(format!("{t}-ag1")),
            due_date: None,
        });
        store.insert_call_cycle(CallCycle {
            cycle_id: format!("{t}-cc1"),
            tenant_id: t.into(),
            frequency: CycleFrequency::Weekly,
            scope: AssignmentScope::Team(format!("{t}-tm1")),
            stops: vec![format!("{t}-loc1")],
            adherence_rate_pct: 90.0,
            completed: false,
        });
    }
    store
}

fn analytics(store: &MemoryStore) -> Analytics {
    Analytics::from_store(store, EngineConfig::default()).expect("valid snapshot")
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Each tenant's national aggregate counts only its own ledger rows.
#[test]
fn national_aggregates_never_cross_tenants() {
    let store = two_tenant_store();
    let analytics = analytics(&store);

    let t1 = analytics.national_analytics("t1").unwrap();
    let t2 = analytics.national_analytics("t2").unwrap();

    assert_eq!(t1.core.total_visits, 4);
    assert_eq!(t2.core.total_visits, 1);
    assert_eq!(t1.core.goals_assigned, 1);
    assert_eq!(t2.core.goals_assigned, 1);
    assert_eq!(t1.core.call_cycles_assigned, 1);
    assert_eq!(t2.core.call_cycles_assigned, 1);
    assert_eq!(t1.agent_count, 1);
    assert_eq!(t2.agent_count, 1);
}

/// A visit tagged with one tenant but captured by another tenant's
/// agent is corrupt: it must not count anywhere.
#[test]
fn mismatched_tenant_tag_is_excluded_everywhere() {
    let mut store = two_tenant_store();
    store.insert_visit(Visit {
        visit_id: "poison".into(),
        agent_id: "t1-ag1".into(),  // t1's agent
        tenant_id: "t2".into(),     // tagged as t2
        location_id: "t1-loc1".into(),
        visited_at: Utc.with_ymd_and_hms(2026, 8, 6, 9, 0, 0).unwrap(),
        status: VisitStatus::Completed,
        outcome: VisitOutcome::Consumer {
            converted: true,
            voucher_issued: false,
        },
    });

    let analytics = analytics(&store);
    assert_eq!(analytics.national_analytics("t1").unwrap().core.total_visits, 4);
    assert_eq!(analytics.national_analytics("t2").unwrap().core.total_visits, 1);
    assert_eq!(analytics.agent_analytics("t1-ag1").unwrap().core.total_visits, 4);
}

/// A goal scoped to another tenant's node is excluded even when its
/// own tenant tag matches the queried tenant.
#[test]
fn foreign_scope_goal_is_excluded() {
    let mut store = two_tenant_store();
    store.insert_goal(Goal {
        goal_id: "poison-goal".into(),
        tenant_id: "t1".into(),
        period: GoalPeriod::Monthly,
        metric: GoalMetric::Visits,
        target: 5.0,
        progress_pct: 0.0,
        status: GoalStatus::Pending,
        assigned_to: "t2-ag1".into(),
        scope: AssignmentScope::Team("t2-tm1".into()), // t2's team
        due_date: None,
    });

    let analytics = analytics(&store);
    assert_eq!(analytics.national_analytics("t1").unwrap().core.goals_assigned, 1);
    assert_eq!(analytics.national_analytics("t2").unwrap().core.goals_assigned, 1);
}

/// Tenant ids are also respected by the system (admin) rollup.
#[test]
fn system_counts_are_per_tenant() {
    let store = two_tenant_store();
    let analytics = analytics(&store);

    let t1 = analytics.system_analytics("t1").unwrap();
    assert_eq!(t1.tenant_name, "Tenant t1");
    assert_eq!(t1.national.region_count, 1);
    assert_eq!(t1.national.core.total_visits, 4);
}
