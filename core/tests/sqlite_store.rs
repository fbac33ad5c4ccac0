use chrono::{TimeZone, Utc};
use fieldpulse_core::ledger::{
    AssignmentScope, CallCycle, CycleFrequency, Goal, GoalMetric, GoalPeriod, GoalStatus, Location,
    LocationKind, Visit, VisitOutcome, VisitStatus,
};
use fieldpulse_core::org::{Agent, Area, Region, Team, Tenant};
use fieldpulse_core::seed::seed_demo_org;
use fieldpulse_core::{Analytics, EngineConfig, MemoryStore, OrgStore, SqliteStore};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn sqlite_copy_of(store: &MemoryStore) -> SqliteStore {
    let sqlite = SqliteStore::in_memory().expect("open in-memory db");
    sqlite.migrate().expect("apply migrations");
    store.dump_into(&sqlite).expect("dump seeded store");
    sqlite
}

fn small_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    store.insert_tenant(Tenant {
        tenant_id: "t1".into(),
        name: "Acme".into(),
        logo_ref: Some("acme.png".into()),
    });
    store.insert_region(Region {
        region_id: "r1".into(),
        tenant_id: "t1".into(),
        manager_id: "r1-mgr".into(),
        name: "North".into(),
    });
    store.insert_area(Area {
        area_id: "a1".into(),
        region_id: "r1".into(),
        tenant_id: "t1".into(),
        manager_id: "a1-mgr".into(),
        name: "Metro".into(),
    });
    store.insert_team(Team {
        team_id: "tm1".into(),
        area_id: "a1".into(),
        tenant_id: "t1".into(),
        leader_id: "tm1-lead".into(),
        name: "Alpha".into(),
    });
    store.insert_agent(Agent {
        agent_id: "ag1".into(),
        team_id: "tm1".into(),
        tenant_id: "t1".into(),
        name: "Thandi Dube".into(),
    });
    store.insert_location(Location {
        location_id: "loc1".into(),
        tenant_id: "t1".into(),
        name: "Corner Spaza".into(),
        address: "12 Vilakazi St".into(),
        lat: -26.2389,
        lng: 27.9089,
        kind: LocationKind::Shop,
    });
    store.insert_location(Location {
        location_id: "loc2".into(),
        tenant_id: "t1".into(),
        name: "Taxi Rank".into(),
        address: "1 Station Rd".into(),
        lat: -26.2041,
        lng: 28.0473,
        kind: LocationKind::ConsumerArea,
    });
    store.insert_visit(Visit {
        visit_id: "v1".into(),
        agent_id: "ag1".into(),
        tenant_id: "t1".into(),
        location_id: "loc1".into(),
        visited_at: Utc.with_ymd_and_hms(2026, 8, 3, 9, 30, 0).unwrap(),
        status: VisitStatus::Completed,
        outcome: VisitOutcome::Shop {
            shelf_share_pct: 42.5,
            in_stock: true,
            trained: true,
        },
    });
    store.insert_visit(Visit {
        visit_id: "v2".into(),
        agent_id: "ag1".into(),
        tenant_id: "t1".into(),
        location_id: "loc2".into(),
        visited_at: Utc.with_ymd_and_hms(2026, 8, 3, 11, 0, 0).unwrap(),
        status: VisitStatus::Pending,
        outcome: VisitOutcome::Consumer {
            converted: false,
            voucher_issued: true,
        },
    });
    store.insert_goal(Goal {
        goal_id: "g1".into(),
        tenant_id: "t1".into(),
        period: GoalPeriod::Quarterly,
        metric: GoalMetric::ShelfShare,
        target: 55.0,
        progress_pct: 77.3,
        status: GoalStatus::InProgress,
        assigned_to: "tm1-lead".into(),
        scope: AssignmentScope::Team("tm1".into()),
        due_date: Some(chrono::NaiveDate::from_ymd_opt(2026, 9, 30).unwrap()),
    });
    store.insert_call_cycle(CallCycle {
        cycle_id: "cc1".into(),
        tenant_id: "t1".into(),
        frequency: CycleFrequency::Daily,
        scope: AssignmentScope::Agent("ag1".into()),
        stops: vec!["loc2".into(), "loc1".into()],
        adherence_rate_pct: 66.6,
        completed: false,
    });
    store
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Every row type survives the SQLite round trip with its enums,
/// outcome payloads, timestamps, and route order intact.
#[test]
fn rows_survive_the_round_trip() {
    let memory = small_store();
    let sqlite = sqlite_copy_of(&memory);
    let snapshot = sqlite.snapshot().expect("rebuild snapshot from rows");

    assert_eq!(snapshot.locations.len(), 2);
    let shop = snapshot
        .locations
        .iter()
        .find(|l| l.location_id == "loc1")
        .unwrap();
    assert_eq!(shop.kind, LocationKind::Shop);
    assert_eq!(shop.lat, -26.2389);

    let v1 = snapshot.visits.iter().find(|v| v.visit_id == "v1").unwrap();
    assert_eq!(v1.status, VisitStatus::Completed);
    assert_eq!(
        v1.visited_at,
        Utc.with_ymd_and_hms(2026, 8, 3, 9, 30, 0).unwrap()
    );
    assert_eq!(
        v1.outcome,
        VisitOutcome::Shop {
            shelf_share_pct: 42.5,
            in_stock: true,
            trained: true,
        }
    );
    let v2 = snapshot.visits.iter().find(|v| v.visit_id == "v2").unwrap();
    assert_eq!(
        v2.outcome,
        VisitOutcome::Consumer {
            converted: false,
            voucher_issued: true,
        }
    );

    let goal = snapshot.goals.iter().find(|g| g.goal_id == "g1").unwrap();
    assert_eq!(goal.period, GoalPeriod::Quarterly);
    assert_eq!(goal.metric, GoalMetric::ShelfShare);
    assert_eq!(goal.status, GoalStatus::InProgress);
    assert_eq!(goal.progress_pct, 77.3);
    assert_eq!(goal.scope, AssignmentScope::Team("tm1".into()));
    assert_eq!(
        goal.due_date,
        Some(chrono::NaiveDate::from_ymd_opt(2026, 9, 30).unwrap())
    );

    let cycle = snapshot
        .call_cycles
        .iter()
        .find(|c| c.cycle_id == "cc1")
        .unwrap();
    assert_eq!(cycle.frequency, CycleFrequency::Daily);
    assert_eq!(cycle.stops, vec!["loc2".to_string(), "loc1".to_string()]);
    assert_eq!(cycle.adherence_rate_pct, 66.6);
    assert!(!cycle.completed);
}

/// Memory and SQLite backends agree on every KPI for the same rows.
#[test]
fn backends_agree_on_kpis() {
    let memory = small_store();
    let sqlite = sqlite_copy_of(&memory);

    let from_memory = Analytics::from_store(&memory, EngineConfig::default()).unwrap();
    let from_sqlite = Analytics::from_store(&sqlite, EngineConfig::default()).unwrap();

    assert_eq!(
        from_memory.agent_analytics("ag1").unwrap(),
        from_sqlite.agent_analytics("ag1").unwrap()
    );
    assert_eq!(
        from_memory.team_analytics("tm1").unwrap(),
        from_sqlite.team_analytics("tm1").unwrap()
    );
    assert_eq!(
        from_memory.system_analytics("t1").unwrap(),
        from_sqlite.system_analytics("t1").unwrap()
    );
}

/// A full seeded organization also round-trips: the persisted copy
/// reproduces the in-memory system KPI exactly.
#[test]
fn seeded_org_round_trips() {
    let mut memory = MemoryStore::new();
    let config = EngineConfig::default();
    let tenant_ids = seed_demo_org(&mut memory, &config, 42).unwrap();
    let sqlite = sqlite_copy_of(&memory);

    let from_memory = Analytics::from_store(&memory, config.clone()).unwrap();
    let from_sqlite = Analytics::from_store(&sqlite, config).unwrap();
    for tenant_id in &tenant_ids {
        assert_eq!(
            from_memory.system_analytics(tenant_id).unwrap(),
            from_sqlite.system_analytics(tenant_id).unwrap(),
            "tenant {tenant_id}"
        );
    }
}

/// Migrations are idempotent enough to re-apply on an existing file.
#[test]
fn migrate_twice_is_harmless() {
    let sqlite = SqliteStore::in_memory().unwrap();
    sqlite.migrate().unwrap();
    sqlite.migrate().unwrap();
    assert!(sqlite.snapshot().unwrap().visits.is_empty());
}
