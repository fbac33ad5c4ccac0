use fieldpulse_core::org::{Agent, Area, Region, Team, Tenant};
use fieldpulse_core::{Analytics, EngineConfig, KpiCore, MemoryStore};

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Hierarchy with no ledger rows at all: a1 has one (idle) team, a2
/// has none.
fn empty_ledger_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    store.insert_tenant(Tenant {
        tenant_id: "t1".into(),
        name: "Acme".into(),
        logo_ref: None,
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
    store.insert_area(Area {
        area_id: "a2".into(),
        region_id: "r1".into(),
        tenant_id: "t1".into(),
        manager_id: "a2-mgr".into(),
        name: "Harbour".into(),
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
        name: "Idle Agent".into(),
    });
    store
}

fn analytics() -> Analytics {
    Analytics::from_store(&empty_ledger_store(), EngineConfig::default()).expect("valid snapshot")
}

fn assert_all_rates_zero(core: &KpiCore, context: &str) {
    for (name, rate) in [
        ("completion_rate", core.completion_rate),
        ("conversion_rate", core.conversion_rate),
        ("average_shelf_share", core.average_shelf_share),
        ("goal_completion_rate", core.goal_completion_rate),
        ("average_adherence_rate", core.average_adherence_rate),
    ] {
        assert!(rate.is_finite(), "{context}: {name} is not finite: {rate}");
        assert_eq!(rate, 0.0, "{context}: {name} must be 0 over an empty set");
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// An area with no teams reports zero counts and zero rates — never
/// NaN or infinity from an empty denominator.
#[test]
fn empty_area_yields_zero_rates() {
    let area = analytics().area_analytics("a2").unwrap();
    assert_eq!(area.team_count, 0);
    assert_eq!(area.agent_count, 0);
    assert_eq!(area.core.total_visits, 0);
    assert_eq!(area.visits_per_team, 0.0);
    assert!(area.by_team.is_empty());
    assert_all_rates_zero(&area.core, "area a2");
}

/// The zero guard holds at every tier, not just one.
#[test]
fn every_tier_guards_empty_denominators() {
    let analytics = analytics();

    let agent = analytics.agent_analytics("ag1").unwrap();
    assert_all_rates_zero(&agent.core, "agent ag1");

    let team = analytics.team_analytics("tm1").unwrap();
    assert_eq!(team.visits_per_agent, 0.0);
    assert_all_rates_zero(&team.core, "team tm1");

    let region = analytics.region_analytics("r1").unwrap();
    assert_eq!(region.visits_per_area, 0.0);
    assert_all_rates_zero(&region.core, "region r1");

    let national = analytics.national_analytics("t1").unwrap();
    assert_eq!(national.visits_per_region, 0.0);
    assert_all_rates_zero(&national.core, "national t1");
}

/// A tenant with no regions at all still aggregates cleanly.
#[test]
fn tenant_without_regions_is_all_zero() {
    let mut store = MemoryStore::new();
    store.insert_tenant(Tenant {
        tenant_id: "t-empty".into(),
        name: "Shell".into(),
        logo_ref: None,
    });
    let analytics = Analytics::from_store(&store, EngineConfig::default()).unwrap();

    let national = analytics.national_analytics("t-empty").unwrap();
    assert_eq!(national.region_count, 0);
    assert_eq!(national.agent_count, 0);
    assert!(national.by_region.is_empty());
    assert_all_rates_zero(&national.core, "empty tenant");

    let system = analytics.system_analytics("t-empty").unwrap();
    assert_eq!(system.location_count, 0);
    assert_eq!(system.manager_count, 0);
}
