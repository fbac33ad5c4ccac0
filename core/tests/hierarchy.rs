use fieldpulse_core::error::EngineError;
use fieldpulse_core::graph::OrgGraph;
use fieldpulse_core::org::{Agent, Area, Manager, OrgUnit, Region, Role, Team, Tenant};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn tenant(id: &str) -> Tenant {
    Tenant {
        tenant_id: id.into(),
        name: format!("Tenant {id}"),
        logo_ref: None,
    }
}

fn region(id: &str, tenant: &str) -> Region {
    Region {
        region_id: id.into(),
        tenant_id: tenant.into(),
        manager_id: format!("{id}-mgr"),
        name: format!("Region {id}"),
    }
}

fn area(id: &str, region: &str, tenant: &str) -> Area {
    Area {
        area_id: id.into(),
        region_id: region.into(),
        tenant_id: tenant.into(),
        manager_id: format!("{id}-mgr"),
        name: format!("Area {id}"),
    }
}

fn team(id: &str, area: &str, tenant: &str) -> Team {
    Team {
        team_id: id.into(),
        area_id: area.into(),
        tenant_id: tenant.into(),
        leader_id: format!("{id}-lead"),
        name: format!("Team {id}"),
    }
}

fn agent(id: &str, team: &str, tenant: &str) -> Agent {
    Agent {
        agent_id: id.into(),
        team_id: team.into(),
        tenant_id: tenant.into(),
        name: format!("Agent {id}"),
    }
}

fn small_graph() -> OrgGraph {
    OrgGraph::build(
        vec![tenant("t1")],
        vec![region("r1", "t1"), region("r2", "t1")],
        vec![area("a1", "r1", "t1"), area("a2", "r1", "t1")],
        vec![team("tm1", "a1", "t1"), team("tm2", "a1", "t1")],
        vec![
            agent("ag1", "tm1", "t1"),
            agent("ag2", "tm1", "t1"),
            agent("ag3", "tm2", "t1"),
        ],
        vec![],
    )
    .expect("valid graph")
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Children of an existing but childless node come back as an empty
/// sequence, never as an error.
#[test]
fn childless_node_yields_empty_children() {
    let graph = small_graph();
    assert!(graph.areas_of("r2").unwrap().is_empty());
    assert!(graph.teams_of("a2").unwrap().is_empty());
}

/// An unknown node id is NotFound, distinct from the childless case.
#[test]
fn unknown_node_is_not_found() {
    let graph = small_graph();
    let err = graph.teams_of("a99").unwrap_err();
    assert!(matches!(err, EngineError::NotFound { kind: "area", .. }), "got {err}");
}

#[test]
fn children_preserve_insertion_order() {
    let graph = small_graph();
    let teams: Vec<&str> = graph
        .teams_of("a1")
        .unwrap()
        .iter()
        .map(|t| t.team_id.as_str())
        .collect();
    assert_eq!(teams, vec!["tm1", "tm2"]);
}

#[test]
fn ancestor_chain_resolves_every_level() {
    let graph = small_graph();
    let chain = graph.ancestor_chain("ag3").unwrap();
    assert_eq!(chain.team.team_id, "tm2");
    assert_eq!(chain.area.area_id, "a1");
    assert_eq!(chain.region.region_id, "r1");
    assert_eq!(chain.tenant.tenant_id, "t1");
}

#[test]
fn membership_is_the_subtree_agent_set() {
    let graph = small_graph();

    let agent_set = graph.membership(&OrgUnit::Agent("ag1".into())).unwrap();
    assert_eq!(agent_set.into_iter().collect::<Vec<_>>(), vec!["ag1"]);

    let team_set = graph.membership(&OrgUnit::Team("tm1".into())).unwrap();
    assert_eq!(team_set.into_iter().collect::<Vec<_>>(), vec!["ag1", "ag2"]);

    let area_set = graph.membership(&OrgUnit::Area("a1".into())).unwrap();
    assert_eq!(area_set.len(), 3);

    // National tier: every agent of the tenant.
    let tenant_set = graph.membership(&OrgUnit::Tenant("t1".into())).unwrap();
    assert_eq!(tenant_set.len(), 3);
}

/// A foreign key that resolves to a parent in a different tenant is a
/// data-integrity error at build time, never silently dropped.
#[test]
fn cross_tenant_fk_fails_fast() {
    let err = OrgGraph::build(
        vec![tenant("t1"), tenant("t2")],
        vec![region("r1", "t1")],
        vec![area("a1", "r1", "t2")], // area claims t2, its region is t1
        vec![],
        vec![],
        vec![],
    )
    .unwrap_err();
    assert!(matches!(err, EngineError::CrossTenant { .. }), "got {err}");
}

#[test]
fn unknown_parent_fails_fast() {
    let err = OrgGraph::build(
        vec![tenant("t1")],
        vec![region("r1", "t1")],
        vec![area("a1", "r9", "t1")],
        vec![],
        vec![],
        vec![],
    )
    .unwrap_err();
    assert!(matches!(err, EngineError::UnknownParent { .. }), "got {err}");
}

/// A manager whose FK shape contradicts its role's capability-table
/// entry is rejected at build time.
#[test]
fn manager_scope_shape_is_validated() {
    let bad_manager = Manager {
        manager_id: "m1".into(),
        tenant_id: "t1".into(),
        role: Role::AreaManager,
        team_id: Some("tm1".into()), // wrong FK for an area manager
        area_id: None,
        region_id: None,
        name: "M".into(),
    };
    let err = OrgGraph::build(
        vec![tenant("t1")],
        vec![region("r1", "t1")],
        vec![area("a1", "r1", "t1")],
        vec![team("tm1", "a1", "t1")],
        vec![],
        vec![bad_manager],
    )
    .unwrap_err();
    assert!(matches!(err, EngineError::DataIntegrity(_)), "got {err}");
}

/// A manager scoped to a node owned by another tenant is rejected.
#[test]
fn manager_cannot_manage_across_tenants() {
    let foreign_manager = Manager {
        manager_id: "m1".into(),
        tenant_id: "t2".into(),
        role: Role::RegionalManager,
        team_id: None,
        area_id: None,
        region_id: Some("r1".into()), // r1 belongs to t1
        name: "M".into(),
    };
    let err = OrgGraph::build(
        vec![tenant("t1"), tenant("t2")],
        vec![region("r1", "t1")],
        vec![],
        vec![],
        vec![],
        vec![foreign_manager],
    )
    .unwrap_err();
    assert!(matches!(err, EngineError::CrossTenant { .. }), "got {err}");
}

#[test]
fn duplicate_ids_are_rejected() {
    let err = OrgGraph::build(
        vec![tenant("t1")],
        vec![region("r1", "t1"), region("r1", "t1")],
        vec![],
        vec![],
        vec![],
        vec![],
    )
    .unwrap_err();
    assert!(matches!(err, EngineError::DataIntegrity(_)), "got {err}");
}
