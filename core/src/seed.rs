//! Deterministic demo-data seeding.
//!
//! Builds a full organization (hierarchy, managers, locations) and a
//! plausible ledger (visits, goals, call cycles) into a MemoryStore,
//! sized by SeedConfig. All randomness flows through SeedRng streams,
//! so the same master seed always produces the same dataset and
//! therefore the same KPIs.

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::ledger::{
    AssignmentScope, CallCycle, CycleFrequency, Goal, GoalMetric, GoalPeriod, GoalStatus,
    Location, LocationKind, Visit, VisitOutcome, VisitStatus,
};
use crate::org::{Agent, Area, Manager, Region, Role, Team, Tenant};
use crate::rng::{SeedRng, SeedRngBank, SeedStream};
use crate::store::MemoryStore;
use crate::types::EntityId;
use chrono::{DateTime, Duration, Utc};

const FIRST_NAMES: &[&str] = &[
    "Amara", "Brian", "Chipo", "Daniel", "Esther", "Farai", "Grace", "Henry", "Itumeleng",
    "Joyce", "Kagiso", "Lerato", "Musa", "Naledi", "Owen", "Palesa", "Rudo", "Sipho", "Thandi",
    "Vusi", "Wendy", "Xolani", "Yvonne", "Zanele",
];

const LAST_NAMES: &[&str] = &[
    "Banda", "Chirwa", "Dube", "Gumede", "Khumalo", "Mabaso", "Ncube", "Okafor", "Phiri",
    "Radebe", "Sibanda", "Tshabalala", "van Wyk", "Zulu", "Moyo", "Nkosi", "Dlamini", "Mokoena",
];

const REGION_NAMES: &[&str] = &[
    "Northern", "Southern", "Eastern", "Western", "Central", "Coastal", "Highlands", "Lakeside",
];

const AREA_NAMES: &[&str] = &[
    "Metro", "Suburban", "Downtown", "Industrial", "Riverside", "Uptown", "Harbour", "Gateway",
];

const SHOP_PREFIXES: &[&str] = &[
    "Sunrise", "Golden", "City", "Corner", "Family", "Prime", "Unity", "Savanna", "Horizon",
    "Market Street",
];

const SHOP_SUFFIXES: &[&str] = &[
    "Supermarket", "Mini Mart", "Trading Store", "Wholesale", "Grocers", "Cash & Carry", "Kiosk",
];

const STREET_NAMES: &[&str] = &[
    "Main Road", "Church Street", "Station Avenue", "Market Lane", "Union Drive", "Park Road",
];

const LOCATION_KINDS: &[LocationKind] = &[
    LocationKind::Shop,
    LocationKind::ConsumerArea,
    LocationKind::Market,
    LocationKind::Mall,
];

fn person_name(rng: &mut SeedRng) -> String {
    format!("{} {}", rng.pick(FIRST_NAMES), rng.pick(LAST_NAMES))
}

fn base_time() -> DateTime<Utc> {
    // 2026-08-03T08:00:00Z; fixed so seeded timestamps are reproducible.
    DateTime::<Utc>::from_timestamp(1_785_744_000, 0).unwrap_or(DateTime::UNIX_EPOCH)
}

/// Seed a demo organization into `store`. Returns the tenant ids.
pub fn seed_demo_org(
    store: &mut MemoryStore,
    config: &EngineConfig,
    master_seed: u64,
) -> EngineResult<Vec<EntityId>> {
    let seed_cfg = &config.seed;
    seed_cfg.validate()?;

    let bank = SeedRngBank::new(master_seed);
    let mut org_rng = bank.for_stream(SeedStream::OrgLayout);
    let mut loc_rng = bank.for_stream(SeedStream::Locations);
    let mut visit_rng = bank.for_stream(SeedStream::Visits);
    let mut goal_rng = bank.for_stream(SeedStream::Goals);
    let mut cycle_rng = bank.for_stream(SeedStream::CallCycles);

    let mut tenant_ids = Vec::new();

    for t in 1..=seed_cfg.tenants {
        let tenant_id = format!("t{t:02}");
        store.insert_tenant(Tenant {
            tenant_id: tenant_id.clone(),
            name: format!("Demo Brand {t}"),
            logo_ref: Some(format!("logos/{tenant_id}.png")),
        });
        store.insert_manager(Manager {
            manager_id: format!("{tenant_id}-nat"),
            tenant_id: tenant_id.clone(),
            role: Role::NationalManager,
            team_id: None,
            area_id: None,
            region_id: None,
            name: person_name(&mut org_rng),
        });
        store.insert_manager(Manager {
            manager_id: format!("{tenant_id}-admin"),
            tenant_id: tenant_id.clone(),
            role: Role::TenantAdmin,
            team_id: None,
            area_id: None,
            region_id: None,
            name: person_name(&mut org_rng),
        });

        let locations = seed_locations(store, &tenant_id, seed_cfg.locations_per_tenant, &mut loc_rng);

        for r in 1..=seed_cfg.regions_per_tenant {
            let region_id = format!("{tenant_id}-r{r}");
            let region_mgr = format!("{region_id}-mgr");
            store.insert_region(Region {
                region_id: region_id.clone(),
                tenant_id: tenant_id.clone(),
                manager_id: region_mgr.clone(),
                name: format!("{} Region", REGION_NAMES[(r - 1) % REGION_NAMES.len()]),
            });
            store.insert_manager(Manager {
                manager_id: region_mgr,
                tenant_id: tenant_id.clone(),
                role: Role::RegionalManager,
                team_id: None,
                area_id: None,
                region_id: Some(region_id.clone()),
                name: person_name(&mut org_rng),
            });
            seed_region_goal(store, &tenant_id, &region_id, &mut goal_rng);

            for a in 1..=seed_cfg.areas_per_region {
                let area_id = format!("{region_id}-a{a}");
                let area_mgr = format!("{area_id}-mgr");
                store.insert_area(Area {
                    area_id: area_id.clone(),
                    region_id: region_id.clone(),
                    tenant_id: tenant_id.clone(),
                    manager_id: area_mgr.clone(),
                    name: format!("{} Area", AREA_NAMES[(a - 1) % AREA_NAMES.len()]),
                });
                store.insert_manager(Manager {
                    manager_id: area_mgr,
                    tenant_id: tenant_id.clone(),
                    role: Role::AreaManager,
                    team_id: None,
                    area_id: Some(area_id.clone()),
                    region_id: None,
                    name: person_name(&mut org_rng),
                });

                for tm in 1..=seed_cfg.teams_per_area {
                    let team_id = format!("{area_id}-tm{tm}");
                    let leader_id = format!("{team_id}-lead");
                    store.insert_team(Team {
                        team_id: team_id.clone(),
                        area_id: area_id.clone(),
                        tenant_id: tenant_id.clone(),
                        leader_id: leader_id.clone(),
                        name: format!("Team {r}-{a}-{tm}"),
                    });
                    store.insert_manager(Manager {
                        manager_id: leader_id.clone(),
                        tenant_id: tenant_id.clone(),
                        role: Role::TeamLeader,
                        team_id: Some(team_id.clone()),
                        area_id: None,
                        region_id: None,
                        name: person_name(&mut org_rng),
                    });
                    seed_team_ledger(
                        store,
                        config,
                        &tenant_id,
                        &team_id,
                        &leader_id,
                        &locations,
                        &mut org_rng,
                        &mut visit_rng,
                        &mut goal_rng,
                        &mut cycle_rng,
                    );
                }
            }
        }
        tenant_ids.push(tenant_id);
    }

    log::info!(
        "seeded {} tenant(s) from master seed {master_seed}",
        tenant_ids.len()
    );
    Ok(tenant_ids)
}

fn seed_locations(
    store: &mut MemoryStore,
    tenant_id: &str,
    count: usize,
    rng: &mut SeedRng,
) -> Vec<EntityId> {
    let mut ids = Vec::with_capacity(count);
    for n in 1..=count {
        let location_id = format!("{tenant_id}-loc{n:03}");
        let kind = *rng.pick(LOCATION_KINDS);
        let name = match kind {
            LocationKind::Shop => {
                format!("{} {}", rng.pick(SHOP_PREFIXES), rng.pick(SHOP_SUFFIXES))
            }
            LocationKind::ConsumerArea => format!("{} Community Hall", rng.pick(SHOP_PREFIXES)),
            LocationKind::Market => format!("{} Market", rng.pick(SHOP_PREFIXES)),
            LocationKind::Mall => format!("{} Mall", rng.pick(SHOP_PREFIXES)),
        };
        store.insert_location(Location {
            location_id: location_id.clone(),
            tenant_id: tenant_id.to_string(),
            name,
            address: format!("{} {}", rng.next_u64_below(200) + 1, rng.pick(STREET_NAMES)),
            lat: rng.range_f64(-26.3, -25.7),
            lng: rng.range_f64(27.8, 28.4),
            kind,
        });
        ids.push(location_id);
    }
    ids
}

fn seed_region_goal(store: &mut MemoryStore, tenant_id: &str, region_id: &str, rng: &mut SeedRng) {
    store.insert_goal(random_goal(
        format!("{region_id}-g1"),
        tenant_id,
        format!("{region_id}-mgr"),
        AssignmentScope::Region(region_id.to_string()),
        rng,
    ));
}

#[allow(clippy::too_many_arguments)]
fn seed_team_ledger(
    store: &mut MemoryStore,
    config: &EngineConfig,
    tenant_id: &str,
    team_id: &str,
    leader_id: &str,
    locations: &[EntityId],
    org_rng: &mut SeedRng,
    visit_rng: &mut SeedRng,
    goal_rng: &mut SeedRng,
    cycle_rng: &mut SeedRng,
) {
    let seed_cfg = &config.seed;

    store.insert_goal(random_goal(
        format!("{team_id}-g1"),
        tenant_id,
        leader_id.to_string(),
        AssignmentScope::Team(team_id.to_string()),
        goal_rng,
    ));
    store.insert_call_cycle(random_cycle(
        format!("{team_id}-cc1"),
        tenant_id,
        AssignmentScope::Team(team_id.to_string()),
        locations,
        cycle_rng,
    ));

    for ag in 1..=seed_cfg.agents_per_team {
        let agent_id = format!("{team_id}-ag{ag}");
        store.insert_agent(Agent {
            agent_id: agent_id.clone(),
            team_id: team_id.to_string(),
            tenant_id: tenant_id.to_string(),
            name: person_name(org_rng),
        });

        for v in 1..=seed_cfg.visits_per_agent {
            store.insert_visit(random_visit(
                format!("{agent_id}-v{v:02}"),
                tenant_id,
                &agent_id,
                locations,
                seed_cfg.consumer_visit_share,
                seed_cfg.completion_probability,
                seed_cfg.conversion_probability,
                visit_rng,
            ));
        }

        store.insert_goal(random_goal(
            format!("{agent_id}-g1"),
            tenant_id,
            agent_id.clone(),
            AssignmentScope::Agent(agent_id.clone()),
            goal_rng,
        ));
        store.insert_call_cycle(random_cycle(
            format!("{agent_id}-cc1"),
            tenant_id,
            AssignmentScope::Agent(agent_id.clone()),
            locations,
            cycle_rng,
        ));
    }
}

#[allow(clippy::too_many_arguments)]
fn random_visit(
    visit_id: EntityId,
    tenant_id: &str,
    agent_id: &str,
    locations: &[EntityId],
    consumer_share: f64,
    completion_p: f64,
    conversion_p: f64,
    rng: &mut SeedRng,
) -> Visit {
    let status = if rng.chance(completion_p) {
        VisitStatus::Completed
    } else if rng.chance(0.5) {
        VisitStatus::Pending
    } else {
        VisitStatus::Cancelled
    };
    let outcome = if rng.chance(consumer_share) {
        VisitOutcome::Consumer {
            converted: status == VisitStatus::Completed && rng.chance(conversion_p),
            voucher_issued: rng.chance(0.3),
        }
    } else {
        VisitOutcome::Shop {
            shelf_share_pct: rng.range_f64(10.0, 80.0),
            in_stock: rng.chance(0.8),
            trained: rng.chance(0.5),
        }
    };
    Visit {
        visit_id,
        agent_id: agent_id.to_string(),
        tenant_id: tenant_id.to_string(),
        location_id: rng.pick(locations).clone(),
        visited_at: base_time()
            + Duration::days(rng.next_u64_below(28) as i64)
            + Duration::hours(rng.next_u64_below(9) as i64),
        status,
        outcome,
    }
}

fn random_goal(
    goal_id: EntityId,
    tenant_id: &str,
    assigned_to: EntityId,
    scope: AssignmentScope,
    rng: &mut SeedRng,
) -> Goal {
    let status = if rng.chance(0.35) {
        GoalStatus::Completed
    } else if rng.chance(0.6) {
        GoalStatus::InProgress
    } else if rng.chance(0.5) {
        GoalStatus::Pending
    } else {
        GoalStatus::Failed
    };
    let progress_pct = match status {
        GoalStatus::Completed => 100.0,
        GoalStatus::Pending => 0.0,
        GoalStatus::InProgress => rng.range_f64(5.0, 95.0),
        GoalStatus::Failed => rng.range_f64(0.0, 70.0),
    };
    Goal {
        goal_id,
        tenant_id: tenant_id.to_string(),
        period: *rng.pick(&[
            GoalPeriod::Daily,
            GoalPeriod::Weekly,
            GoalPeriod::Monthly,
            GoalPeriod::Quarterly,
        ]),
        metric: *rng.pick(&[
            GoalMetric::Visits,
            GoalMetric::Conversions,
            GoalMetric::ShelfShare,
            GoalMetric::ShopsTrained,
        ]),
        target: (rng.next_u64_below(19) + 2) as f64 * 5.0,
        progress_pct,
        status,
        assigned_to,
        scope,
        due_date: Some(
            (base_time() + Duration::days(28 + rng.next_u64_below(60) as i64)).date_naive(),
        ),
    }
}

fn random_cycle(
    cycle_id: EntityId,
    tenant_id: &str,
    scope: AssignmentScope,
    locations: &[EntityId],
    rng: &mut SeedRng,
) -> CallCycle {
    let stop_count = 3 + rng.next_u64_below(4) as usize;
    let stops = (0..stop_count.min(locations.len()))
        .map(|_| rng.pick(locations).clone())
        .collect();
    CallCycle {
        cycle_id,
        tenant_id: tenant_id.to_string(),
        frequency: *rng.pick(&[
            CycleFrequency::Daily,
            CycleFrequency::Weekly,
            CycleFrequency::Monthly,
        ]),
        scope,
        stops,
        adherence_rate_pct: rng.range_f64(40.0, 100.0),
        completed: rng.chance(0.15),
    }
}
