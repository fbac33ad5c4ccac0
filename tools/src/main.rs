//! kpi-runner: headless dashboard runner for FieldPulse.
//!
//! Usage:
//!   kpi-runner --seed 12345
//!   kpi-runner --seed 12345 --db org.db --json
//!   kpi-runner --seed 12345 --config engine.json

use anyhow::Result;
use fieldpulse_core::{
    seed::seed_demo_org, Analytics, EngineConfig, MemoryStore, NationalKpi, SqliteStore,
};
use std::env;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let json = args.iter().any(|a| a == "--json");
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str());
    let config = match args.windows(2).find(|w| w[0] == "--config") {
        Some(w) => EngineConfig::load(Path::new(&w[1]))?,
        None => EngineConfig::default(),
    };
    for flag in args.iter().skip(1).filter(|a| a.starts_with("--")) {
        if !matches!(flag.as_str(), "--seed" | "--json" | "--db" | "--config") {
            log::warn!("Unknown flag: {flag}");
        }
    }

    if !json {
        println!("FieldPulse — kpi-runner");
        println!("  seed: {seed}");
        println!("  db:   {}", db.unwrap_or("(in memory)"));
        println!();
    }

    let mut store = MemoryStore::new();
    let tenant_ids = seed_demo_org(&mut store, &config, seed)?;

    // With --db the seeded organization is persisted and the snapshot
    // is read back through the SQLite backend, exercising the same
    // store contract the in-memory path uses.
    let analytics = match db {
        Some(path) => {
            let sqlite = SqliteStore::open(path)?;
            sqlite.migrate()?;
            store.dump_into(&sqlite)?;
            Analytics::from_store(&sqlite, config)?
        }
        None => Analytics::from_store(&store, config)?,
    };

    for tenant_id in &tenant_ids {
        if json {
            let system = analytics
                .system_analytics(tenant_id)
                .ok_or_else(|| anyhow::anyhow!("tenant '{tenant_id}' missing from snapshot"))?;
            println!("{}", serde_json::to_string_pretty(&system)?);
        } else {
            print_dashboard(&analytics, tenant_id)?;
        }
    }
    Ok(())
}

fn print_dashboard(analytics: &Analytics, tenant_id: &str) -> Result<()> {
    let system = analytics
        .system_analytics(tenant_id)
        .ok_or_else(|| anyhow::anyhow!("tenant '{tenant_id}' missing from snapshot"))?;
    let national = &system.national;

    println!("=== {} ({tenant_id}) ===", system.tenant_name);
    println!(
        "  org:            {} regions / {} areas / {} teams / {} agents / {} managers",
        national.region_count,
        national.area_count,
        national.team_count,
        national.agent_count,
        system.manager_count,
    );
    println!("  locations:      {}", system.location_count);
    print_core(national);

    for region in &national.by_region {
        println!(
            "  - {:<18} visits={:<4} conversions={:<3} adherence={:.1}%",
            region.name, region.total_visits, region.conversions, region.average_adherence_rate,
        );
        if let Some(region_kpi) = analytics.region_analytics(&region.id) {
            for area in &region_kpi.by_area {
                println!(
                    "      {:<16} visits={:<4} conversions={:<3} adherence={:.1}%",
                    area.name, area.total_visits, area.conversions, area.average_adherence_rate,
                );
            }
        }
    }
    println!();
    Ok(())
}

fn print_core(national: &NationalKpi) {
    let core = &national.core;
    println!(
        "  visits:         {} total ({} consumer / {} shop), {:.1}% completed",
        core.total_visits, core.consumer_visits, core.shop_visits, core.completion_rate,
    );
    println!(
        "  conversions:    {} ({:.1}% of consumer visits)",
        core.conversions, core.conversion_rate,
    );
    println!(
        "  shelf share:    {:.1}% avg, {} shops trained",
        core.average_shelf_share, core.shops_trained,
    );
    println!(
        "  goals:          {}/{} completed ({:.1}%)",
        core.goals_completed, core.goals_assigned, core.goal_completion_rate,
    );
    println!(
        "  call cycles:    {} assigned, {} active, {:.1}% avg adherence",
        core.call_cycles_assigned, core.call_cycles_active, core.average_adherence_rate,
    );
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
