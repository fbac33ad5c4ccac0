//! FieldPulse core — multi-tenant field-sales KPI aggregation.
//!
//! Agents capture consumer and shop visits; goals and call cycles are
//! pinned to hierarchy nodes; dashboards read per-tier KPI records
//! rolled up from the raw ledgers. The roll-up is a pure fold over an
//! immutable snapshot: same snapshot in, bit-identical KPIs out.

pub mod aggregator;
pub mod config;
pub mod error;
pub mod graph;
pub mod ledger;
pub mod org;
pub mod query;
pub mod rng;
pub mod seed;
pub mod store;
pub mod types;

pub use aggregator::{AgentKpi, Aggregator, AreaKpi, KpiCore, NationalKpi, RegionKpi, SystemKpi, TeamKpi};
pub use config::{EngineConfig, IntegrityMode, SeedConfig};
pub use error::{EngineError, EngineResult};
pub use graph::OrgGraph;
pub use org::{OrgUnit, Role};
pub use query::Analytics;
pub use store::{MemoryStore, OrgSnapshot, OrgStore, SqliteStore};
