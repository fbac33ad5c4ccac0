//! Ledger records: visits, goals, call cycles, locations.
//!
//! Ledger rows are flat, append-style records tagged with agent and
//! tenant foreign keys. The aggregator consumes them read-only; rows
//! whose foreign keys resolve to nothing are excluded from every
//! aggregate (lenient mode) rather than failing the fold.

use crate::org::OrgUnit;
use crate::types::{EntityId, TenantId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Call cycles at or above this adherence percentage are active.
/// Adherence 70 is active; 69 is pending.
pub const ADHERENCE_ACTIVE_THRESHOLD: f64 = 70.0;

// ── Locations ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    Shop,
    ConsumerArea,
    Market,
    Mall,
}

impl LocationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LocationKind::Shop => "shop",
            LocationKind::ConsumerArea => "consumer_area",
            LocationKind::Market => "market",
            LocationKind::Mall => "mall",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "shop" => Some(LocationKind::Shop),
            "consumer_area" => Some(LocationKind::ConsumerArea),
            "market" => Some(LocationKind::Market),
            "mall" => Some(LocationKind::Mall),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub location_id: EntityId,
    pub tenant_id: TenantId,
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub kind: LocationKind,
}

// ── Visits ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitStatus {
    Pending,
    Completed,
    Cancelled,
}

impl VisitStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            VisitStatus::Pending => "pending",
            VisitStatus::Completed => "completed",
            VisitStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(VisitStatus::Pending),
            "completed" => Some(VisitStatus::Completed),
            "cancelled" => Some(VisitStatus::Cancelled),
            _ => None,
        }
    }
}

/// Type-specific outcome payload captured by the agent's survey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum VisitOutcome {
    Consumer {
        converted: bool,
        voucher_issued: bool,
    },
    Shop {
        shelf_share_pct: f64,
        in_stock: bool,
        trained: bool,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visit {
    pub visit_id: EntityId,
    pub agent_id: EntityId,
    pub tenant_id: TenantId,
    pub location_id: EntityId,
    pub visited_at: DateTime<Utc>,
    pub status: VisitStatus,
    pub outcome: VisitOutcome,
}

impl Visit {
    pub fn is_consumer(&self) -> bool {
        matches!(self.outcome, VisitOutcome::Consumer { .. })
    }

    pub fn is_shop(&self) -> bool {
        matches!(self.outcome, VisitOutcome::Shop { .. })
    }

    pub fn is_completed(&self) -> bool {
        self.status == VisitStatus::Completed
    }

    /// True only for consumer visits that converted.
    pub fn converted(&self) -> bool {
        matches!(self.outcome, VisitOutcome::Consumer { converted: true, .. })
    }

    pub fn shelf_share(&self) -> Option<f64> {
        match self.outcome {
            VisitOutcome::Shop { shelf_share_pct, .. } => Some(shelf_share_pct),
            VisitOutcome::Consumer { .. } => None,
        }
    }

    /// True for shop visits where staff training was delivered.
    pub fn shop_trained(&self) -> bool {
        matches!(self.outcome, VisitOutcome::Shop { trained: true, .. })
    }
}

// ── Assignment scoping ───────────────────────────────────────────────────────

/// Who a goal or call cycle is pinned to: exactly one of an agent or a
/// hierarchy node. The enum shape makes the "exactly one FK" invariant
/// unrepresentable to violate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "level", content = "id")]
pub enum AssignmentScope {
    Agent(EntityId),
    Team(EntityId),
    Area(EntityId),
    Region(EntityId),
}

impl AssignmentScope {
    pub fn as_unit(&self) -> OrgUnit {
        match self {
            AssignmentScope::Agent(id) => OrgUnit::Agent(id.clone()),
            AssignmentScope::Team(id) => OrgUnit::Team(id.clone()),
            AssignmentScope::Area(id) => OrgUnit::Area(id.clone()),
            AssignmentScope::Region(id) => OrgUnit::Region(id.clone()),
        }
    }

    pub fn level(&self) -> &'static str {
        match self {
            AssignmentScope::Agent(_) => "agent",
            AssignmentScope::Team(_) => "team",
            AssignmentScope::Area(_) => "area",
            AssignmentScope::Region(_) => "region",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            AssignmentScope::Agent(id)
            | AssignmentScope::Team(id)
            | AssignmentScope::Area(id)
            | AssignmentScope::Region(id) => id,
        }
    }

    pub fn from_parts(level: &str, id: &str) -> Option<Self> {
        match level {
            "agent" => Some(AssignmentScope::Agent(id.to_string())),
            "team" => Some(AssignmentScope::Team(id.to_string())),
            "area" => Some(AssignmentScope::Area(id.to_string())),
            "region" => Some(AssignmentScope::Region(id.to_string())),
            _ => None,
        }
    }
}

// ── Goals ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalPeriod {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
}

impl GoalPeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            GoalPeriod::Daily => "daily",
            GoalPeriod::Weekly => "weekly",
            GoalPeriod::Monthly => "monthly",
            GoalPeriod::Quarterly => "quarterly",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "daily" => Some(GoalPeriod::Daily),
            "weekly" => Some(GoalPeriod::Weekly),
            "monthly" => Some(GoalPeriod::Monthly),
            "quarterly" => Some(GoalPeriod::Quarterly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalMetric {
    Visits,
    Conversions,
    ShelfShare,
    ShopsTrained,
}

impl GoalMetric {
    pub fn as_str(self) -> &'static str {
        match self {
            GoalMetric::Visits => "visits",
            GoalMetric::Conversions => "conversions",
            GoalMetric::ShelfShare => "shelf_share",
            GoalMetric::ShopsTrained => "shops_trained",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "visits" => Some(GoalMetric::Visits),
            "conversions" => Some(GoalMetric::Conversions),
            "shelf_share" => Some(GoalMetric::ShelfShare),
            "shops_trained" => Some(GoalMetric::ShopsTrained),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl GoalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            GoalStatus::Pending => "pending",
            GoalStatus::InProgress => "in_progress",
            GoalStatus::Completed => "completed",
            GoalStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(GoalStatus::Pending),
            "in_progress" => Some(GoalStatus::InProgress),
            "completed" => Some(GoalStatus::Completed),
            "failed" => Some(GoalStatus::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub goal_id: EntityId,
    pub tenant_id: TenantId,
    pub period: GoalPeriod,
    pub metric: GoalMetric,
    pub target: f64,
    /// Progress toward target, clamped to 0..=100 by the stores.
    pub progress_pct: f64,
    pub status: GoalStatus,
    /// The user accountable for the goal (an agent for Agent scope, a
    /// leader or manager for node scopes).
    pub assigned_to: EntityId,
    pub scope: AssignmentScope,
    pub due_date: Option<NaiveDate>,
}

impl Goal {
    pub fn is_completed(&self) -> bool {
        self.status == GoalStatus::Completed
    }
}

// ── Call cycles ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleFrequency {
    Daily,
    Weekly,
    Monthly,
}

impl CycleFrequency {
    pub fn as_str(self) -> &'static str {
        match self {
            CycleFrequency::Daily => "daily",
            CycleFrequency::Weekly => "weekly",
            CycleFrequency::Monthly => "monthly",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "daily" => Some(CycleFrequency::Daily),
            "weekly" => Some(CycleFrequency::Weekly),
            "monthly" => Some(CycleFrequency::Monthly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    Pending,
    Active,
    Completed,
}

/// A recurring schedule of locations an assignee must cover.
///
/// Status is never stored: it is recomputed from the adherence rate
/// (and the completed flag) on every read, so a later adherence update
/// can never drift away from a stale stored status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallCycle {
    pub cycle_id: EntityId,
    pub tenant_id: TenantId,
    pub frequency: CycleFrequency,
    pub scope: AssignmentScope,
    /// Ordered route of location ids.
    pub stops: Vec<EntityId>,
    /// Actual-vs-planned coverage, 0..=100, maintained externally.
    pub adherence_rate_pct: f64,
    /// Set once the cycle's period has fully elapsed.
    pub completed: bool,
}

impl CallCycle {
    pub fn status(&self) -> CycleStatus {
        self.status_with(ADHERENCE_ACTIVE_THRESHOLD)
    }

    pub fn status_with(&self, active_threshold: f64) -> CycleStatus {
        if self.completed {
            CycleStatus::Completed
        } else if self.adherence_rate_pct < active_threshold {
            CycleStatus::Pending
        } else {
            CycleStatus::Active
        }
    }
}
