//! Organizational entities and roles.
//!
//! The hierarchy is Tenant → Region → Area → Team → Agent. Every
//! non-tenant entity carries the tenant_id of its root; the graph
//! layer rejects any foreign key that crosses tenants.
//!
//! RULE: roles are a closed enum with one capability table
//! (`Role::scope_kind`) consumed by both membership computation and
//! authorization checks. No string-typed role dispatch anywhere else.

use crate::types::{EntityId, TenantId};
use serde::{Deserialize, Serialize};

// ── Hierarchy nodes ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub tenant_id: TenantId,
    pub name: String,
    pub logo_ref: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    pub region_id: EntityId,
    pub tenant_id: TenantId,
    pub manager_id: EntityId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Area {
    pub area_id: EntityId,
    pub region_id: EntityId,
    pub tenant_id: TenantId,
    pub manager_id: EntityId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub team_id: EntityId,
    pub area_id: EntityId,
    pub tenant_id: TenantId,
    pub leader_id: EntityId,
    pub name: String,
}

/// Leaf user of the hierarchy. Agents capture visits; everyone above
/// them only reads aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub agent_id: EntityId,
    pub team_id: EntityId,
    pub tenant_id: TenantId,
    pub name: String,
}

// ── Roles ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Agent,
    TeamLeader,
    AreaManager,
    RegionalManager,
    NationalManager,
    TenantAdmin,
}

/// Which hierarchy node a role's holder owns a foreign key to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    /// Own visits only (agents).
    OwnRecords,
    Team,
    Area,
    Region,
    /// Whole tenant (national managers and tenant admins carry no
    /// further foreign key).
    Tenant,
}

impl Role {
    /// The capability table: one source of truth for which tier each
    /// role manages, used by membership computation and any
    /// authorization check.
    pub fn scope_kind(self) -> ScopeKind {
        match self {
            Role::Agent => ScopeKind::OwnRecords,
            Role::TeamLeader => ScopeKind::Team,
            Role::AreaManager => ScopeKind::Area,
            Role::RegionalManager => ScopeKind::Region,
            Role::NationalManager | Role::TenantAdmin => ScopeKind::Tenant,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Agent => "agent",
            Role::TeamLeader => "team_leader",
            Role::AreaManager => "area_manager",
            Role::RegionalManager => "regional_manager",
            Role::NationalManager => "national_manager",
            Role::TenantAdmin => "tenant_admin",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "agent" => Some(Role::Agent),
            "team_leader" => Some(Role::TeamLeader),
            "area_manager" => Some(Role::AreaManager),
            "regional_manager" => Some(Role::RegionalManager),
            "national_manager" => Some(Role::NationalManager),
            "tenant_admin" => Some(Role::TenantAdmin),
            _ => None,
        }
    }
}

/// Non-agent user. Carries exactly the hierarchy foreign key its role
/// demands; `scope_matches_role` checks that shape and the graph build
/// rejects violations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manager {
    pub manager_id: EntityId,
    pub tenant_id: TenantId,
    pub role: Role,
    pub team_id: Option<EntityId>,
    pub area_id: Option<EntityId>,
    pub region_id: Option<EntityId>,
    pub name: String,
}

impl Manager {
    /// True when the FK shape matches the role's capability table entry.
    pub fn scope_matches_role(&self) -> bool {
        let (team, area, region) = (
            self.team_id.is_some(),
            self.area_id.is_some(),
            self.region_id.is_some(),
        );
        match self.role.scope_kind() {
            ScopeKind::Team => team && !area && !region,
            ScopeKind::Area => !team && area && !region,
            ScopeKind::Region => !team && !area && region,
            ScopeKind::Tenant => !team && !area && !region,
            // Agents are modelled by the Agent struct, never by Manager.
            ScopeKind::OwnRecords => false,
        }
    }
}

// ── Hierarchy addressing ─────────────────────────────────────────────────────

/// One node of the hierarchy, addressed by tier + id. Used to ask the
/// graph for membership sets and to scope goals and call cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "tier", content = "id")]
pub enum OrgUnit {
    Agent(EntityId),
    Team(EntityId),
    Area(EntityId),
    Region(EntityId),
    Tenant(TenantId),
}

impl OrgUnit {
    pub fn tier_name(&self) -> &'static str {
        match self {
            OrgUnit::Agent(_) => "agent",
            OrgUnit::Team(_) => "team",
            OrgUnit::Area(_) => "area",
            OrgUnit::Region(_) => "region",
            OrgUnit::Tenant(_) => "tenant",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            OrgUnit::Agent(id)
            | OrgUnit::Team(id)
            | OrgUnit::Area(id)
            | OrgUnit::Region(id)
            | OrgUnit::Tenant(id) => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_table_covers_every_role() {
        assert_eq!(Role::Agent.scope_kind(), ScopeKind::OwnRecords);
        assert_eq!(Role::TeamLeader.scope_kind(), ScopeKind::Team);
        assert_eq!(Role::AreaManager.scope_kind(), ScopeKind::Area);
        assert_eq!(Role::RegionalManager.scope_kind(), ScopeKind::Region);
        assert_eq!(Role::NationalManager.scope_kind(), ScopeKind::Tenant);
        assert_eq!(Role::TenantAdmin.scope_kind(), ScopeKind::Tenant);
    }

    #[test]
    fn role_labels_round_trip() {
        for role in [
            Role::Agent,
            Role::TeamLeader,
            Role::AreaManager,
            Role::RegionalManager,
            Role::NationalManager,
            Role::TenantAdmin,
        ] {
            assert_eq!(Role::parse(role.label()), Some(role));
        }
        assert_eq!(Role::parse("superuser"), None);
    }

    #[test]
    fn manager_scope_shape_is_enforced() {
        let mut m = Manager {
            manager_id: "m1".into(),
            tenant_id: "t1".into(),
            role: Role::TeamLeader,
            team_id: Some("tm1".into()),
            area_id: None,
            region_id: None,
            name: "Lee".into(),
        };
        assert!(m.scope_matches_role());

        m.area_id = Some("a1".into());
        assert!(!m.scope_matches_role(), "two scope FKs must be rejected");

        m.role = Role::NationalManager;
        m.team_id = None;
        m.area_id = None;
        assert!(m.scope_matches_role(), "national managers carry no scope FK");
    }
}
