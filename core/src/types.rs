//! Shared primitive types used across the entire engine.

/// A stable, unique identifier for any entity in the organization.
pub type EntityId = String;

/// Identifier of the tenant that owns an entity. Every non-tenant
/// entity carries one; no aggregation may cross tenants.
pub type TenantId = String;
