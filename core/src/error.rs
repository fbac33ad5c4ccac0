use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("{child_kind} '{child_id}' references unknown {parent_kind} '{parent_id}'")]
    UnknownParent {
        child_kind: &'static str,
        child_id: String,
        parent_kind: &'static str,
        parent_id: String,
    },

    #[error(
        "{child_kind} '{child_id}' in tenant '{child_tenant}' references \
         {parent_kind} '{parent_id}' owned by tenant '{parent_tenant}'"
    )]
    CrossTenant {
        child_kind: &'static str,
        child_id: String,
        child_tenant: String,
        parent_kind: &'static str,
        parent_id: String,
        parent_tenant: String,
    },

    #[error("Data integrity violation: {0}")]
    DataIntegrity(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
