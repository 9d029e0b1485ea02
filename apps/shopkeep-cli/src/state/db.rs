//! # Database State
//!
//! Wraps the `Database` handle shared by every command. The pool inside is
//! thread-safe, so commands query concurrently without extra locking.

use shopkeep_db::{Database, DbConfig};

use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct DbState {
    db: Database,
}

impl DbState {
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    /// Fresh migrated in-memory database, for tests.
    pub async fn in_memory() -> Result<Self, ApiError> {
        Ok(DbState::new(Database::new(DbConfig::in_memory()).await?))
    }

    pub fn inner(&self) -> &Database {
        &self.db
    }
}
