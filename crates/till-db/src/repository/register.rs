//! # Register Repository
//!
//! Database operations for registers (cash-handling points).
//!
//! Registers are configuration data: created once per counter, deactivated
//! rather than deleted so historical sessions keep a valid back-reference.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use till_core::validation::validate_actor;
use till_core::{CoreError, Register};

/// Repository for register configuration.
#[derive(Debug, Clone)]
pub struct RegisterRepository {
    pool: SqlitePool,
}

impl RegisterRepository {
    /// Creates a new RegisterRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RegisterRepository { pool }
    }

    /// Creates a register within a branch.
    pub async fn create(
        &self,
        tenant_id: &str,
        branch_id: &str,
        name: &str,
    ) -> DbResult<Register> {
        // Same presence rule as actor ids: non-empty after trimming.
        validate_actor("name", name).map_err(CoreError::from)?;

        let register = Register {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            branch_id: branch_id.to_string(),
            name: name.trim().to_string(),
            is_active: true,
            created_at: Utc::now(),
        };

        debug!(id = %register.id, branch_id = %branch_id, name = %register.name, "Creating register");

        sqlx::query(
            r#"
            INSERT INTO registers (id, tenant_id, branch_id, name, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&register.id)
        .bind(&register.tenant_id)
        .bind(&register.branch_id)
        .bind(&register.name)
        .bind(register.is_active)
        .bind(register.created_at)
        .execute(&self.pool)
        .await?;

        Ok(register)
    }

    /// Gets a register by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Register>> {
        let register = sqlx::query_as::<_, Register>(
            r#"
            SELECT id, tenant_id, branch_id, name, is_active, created_at
            FROM registers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(register)
    }

    /// Lists registers in a branch, active first, then by name.
    pub async fn list_by_branch(&self, branch_id: &str) -> DbResult<Vec<Register>> {
        let registers = sqlx::query_as::<_, Register>(
            r#"
            SELECT id, tenant_id, branch_id, name, is_active, created_at
            FROM registers
            WHERE branch_id = ?1
            ORDER BY is_active DESC, name
            "#,
        )
        .bind(branch_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(registers)
    }

    /// Deactivates a register (soft delete).
    ///
    /// Open sessions are unaffected; the flag only blocks new opens.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE registers SET is_active = 0 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::RegisterNotFound(id.to_string()).into());
        }

        Ok(())
    }
}
