//! `PostgreSQL` account store.
//!
//! Queries are checked at runtime (`query_as`) so the crate builds without a
//! live database. Row types decode straight into the core newtypes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use stackfood_core::{AccountId, AccountRole, Email};

use super::{AccountStore, RepositoryError};
use crate::models::account::{Account, NewAccount};

/// Columns selected for every account read. Never includes the password hash.
const ACCOUNT_COLUMNS: &str =
    "id, email, phone, first_name, last_name, role, created_at, updated_at";

/// An account row as stored in `stackfood.account`.
#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: AccountId,
    email: Email,
    phone: String,
    first_name: String,
    last_name: String,
    role: AccountRole,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            phone: row.phone,
            first_name: row.first_name,
            last_name: row.last_name,
            role: row.role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// An account row joined with its (nullable) password hash.
#[derive(sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    account: AccountRow,
    password_hash: Option<String>,
}

/// Account store backed by a `PostgreSQL` pool.
#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    /// Create a new store over an open pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn get_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM stackfood.account WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Account::from))
    }

    async fn get_by_email(&self, email: &Email) -> Result<Option<Account>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM stackfood.account WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Account::from))
    }

    async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(Account, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS}, password_hash FROM stackfood.account WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let Some(password_hash) = row.password_hash else {
            return Ok(None);
        };

        Ok(Some((row.account.into(), password_hash)))
    }

    async fn create(
        &self,
        account: &NewAccount,
        password_hash: &str,
    ) -> Result<Account, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            r"
            INSERT INTO stackfood.account (email, phone, first_name, last_name, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ACCOUNT_COLUMNS}
            "
        ))
        .bind(&account.email)
        .bind(&account.phone)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(row.into())
    }

    async fn delete_by_email(&self, email: &Email) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM stackfood.account WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
