//! In-process account store.
//!
//! Behaves like the `PostgreSQL` store (unique emails, store-assigned IDs and
//! timestamps, default role) without a database. Used by the test suites.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use stackfood_core::{AccountId, AccountRole, Email};

use super::{AccountStore, RepositoryError};
use crate::models::account::{Account, NewAccount};

#[derive(Default)]
struct Inner {
    last_id: i32,
    accounts: BTreeMap<Email, StoredAccount>,
}

struct StoredAccount {
    account: Account,
    password_hash: Option<String>,
}

/// Account store held entirely in memory.
#[derive(Default)]
pub struct MemoryAccountStore {
    inner: Mutex<Inner>,
}

impl MemoryAccountStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an account that has no password (e.g. imported from elsewhere).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    pub async fn insert_without_password(
        &self,
        account: &NewAccount,
    ) -> Result<Account, RepositoryError> {
        self.insert(account, None).await
    }

    /// Number of accounts currently stored.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.accounts.len()
    }

    /// Whether the store holds no accounts.
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.accounts.is_empty()
    }

    async fn insert(
        &self,
        new: &NewAccount,
        password_hash: Option<String>,
    ) -> Result<Account, RepositoryError> {
        let mut inner = self.inner.lock().await;

        if inner.accounts.contains_key(&new.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        inner.last_id += 1;
        let now = Utc::now();
        let account = Account {
            id: AccountId::new(inner.last_id),
            email: new.email.clone(),
            phone: new.phone.clone(),
            first_name: new.first_name.clone(),
            last_name: new.last_name.clone(),
            role: AccountRole::default(),
            created_at: now,
            updated_at: now,
        };

        inner.accounts.insert(
            new.email.clone(),
            StoredAccount {
                account: account.clone(),
                password_hash,
            },
        );

        Ok(account)
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn get_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .accounts
            .values()
            .find(|stored| stored.account.id == id)
            .map(|stored| stored.account.clone()))
    }

    async fn get_by_email(&self, email: &Email) -> Result<Option<Account>, RepositoryError> {
        let inner = self.inner.lock().await;
        Ok(inner.accounts.get(email).map(|stored| stored.account.clone()))
    }

    async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(Account, String)>, RepositoryError> {
        let inner = self.inner.lock().await;
        Ok(inner.accounts.get(email).and_then(|stored| {
            stored
                .password_hash
                .clone()
                .map(|hash| (stored.account.clone(), hash))
        }))
    }

    async fn create(
        &self,
        account: &NewAccount,
        password_hash: &str,
    ) -> Result<Account, RepositoryError> {
        self.insert(account, Some(password_hash.to_owned())).await
    }

    async fn delete_by_email(&self, email: &Email) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().await;
        inner
            .accounts
            .remove(email)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
