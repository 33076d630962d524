//! Account service.
//!
//! Lookup, creation, deletion and credential verification for accounts.
//! Passwords are hashed with Argon2id; hashing and verification run on the
//! blocking thread pool.

mod error;

pub use error::AccountError;

use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use stackfood_core::{AccountId, Email};

use crate::db::{AccountStore, RepositoryError};
use crate::models::account::{Account, NewAccount};

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Account service.
///
/// Stateless apart from the injected store handle; cheap to clone.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn AccountStore>,
}

impl AccountService {
    /// Create a new account service over a store handle.
    #[must_use]
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    /// Get an account by ID.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Repository` if the store operation fails.
    pub async fn get_by_id(&self, id: AccountId) -> Result<Option<Account>, AccountError> {
        Ok(self.store.get_by_id(id).await?)
    }

    /// Get an account by email.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Repository` if the store operation fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<Account>, AccountError> {
        Ok(self.store.get_by_email(email).await?)
    }

    /// Create an account, storing an Argon2id hash of `password`.
    ///
    /// Does not pre-check the email: uniqueness is left to the store, so a
    /// concurrent registration that wins the race surfaces here as
    /// `EmailTaken`.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::WeakPassword` if the password is too short.
    /// Returns `AccountError::EmailTaken` if the email is already registered.
    /// Returns `AccountError::PasswordHash` if hashing fails.
    pub async fn create(
        &self,
        account: &NewAccount,
        password: &str,
    ) -> Result<Account, AccountError> {
        validate_password(password)?;

        let password = password.to_owned();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|_| AccountError::PasswordHash)??;

        let created = self
            .store
            .create(account, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AccountError::EmailTaken,
                other => AccountError::Repository(other),
            })?;

        tracing::info!(account_id = %created.id, "account created");
        Ok(created)
    }

    /// Delete the account registered under `email`.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::NotFound` if no account has this email.
    pub async fn delete_by_email(&self, email: &Email) -> Result<(), AccountError> {
        self.store.delete_by_email(email).await.map_err(|e| match e {
            RepositoryError::NotFound => AccountError::NotFound,
            other => AccountError::Repository(other),
        })?;

        tracing::info!(email = %email, "account deleted");
        Ok(())
    }

    /// Check an email/password pair.
    ///
    /// Returns the account on a match and `None` otherwise: unknown email,
    /// account without a password, wrong password and unreadable stored hash
    /// all look the same to the caller.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Repository` if the store operation fails.
    pub async fn verify_credentials(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<Option<Account>, AccountError> {
        let Some((account, password_hash)) = self.store.get_password_hash(email).await? else {
            return Ok(None);
        };

        let password = password.to_owned();
        let verified = tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
            .await
            .map_err(|_| AccountError::PasswordHash)?;

        match verified {
            Ok(true) => Ok(Some(account)),
            Ok(false) => Ok(None),
            Err(e) => {
                tracing::warn!(account_id = %account.id, error = %e, "stored password hash is unreadable");
                Ok(None)
            }
        }
    }

    /// Check that the underlying store is reachable.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Repository` if the store cannot be reached.
    pub async fn ping(&self) -> Result<(), AccountError> {
        Ok(self.store.ping().await?)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AccountError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AccountError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id with a random salt.
fn hash_password(password: &str) -> Result<String, AccountError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AccountError::PasswordHash)
}

/// Verify a password against a PHC hash string.
///
/// `Ok(false)` is a mismatch; `Err` means the stored hash could not be parsed.
fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryAccountStore;

    fn service() -> (AccountService, Arc<MemoryAccountStore>) {
        let store = Arc::new(MemoryAccountStore::new());
        (AccountService::new(store.clone()), store)
    }

    fn new_account(email: &str) -> NewAccount {
        NewAccount {
            email: Email::parse(email).unwrap(),
            phone: "+237 6 99 00 11 22".to_owned(),
            first_name: "Jean".to_owned(),
            last_name: "Paul Martin".to_owned(),
        }
    }

    #[test]
    fn test_hash_is_salted_and_not_plaintext() {
        let first = hash_password("motdepasse").unwrap();
        let second = hash_password("motdepasse").unwrap();

        assert_ne!(first, "motdepasse");
        assert_ne!(first, second);
        assert!(first.starts_with("$argon2id$"));
    }

    #[test]
    fn test_verify_password_rejects_malformed_hash() {
        assert!(verify_password("motdepasse", "not-a-phc-string").is_err());
    }

    #[test]
    fn test_validate_password_counts_characters() {
        // 8 characters, 16 bytes
        assert!(validate_password("éééééééé").is_ok());
        assert!(matches!(
            validate_password("short"),
            Err(AccountError::WeakPassword(_))
        ));
    }

    #[tokio::test]
    async fn test_create_then_lookup_matches_input() {
        let (service, _) = service();
        let input = new_account("jean@stackfood.cm");

        let created = service.create(&input, "motdepasse").await.unwrap();
        let found = service.get_by_email(&input.email).await.unwrap().unwrap();

        assert_eq!(found, created);
        assert_eq!(found.phone, input.phone);
        assert_eq!(found.first_name, "Jean");
        assert_eq!(found.last_name, "Paul Martin");
        assert_eq!(service.get_by_id(created.id).await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn test_stored_hash_is_not_plaintext() {
        let (service, store) = service();
        let input = new_account("jean@stackfood.cm");
        service.create(&input, "motdepasse").await.unwrap();

        let (_, hash) = store.get_password_hash(&input.email).await.unwrap().unwrap();
        assert_ne!(hash, "motdepasse");
        assert!(!hash.contains("motdepasse"));
    }

    #[tokio::test]
    async fn test_create_duplicate_email_is_email_taken() {
        let (service, store) = service();
        service
            .create(&new_account("jean@stackfood.cm"), "motdepasse")
            .await
            .unwrap();

        let err = service
            .create(&new_account("JEAN@stackfood.cm"), "autrepasse")
            .await
            .unwrap_err();

        assert!(matches!(err, AccountError::EmailTaken));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_verify_credentials() {
        let (service, _) = service();
        let input = new_account("jean@stackfood.cm");
        let created = service.create(&input, "motdepasse").await.unwrap();

        let ok = service
            .verify_credentials(&input.email, "motdepasse")
            .await
            .unwrap();
        assert_eq!(ok, Some(created));

        let wrong = service
            .verify_credentials(&input.email, "motdepassE")
            .await
            .unwrap();
        assert!(wrong.is_none());
    }

    #[tokio::test]
    async fn test_verify_credentials_unicode_and_boundary_length() {
        let (service, _) = service();

        for (email, password) in [
            ("unicode@stackfood.cm", "mañana🍕 délicieux"),
            ("exact@stackfood.cm", "12345678"),
            ("accents@stackfood.cm", "çàéèùâêî"),
        ] {
            let input = new_account(email);
            service.create(&input, password).await.unwrap();

            assert!(
                service
                    .verify_credentials(&input.email, password)
                    .await
                    .unwrap()
                    .is_some(),
                "password {password:?} should verify"
            );
            assert!(
                service
                    .verify_credentials(&input.email, &format!("{password}x"))
                    .await
                    .unwrap()
                    .is_none()
            );
        }
    }

    #[tokio::test]
    async fn test_verify_credentials_does_not_distinguish_unknown_email() {
        let (service, store) = service();
        let passwordless = new_account("nopass@stackfood.cm");
        store.insert_without_password(&passwordless).await.unwrap();

        let unknown = Email::parse("ghost@stackfood.cm").unwrap();
        assert!(
            service
                .verify_credentials(&unknown, "motdepasse")
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            service
                .verify_credentials(&passwordless.email, "motdepasse")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_delete_by_email() {
        let (service, store) = service();
        let input = new_account("jean@stackfood.cm");
        service.create(&input, "motdepasse").await.unwrap();

        service.delete_by_email(&input.email).await.unwrap();

        assert!(service.get_by_email(&input.email).await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found_and_leaves_store_unchanged() {
        let (service, store) = service();
        service
            .create(&new_account("jean@stackfood.cm"), "motdepasse")
            .await
            .unwrap();

        let ghost = Email::parse("ghost@stackfood.cm").unwrap();
        let err = service.delete_by_email(&ghost).await.unwrap_err();

        assert!(matches!(err, AccountError::NotFound));
        assert_eq!(store.len().await, 1);
    }
}
