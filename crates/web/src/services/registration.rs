//! Registration flow.
//!
//! Turns an untrusted form submission into an account:
//!
//! 1. [`RegisterForm::validate`] checks every field and either yields a typed
//!    [`Registration`] or a [`FieldErrors`] set. The store is not touched.
//! 2. The email is checked for an existing account.
//! 3. The display name is split into first and last name.
//! 4. The account is created. A uniqueness conflict from the store (a
//!    concurrent registration) is reported exactly like step 2.

use std::collections::BTreeMap;
use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stackfood_core::Email;

use super::accounts::{AccountError, AccountService, MIN_PASSWORD_LENGTH};
use crate::models::account::{Account, NewAccount};

/// Minimum display-name length, in characters.
pub const MIN_NAME_LENGTH: usize = 2;

/// Minimum phone-number length, in characters.
pub const MIN_PHONE_LENGTH: usize = 10;

/// Value the terms checkbox posts when ticked.
const TERMS_ACCEPTED: &str = "on";

pub const NAME_TOO_SHORT: &str = "Le nom doit contenir au moins 2 caractères";
pub const EMAIL_INVALID: &str = "Veuillez entrer une adresse email valide";
pub const PHONE_INVALID: &str = "Veuillez entrer un numéro de téléphone valide";
pub const PASSWORD_TOO_SHORT: &str = "Le mot de passe doit contenir au moins 8 caractères";
pub const PASSWORDS_DIFFER: &str = "Les mots de passe ne correspondent pas";
pub const TERMS_REQUIRED: &str = "Vous devez accepter les conditions d'utilisation";
pub const EMAIL_TAKEN: &str = "Cette adresse email est déjà utilisée";

// =============================================================================
// Form Types
// =============================================================================

/// Raw registration form as posted by the browser.
///
/// Every field is optional on the wire; missing fields deserialize as empty
/// and are caught by validation.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: String,
    pub terms: Option<String>,
}

impl fmt::Debug for RegisterForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterForm")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("password", &"[REDACTED]")
            .field("confirm_password", &"[REDACTED]")
            .field("terms", &self.terms)
            .finish()
    }
}

/// A registration that passed validation.
#[derive(Debug)]
pub struct Registration {
    /// Display name, trimmed.
    pub name: String,
    pub email: Email,
    /// Phone number, trimmed.
    pub phone: String,
    pub password: SecretString,
}

/// Form fields that can carry validation messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Name,
    Email,
    Phone,
    Password,
    ConfirmPassword,
    Terms,
}

impl Field {
    /// Form field name as posted by the browser.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Password => "password",
            Self::ConfirmPassword => "confirmPassword",
            Self::Terms => "terms",
        }
    }

    /// Look a field up by its form name.
    #[must_use]
    pub fn from_form_name(name: &str) -> Option<Self> {
        [
            Self::Name,
            Self::Email,
            Self::Phone,
            Self::Password,
            Self::ConfirmPassword,
            Self::Terms,
        ]
        .into_iter()
        .find(|field| field.as_str() == name)
    }
}

/// Validation messages keyed by field.
///
/// Serializes as `{"email": ["..."], "confirmPassword": ["..."]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, Vec<String>>);

impl FieldErrors {
    /// An error set with a single message.
    #[must_use]
    pub fn single(field: Field, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    /// Record a message against a field.
    pub fn add(&mut self, field: Field, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    /// Whether no messages were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded against a field.
    #[must_use]
    pub fn get(&self, field: Field) -> &[String] {
        self.0.get(&field).map_or(&[], Vec::as_slice)
    }

    /// Whether a field has any messages.
    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    /// Whether the field with this form name has any messages.
    #[must_use]
    pub fn has(&self, form_name: &str) -> bool {
        Field::from_form_name(form_name).is_some_and(|field| self.contains(field))
    }

    /// Messages for the field with this form name, joined for display.
    ///
    /// Used by templates: `{% if let Some(msg) = errors.message("email") %}`.
    #[must_use]
    pub fn message(&self, form_name: &str) -> Option<String> {
        let field = Field::from_form_name(form_name)?;
        self.0.get(&field).map(|messages| messages.join(", "))
    }
}

/// Why a registration did not produce an account.
#[derive(Debug, Error)]
pub enum RegisterError {
    /// The submission was rejected; messages are per field.
    #[error("invalid registration")]
    Invalid(FieldErrors),

    /// The account service failed.
    #[error(transparent)]
    Account(#[from] AccountError),
}

// =============================================================================
// Validation
// =============================================================================

impl RegisterForm {
    /// Validate the submission, collecting every failing rule.
    ///
    /// Lengths are counted in characters, so accented names and non-ASCII
    /// passwords are measured the way users type them.
    ///
    /// # Errors
    ///
    /// Returns the complete set of per-field messages if any rule fails.
    pub fn validate(self) -> Result<Registration, FieldErrors> {
        let mut errors = FieldErrors::default();

        let name = self.name.trim();
        if name.chars().count() < MIN_NAME_LENGTH {
            errors.add(Field::Name, NAME_TOO_SHORT);
        }

        let email = Email::parse(&self.email)
            .map_err(|_| errors.add(Field::Email, EMAIL_INVALID))
            .ok();

        let phone = self.phone.trim();
        if phone.chars().count() < MIN_PHONE_LENGTH {
            errors.add(Field::Phone, PHONE_INVALID);
        }

        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.add(Field::Password, PASSWORD_TOO_SHORT);
        }

        if self.password != self.confirm_password {
            errors.add(Field::ConfirmPassword, PASSWORDS_DIFFER);
        }

        if self.terms.as_deref() != Some(TERMS_ACCEPTED) {
            errors.add(Field::Terms, TERMS_REQUIRED);
        }

        match email {
            Some(email) if errors.is_empty() => Ok(Registration {
                name: name.to_owned(),
                email,
                phone: phone.to_owned(),
                password: SecretString::from(self.password),
            }),
            _ => Err(errors),
        }
    }
}

/// Split a display name into first name and last name.
///
/// The first whitespace-separated token is the first name; the remaining
/// tokens, joined by single spaces, are the last name (empty if none).
#[must_use]
pub fn split_name(name: &str) -> (String, String) {
    let mut tokens = name.split_whitespace();
    let first_name = tokens.next().unwrap_or_default().to_owned();
    let last_name = tokens.collect::<Vec<_>>().join(" ");
    (first_name, last_name)
}

// =============================================================================
// Flow
// =============================================================================

/// Run the registration flow for one submission.
///
/// # Errors
///
/// Returns `RegisterError::Invalid` for validation failures and for an email
/// that is already registered (whether caught by the pre-check or by the
/// store's uniqueness constraint).
/// Returns `RegisterError::Account` if the account service fails otherwise.
pub async fn register(
    accounts: &AccountService,
    form: RegisterForm,
) -> Result<Account, RegisterError> {
    let registration = form.validate().map_err(RegisterError::Invalid)?;

    if accounts.get_by_email(&registration.email).await?.is_some() {
        tracing::debug!("registration rejected: email already in use");
        return Err(email_taken());
    }

    let (first_name, last_name) = split_name(&registration.name);
    let new_account = NewAccount {
        email: registration.email,
        phone: registration.phone,
        first_name,
        last_name,
    };

    match accounts
        .create(&new_account, registration.password.expose_secret())
        .await
    {
        Ok(account) => Ok(account),
        Err(AccountError::EmailTaken) => {
            tracing::info!("registration lost a race on a duplicate email");
            Err(email_taken())
        }
        Err(e) => Err(e.into()),
    }
}

fn email_taken() -> RegisterError {
    RegisterError::Invalid(FieldErrors::single(Field::Email, EMAIL_TAKEN))
}
