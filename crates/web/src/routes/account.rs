//! Account route handlers.
//!
//! These routes require authentication.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use stackfood_core::AccountRole;

use crate::error::AppError;
use crate::filters;
use crate::middleware::{RequireAuth, clear_current_account};
use crate::models::Account;
use crate::state::AppState;

/// Account display data for templates.
pub struct AccountView {
    pub display_name: String,
    pub first_name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub member_since: String,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            display_name: account.display_name(),
            first_name: account.first_name.clone(),
            email: account.email.to_string(),
            phone: account.phone.clone(),
            role: role_label(account.role).to_owned(),
            member_since: account.created_at.format("%d/%m/%Y").to_string(),
        }
    }
}

const fn role_label(role: AccountRole) -> &'static str {
    match role {
        AccountRole::Customer => "Client",
        AccountRole::RestaurantOwner => "Restaurateur",
        AccountRole::Admin => "Administrateur",
    }
}

/// Account overview page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountIndexTemplate {
    pub account: AccountView,
}

/// Display account overview page.
///
/// The session only holds a snapshot, so the account is re-read from the
/// store. If it has been deleted since sign-in, the session is ended.
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
) -> Result<Response, AppError> {
    let Some(account) = state.accounts().get_by_id(current.id).await? else {
        tracing::info!(account_id = %current.id, "session refers to a deleted account");
        clear_current_account(&session).await?;
        return Ok(Redirect::to("/auth/login").into_response());
    };

    Ok(AccountIndexTemplate {
        account: AccountView::from(&account),
    }
    .into_response())
}
