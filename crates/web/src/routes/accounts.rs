//! Account route handlers: registration, login, logout and the profile page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;
use url::Url;

use super::{found, paths};
use crate::db::ProfileRepository;
use crate::error::AppError;
use crate::forms::auth::{login_failed, registration_errors};
use crate::forms::{FormErrors, LoginForm, RegisterForm};
use crate::middleware::{Operation, RequestContext};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for the login page.
#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "accounts/login.html")]
pub struct LoginTemplate {
    pub username: String,
    pub next: String,
    pub errors: FormErrors,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "accounts/register.html")]
pub struct RegisterTemplate {
    pub username: String,
    pub errors: FormErrors,
}

/// Current user display data.
pub struct UserView {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub date_joined: String,
    pub bio: String,
}

/// About-me page template.
#[derive(Template, WebTemplate)]
#[template(path = "accounts/about_me.html")]
pub struct AboutMeTemplate {
    pub user: Option<UserView>,
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(ctx: RequestContext) -> Result<impl IntoResponse, AppError> {
    ctx.authorize(Operation::Register)?;

    Ok(RegisterTemplate {
        username: String::new(),
        errors: FormErrors::new(),
    })
}

/// Create the account and profile, then log the new user in.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    mut ctx: RequestContext,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    ctx.authorize(Operation::Register)?;

    if let Err(errors) = form.validate() {
        return Ok(RegisterTemplate {
            username: form.username,
            errors,
        }
        .into_response());
    }

    let auth = AuthService::new(state.pool());
    if let Err(e) = auth
        .register(&form.username, &form.password1, &form.password2)
        .await
    {
        return match registration_errors(&e) {
            Some(errors) => Ok(RegisterTemplate {
                username: form.username,
                errors,
            }
            .into_response()),
            None => Err(e.into()),
        };
    }

    let user = auth.authenticate(&form.username, &form.password1).await?;
    ctx.login(state.pool(), user).await?;

    Ok(found(paths::ABOUT_ME))
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    ctx: RequestContext,
    Query(query): Query<NextQuery>,
) -> Result<impl IntoResponse, AppError> {
    ctx.authorize(Operation::Login)?;

    Ok(LoginTemplate {
        username: String::new(),
        next: query.next.unwrap_or_default(),
        errors: FormErrors::new(),
    })
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    mut ctx: RequestContext,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    ctx.authorize(Operation::Login)?;

    if let Err(errors) = form.validate() {
        return Ok(LoginTemplate {
            username: form.username,
            next: form.next,
            errors,
        }
        .into_response());
    }

    match AuthService::new(state.pool())
        .authenticate(&form.username, &form.password)
        .await
    {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "user logged in");
            ctx.login(state.pool(), user).await?;
            let target = safe_next(&form.next, &state.config().base_url);
            Ok(found(target.unwrap_or(paths::ABOUT_ME)))
        }
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!("login failed");
            Ok(LoginTemplate {
                username: form.username,
                next: form.next,
                errors: login_failed(),
            }
            .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Flush the session and return to the login page.
#[instrument(skip_all)]
pub async fn logout(mut ctx: RequestContext) -> Result<Response, AppError> {
    ctx.authorize(Operation::Logout)?;

    if let Some(user) = ctx.user() {
        tracing::info!(user_id = %user.id, "user logged out");
    }
    ctx.logout().await?;

    Ok(found(paths::LOGIN))
}

// =============================================================================
// Profile Routes
// =============================================================================

/// Show the current user, or an anonymous notice.
pub async fn about_me(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, AppError> {
    ctx.authorize(Operation::AboutMe)?;

    let user = match ctx.user() {
        Some(user) => {
            let bio = ProfileRepository::new(state.pool())
                .get_by_user(user.id)
                .await?
                .map(|p| p.bio)
                .unwrap_or_default();
            Some(UserView {
                username: user.username.to_string(),
                full_name: format!("{} {}", user.first_name, user.last_name)
                    .trim()
                    .to_string(),
                email: user.email.clone(),
                is_staff: user.is_staff,
                is_superuser: user.is_superuser,
                date_joined: user.date_joined.format("%Y-%m-%d").to_string(),
                bio,
            })
        }
        None => None,
    };

    Ok(AboutMeTemplate { user })
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Accept only same-origin absolute paths as a post-login target.
///
/// Browsers drop tabs and newlines inside URLs, so any whitespace or control
/// character is refused before the origin check.
fn safe_next<'a>(next: &'a str, base_url: &str) -> Option<&'a str> {
    if !next.starts_with('/')
        || next
            .chars()
            .any(|c| c.is_control() || c.is_whitespace() || c == '\\')
    {
        return None;
    }

    let base = Url::parse(base_url).ok()?;
    let target = base.join(next).ok()?;
    (target.origin() == base.origin()).then_some(next)
}
