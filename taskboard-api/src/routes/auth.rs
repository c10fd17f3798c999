/// Sign-up, login and logout form actions
///
/// # Endpoints
///
/// - `POST /signup` - `email`, `password`, `confirmPassword`
/// - `POST /login` - `email`, `password`
/// - `POST /logout`
///
/// Bodies are `application/x-www-form-urlencoded`. Provider failures are
/// mapped to user-facing messages; the submitted email (never a password) is
/// echoed back so the form can be repopulated.

use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    Extension, Form, Json,
};
use serde::Serialize;
use taskboard_shared::{
    auth::{
        cookies,
        messages::{auth_error_message, is_network_error},
        RequestContext,
    },
    backend::{auth::SignUpOutcome, BackendError},
    models::{Identity, Session},
    validation::{
        auth::{LoginForm, SignUpForm},
        FormData,
    },
};
use tracing::{info, warn};

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: &'static str,
    pub user: Identity,

    /// `false` when the account still has to be confirmed by email
    pub signed_in: bool,
}

/// `POST /signup`
pub async fn signup(
    State(state): State<AppState>,
    Form(form): Form<SignUpForm>,
) -> ApiResult<(HeaderMap, Json<AuthResponse>)> {
    let data = form.echo();
    let credentials = form
        .into_credentials()
        .map_err(|errors| ApiError::Validation {
            errors,
            data: data.clone(),
        })?;

    let outcome = state
        .auth
        .sign_up(&credentials.email, &credentials.password)
        .await
        .map_err(|e| provider_failure("Sign-up", &e, data))?;

    Ok(match outcome {
        SignUpOutcome::SignedIn(session) => {
            info!(user_id = %session.user.id, "Account created");
            signed_in(&state, session, "Account created successfully")
        }
        SignUpOutcome::ConfirmationRequired(user) => {
            info!(user_id = %user.id, "Account created; awaiting email confirmation");
            (
                HeaderMap::new(),
                Json(AuthResponse {
                    success: true,
                    message: "Please check your email to confirm your account",
                    user,
                    signed_in: false,
                }),
            )
        }
    })
}

/// `POST /login`
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> ApiResult<(HeaderMap, Json<AuthResponse>)> {
    let data = form.echo();
    let credentials = form
        .into_credentials()
        .map_err(|errors| ApiError::Validation {
            errors,
            data: data.clone(),
        })?;

    let session = state
        .auth
        .sign_in_with_password(&credentials.email, &credentials.password)
        .await
        .map_err(|e| provider_failure("Login", &e, data))?;

    info!(user_id = %session.user.id, "Logged in");
    Ok(signed_in(&state, session, "Logged in successfully"))
}

/// `POST /logout`
///
/// Always clears the session cookies and redirects to `/login`, even if the
/// provider could not revoke the session.
pub async fn logout(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Response {
    if let Some(token) = ctx.access_token.as_deref() {
        if let Err(e) = state.auth.sign_out(token).await {
            warn!(error = %e, "Failed to revoke session");
        }
    }

    let mut headers = HeaderMap::new();
    cookies::clear_session_cookies(&mut headers, state.secure_cookies());
    (headers, Redirect::to("/login")).into_response()
}

fn signed_in(state: &AppState, session: Session, message: &'static str) -> (HeaderMap, Json<AuthResponse>) {
    let mut headers = HeaderMap::new();
    cookies::set_session_cookies(&mut headers, &session, state.secure_cookies());

    (
        headers,
        Json(AuthResponse {
            success: true,
            message,
            user: session.user,
            signed_in: true,
        }),
    )
}

fn provider_failure(action: &str, error: &BackendError, data: FormData) -> ApiError {
    if is_network_error(error) {
        warn!(action, error = %error, "Identity provider unreachable");
    } else {
        info!(action, error = %error, "Identity provider rejected request");
    }

    ApiError::Authentication {
        message: auth_error_message(error),
        data,
    }
}
