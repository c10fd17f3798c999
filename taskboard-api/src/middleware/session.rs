/// Session resolver
///
/// Runs once per request, before any handler:
///
/// 1. Reads the access/refresh token cookies.
/// 2. Verifies the access token with the identity provider.
/// 3. If that fails and a refresh token is present, exchanges it for a new
///    session and writes the rotated tokens back as cookies.
/// 4. Binds a task store to the resulting access token and inserts a
///    [`RequestContext`] into the request extensions.
///
/// Any failure leaves the request anonymous; handlers decide whether that is
/// allowed. Cookies are cleared only when the provider rejects the tokens,
/// never when it is unreachable, failing or rate limiting.

use axum::{
    extract::{Request, State},
    http::{header::SET_COOKIE, HeaderMap},
    middleware::Next,
    response::Response,
};
use taskboard_shared::{
    auth::{cookies, RequestContext},
    backend::BackendError,
    models::Session,
};
use tracing::{debug, info, warn};

use crate::app::AppState;

/// Cookie changes to apply to the response
#[derive(Debug)]
enum CookieUpdate {
    Keep,

    /// The session was refreshed; persist the new tokens
    Rotate(Session),

    /// The cookies no longer describe a valid session
    Clear,
}

#[derive(Debug)]
struct Resolved {
    context: RequestContext,
    cookies: CookieUpdate,
}

/// Axum middleware attaching a [`RequestContext`] to every request
pub async fn session_layer(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let resolved = resolve(&state, req.headers()).await;
    req.extensions_mut().insert(resolved.context);

    let mut response = next.run(req).await;

    // Handlers that manage the session themselves (login, logout) win.
    if response.headers().contains_key(SET_COOKIE) {
        return response;
    }

    let secure = state.secure_cookies();
    match resolved.cookies {
        CookieUpdate::Keep => {}
        CookieUpdate::Rotate(session) => {
            cookies::set_session_cookies(response.headers_mut(), &session, secure)
        }
        CookieUpdate::Clear => cookies::clear_session_cookies(response.headers_mut(), secure),
    }

    response
}

async fn resolve(state: &AppState, headers: &HeaderMap) -> Resolved {
    let access_token = cookies::read_cookie(headers, cookies::ACCESS_TOKEN_COOKIE);
    let refresh_token = cookies::read_refresh_token(headers);

    if access_token.is_none() && refresh_token.is_none() {
        return anonymous(state, CookieUpdate::Keep);
    }

    if let Some(token) = access_token {
        match state.auth.get_user(&token).await {
            Ok(identity) => {
                debug!(user_id = %identity.id, "Session verified");
                return Resolved {
                    context: RequestContext {
                        identity: Some(identity),
                        tasks: state.tasks.bind(Some(&token)),
                        access_token: Some(token),
                    },
                    cookies: CookieUpdate::Keep,
                };
            }
            Err(e) if e.is_unavailable() => return unreachable_provider(state, &e),
            Err(e) => debug!(error = %e, "Access token not accepted"),
        }
    }

    let Some(refresh_token) = refresh_token else {
        return anonymous(state, CookieUpdate::Clear);
    };

    match state.auth.refresh_session(&refresh_token).await {
        Ok(session) => {
            info!(user_id = %session.user.id, "Session refreshed");
            Resolved {
                context: RequestContext {
                    identity: Some(session.user.clone()),
                    tasks: state.tasks.bind(Some(&session.access_token)),
                    access_token: Some(session.access_token.clone()),
                },
                cookies: CookieUpdate::Rotate(session),
            }
        }
        Err(e) if e.is_unavailable() => unreachable_provider(state, &e),
        Err(e) => {
            debug!(error = %e, "Refresh token rejected");
            anonymous(state, CookieUpdate::Clear)
        }
    }
}

fn anonymous(state: &AppState, update: CookieUpdate) -> Resolved {
    Resolved {
        context: RequestContext::anonymous(state.tasks.bind(None)),
        cookies: update,
    }
}

/// The cookies are kept: an outage or rate limit says nothing about the
/// tokens, and the provider may answer on the next request.
fn unreachable_provider(state: &AppState, error: &BackendError) -> Resolved {
    warn!(error = %error, "Identity provider unavailable; continuing anonymously");
    anonymous(state, CookieUpdate::Keep)
}
