/// Page data loaders
///
/// These return the JSON a rendering layer needs for each page and enforce
/// the page guards: protected pages send anonymous visitors to `/login`, the
/// sign-up and login pages send signed-in visitors to `/`.

use axum::{Extension, Json};
use serde::Serialize;
use serde_json::{json, Value};
use taskboard_shared::{auth::RequestContext, models::Identity};

use crate::error::{ApiError, ApiResult};

#[derive(Debug, Serialize)]
pub struct HomePage {
    pub user: Identity,
}

/// Layout data available to every page
#[derive(Debug, Serialize)]
pub struct SessionData {
    pub session: Option<SessionUser>,
}

#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub user: Identity,
}

/// `GET /`
pub async fn home(Extension(ctx): Extension<RequestContext>) -> ApiResult<Json<HomePage>> {
    let user = ctx.identity.ok_or(ApiError::Redirect("/login"))?;
    Ok(Json(HomePage { user }))
}

/// `GET /session`
pub async fn session(Extension(ctx): Extension<RequestContext>) -> Json<SessionData> {
    Json(SessionData {
        session: ctx.identity.map(|user| SessionUser { user }),
    })
}

/// `GET /signup`
pub async fn signup_page(Extension(ctx): Extension<RequestContext>) -> ApiResult<Json<Value>> {
    guest_only(&ctx)
}

/// `GET /login`
pub async fn login_page(Extension(ctx): Extension<RequestContext>) -> ApiResult<Json<Value>> {
    guest_only(&ctx)
}

fn guest_only(ctx: &RequestContext) -> ApiResult<Json<Value>> {
    if ctx.is_authenticated() {
        return Err(ApiError::Redirect("/"));
    }
    Ok(Json(json!({})))
}
