/// Error handling for the API server
///
/// Every handler returns `ApiResult<T>`. Failures carry the payload a form
/// needs to re-render: field errors and the submitted values.
///
/// # Response bodies
///
/// ```text
/// 401 { "error": "Unauthorized", "message": ... }
/// 400 { "error": "Validation Error", "errors": { field: [msg] }, "data": {...} }
/// 400 { "error": "Authentication Error", "message": ..., "data": {...} }
/// 500 { "error": "Server Error", "message": ..., "data"?: {...} }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use taskboard_shared::validation::{FieldErrors, FormData};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    /// No identity on the request (401)
    Unauthorized(String),

    /// Malformed request, e.g. an unknown form action (400)
    BadRequest(String),

    /// Form failed its schema (400)
    Validation { errors: FieldErrors, data: FormData },

    /// The identity provider rejected a sign-up or login (400)
    Authentication { message: String, data: FormData },

    /// Backend failure; the cause has already been logged (500)
    Server {
        message: String,
        data: Option<FormData>,
    },

    /// Page guard: send the browser elsewhere (303)
    Redirect(&'static str),
}

/// Error response format
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<FormData>,
}

impl ApiError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn server(message: impl Into<String>, data: Option<FormData>) -> Self {
        ApiError::Server {
            message: message.into(),
            data,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) | ApiError::Validation { .. } | ApiError::Authentication { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Server { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Redirect(_) => StatusCode::SEE_OTHER,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Validation { errors, .. } => {
                write!(f, "Validation failed: {} fields", errors.len())
            }
            ApiError::Authentication { message, .. } => write!(f, "Authentication failed: {}", message),
            ApiError::Server { message, .. } => write!(f, "Server error: {}", message),
            ApiError::Redirect(to) => write!(f, "Redirect to {}", to),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<FieldErrors> for ErrorResponse {
    fn from(errors: FieldErrors) -> Self {
        Self {
            error: "Validation Error",
            message: None,
            errors: Some(errors),
            data: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            ApiError::Redirect(to) => return Redirect::to(to).into_response(),
            ApiError::Unauthorized(message) => ErrorResponse {
                error: "Unauthorized",
                message: Some(message),
                errors: None,
                data: None,
            },
            ApiError::BadRequest(message) => ErrorResponse {
                error: "Bad Request",
                message: Some(message),
                errors: None,
                data: None,
            },
            ApiError::Validation { errors, data } => ErrorResponse {
                data: Some(data),
                ..ErrorResponse::from(errors)
            },
            ApiError::Authentication { message, data } => ErrorResponse {
                error: "Authentication Error",
                message: Some(message),
                errors: None,
                data: Some(data),
            },
            ApiError::Server { message, data } => ErrorResponse {
                error: "Server Error",
                message: Some(message),
                errors: None,
                data,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Successful form action
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: &'static str,
}

impl ActionResponse {
    pub fn ok(message: &'static str) -> Json<Self> {
        Json(Self {
            success: true,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::LOCATION;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::unauthorized("You must be logged in");
        assert_eq!(err.to_string(), "Unauthorized: You must be logged in");
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_validation_error_body() {
        let mut errors = FieldErrors::new();
        errors.add("title", "Title is required");
        let mut data = FormData::new();
        data.insert("priority".to_string(), "High".to_string());

        let response = ApiError::Validation { errors, data }.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Validation Error");
        assert_eq!(body["errors"]["title"][0], "Title is required");
        assert_eq!(body["data"]["priority"], "High");
        assert!(body.get("message").is_none());
    }

    #[tokio::test]
    async fn test_server_error_without_data() {
        let response = ApiError::server("Failed to delete task", None).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Server Error");
        assert_eq!(body["message"], "Failed to delete task");
        assert!(body.get("data").is_none());
    }

    #[test]
    fn test_redirect_is_see_other() {
        let response = ApiError::Redirect("/login").into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/login");
    }
}
