use axum::{
    Json,
    body::Body,
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::{AppError, ErrorKind};

pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// Problem document returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetail {
    pub title: String,
    pub status: u16,
    pub code: String,
    pub detail: String,
    pub timestamp: String,
    /// Request path, filled in by [`problem_instance_middleware`].
    pub instance: String,
}

impl ProblemDetail {
    fn render(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut resp = Json(&self).into_response();
        *resp.status_mut() = status;
        resp.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(APPLICATION_PROBLEM_JSON),
        );
        resp.extensions_mut().insert(self);
        resp
    }
}

/// HTTP face of [`AppError`], optionally carrying an operation-specific title.
pub struct ApiError {
    error: AppError,
    title: Option<&'static str>,
    status: Option<StatusCode>,
}

impl ApiError {
    #[must_use]
    pub const fn new(error: AppError) -> Self {
        Self {
            error,
            title: None,
            status: None,
        }
    }

    #[must_use]
    pub const fn with_title(mut self, title: &'static str) -> Self {
        self.title = Some(title);
        self
    }

    /// Replaces the status derived from the error kind.
    #[must_use]
    pub const fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self.status {
            Some(status) => status,
            None => status_for(self.error.kind()),
        }
    }

    fn problem(&self) -> ProblemDetail {
        let detail = if self.error.is_internal() {
            "internal server error".to_string()
        } else {
            self.error.to_string()
        };

        ProblemDetail {
            title: self.title.map_or_else(
                || self.error.default_title().to_string(),
                ToString::to_string,
            ),
            status: self.status().as_u16(),
            code: self.error.code().to_string(),
            detail,
            timestamp: chrono::Utc::now().to_rfc3339(),
            instance: String::new(),
        }
    }
}

impl fmt::Debug for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiError")
            .field("error", &self.error)
            .field("title", &self.title)
            .field("status", &self.status)
            .finish()
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        Self::new(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.error.code();
        if self.error.is_internal() {
            tracing::error!(code, error = ?self.error, "Request failed");
        } else {
            tracing::debug!(code, error = %self.error, "Request rejected");
        }

        self.problem().render()
    }
}

/// Attaches an operation title to a service result.
pub trait ProblemTitle<T> {
    fn titled(self, title: &'static str) -> Result<T, ApiError>;
}

impl<T> ProblemTitle<T> for Result<T, AppError> {
    fn titled(self, title: &'static str) -> Result<T, ApiError> {
        self.map_err(|e| ApiError::new(e).with_title(title))
    }
}

#[must_use]
pub const fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::BadRequest | ErrorKind::AlreadyExists => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::Forbidden | ErrorKind::InvalidOtp | ErrorKind::UserNotActivated => {
            StatusCode::FORBIDDEN
        }
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        ErrorKind::Timeout => StatusCode::REQUEST_TIMEOUT,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Re-renders problem documents with the request path as `instance`.
pub async fn problem_instance_middleware(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let mut response = next.run(req).await;

    let Some(mut problem) = response.extensions_mut().remove::<ProblemDetail>() else {
        return response;
    };
    problem.instance = path;

    let Ok(body) = serde_json::to_vec(&problem) else {
        return response;
    };
    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(body))
}

/// Answers 408 with a problem document once `limit` elapses.
pub async fn request_timeout_middleware(
    State(limit): State<Duration>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    tokio::time::timeout(limit, next.run(req))
        .await
        .map_err(|_| ApiError::new(AppError::RequestTimeout(limit)))
}

/// Fallback for unknown routes.
pub async fn route_not_found() -> ApiError {
    ApiError::new(AppError::not_found("route"))
}
