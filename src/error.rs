use axum::extract::rejection::JsonRejection;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::skills::SkillNameError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Not authenticated")]
    Unauthenticated,
    #[error("{0}")]
    Validation(String),
    #[error("There was a problem with the database")]
    Storage(eyre::Report),
}

// eyre::Report isn't a std Error, so thiserror's #[from] can't be used here
impl From<eyre::Report> for ServerError {
    fn from(report: eyre::Report) -> Self {
        ServerError::Storage(report)
    }
}

// keeps malformed bodies on the same `{"detail": ...}` shape as every other error
impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::Validation(rejection.body_text())
    }
}

impl From<SkillNameError> for ServerError {
    fn from(err: SkillNameError) -> Self {
        ServerError::Validation(err.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ServerError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        if let ServerError::Storage(report) = &self {
            error!("storage failure: {report:?}");
        }
        let status = self.status();
        let mut response = (status, Json(ErrorBody { detail: self.to_string() })).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
