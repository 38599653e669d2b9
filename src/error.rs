use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

/// Validation failures of submitted forms, rendered inline next to the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Form {
  #[error("Please provide all fields.")]
  MissingFields,
  #[error("Invalid expiry date format. Use 'YYYY-MM-DD'.")]
  BadDateFormat,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("Database error: {0}")]
  Database(#[from] sea_orm::DbErr),

  #[error("Subscription not found")]
  NotFound,

  #[error("App key already registered")]
  Conflict,

  #[error(transparent)]
  Form(#[from] Form),
}

impl Error {
  pub fn status(&self) -> StatusCode {
    match self {
      Error::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
      Error::NotFound => StatusCode::NOT_FOUND,
      Error::Conflict => StatusCode::CONFLICT,
      Error::Form(_) => StatusCode::BAD_REQUEST,
    }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = self.status();

    // store faults are not exposed to callers
    let message = match &self {
      Error::Database(err) => {
        error!("Database error: {err}");
        "Database error".to_string()
      }
      other => other.to_string(),
    };

    let body = json::json!({
      "success": false,
      "error": message
    });

    (status, Json(body)).into_response()
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
