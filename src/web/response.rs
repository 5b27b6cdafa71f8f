use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::query::QueryError;

/// 錯誤時回傳的內容 `{"error": "..."}`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        ErrorBody {
            error: error.into(),
        }
    }
}

impl QueryError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            QueryError::InvalidMonth => StatusCode::BAD_REQUEST,
            QueryError::YearNotFound { .. } | QueryError::MonthNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
        }
    }
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorBody::new(self.to_string()))).into_response()
    }
}
