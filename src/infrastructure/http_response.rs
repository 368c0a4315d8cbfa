// HTTP response utilities - the JSON envelope and error mapping
use crate::application::error::QueryError;
use crate::domain::pagination::Pagination;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

/// `{success, data, pagination?, count?}` for every successful API call.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl<T: Serialize> Envelope<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data,
            pagination: None,
            count: None,
        }
    }

    pub fn paginated(data: T, pagination: Pagination) -> Self {
        Self {
            pagination: Some(pagination),
            ..Self::data(data)
        }
    }
}

impl<I: Serialize> Envelope<Vec<I>> {
    /// List envelope carrying its own length, as the batch views return.
    pub fn counted(data: Vec<I>) -> Self {
        let count = data.len();
        Self {
            count: Some(count),
            ..Self::data(data)
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// A query failure on its way to the client.
///
/// `summary` is the only text a production client sees; `expose_detail`
/// adds the internal cause under `message` for development.
#[derive(Debug)]
pub struct ApiError {
    pub error: QueryError,
    pub summary: &'static str,
    pub expose_detail: bool,
}

impl ApiError {
    pub fn new(error: QueryError, summary: &'static str, expose_detail: bool) -> Self {
        Self {
            error,
            summary,
            expose_detail,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.error {
            QueryError::NotFound(_) => StatusCode::NOT_FOUND,
            QueryError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            QueryError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self.error {
            QueryError::NotFound(what) => tracing::debug!("Lookup miss: {}", what),
            other => tracing::error!(status = status.as_u16(), "{}: {}", self.summary, other),
        }

        let mut body = json!({
            "success": false,
            "error": self.summary,
        });
        if self.expose_detail && !matches!(self.error, QueryError::NotFound(_)) {
            body["message"] = json!(self.error.to_string());
        }

        (status, Json(body)).into_response()
    }
}

/// Body for any path no route claims.
pub fn route_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "error": "Route not found" })),
    )
        .into_response()
}
