//! HTTP mapping of runner errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use specrunner_common::{Error, ErrorBody};
use tracing::{error, warn};

/// Error returned by handlers; always rendered as a JSON [`ErrorBody`]
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody::new(message),
        }
    }

    #[cfg(test)]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        if let Error::ReportNotFound = e {
            return Self {
                status: StatusCode::NOT_FOUND,
                body: ErrorBody::new(e.to_string())
                    .with_suggestion("Run a test first to generate a report"),
            };
        }

        if e.is_client_error() {
            warn!("Rejected request: {}", e);
            Self::bad_request(e.to_string())
        } else {
            error!("Internal error: {}", e);
            Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: ErrorBody::new(e.to_string()),
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(Error::TestNotFound("a.spec.ts".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(Error::InvalidRequest("missing".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::from(Error::ReportNotFound).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(Error::Io(std::io::Error::other("denied"))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(Error::InvalidConfig("port".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_client_errors_keep_message() {
        let err = ApiError::from(Error::TestNotFound("a.spec.ts".into()));
        assert_eq!(err.body.error, "Test file not found: a.spec.ts");
        assert!(err.body.suggestion.is_none());
    }

    #[test]
    fn test_report_not_found_has_suggestion() {
        let err = ApiError::from(Error::ReportNotFound);
        assert_eq!(err.body.error, "No report found");
        assert!(err.body.suggestion.is_some());
        assert!(!err.body.success);
    }
}
