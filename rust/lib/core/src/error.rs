use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

// ── Error codes ─────────────────────────────────────────────────────
//
// Stable, machine-readable identifiers. Clients match on these,
// never on the human-readable message string.

/// Stable error code constants.
///
/// Every error body carries `{"error": "...", "code": "NOT_FOUND"}`.
/// Codes never change; messages are operator-facing and may be reworded.
pub mod error_code {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const ALREADY_EXISTS: &str = "ALREADY_EXISTS";
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const UPSTREAM_ERROR: &str = "UPSTREAM_ERROR";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const INTERNAL: &str = "INTERNAL";
}

// ── ServiceError ────────────────────────────────────────────────────

/// Unified service error type used across all modules.
///
/// Each variant maps to a stable error code (see [`error_code`]) and an
/// HTTP status code. The JSON response always includes both:
///
/// ```json
/// {"error": "Lote no encontrado", "code": "NOT_FOUND"}
/// ```
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Resource does not exist. HTTP 404.
    #[error("{0}")]
    NotFound(String),

    /// Duplicate key / resource already exists. HTTP 409.
    #[error("{0}")]
    Conflict(String),

    /// Input data is invalid. HTTP 400.
    #[error("{0}")]
    Validation(String),

    /// An external system answered with a non-success status.
    /// The upstream status is passed through to the caller.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// Storage backend failure. HTTP 500.
    #[error("{0}")]
    Storage(String),

    /// Unexpected internal error. HTTP 500.
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    /// Stable, machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => error_code::NOT_FOUND,
            ServiceError::Conflict(_) => error_code::ALREADY_EXISTS,
            ServiceError::Validation(_) => error_code::VALIDATION_FAILED,
            ServiceError::Upstream { .. } => error_code::UPSTREAM_ERROR,
            ServiceError::Storage(_) => error_code::STORAGE_ERROR,
            ServiceError::Internal(_) => error_code::INTERNAL,
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True for failures the caller cannot act on (storage, internal).
    ///
    /// Handlers log these and replace the message with a generic one.
    pub fn is_server_fault(&self) -> bool {
        matches!(self, ServiceError::Storage(_) | ServiceError::Internal(_))
    }

    /// Log a server fault and swap its message for `public_message`.
    ///
    /// Client-side errors (400/404/409, upstream statuses) pass through.
    pub fn mask(self, public_message: &str) -> ServiceError {
        match self {
            ServiceError::Storage(detail) => {
                tracing::error!(error = %detail, "{public_message}");
                ServiceError::Storage(public_message.to_string())
            }
            ServiceError::Internal(detail) => {
                tracing::error!(error = %detail, "{public_message}");
                ServiceError::Internal(public_message.to_string())
            }
            other => other,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = serde_json::json!({
            "error": self.to_string(),
            "code": self.error_code(),
        });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_mapping() {
        assert_eq!(ServiceError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ServiceError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(ServiceError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ServiceError::Storage("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ServiceError::Internal("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn upstream_status_passes_through() {
        let err = ServiceError::Upstream { status: 404, message: "x".into() };
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = ServiceError::Upstream { status: 503, message: "x".into() };
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        // Out-of-range codes degrade to 502.
        let err = ServiceError::Upstream { status: 42, message: "x".into() };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn error_code_mapping() {
        assert_eq!(ServiceError::NotFound("x".into()).error_code(), "NOT_FOUND");
        assert_eq!(ServiceError::Conflict("x".into()).error_code(), "ALREADY_EXISTS");
        assert_eq!(ServiceError::Validation("x".into()).error_code(), "VALIDATION_FAILED");
        assert_eq!(
            ServiceError::Upstream { status: 500, message: "x".into() }.error_code(),
            "UPSTREAM_ERROR"
        );
        assert_eq!(ServiceError::Storage("x".into()).error_code(), "STORAGE_ERROR");
        assert_eq!(ServiceError::Internal("x".into()).error_code(), "INTERNAL");
    }

    #[test]
    fn server_fault_classification() {
        assert!(ServiceError::Storage("x".into()).is_server_fault());
        assert!(ServiceError::Internal("x".into()).is_server_fault());
        assert!(!ServiceError::NotFound("x".into()).is_server_fault());
        assert!(!ServiceError::Validation("x".into()).is_server_fault());
        assert!(!ServiceError::Upstream { status: 502, message: "x".into() }.is_server_fault());
    }

    #[test]
    fn mask_hides_server_detail() {
        let err = ServiceError::Storage("disk I/O error at page 7".into())
            .mask("Error al cargar los lotes");
        assert_eq!(err.to_string(), "Error al cargar los lotes");
        assert_eq!(err.error_code(), "STORAGE_ERROR");

        let err = ServiceError::NotFound("Lote no encontrado".into())
            .mask("Error al cargar el lote");
        assert_eq!(err.to_string(), "Lote no encontrado");
    }

    #[tokio::test]
    async fn json_response_format() {
        let err = ServiceError::NotFound("Lote no encontrado".into());
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(resp.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], "Lote no encontrado");
        assert_eq!(json["code"], "NOT_FOUND");
    }

    #[test]
    fn error_display_is_just_message() {
        assert_eq!(ServiceError::NotFound("piece 12".into()).to_string(), "piece 12");
        assert_eq!(ServiceError::Validation("bad input".into()).to_string(), "bad input");
        assert_eq!(
            ServiceError::Upstream { status: 500, message: "down".into() }.to_string(),
            "down"
        );
    }
}
