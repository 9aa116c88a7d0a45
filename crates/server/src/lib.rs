use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::IntoResponse,
};
use documents::DocumentError;
use engine::EngineError;

pub use api_types::ErrorBody;
pub use auth::{AuthError, AuthSettings, TokenVerifier};
pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod auth;
mod budgets;
mod customers;
mod exports;
mod notify;
mod server;

pub enum ServerError {
    Engine(EngineError),
    Document(DocumentError),
    Unauthenticated,
    /// Timed out or contended; the client may retry.
    Unavailable,
    NotFound(String),
    BadRequest(String),
    /// The mail provider did not accept the message.
    Delivery(String),
}

const INTERNAL: &str = "internal server error";

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::InvalidTaxId(_)
        | EngineError::InvalidField(_)
        | EngineError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
        EngineError::AllocationConflict(_) => StatusCode::SERVICE_UNAVAILABLE,
        EngineError::InvalidNumber(_) | EngineError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            INTERNAL.to_string()
        }
        EngineError::InvalidNumber(number) => {
            tracing::error!("stored budget number is malformed: {number}");
            INTERNAL.to_string()
        }
        EngineError::AllocationConflict(attempts) => {
            tracing::warn!("budget number allocation gave up after {attempts} attempts");
            "budget number allocation is busy, retry".to_string()
        }
        other => other.to_string(),
    }
}

fn status_and_message_for_document_error(err: DocumentError) -> (StatusCode, String) {
    match err {
        DocumentError::InvalidDestination(_) | DocumentError::InvalidMonth(_) => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        other => {
            tracing::error!("document error: {other}");
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_string())
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Document(err) => status_and_message_for_document_error(err),
            ServerError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "unauthenticated".to_string())
            }
            ServerError::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service unavailable, retry".to_string(),
            ),
            ServerError::NotFound(err) => (StatusCode::NOT_FOUND, err),
            ServerError::BadRequest(err) => (StatusCode::BAD_REQUEST, err),
            ServerError::Delivery(reason) => {
                tracing::warn!("email delivery failed: {reason}");
                (StatusCode::BAD_GATEWAY, "email delivery failed".to_string())
            }
        };

        let mut response = (status, Json(ErrorBody { error })).into_response();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from_static("1"));
        }
        response
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<DocumentError> for ServerError {
    fn from(value: DocumentError) -> Self {
        Self::Document(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        Self::BadRequest(value.body_text())
    }
}

impl From<PathRejection> for ServerError {
    fn from(value: PathRejection) -> Self {
        Self::BadRequest(value.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(value: QueryRejection) -> Self {
        Self::BadRequest(value.body_text())
    }
}
