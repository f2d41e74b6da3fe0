use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use ipay_engine::{AuthApiError, PaymentFlowError};
use log::error;
use serde_json::json;
use thiserror::Error;

/// Returned to clients in place of any internal failure. The details only go to the log.
const INTERNAL_ERROR_MESSAGE: &str = "An internal server error occurred.";

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("{0}")]
    AuthenticationError(#[from] AuthError),
    #[error("A user with this username, account number or ID number already exists.")]
    DuplicateIdentity,
    #[error("{0}")]
    NoRecordFound(String),
    #[error("{0}")]
    InvalidTransition(String),
    #[error("Some transactions are not verified and cannot be submitted.")]
    PreconditionFailed(Vec<i64>),
    #[error("Too many requests. Please try again later.")]
    RateLimited,
}

impl ServerError {
    fn is_internal(&self) -> bool {
        self.status_code() == StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::MissingToken => StatusCode::UNAUTHORIZED,
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::InvalidToken(_) => StatusCode::FORBIDDEN,
                AuthError::InsufficientPermissions => StatusCode::FORBIDDEN,
                AuthError::TokenIssueError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::DuplicateIdentity => StatusCode::CONFLICT,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidTransition(_) => StatusCode::BAD_REQUEST,
            Self::PreconditionFailed(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            Self::PreconditionFailed(ids) => json!({ "error": self.to_string(), "unverifiedIds": ids }),
            _ if self.is_internal() => {
                error!("💻️ {self}");
                json!({ "error": INTERNAL_ERROR_MESSAGE })
            },
            _ => json!({ "error": self.to_string() }),
        };
        HttpResponse::build(self.status_code()).insert_header(ContentType::json()).body(body.to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Access denied. No token provided.")]
    MissingToken,
    #[error("Invalid credentials.")]
    InvalidCredentials,
    #[error("Invalid or expired token. {0}")]
    InvalidToken(String),
    #[error("You do not have permission to access this resource.")]
    InsufficientPermissions,
    #[error("Could not issue an access token. {0}")]
    TokenIssueError(String),
}

impl From<AuthApiError> for ServerError {
    fn from(e: AuthApiError) -> Self {
        match e {
            AuthApiError::InvalidInput(v) => Self::InvalidInput(v.to_string()),
            AuthApiError::InvalidCredentials => Self::AuthenticationError(AuthError::InvalidCredentials),
            AuthApiError::DuplicateIdentity => Self::DuplicateIdentity,
            AuthApiError::UserNotFound(_) => Self::NoRecordFound(e.to_string()),
            AuthApiError::DatabaseError(s) => Self::BackendError(format!("Database error: {s}")),
            AuthApiError::HashingError(s) => Self::BackendError(format!("Password hashing error: {s}")),
        }
    }
}

impl From<PaymentFlowError> for ServerError {
    fn from(e: PaymentFlowError) -> Self {
        match e {
            PaymentFlowError::Forbidden => Self::AuthenticationError(AuthError::InsufficientPermissions),
            PaymentFlowError::InvalidInput(v) => Self::InvalidInput(v.to_string()),
            PaymentFlowError::NotFound(_) => Self::NoRecordFound(e.to_string()),
            PaymentFlowError::InvalidTransition { .. } => Self::InvalidTransition(e.to_string()),
            PaymentFlowError::PreconditionFailed(ids) => Self::PreconditionFailed(ids),
            PaymentFlowError::DatabaseError(s) => Self::BackendError(format!("Database error: {s}")),
        }
    }
}
