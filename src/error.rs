use actix_web::http::StatusCode;
use actix_web::ResponseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CspError {
    #[error("Directive '{directive}' expects {expected}, got {found}")]
    TypeMismatch {
        directive: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Unknown directive: {0}")]
    UnknownDirective(String),

    #[error("Invalid nonce target: {0} (expected 'script' or 'style')")]
    InvalidNonceTarget(String),

    #[error("Crypto error: {0}")]
    CryptoError(String),

    #[error("Header processing error: {0}")]
    HeaderError(String),

    #[error("No CSP scope attached to this request; is CspMiddleware installed?")]
    MissingScope,

    #[error("The request CSP policy is already in use by an enclosing csp_policy call")]
    PolicyInUse,

    #[error("Config error: {0}")]
    ConfigError(String),
}

impl ResponseError for CspError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::TypeMismatch { .. }
            | Self::UnknownDirective(_)
            | Self::InvalidNonceTarget(_)
            | Self::ConfigError(_) => StatusCode::BAD_REQUEST,

            Self::CryptoError(_)
            | Self::HeaderError(_)
            | Self::MissingScope
            | Self::PolicyInUse => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<serde_json::Error> for CspError {
    fn from(err: serde_json::Error) -> Self {
        Self::ConfigError(err.to_string())
    }
}
