use crate::constants;
use crate::models::ServiceId;
use thiserror::Error;

/// Failures talking to the hosted backend (gateway or change feed)
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("gateway misconfigured: {0}")]
    Config(String),
}

impl GatewayError {
    /// True for a unique-constraint conflict (duplicate favorite insert)
    pub fn is_conflict(&self) -> bool {
        matches!(self, GatewayError::Status { status: 409, .. })
    }
}

/// Outcomes of a favorites operation that did not change anything
#[derive(Debug, Error)]
pub enum FavoriteError {
    #[error("not authenticated")]
    NeedsAuth,
    #[error("service {0} is not a persisted record")]
    InvalidTarget(ServiceId),
    #[error("transport failure: {0}")]
    Transport(#[from] GatewayError),
}

impl FavoriteError {
    /// Text shown to the user in a toast
    pub fn user_message(&self) -> &'static str {
        match self {
            FavoriteError::NeedsAuth => constants::MSG_NEEDS_AUTH,
            FavoriteError::InvalidTarget(_) => constants::MSG_INVALID_TARGET,
            FavoriteError::Transport(_) => constants::MSG_UPDATE_FAILED,
        }
    }

    pub fn needs_auth(&self) -> bool {
        matches!(self, FavoriteError::NeedsAuth)
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("access token is not a JWT")]
    Malformed,
    #[error("access token payload is not valid: {0}")]
    Payload(String),
    #[error("access token has no subject")]
    MissingSubject,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_is_detected_from_status() {
        let err = GatewayError::Status { status: 409, body: "duplicate key".into() };
        assert!(err.is_conflict());
        let err = GatewayError::Status { status: 500, body: String::new() };
        assert!(!err.is_conflict());
    }

    #[test]
    fn every_favorite_error_has_a_message() {
        assert_eq!(FavoriteError::NeedsAuth.user_message(), constants::MSG_NEEDS_AUTH);
        assert_eq!(
            FavoriteError::InvalidTarget(ServiceId::from("1")).user_message(),
            constants::MSG_INVALID_TARGET
        );
        let transport = FavoriteError::from(GatewayError::Decode("eof".into()));
        assert_eq!(transport.user_message(), constants::MSG_UPDATE_FAILED);
        assert!(!transport.needs_auth());
    }
}
