use crate::models::UserId;
use crate::utils::errors::SessionError;
use base64::Engine;
use serde::Deserialize;

/// Signed-in identity handed to the favorites manager
///
/// Sign-in itself happens elsewhere; this only carries its result.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: UserId,
    pub access_token: String,
}

#[derive(Deserialize)]
struct Claims {
    sub: Option<String>,
}

impl Session {
    pub fn new(user_id: UserId, access_token: impl Into<String>) -> Self {
        Self {
            user_id,
            access_token: access_token.into(),
        }
    }

    /// Build a session from an access token, taking the user id from its `sub` claim
    ///
    /// The signature is not checked; the backend validates the token on every call.
    pub fn from_access_token(token: &str) -> Result<Self, SessionError> {
        let mut parts = token.split('.');
        let payload = match (parts.next(), parts.next(), parts.next()) {
            (Some(_), Some(payload), Some(_)) if !payload.is_empty() => payload,
            _ => return Err(SessionError::Malformed),
        };

        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| SessionError::Payload(e.to_string()))?;
        let claims: Claims =
            serde_json::from_slice(&bytes).map_err(|e| SessionError::Payload(e.to_string()))?;

        match claims.sub {
            Some(sub) if !sub.is_empty() => Ok(Self::new(UserId::from(sub), token)),
            _ => Err(SessionError::MissingSubject),
        }
    }
}
