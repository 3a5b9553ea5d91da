use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Claims carried by a short-lived access token.
///
/// `sub` is the user identifier. The random `jti` makes every issued token
/// unique even when two are minted within the same second.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl AccessClaims {
    /// Build claims for a user with `iat = now` and `exp = now + ttl`.
    pub fn new(user_id: impl ToString, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }
}

/// Claims carried by a refresh token.
///
/// Binds the token to one device session via `device_id`; the session row
/// mirrors `exp` so a rotated-away token can be recognized on presentation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshClaims {
    pub sub: String,
    pub device_id: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl RefreshClaims {
    /// Build claims binding `user_id` to `device_id`, expiring after `ttl`.
    pub fn new(user_id: impl ToString, device_id: impl ToString, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.to_string(),
            device_id: device_id.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }
}

/// Claims carried by a password-recovery token.
///
/// `sub` is absent on tokens minted for unknown email addresses: those are
/// issued and mailed anyway so a recovery request reveals nothing about
/// which addresses are registered, but they can never reset a password.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecoveryClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl RecoveryClaims {
    /// Build recovery claims, with or without a subject.
    pub fn new(user_id: Option<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }
}
