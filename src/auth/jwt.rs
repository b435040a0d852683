//! Signed access and refresh tokens (JWT, HS256).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::models::UserId;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// The two token purposes. The issuer tag keeps one from being used as the
/// other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub const fn issuer(self) -> &'static str {
        match self {
            TokenKind::Access => "chirpy-access",
            TokenKind::Refresh => "chirpy-refresh",
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    #[error("token issued in the future")]
    NotYetValid,

    #[error("token subject is not a user id: {0:?}")]
    BadSubject(String),

    #[error("expiry out of range for a token issued at {0}")]
    ExpiryOutOfRange(DateTime<Utc>),

    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// What a successfully validated token asserts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub subject: UserId,
    pub issuer: String,
}

/// Mints and checks tokens with one symmetric key.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue(&self, user_id: UserId, ttl: Duration, issuer: &str) -> Result<String, TokenError> {
        self.issue_at(user_id, Utc::now(), ttl, issuer)
    }

    /// Like [`issue`](Self::issue) with an explicit issue time.
    pub fn issue_at(
        &self,
        user_id: UserId,
        issued_at: DateTime<Utc>,
        ttl: Duration,
        issuer: &str,
    ) -> Result<String, TokenError> {
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or(TokenError::ExpiryOutOfRange(issued_at))?;
        let claims = Claims {
            sub: user_id.to_string(),
            iss: issuer.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(TokenError::Signing)
    }

    /// Check signature, structure and validity window. The issuer tag is
    /// returned, not checked; callers decide which tag they accept.
    pub fn validate(&self, token: &str) -> Result<VerifiedToken, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "iat", "iss", "sub"]);

        let data =
            decode::<Claims>(token, &self.decoding, &validation).map_err(TokenError::Invalid)?;
        if data.claims.iat > Utc::now().timestamp() {
            return Err(TokenError::NotYetValid);
        }
        let subject = data
            .claims
            .sub
            .parse::<UserId>()
            .ok()
            .filter(|id| *id >= 1)
            .ok_or_else(|| TokenError::BadSubject(data.claims.sub.clone()))?;

        Ok(VerifiedToken {
            subject,
            issuer: data.claims.iss,
        })
    }
}

/// Short stable digest of a token, for logs.
pub fn fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    hex::encode(&digest[..6])
}
