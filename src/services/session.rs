//! Session use cases: registration, login, refresh, revoke and
//! authenticated profile changes.

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info, instrument, warn};

use crate::auth::jwt::fingerprint;
use crate::auth::password::{hash_password, verify_against_dummy, verify_password};
use crate::auth::{TokenIssuer, TokenKind};
use crate::config::Config;
use crate::error::{AppError, AppResult, AuthFailure};
use crate::models::{User, UserId};
use crate::repositories::{CredentialStore, ProfileUpdate, StoreError, TokenLedger};

/// Lifetimes too large for `Duration` saturate; issuing then fails with an
/// internal error instead of panicking.
fn ttl(secs: i64) -> Duration {
    Duration::try_seconds(secs).unwrap_or(Duration::MAX)
}

/// Tokens handed out by a successful login.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct SessionService {
    users: Arc<dyn CredentialStore>,
    ledger: Arc<dyn TokenLedger>,
    tokens: TokenIssuer,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl SessionService {
    pub fn new(
        users: Arc<dyn CredentialStore>,
        ledger: Arc<dyn TokenLedger>,
        tokens: TokenIssuer,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            users,
            ledger,
            tokens,
            access_ttl,
            refresh_ttl,
        }
    }

    /// Build from configuration (signing secret and token lifetimes).
    pub fn from_config(
        config: &Config,
        users: Arc<dyn CredentialStore>,
        ledger: Arc<dyn TokenLedger>,
    ) -> Self {
        Self::new(
            users,
            ledger,
            TokenIssuer::new(&config.jwt_secret),
            ttl(config.access_token_ttl_secs),
            ttl(config.refresh_token_ttl_secs),
        )
    }

    #[instrument(skip(self, password))]
    pub async fn register(&self, email: &str, password: &str) -> AppResult<User> {
        let password_hash = hash_password(password)?;
        let user = self.users.register(email, password_hash).await?;
        info!(user_id = user.id, "user registered");
        Ok(user)
    }

    /// Verify credentials and open a session. Unknown email and wrong
    /// password produce the same error.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> AppResult<Session> {
        let user = match self.find_user_by_email(email).await {
            Ok(user) => user,
            Err(StoreError::NotFound) => {
                verify_against_dummy(password);
                return Err(AuthFailure::UnknownEmail.into());
            }
            Err(e) => return Err(e.into()),
        };
        if !verify_password(&user.password_hash, password) {
            return Err(AuthFailure::WrongPassword.into());
        }

        let access_token = self.issue(user.id, TokenKind::Access)?;
        let refresh_token = self.issue(user.id, TokenKind::Refresh)?;
        if !self.ledger.record(&refresh_token).await? {
            return Err(AppError::Internal(anyhow::anyhow!(
                "refresh token {} already recorded",
                fingerprint(&refresh_token)
            )));
        }

        info!(user_id = user.id, refresh = %fingerprint(&refresh_token), "session opened");
        Ok(Session {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Exchange a live refresh token for a new access token. The refresh
    /// token itself is not rotated.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<String> {
        let user_id = self.require(refresh_token, TokenKind::Refresh)?;
        if self.ledger.is_revoked(refresh_token).await? {
            return Err(AuthFailure::RefreshRevoked.into());
        }
        let access_token = self.issue(user_id, TokenKind::Access)?;
        debug!(user_id, refresh = %fingerprint(refresh_token), "access token refreshed");
        Ok(access_token)
    }

    /// Mark a refresh token revoked. Access tokens already issued stay valid
    /// until they expire.
    pub async fn revoke(&self, refresh_token: &str) -> AppResult<()> {
        if !self.ledger.revoke(refresh_token).await? {
            return Err(AuthFailure::RefreshRevoked.into());
        }
        info!(refresh = %fingerprint(refresh_token), "refresh token revoked");
        Ok(())
    }

    /// Resolve the user behind an access token. No ledger lookup.
    pub fn authenticate(&self, access_token: &str) -> AppResult<UserId> {
        Ok(self.require(access_token, TokenKind::Access)?)
    }

    #[instrument(skip(self, access_token, new_password))]
    pub async fn update_profile(
        &self,
        access_token: &str,
        new_email: Option<String>,
        new_password: Option<String>,
    ) -> AppResult<User> {
        let user_id = self.authenticate(access_token)?;
        let password_hash = new_password.as_deref().map(hash_password).transpose()?;
        let update = ProfileUpdate {
            email: new_email,
            password_hash,
        };
        match self.users.update_profile(user_id, update).await {
            Ok(user) => {
                info!(user_id, "profile updated");
                Ok(user)
            }
            // A well-signed token for a user this store has never seen.
            Err(StoreError::NotFound) => {
                warn!(user_id, "token subject has no account");
                Err(AppError::Unauthorized)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn upgrade_membership(&self, user_id: UserId) -> AppResult<()> {
        self.users.set_membership(user_id, true).await?;
        info!(user_id, "membership upgraded");
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        let id = self.users.lookup_by_email(email).await?;
        self.users.lookup_by_id(id).await
    }

    fn issue(&self, user_id: UserId, kind: TokenKind) -> AppResult<String> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        Ok(self.tokens.issue(user_id, ttl, kind.issuer())?)
    }

    /// Validate `token` and insist on the issuer tag of `kind`.
    fn require(&self, token: &str, kind: TokenKind) -> Result<UserId, AuthFailure> {
        let verified = self.tokens.validate(token)?;
        if verified.issuer != kind.issuer() {
            return Err(AuthFailure::WrongIssuer {
                expected: kind.issuer(),
                found: verified.issuer,
            });
        }
        Ok(verified.subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryStore;
    use tokio_test::{assert_err, assert_ok};

    const SECRET: &str = "session-test-secret";

    fn service_with(store: Arc<InMemoryStore>, secret: &str) -> SessionService {
        SessionService::new(
            store.clone(),
            store,
            TokenIssuer::new(secret),
            Duration::hours(1),
            Duration::days(60),
        )
    }

    fn service() -> SessionService {
        service_with(Arc::new(InMemoryStore::new()), SECRET)
    }

    #[tokio::test]
    async fn register_then_login() {
        let sessions = service();
        let user = sessions.register("a@x.com", "pw").await.unwrap();
        assert_eq!(user.id, 1);

        let session = sessions.login("a@x.com", "pw").await.unwrap();
        assert_eq!(session.user.id, user.id);
        assert_ne!(session.access_token, session.refresh_token);
        assert_eq!(assert_ok!(sessions.authenticate(&session.access_token)), user.id);
    }

    #[tokio::test]
    async fn register_duplicate_email_is_distinguishable() {
        let sessions = service();
        sessions.register("a@x.com", "pw").await.unwrap();
        let err = sessions.register("a@x.com", "other").await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail));
    }

    #[tokio::test]
    async fn login_failures_are_generic() {
        let sessions = service();
        sessions.register("a@x.com", "pw").await.unwrap();

        let wrong = sessions.login("a@x.com", "wrong").await.unwrap_err();
        let unknown = sessions.login("b@x.com", "pw").await.unwrap_err();
        assert!(matches!(wrong, AppError::InvalidCredentials));
        assert!(matches!(unknown, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn refresh_mints_access_token_for_same_user() {
        let sessions = service();
        let user = sessions.register("a@x.com", "pw").await.unwrap();
        let session = sessions.login("a@x.com", "pw").await.unwrap();

        let access = sessions.refresh(&session.refresh_token).await.unwrap();
        assert_eq!(sessions.authenticate(&access).unwrap(), user.id);
    }

    #[tokio::test]
    async fn revoked_refresh_token_is_rejected() {
        let sessions = service();
        sessions.register("a@x.com", "pw").await.unwrap();
        let session = sessions.login("a@x.com", "pw").await.unwrap();

        assert_ok!(sessions.revoke(&session.refresh_token).await);
        let err = sessions.refresh(&session.refresh_token).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));

        // Revoking again is still fine.
        assert_ok!(sessions.revoke(&session.refresh_token).await);
        // Access tokens from that session remain usable until they expire.
        assert_ok!(sessions.authenticate(&session.access_token));
    }

    #[tokio::test]
    async fn revoke_unknown_token_is_unauthorized() {
        let sessions = service();
        let err = sessions.revoke("never-issued").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn refresh_requires_a_recorded_token() {
        let sessions = service();
        sessions.register("a@x.com", "pw").await.unwrap();
        // Correctly signed, correct tag, but never recorded by a login.
        let forged = TokenIssuer::new(SECRET)
            .issue(1, Duration::days(60), TokenKind::Refresh.issuer())
            .unwrap();
        let err = sessions.refresh(&forged).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn tokens_are_not_interchangeable() {
        let sessions = service();
        sessions.register("a@x.com", "pw").await.unwrap();
        let session = sessions.login("a@x.com", "pw").await.unwrap();

        assert!(matches!(
            sessions.refresh(&session.access_token).await,
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            sessions.authenticate(&session.refresh_token),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            sessions
                .update_profile(&session.refresh_token, Some("b@x.com".into()), None)
                .await,
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn tokens_from_another_key_are_unauthorized() {
        let store = Arc::new(InMemoryStore::new());
        let sessions = service_with(store.clone(), SECRET);
        let other = service_with(store, "some-other-secret");
        sessions.register("a@x.com", "pw").await.unwrap();
        let session = sessions.login("a@x.com", "pw").await.unwrap();

        assert!(matches!(
            other.authenticate(&session.access_token),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            other.refresh(&session.refresh_token).await,
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn expired_access_token_is_unauthorized() {
        let sessions = service();
        let stale = TokenIssuer::new(SECRET)
            .issue_at(
                1,
                chrono::Utc::now() - Duration::hours(3),
                Duration::hours(1),
                TokenKind::Access.issuer(),
            )
            .unwrap();
        assert_err!(sessions.authenticate(&stale));
    }

    #[tokio::test]
    async fn update_profile_changes_credentials() {
        let sessions = service();
        sessions.register("a@x.com", "pw").await.unwrap();
        let session = sessions.login("a@x.com", "pw").await.unwrap();

        let user = sessions
            .update_profile(
                &session.access_token,
                Some("new@x.com".into()),
                Some("pw2".into()),
            )
            .await
            .unwrap();
        assert_eq!(user.email, "new@x.com");

        assert!(sessions.login("a@x.com", "pw").await.is_err());
        assert!(sessions.login("new@x.com", "pw").await.is_err());
        assert_ok!(sessions.login("new@x.com", "pw2").await);
    }

    #[tokio::test]
    async fn update_profile_onto_taken_email_fails() {
        let store = Arc::new(InMemoryStore::new());
        let sessions = service_with(store.clone(), SECRET);
        sessions.register("a@x.com", "pw").await.unwrap();
        sessions.register("b@x.com", "pw").await.unwrap();
        let session = sessions.login("a@x.com", "pw").await.unwrap();

        let err = sessions
            .update_profile(&session.access_token, Some("b@x.com".into()), Some("x".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail));

        assert_eq!(store.lookup_by_email("a@x.com").await, Ok(1));
        assert_eq!(store.lookup_by_email("b@x.com").await, Ok(2));
        assert_ok!(sessions.login("a@x.com", "pw").await);
    }

    #[tokio::test]
    async fn update_profile_for_unknown_subject_is_unauthorized() {
        let sessions = service();
        let orphan = TokenIssuer::new(SECRET)
            .issue(9, Duration::hours(1), TokenKind::Access.issuer())
            .unwrap();
        let err = sessions
            .update_profile(&orphan, Some("x@x.com".into()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn upgrade_membership() {
        let store = Arc::new(InMemoryStore::new());
        let sessions = service_with(store.clone(), SECRET);
        let user = sessions.register("a@x.com", "pw").await.unwrap();

        sessions.upgrade_membership(user.id).await.unwrap();
        assert!(store.lookup_by_id(user.id).await.unwrap().is_chirpy_red);
        assert!(matches!(
            sessions.upgrade_membership(99).await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn oversized_refresh_ttl_fails_login_without_panicking() {
        let store = Arc::new(InMemoryStore::new());
        let config = Config {
            server_addr: "127.0.0.1:0".parse().unwrap(),
            jwt_secret: SECRET.to_string(),
            polka_key: String::new(),
            access_token_ttl_secs: 3600,
            refresh_token_ttl_secs: 100_000_000_000_000,
            log_level: "debug".to_string(),
        };
        let sessions = SessionService::from_config(&config, store.clone(), store);

        sessions.register("a@x.com", "pw").await.unwrap();
        let err = sessions.login("a@x.com", "pw").await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[tokio::test]
    async fn each_login_opens_a_separate_session() {
        let sessions = service();
        sessions.register("a@x.com", "pw").await.unwrap();
        let first = sessions.login("a@x.com", "pw").await.unwrap();
        let second = sessions.login("a@x.com", "pw").await.unwrap();
        assert_ne!(first.refresh_token, second.refresh_token);

        sessions.revoke(&first.refresh_token).await.unwrap();
        assert_ok!(sessions.refresh(&second.refresh_token).await);
    }
}
