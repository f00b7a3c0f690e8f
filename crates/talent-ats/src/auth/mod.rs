//! Admin authentication: one hashed credential and in-process bearer sessions.

mod password;
pub mod router;

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::config::{AuthConfig, MAX_SESSION_TTL_MINUTES};

pub use password::{
    hash_password, hash_password_with_salt, is_password_hash, verify_password, PasswordError,
};
pub use router::{auth_router, require_admin};

/// An authenticated admin session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("admin login is not configured")]
    LoginDisabled,
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid or expired session")]
    InvalidToken,
    #[error("session expiry is out of range")]
    ExpiryOutOfRange,
}

#[derive(Debug, Clone)]
struct AdminCredential {
    username: String,
    password_hash: String,
}

pub struct AuthService {
    admin: Option<AdminCredential>,
    ttl: Duration,
    sessions: RwLock<HashMap<String, Session>>,
}

impl AuthService {
    pub fn new(config: &AuthConfig) -> Self {
        let admin = config
            .admin_password_hash
            .as_ref()
            .map(|password_hash| AdminCredential {
                username: config.admin_username.clone(),
                password_hash: password_hash.clone(),
            });
        match &admin {
            None => tracing::warn!("ADMIN_PASSWORD_HASH not set; admin endpoints are locked"),
            Some(admin) if !is_password_hash(&admin.password_hash) => {
                tracing::warn!("ADMIN_PASSWORD_HASH is not a PHC string; admin login will fail")
            }
            Some(_) => {}
        }

        let minutes = config
            .session_ttl_minutes
            .clamp(1, MAX_SESSION_TTL_MINUTES);
        Self {
            admin,
            ttl: Duration::try_minutes(minutes).unwrap_or(Duration::hours(8)),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn login(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<Session, AuthError> {
        let admin = self.admin.as_ref().ok_or(AuthError::LoginDisabled)?;

        let username_matches = username.trim() == admin.username;
        let password_matches = verify_password(password, &admin.password_hash);
        if !(username_matches && password_matches) {
            tracing::warn!(username = %username.trim(), "rejected admin login");
            return Err(AuthError::InvalidCredentials);
        }

        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or(AuthError::ExpiryOutOfRange)?;
        let session = Session {
            token: new_token(),
            username: admin.username.clone(),
            expires_at,
        };

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, existing| existing.expires_at > now);
        sessions.insert(session.token.clone(), session.clone());
        tracing::info!(username = %session.username, "admin session opened");
        Ok(session)
    }

    /// Resolves a bearer token; expired sessions are dropped on sight.
    pub async fn authorize(&self, token: &str, now: DateTime<Utc>) -> Result<Session, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let session = self.sessions.read().await.get(token).cloned();
        match session {
            Some(session) if session.expires_at > now => Ok(session),
            Some(_) => {
                self.sessions.write().await.remove(token);
                Err(AuthError::InvalidToken)
            }
            None => Err(AuthError::InvalidToken),
        }
    }

    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        self.sessions
            .write()
            .await
            .remove(token.trim())
            .map(|_| ())
            .ok_or(AuthError::InvalidToken)
    }
}

fn new_token() -> String {
    format!(
        "{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(ttl_minutes: i64) -> AuthService {
        AuthService::new(&AuthConfig {
            admin_username: "hr-admin".to_string(),
            admin_password_hash: Some(
                hash_password_with_salt("s3cret!", "fixed-salt").expect("hashed"),
            ),
            session_ttl_minutes: ttl_minutes,
        })
    }

    #[tokio::test]
    async fn login_issues_session_that_authorizes() {
        let auth = service(30);
        let now = Utc::now();
        let session = auth.login("hr-admin", "s3cret!", now).await.expect("login");
        assert_eq!(session.expires_at, now + Duration::minutes(30));

        let resolved = auth.authorize(&session.token, now).await.expect("valid");
        assert_eq!(resolved.username, "hr-admin");
    }

    #[tokio::test]
    async fn wrong_password_or_user_is_rejected() {
        let auth = service(30);
        let now = Utc::now();
        assert_eq!(
            auth.login("hr-admin", "admin123", now).await,
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            auth.login("admin", "s3cret!", now).await,
            Err(AuthError::InvalidCredentials)
        );
    }

    #[tokio::test]
    async fn sessions_expire_and_can_be_revoked() {
        let auth = service(10);
        let now = Utc::now();
        let session = auth.login("hr-admin", "s3cret!", now).await.expect("login");
        assert_eq!(
            auth.authorize(&session.token, now + Duration::minutes(11)).await,
            Err(AuthError::InvalidToken)
        );

        let session = auth.login("hr-admin", "s3cret!", now).await.expect("login");
        auth.logout(&session.token).await.expect("logout");
        assert_eq!(
            auth.authorize(&session.token, now).await,
            Err(AuthError::InvalidToken)
        );
    }

    #[tokio::test]
    async fn oversized_ttl_is_capped_instead_of_overflowing() {
        let auth = service(100_000_000_000_000);
        let now = Utc::now();
        let session = auth.login("hr-admin", "s3cret!", now).await.expect("login");
        assert_eq!(
            session.expires_at,
            now + Duration::minutes(MAX_SESSION_TTL_MINUTES)
        );
    }

    #[tokio::test]
    async fn expiry_past_the_calendar_is_refused() {
        let auth = service(60);
        assert_eq!(
            auth.login("hr-admin", "s3cret!", DateTime::<Utc>::MAX_UTC).await,
            Err(AuthError::ExpiryOutOfRange)
        );
    }

    #[tokio::test]
    async fn login_is_disabled_without_a_hash() {
        let auth = AuthService::new(&AuthConfig {
            admin_username: "admin".to_string(),
            admin_password_hash: None,
            session_ttl_minutes: 30,
        });
        assert_eq!(
            auth.login("admin", "admin123", Utc::now()).await,
            Err(AuthError::LoginDisabled)
        );
    }
}
