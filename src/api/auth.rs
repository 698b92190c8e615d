//! Authentication endpoints
//!
//! A successful login or registration stores the returned session, after
//! which every request carries `Authorization: Bearer <token>`. Logout only
//! forgets the local session; the service keeps no server-side state for it.

use super::ApiClient;
use crate::error::{Error, Result};
use crate::types::{LoginRequest, RegisterRequest, Session};

impl ApiClient {
    /// Log in and persist the returned session
    ///
    /// # Errors
    /// `Error::Http` for rejected credentials, `Error::Parse` if the response
    /// carries no token
    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let session: Session = self.post("auth/login", &body).await?;
        self.store_session(session, username)
    }

    /// Create an account and persist the returned session
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<Session> {
        let body = RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let session: Session = self.post("auth/register", &body).await?;
        self.store_session(session, username)
    }

    /// Forget the stored session
    pub fn logout(&self) -> Result<()> {
        self.session_store().clear()?;
        tracing::info!("logged out");
        Ok(())
    }

    /// Session currently stored, if any
    pub fn current_session(&self) -> Option<Session> {
        self.session_store().load()
    }

    /// True when a session with a usable token is stored
    pub fn is_authenticated(&self) -> bool {
        self.current_session()
            .is_some_and(|s| s.bearer_token().is_some())
    }

    fn store_session(&self, session: Session, username: &str) -> Result<Session> {
        if session.bearer_token().is_none() {
            return Err(Error::Parse("auth response carried no token".to_string()));
        }
        self.session_store().save(&session)?;
        tracing::info!(username = %username, "session established");
        Ok(session)
    }
}
