//! Session Context
//!
//! The single place that knows whether someone is signed in. It is handed
//! to repositories explicitly; nothing reads session state globally.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::auth::Authenticator;
use crate::domain::{Credentials, DomainError, DomainResult, Identity, Session};
use crate::session_file::SessionFile;

/// Resolves the caller's identity before any owner-scoped operation.
#[async_trait]
pub trait SessionGuard: Send + Sync {
    /// The live session, or `Unauthenticated` when there is none or it has
    /// expired.
    async fn current_session(&self) -> DomainResult<Session>;

    async fn current_user(&self) -> DomainResult<Identity> {
        Ok(self.current_session().await?.user)
    }
}

/// Shared, explicitly managed session state
#[derive(Clone, Default)]
pub struct SessionContext {
    current: Arc<RwLock<Option<Session>>>,
    file: Option<Arc<SessionFile>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A context that starts out signed in
    pub fn signed_in(session: Session) -> Self {
        Self {
            current: Arc::new(RwLock::new(Some(session))),
            file: None,
        }
    }

    /// Persist every established session to `file`
    pub fn with_file(mut self, file: SessionFile) -> Self {
        self.file = Some(Arc::new(file));
        self
    }

    pub async fn is_signed_in(&self) -> bool {
        self.current_session().await.is_ok()
    }

    /// Load a previously saved session. Expired or unreadable sessions are
    /// discarded.
    pub async fn restore(&self) -> Option<Identity> {
        let file = self.file.as_ref()?;
        let session = match file.load().await {
            Ok(Some(session)) => session,
            Ok(None) => return None,
            Err(err) => {
                warn!(path = %file.path().display(), "discarding saved session: {}", err);
                self.clear_file().await;
                return None;
            }
        };

        if session.is_expired(Utc::now()) {
            debug!(user = %session.owner(), "saved session expired");
            self.clear_file().await;
            return None;
        }

        let user = session.user.clone();
        *self.current.write().await = Some(session);
        info!(user = %user.id, "session restored");
        Some(user)
    }

    /// Make `session` the current one
    pub async fn establish(&self, session: Session) -> Identity {
        if let Some(file) = &self.file {
            if let Err(err) = file.save(&session).await {
                warn!(path = %file.path().display(), "could not save session: {}", err);
            }
        }
        let user = session.user.clone();
        *self.current.write().await = Some(session);
        user
    }

    pub async fn sign_in(
        &self,
        auth: &dyn Authenticator,
        credentials: &Credentials,
    ) -> DomainResult<Identity> {
        let session = auth.sign_in(credentials).await?;
        Ok(self.establish(session).await)
    }

    /// Exchange the refresh token for a new session. Works on an expired
    /// session as long as a refresh token is held.
    pub async fn refresh(&self, auth: &dyn Authenticator) -> DomainResult<Identity> {
        let refresh_token = self
            .current
            .read()
            .await
            .as_ref()
            .and_then(|s| s.refresh_token.clone())
            .ok_or(DomainError::Unauthenticated)?;

        let session = auth.refresh(&refresh_token).await?;
        debug!(user = %session.owner(), "session refreshed");
        Ok(self.establish(session).await)
    }

    /// Drop the current session locally
    pub async fn expire(&self) {
        if self.current.write().await.take().is_some() {
            debug!("session expired");
        }
        self.clear_file().await;
    }

    /// Revoke the session at the store and forget it locally. The local
    /// session is gone even when revocation fails.
    pub async fn sign_out(&self, auth: &dyn Authenticator) -> DomainResult<()> {
        let session = self.current.write().await.take();
        self.clear_file().await;
        match session {
            Some(session) => {
                info!(user = %session.owner(), "signing out");
                auth.sign_out(&session.access_token).await
            }
            None => Ok(()),
        }
    }

    async fn clear_file(&self) {
        if let Some(file) = &self.file {
            if let Err(err) = file.clear().await {
                warn!(path = %file.path().display(), "could not remove session file: {}", err);
            }
        }
    }
}

#[async_trait]
impl SessionGuard for SessionContext {
    async fn current_session(&self) -> DomainResult<Session> {
        match self.current.read().await.as_ref() {
            Some(session) if !session.is_expired(Utc::now()) => Ok(session.clone()),
            _ => Err(DomainError::Unauthenticated),
        }
    }
}
