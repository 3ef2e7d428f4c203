//! Authentication Client
//!
//! Sign-up, sign-in and token management against the hosted auth API.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::domain::{
    Credentials, DomainError, DomainResult, Identity, NewProfile, OwnerId, Profile, Session,
    SignUpForm,
};
use crate::remote::check_response;
use crate::repository::{Repository, RestRepository};

/// Result of a sign-up. `session` is absent while the e-mail awaits
/// confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpOutcome {
    pub user: Identity,
    pub session: Option<Session>,
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn sign_up(&self, form: &SignUpForm) -> DomainResult<SignUpOutcome>;

    async fn sign_in(&self, credentials: &Credentials) -> DomainResult<Session>;

    /// Resolve the identity behind an access token
    async fn get_user(&self, access_token: &str) -> DomainResult<Identity>;

    async fn refresh(&self, refresh_token: &str) -> DomainResult<Session>;

    async fn sign_out(&self, access_token: &str) -> DomainResult<()>;
}

#[derive(Debug, Default, Deserialize)]
struct UserMetadata {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: OwnerId,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<UserMetadata>,
}

impl From<AuthUser> for Identity {
    fn from(user: AuthUser) -> Self {
        Identity {
            id: user.id,
            email: user.email,
            name: user.user_metadata.and_then(|m| m.name),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    /// Unix seconds
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .or_else(|| self.expires_in.map(|secs| now + Duration::seconds(secs)));
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user.into(),
        }
    }
}

pub struct RestAuthClient {
    client: Client,
    config: StoreConfig,
    profiles: RestRepository<Profile>,
}

impl RestAuthClient {
    pub fn new(client: Client, config: StoreConfig) -> Self {
        Self {
            profiles: RestRepository::new(client.clone(), config.clone()),
            client,
            config,
        }
    }

    async fn post(&self, path: &str, body: &Value) -> DomainResult<Value> {
        debug!(path, "auth request");
        let response = self
            .client
            .post(self.config.auth_url(path))
            .header("apikey", &self.config.api_key)
            .json(body)
            .send()
            .await?;
        Ok(check_response(response).await?.json::<Value>().await?)
    }

    async fn token(&self, grant_type: &str, body: &Value) -> DomainResult<Session> {
        let value = self
            .post(&format!("token?grant_type={}", grant_type), body)
            .await?;
        let token: TokenResponse = serde_json::from_value(value).map_err(DomainError::store)?;
        Ok(token.into_session(Utc::now()))
    }
}

#[async_trait]
impl Authenticator for RestAuthClient {
    async fn sign_up(&self, form: &SignUpForm) -> DomainResult<SignUpOutcome> {
        form.validate()?;
        let name = form.name.trim().to_string();
        let value = self
            .post(
                "signup",
                &json!({
                    "email": form.credentials.email.trim(),
                    "password": form.credentials.password,
                    "data": { "name": name },
                }),
            )
            .await?;

        // Auto-confirmed projects answer with a full session, the rest with
        // the bare user record.
        let outcome = if value.get("access_token").is_some() {
            let token: TokenResponse =
                serde_json::from_value(value).map_err(DomainError::store)?;
            let session = token.into_session(Utc::now());
            SignUpOutcome {
                user: session.user.clone(),
                session: Some(session),
            }
        } else {
            let user: AuthUser = serde_json::from_value(value).map_err(DomainError::store)?;
            SignUpOutcome {
                user: user.into(),
                session: None,
            }
        };

        if let Some(session) = &outcome.session {
            let profile = NewProfile { name };
            if let Err(err) = self.profiles.create(session, &profile).await {
                // The project may already create profiles with a trigger
                warn!(user = %session.owner(), "profile insert failed: {}", err);
            }
        }

        info!(user = %outcome.user.id, confirmed = outcome.session.is_some(), "signed up");
        Ok(outcome)
    }

    async fn sign_in(&self, credentials: &Credentials) -> DomainResult<Session> {
        credentials.validate()?;
        let session = self
            .token(
                "password",
                &json!({
                    "email": credentials.email.trim(),
                    "password": credentials.password,
                }),
            )
            .await?;
        info!(user = %session.owner(), "signed in");
        Ok(session)
    }

    async fn get_user(&self, access_token: &str) -> DomainResult<Identity> {
        let response = self
            .client
            .get(self.config.auth_url("user"))
            .header("apikey", &self.config.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            debug!(status = %response.status(), "access token rejected");
            return Err(DomainError::Unauthenticated);
        }
        let user: AuthUser = check_response(response).await?.json().await?;
        Ok(user.into())
    }

    async fn refresh(&self, refresh_token: &str) -> DomainResult<Session> {
        self.token("refresh_token", &json!({ "refresh_token": refresh_token }))
            .await
    }

    async fn sign_out(&self, access_token: &str) -> DomainResult<()> {
        let response = self
            .client
            .post(self.config.auth_url("logout"))
            .header("apikey", &self.config.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        check_response(response).await?;
        Ok(())
    }
}
