//! Identity and Session
//!
//! An identity is the authenticated principal; a session pairs it with the
//! bearer token used for every owner-scoped call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{DomainError, DomainResult};
use super::id::OwnerId;

/// Authenticated principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: OwnerId,
    #[serde(default)]
    pub email: Option<String>,
    /// Display name from sign-up metadata
    #[serde(default)]
    pub name: Option<String>,
}

impl Identity {
    pub fn new(id: impl Into<OwnerId>) -> Self {
        Self {
            id: id.into(),
            email: None,
            name: None,
        }
    }
}

/// A live authenticated session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// None means the store did not report an expiry
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    pub user: Identity,
}

impl Session {
    pub fn new(access_token: impl Into<String>, user: Identity) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at: None,
            user,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    pub fn owner(&self) -> &OwnerId {
        &self.user.id
    }
}

/// Email + password sign-in input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        let email = self.email.trim();
        let valid_email = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
        if !valid_email {
            return Err(DomainError::Validation("a valid e-mail is required".to_string()));
        }
        if self.password.is_empty() {
            return Err(DomainError::Validation("password is required".to_string()));
        }
        Ok(())
    }
}

/// Sign-up input: credentials plus display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpForm {
    #[serde(flatten)]
    pub credentials: Credentials,
    #[serde(default)]
    pub name: String,
}

impl SignUpForm {
    pub fn validate(&self) -> DomainResult<()> {
        self.credentials.validate()?;
        if self.name.trim().is_empty() {
            return Err(DomainError::Validation("name is required".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_session_expiry() {
        let now = Utc::now();
        let mut session = Session::new("token", Identity::new("u-1"));
        assert!(!session.is_expired(now));

        session.expires_at = Some(now - Duration::seconds(1));
        assert!(session.is_expired(now));

        session.expires_at = Some(now + Duration::hours(1));
        assert!(!session.is_expired(now));
    }

    #[test]
    fn test_credentials_validation() {
        assert!(Credentials::new("a@b.co", "secret").validate().is_ok());
        assert!(Credentials::new("ab.co", "secret").validate().is_err());
        assert!(Credentials::new("@b.co", "secret").validate().is_err());
        assert!(Credentials::new("a@b.co", "").validate().is_err());
    }

    #[test]
    fn test_sign_up_requires_name() {
        let form = SignUpForm {
            credentials: Credentials::new("a@b.co", "secret"),
            name: "  ".to_string(),
        };
        assert_eq!(
            form.validate(),
            Err(DomainError::Validation("name is required".to_string()))
        );
    }

    #[test]
    fn test_missing_fields_reach_validation() {
        let creds: Credentials = serde_json::from_str(r#"{"email":"a@b.co"}"#).unwrap();
        assert_eq!(
            creds.validate().unwrap_err(),
            DomainError::Validation("password is required".to_string())
        );

        let form: SignUpForm =
            serde_json::from_str(r#"{"email":"a@b.co","password":"pw"}"#).unwrap();
        assert_eq!(
            form.validate().unwrap_err(),
            DomainError::Validation("name is required".to_string())
        );
    }
}
