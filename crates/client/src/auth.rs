//! Credentials and the shared session that carries them.

use std::sync::{Arc, RwLock};

use chino_protocol::constants::ACCESS_TOKEN_USER;
use reqwest::header::{AUTHORIZATION, HeaderValue};

use crate::error::ApiError;

/// How requests authenticate.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// HTTP Basic with the customer id and key (administrative access).
    Customer {
        customer_id: String,
        customer_key: String,
    },
    /// HTTP Basic with the `ACCESS_TOKEN` username and a user token.
    AccessToken(String),
    /// `Authorization: Bearer <token>`.
    Bearer(String),
}

impl Credentials {
    pub fn customer(customer_id: impl Into<String>, customer_key: impl Into<String>) -> Self {
        Credentials::Customer {
            customer_id: customer_id.into(),
            customer_key: customer_key.into(),
        }
    }

    /// Adds the authentication header to `req`.
    pub(crate) fn apply(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, ApiError> {
        Ok(match self {
            Credentials::Customer {
                customer_id,
                customer_key,
            } => req.basic_auth(customer_id, Some(customer_key)),
            Credentials::AccessToken(token) => req.basic_auth(ACCESS_TOKEN_USER, Some(token)),
            Credentials::Bearer(token) => {
                let value = HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|_| ApiError::InvalidCredentials)?;
                req.header(AUTHORIZATION, value)
            }
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Customer { customer_id, .. } => f
                .debug_struct("Customer")
                .field("customer_id", customer_id)
                .field("customer_key", &"<redacted>")
                .finish(),
            Credentials::AccessToken(_) => f.write_str("AccessToken(<redacted>)"),
            Credentials::Bearer(_) => f.write_str("Bearer(<redacted>)"),
        }
    }
}

/// Shared, reference-counted credential holder.
///
/// Clones observe the same credentials. Use [`snapshot`](Self::snapshot)
/// to freeze the current credentials for a long-running upload so a
/// concurrent login/logout cannot change them mid-transfer.
#[derive(Clone, Default)]
pub struct ApiSession {
    inner: Arc<RwLock<Option<Credentials>>>,
}

impl ApiSession {
    pub fn new(credentials: Option<Credentials>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(credentials)),
        }
    }

    pub fn set_credentials(&self, credentials: Credentials) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(credentials);
    }

    pub fn clear_credentials(&self) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }

    /// Current credentials, if any.
    pub fn credentials(&self) -> Option<Credentials> {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Independent session holding a copy of the current credentials.
    pub fn snapshot(&self) -> ApiSession {
        ApiSession::new(self.credentials())
    }
}

impl std::fmt::Debug for ApiSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiSession")
            .field("credentials", &self.credentials())
            .finish()
    }
}
