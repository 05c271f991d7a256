//! Top-level client.

use tracing::info;

use crate::auth::{ApiSession, Credentials};
use crate::blobs::BlobsApi;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::HttpClient;

/// Entry point: one shared session, one connection pool, one sub-client
/// per resource family.
#[derive(Debug, Clone)]
pub struct ChinoClient {
    session: ApiSession,
    http: HttpClient,
    blobs: BlobsApi,
}

impl ChinoClient {
    /// Builds a client. Explicit `credentials` override the config's `[auth]` table.
    pub fn new(config: &ClientConfig, credentials: Option<Credentials>) -> Result<Self, ApiError> {
        let session = ApiSession::new(credentials.or_else(|| config.credentials()));
        let http = HttpClient::new(config, session.clone())?;
        let blobs = BlobsApi::new(http.clone(), config);

        info!(
            root = http.root(),
            authenticated = session.is_authenticated(),
            "chino client ready"
        );

        Ok(Self {
            session,
            http,
            blobs,
        })
    }

    pub fn session(&self) -> &ApiSession {
        &self.session
    }

    /// Raw API access for endpoints without a dedicated client.
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn blobs(&self) -> &BlobsApi {
        &self.blobs
    }

    /// Switches every sub-client to `credentials`.
    pub fn set_credentials(&self, credentials: Credentials) {
        self.session.set_credentials(credentials);
    }

    pub fn clear_credentials(&self) {
        self.session.clear_credentials();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;
    use crate::testing::{MockResponse, MockServer};

    #[test]
    fn config_credentials_are_used_by_default() {
        let config = ClientConfig {
            auth: Some(AuthConfig {
                access_token: Some("tok".into()),
                ..AuthConfig::default()
            }),
            ..ClientConfig::default()
        };

        let client = ChinoClient::new(&config, None).unwrap();
        assert_eq!(
            client.session().credentials(),
            Some(Credentials::AccessToken("tok".into()))
        );

        let explicit = ChinoClient::new(&config, Some(Credentials::Bearer("b".into()))).unwrap();
        assert_eq!(
            explicit.session().credentials(),
            Some(Credentials::Bearer("b".into()))
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let config = ClientConfig {
            base_url: "not a url".into(),
            ..ClientConfig::default()
        };
        assert!(matches!(
            ChinoClient::new(&config, None),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn login_is_seen_by_blobs() {
        let server = MockServer::start(vec![MockResponse::json(
            200,
            r#"{"result":"success","data":{"blob":{"upload_id":"u1"}}}"#,
        )])
        .await;
        let config = ClientConfig {
            base_url: server.url(),
            ..ClientConfig::default()
        };
        let client = ChinoClient::new(&config, None).unwrap();
        assert!(!client.session().is_authenticated());

        client.set_credentials(Credentials::Bearer("fresh".into()));
        let mut upload = client.blobs().session();
        upload.begin("d1", "f", "a.bin").await.unwrap();

        assert_eq!(
            server.requests()[0].header("authorization"),
            Some("Bearer fresh")
        );

        client.clear_credentials();
        assert!(!client.http().session().is_authenticated());
    }
}
