//! Authenticated requests and response envelope validation.
//!
//! Every JSON response is an [`Envelope`]. A response is accepted only when
//! the HTTP status is 2xx and the envelope says `success`; anything else
//! becomes [`ApiError::NotFound`] (404) or [`ApiError::Rejected`].

use chino_protocol::{DeleteOptions, Envelope, ListResult, Paging, ResultKind};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::auth::ApiSession;
use crate::config::ClientConfig;
use crate::error::ApiError;

/// Message used when an error response carries no readable envelope.
const SERVER_ERROR: &str = "something went wrong with the server";

/// Characters left as-is in a path segment (RFC 3986 unreserved).
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encodes one path segment, such as a resource id.
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Low-level API client shared by the resource clients.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    root: String,
    session: ApiSession,
}

impl HttpClient {
    /// Builds a client for the host and version in `config`.
    pub fn new(config: &ClientConfig, session: ApiSession) -> Result<Self, ApiError> {
        let root = config.api_root()?;
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("chino-rust/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            root,
            session,
        })
    }

    /// Same connection pool, different credentials holder.
    pub fn with_session(&self, session: ApiSession) -> Self {
        Self {
            http: self.http.clone(),
            root: self.root.clone(),
            session,
        }
    }

    pub fn session(&self) -> &ApiSession {
        &self.session
    }

    /// API root, ending in `/`.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Absolute URL of `path` (relative to the API root).
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.root, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder, ApiError> {
        let req = self.http.request(method, self.url(path));
        match self.session.credentials() {
            Some(credentials) => credentials.apply(req),
            None => Ok(req),
        }
    }

    /// Sends a request and validates the response envelope.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        req: reqwest::RequestBuilder,
    ) -> Result<Envelope, ApiError> {
        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await?;
        debug!(%method, path, status, bytes = body.len(), "api response");
        interpret(status, &body, path)
    }

    /// Sends a JSON request and returns the envelope `data` as `T`.
    ///
    /// A success envelope without `data` is an error; use
    /// [`call_empty`](Self::call_empty) for endpoints that return none.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<T, ApiError> {
        let envelope = self.call_envelope(method, path, query, body).await?;
        Ok(envelope.require_data()?)
    }

    /// Like [`call`](Self::call) but discards any payload.
    pub async fn call_empty(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<(), ApiError> {
        self.call_envelope(method, path, query, body).await?;
        Ok(())
    }

    async fn call_envelope(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<Envelope, ApiError> {
        let mut req = self.request(method.clone(), path)?;
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        self.execute(method, path, req).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.call(Method::GET, path, &[], None).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body)?;
        self.call(Method::POST, path, &[], Some(&body)).await
    }

    /// Fetches one page of a list endpoint.
    ///
    /// `items_key` names the array inside `data` (`documents`, `users`, ...).
    pub async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        items_key: &str,
        paging: Paging,
    ) -> Result<ListResult<T>, ApiError> {
        let data: serde_json::Value = self
            .call(Method::GET, path, &paging.as_query(), None)
            .await?;
        Ok(ListResult::from_data(data, items_key)?)
    }

    /// Deletes a resource. Only flags that are set are sent, as `"true"`.
    pub async fn delete_resource(&self, path: &str, options: DeleteOptions) -> Result<(), ApiError> {
        self.call_empty(Method::DELETE, path, &options.as_query(), None)
            .await
    }

    /// `PUT` of a raw body with extra headers.
    pub async fn put_bytes(
        &self,
        path: &str,
        headers: &[(&'static str, String)],
        content_type: &'static str,
        body: Vec<u8>,
    ) -> Result<(), ApiError> {
        let mut req = self
            .request(Method::PUT, path)?
            .header(CONTENT_TYPE, content_type);
        for (name, value) in headers {
            req = req.header(*name, value.as_str());
        }
        self.execute(Method::PUT, path, req.body(body)).await?;
        Ok(())
    }

    /// `GET` of a binary resource, returning headers and body.
    ///
    /// Error responses are still JSON envelopes and are mapped as usual.
    pub async fn get_raw(&self, path: &str) -> Result<(HeaderMap, Vec<u8>), ApiError> {
        let resp = self.request(Method::GET, path)?.send().await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await?;
        debug!(method = "GET", path, status = status.as_u16(), bytes = body.len(), "api response");

        if !status.is_success() {
            return Err(failure(status.as_u16(), &body, path));
        }
        Ok((headers, body.to_vec()))
    }
}

/// Validates a JSON response.
fn interpret(status: u16, body: &[u8], path: &str) -> Result<Envelope, ApiError> {
    if !(200..300).contains(&status) {
        return Err(failure(status, body, path));
    }
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Envelope {
            result: ResultKind::Success,
            result_code: Some(status),
            data: None,
            message: None,
        });
    }

    let envelope: Envelope = serde_json::from_slice(body)?;
    if envelope.is_success() {
        Ok(envelope)
    } else {
        Err(ApiError::Rejected {
            status: envelope.result_code.unwrap_or(status),
            kind: envelope.result,
            message: envelope.failure_message(),
        })
    }
}

/// Error for a non-2xx response.
fn failure(status: u16, body: &[u8], path: &str) -> ApiError {
    let envelope = serde_json::from_slice::<Envelope>(body).ok();
    if status == 404 {
        let detail = envelope
            .map(|e| e.failure_message())
            .filter(|m| !m.is_empty());
        return ApiError::NotFound(match detail {
            Some(m) => format!("{path} ({m})"),
            None => path.to_string(),
        });
    }

    match envelope {
        Some(envelope) => {
            let message = envelope.failure_message();
            ApiError::Rejected {
                status,
                kind: match envelope.result {
                    ResultKind::Success => ResultKind::Error,
                    kind => kind,
                },
                message: if message.is_empty() {
                    SERVER_ERROR.into()
                } else {
                    message
                },
            }
        }
        None => ApiError::Rejected {
            status,
            kind: ResultKind::Error,
            message: SERVER_ERROR.into(),
        },
    }
}
