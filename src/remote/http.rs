use http::Uri;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub type Method = reqwest::Method;
pub type StatusCode = reqwest::StatusCode;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response (connect, TLS or timeout).
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The server replied with a non-success status.
    ///
    /// The raw response body is kept so callers can surface whatever
    /// diagnostics the remote attached to the failure.
    #[error("server replied with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The response body could not be decoded as the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(#[source] reqwest::Error),
}

#[derive(Debug, Clone)]
pub enum Auth {
    Bearer { token: String },
}

/// Thin typed wrapper over [reqwest::Client] carrying the request timeout
/// and authentication used for every call to the remote.
#[derive(Debug, Clone)]
pub struct Client {
    client: reqwest::Client,
    timeout: Duration,
    auth: Option<Auth>,
}

impl Client {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
            auth: None,
        }
    }

    pub fn auth(self, auth: Option<Auth>) -> Self {
        Self { auth, ..self }
    }

    pub async fn get<R>(&self, uri: &Uri) -> Result<R, ClientError>
    where
        R: DeserializeOwned,
    {
        let response = self.request(Method::GET, uri, |req| req).await?;
        response.json().await.map_err(ClientError::Decode)
    }

    pub async fn post<P, R>(&self, uri: &Uri, payload: &P) -> Result<R, ClientError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .request(Method::POST, uri, |req| req.json(payload))
            .await?;
        response.json().await.map_err(ClientError::Decode)
    }

    /// DELETE ignores any response body; the remote acknowledges with an
    /// empty 2xx and signals completion through later describe calls.
    pub async fn delete(&self, uri: &Uri) -> Result<(), ClientError> {
        self.request(Method::DELETE, uri, |req| req).await?;
        Ok(())
    }

    async fn request<D>(
        &self,
        method: Method,
        uri: &Uri,
        decorator: D,
    ) -> Result<reqwest::Response, ClientError>
    where
        D: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let mut request = self
            .client
            .request(method.clone(), uri.to_string())
            .timeout(self.timeout);

        if let Some(Auth::Bearer { token }) = &self.auth {
            request = request.bearer_auth(token);
        }

        let response = decorator(request)
            .send()
            .await
            .map_err(ClientError::Transport)?;

        let status = response.status();
        debug!(%method, %uri, status = status.as_u16(), "remote call");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }

        Ok(response)
    }
}
