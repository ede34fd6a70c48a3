//! HTTP transport for the marketplace backend.

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use zendulge_config::Config;

use super::adapters::Envelope;
use super::error::{map_status_code, GatewayError};
use super::session::Session;

const MAX_ERROR_BODY: usize = 200;

/// REST client bound to one backend and one auth [`Session`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    pub fn new(config: &Config, session: Session) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|err| GatewayError::Setup(err.to_string()))?;
        Ok(Self::with_client(http, config.normalized_base_url(), session))
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>, session: Session) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        let response = self.execute(Method::GET, path, self.request(Method::GET, path)).await?;
        decode(response).await
    }

    pub(crate) async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(method.clone(), path).json(body);
        let response = self.execute(method, path, builder).await?;
        decode(response).await
    }

    /// Sends a request whose response body is ignored.
    pub(crate) async fn send_unit<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), GatewayError>
    where
        B: Serialize + ?Sized,
    {
        let mut builder = self.request(method.clone(), path);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.execute(method, path, builder).await.map(|_| ())
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        builder: RequestBuilder,
    ) -> Result<Response, GatewayError> {
        debug!(%method, path, "api request");
        let response = builder.send().await.map_err(|err| {
            let error = GatewayError::from(err);
            warn!(%method, path, error = %error, "api request failed");
            error
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(%method, path, status = status.as_u16(), "api response");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = map_status_code(status, error_message(&body));
        warn!(%method, path, status = status.as_u16(), error = %error, "api request rejected");
        Err(error)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    let bytes = response.bytes().await?;
    let envelope: Envelope<T> = if bytes.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_value(Value::Null)?
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok(envelope.into_inner())
}

/// Pulls `message` or `error` out of an error body, falling back to the raw
/// text.
fn error_message(body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        ["message", "error"].iter().find_map(|key| match value.get(key) {
            Some(Value::String(text)) => Some(text.clone()),
            Some(Value::Array(items)) => Some(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            _ => None,
        })
    });
    match from_json {
        Some(message) => message,
        None => body.trim().chars().take(MAX_ERROR_BODY).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_structured_fields() {
        assert_eq!(error_message(r#"{"message":"Name taken"}"#), "Name taken");
        assert_eq!(error_message(r#"{"error":"Bad token"}"#), "Bad token");
        assert_eq!(
            error_message(r#"{"message":["name must not be empty","postcode invalid"]}"#),
            "name must not be empty; postcode invalid"
        );
        assert_eq!(error_message("  gateway down \n"), "gateway down");
    }

    #[test]
    fn urls_join_without_double_slashes() {
        let client = ApiClient::with_client(
            reqwest::Client::new(),
            "http://localhost:3000/api/",
            Session::new(),
        );
        assert_eq!(client.url("/businesses/b1/sites"), "http://localhost:3000/api/businesses/b1/sites");
        assert_eq!(client.url("auth/login"), "http://localhost:3000/api/auth/login");
    }
}
