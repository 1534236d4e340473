//! Blocking JSON transport over `ureq`.

use serde::{de::DeserializeOwned, Serialize};

use promo_sync::RemoteError;

use crate::config::ClientConfig;

/// Longest slice of an unstructured error body kept in messages.
const BODY_PREVIEW_CHARS: usize = 200;

pub struct HttpTransport {
    agent: ureq::Agent,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(config.timeout).build();
        Self {
            agent,
            base_url: config.base_url.clone(),
            auth_token: config.auth_token.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, RemoteError> {
        tracing::debug!("GET {path}");
        let response = self
            .request("GET", path)
            .call()
            .map_err(|e| map_error("GET", path, e))?;
        read_json(response, path)
    }

    pub fn send<B: Serialize, T: DeserializeOwned>(
        &self,
        method: &str,
        path: &str,
        body: &B,
    ) -> Result<T, RemoteError> {
        tracing::debug!("{method} {path}");
        let response = self
            .request(method, path)
            .send_json(body)
            .map_err(|e| map_error(method, path, e))?;
        read_json(response, path)
    }

    /// Like [`send`](Self::send) for endpoints whose reply carries nothing useful.
    pub fn send_unit<B: Serialize>(&self, method: &str, path: &str, body: &B) -> Result<(), RemoteError> {
        tracing::debug!("{method} {path}");
        self.request(method, path)
            .send_json(body)
            .map_err(|e| map_error(method, path, e))?;
        Ok(())
    }

    pub fn delete(&self, path: &str) -> Result<(), RemoteError> {
        tracing::debug!("DELETE {path}");
        self.request("DELETE", path)
            .call()
            .map_err(|e| map_error("DELETE", path, e))?;
        Ok(())
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        let url = format!("{}{}", self.base_url, path);
        let request = self
            .agent
            .request(method, &url)
            .set("Accept", "application/json");
        match &self.auth_token {
            Some(token) => request.set("Authorization", &format!("Bearer {token}")),
            None => request,
        }
    }
}

fn read_json<T: DeserializeOwned>(response: ureq::Response, path: &str) -> Result<T, RemoteError> {
    let body = response
        .into_string()
        .map_err(|e| RemoteError::Transport(format!("reading reply of {path}: {e}")))?;
    let body = if body.trim().is_empty() { "{}" } else { body.as_str() };
    serde_json::from_str(body).map_err(|e| RemoteError::MalformedResponse(format!("{path}: {e}")))
}

fn map_error(method: &str, path: &str, error: ureq::Error) -> RemoteError {
    match error {
        ureq::Error::Status(status, response) => {
            let status_text = response.status_text().to_string();
            let body = response.into_string().unwrap_or_default();
            let message = error_message(&body).unwrap_or_else(|| {
                if body.trim().is_empty() {
                    status_text
                } else {
                    body.chars().take(BODY_PREVIEW_CHARS).collect()
                }
            });
            tracing::warn!("{method} {path} -> {status}: {message}");
            RemoteError::Http { status, message }
        }
        ureq::Error::Transport(transport) => RemoteError::Transport(transport.to_string()),
    }
}

/// The `message` field of a JSON error body, when there is one.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_field_is_extracted() {
        assert_eq!(
            error_message(r#"{"code": 3, "message": "slot not available"}"#).as_deref(),
            Some("slot not available")
        );
        assert_eq!(error_message(r#"{"message": ""}"#), None);
        assert_eq!(error_message("<html>bad gateway</html>"), None);
    }
}
