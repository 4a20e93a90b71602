//! HTTP client for dashboard API requests.
//!
//! This module provides a low-level HTTP client wrapper for making requests
//! to the platform API, handling authentication, status checks, and response
//! parsing.

use super::error::ApiError;
use crate::session::Session;
use log::*;
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Makes requests to the API and tries to conform response data to the
/// requested type.
///
pub struct Client {
    base_url: String,
    session: Arc<Session>,
    http_client: reqwest::Client,
}

impl Client {
    /// Returns a new instance for the given base URL and session.
    ///
    pub fn new(base_url: &str, session: Arc<Session>) -> Result<Self, ApiError> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Client {
            base_url: base_url.trim_end_matches('/').to_owned(),
            session,
            http_client,
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Make a GET request and deserialize the body.
    ///
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let response = self.call(Method::GET, path, params, None).await?;
        parse(response).await
    }

    /// Make a request with an optional JSON body and deserialize the answer.
    ///
    pub async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, ApiError> {
        let response = self.call(method, path, &[], body).await?;
        parse(response).await
    }

    /// Make request and return the successful response or an error.
    ///
    async fn call(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
        body: Option<serde_json::Value>,
    ) -> Result<Response, ApiError> {
        let token = self.session.token().ok_or(ApiError::NotAuthenticated)?;
        let request_url = format!("{}/{}", &self.base_url, path.trim_start_matches('/'));
        debug!("{} {} {:?}", method, request_url, params);

        let mut request = self
            .http_client
            .request(method, &request_url)
            .bearer_auth(token);
        if !params.is_empty() {
            request = request.query(params);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            error!("API rejected credentials for {}", request_url);
            self.session.expire();
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let response_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("Unable to read response"));
            let message = error_message(&response_text);
            error!("API request failed with status {}: {}", status, message);
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }
}

async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let response_bytes = response.bytes().await?;
    serde_json::from_slice::<T>(&response_bytes).map_err(|e| {
        error!(
            "Failed to deserialize API response: {}. Response body: {}",
            e,
            String::from_utf8_lossy(&response_bytes)
        );
        ApiError::Deserialization(e)
    })
}

/// Pull the `message` out of an error body, falling back to the raw text.
///
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_owned)
        })
        .unwrap_or_else(|| body.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message() {
        assert_eq!(error_message(r#"{"message":"Course not found"}"#), "Course not found");
        assert_eq!(error_message("Bad gateway"), "Bad gateway");
        assert_eq!(error_message(r#"{"error":"x"}"#), r#"{"error":"x"}"#);
    }

    #[tokio::test]
    async fn test_call_without_token() {
        let client = Client::new("http://127.0.0.1:9", Arc::new(Session::in_memory(None))).unwrap();
        let result: Result<serde_json::Value, ApiError> = client.get("courses", &[]).await;
        assert!(matches!(result, Err(ApiError::NotAuthenticated)));
    }
}
