// Outbound HTTP abstraction.
//
// Verifiers and the key cache call providers through this trait so that
// every call carries an explicit timeout and tests can script responses.
// `ReqwestHttpClient` is the production implementation; `MockHttpClient`
// plays the role the in-memory store plays for persistence.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json(&self) -> Result<serde_json::Value, HttpClientError> {
        serde_json::from_str(&self.body).map_err(|e| HttpClientError::Body(e.to_string()))
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum HttpClientError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid response body: {0}")]
    Body(String),
}

/// A GET with headers, query parameters, and a hard timeout. This is the
/// entire surface the engine needs from an HTTP stack.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        params: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<HttpResponse, HttpClientError>;
}

/// Production client backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        params: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<HttpResponse, HttpClientError> {
        let mut request = self.client.get(url).timeout(timeout);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        if !params.is_empty() {
            request = request.query(params);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                HttpClientError::Timeout(timeout)
            } else {
                HttpClientError::Transport(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| HttpClientError::Body(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}

/// A request as the mock saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub params: Vec<(String, String)>,
}

/// Scripted HTTP client for tests: queue responses in order, then inspect
/// what was requested.
#[derive(Debug, Default)]
pub struct MockHttpClient {
    responses: Mutex<VecDeque<Result<HttpResponse, HttpClientError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response to serve on the next call.
    pub fn push_response(&self, status: u16, body: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(HttpResponse {
                status,
                body: body.into(),
            }));
    }

    /// Queue a transport-level failure.
    pub fn push_error(&self, error: HttpClientError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Every request issued so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        params: &[(&str, &str)],
        _timeout: Duration,
    ) -> Result<HttpResponse, HttpClientError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            url: url.to_string(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(HttpClientError::Transport(
                    "no scripted response".to_string(),
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_serves_responses_in_order() {
        let mock = MockHttpClient::new();
        mock.push_response(200, "first");
        mock.push_response(404, "second");

        let r1 = mock
            .get("https://a.example", &[], &[], Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(r1.status, 200);
        assert_eq!(r1.body, "first");
        assert!(r1.is_success());

        let r2 = mock
            .get("https://b.example", &[], &[], Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(r2.status, 404);
        assert!(!r2.is_success());
    }

    #[tokio::test]
    async fn test_mock_records_requests() {
        let mock = MockHttpClient::new();
        mock.push_response(200, "{}");

        mock.get(
            "https://graph.example/me",
            &[("Authorization", "Bearer t")],
            &[("fields", "id,email")],
            Duration::from_secs(1),
        )
        .await
        .unwrap();

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "https://graph.example/me");
        assert_eq!(requests[0].headers[0].0, "Authorization");
        assert_eq!(requests[0].params[0], ("fields".to_string(), "id,email".to_string()));
    }

    #[tokio::test]
    async fn test_mock_without_script_fails() {
        let mock = MockHttpClient::new();
        let result = mock
            .get("https://a.example", &[], &[], Duration::from_secs(1))
            .await;
        assert!(matches!(result, Err(HttpClientError::Transport(_))));
    }

    #[test]
    fn test_response_json_parsing() {
        let response = HttpResponse {
            status: 200,
            body: "{\"id\":\"5\"}".to_string(),
        };
        assert_eq!(response.json().unwrap()["id"], "5");

        let garbage = HttpResponse {
            status: 200,
            body: "not json".to_string(),
        };
        assert!(matches!(garbage.json(), Err(HttpClientError::Body(_))));
    }
}
