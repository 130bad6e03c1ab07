use std::time::Duration;
use reqwest::Client;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use url::Url;
use crate::core::{CallbackResponse, DevHookError, Result};

/// 对 reqwest 的薄封装，把失败统一成 DevHookError
#[derive(Debug, Clone, Default)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| DevHookError::internal(format!("failed to build http client: {}", e)))?;
        Ok(Self { client })
    }

    /// GET 并把响应体解码为 `T`
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str, token: &str) -> Result<T> {
        let fetch_error = |source: reqwest::Error| DevHookError::Fetch {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(fetch_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DevHookError::PollStatus {
                status_code: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await.map_err(fetch_error)?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// POST 原始请求体，只返回状态码与响应头
    pub async fn post(&self, url: &Url, headers: HeaderMap, body: String) -> Result<CallbackResponse> {
        let response = self
            .client
            .post(url.clone())
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|source| DevHookError::Fetch {
                url: url.to_string(),
                source,
            })?;

        Ok(CallbackResponse::new(response.status(), response.headers().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_get_json_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/poll"))
            .and(header("authorization", "Bearer jwt-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true })))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new();
        let body: Value = client
            .get_json(&format!("{}/poll", server.uri()), "jwt-123")
            .await
            .unwrap();
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_get_json_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let result: Result<Value> = HttpClient::new().get_json(&server.uri(), "t").await;
        assert!(matches!(result, Err(DevHookError::Decode(_))));
    }

    #[tokio::test]
    async fn test_get_json_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad token"))
            .mount(&server)
            .await;

        let result: Result<Value> = HttpClient::new().get_json(&server.uri(), "t").await;
        match result {
            Err(DevHookError::PollStatus { status_code, message }) => {
                assert_eq!(status_code, 401);
                assert_eq!(message, "bad token");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_post_unreachable_is_fetch_error() {
        let url = Url::parse("http://127.0.0.1:1/hook").unwrap();
        let result = HttpClient::new().post(&url, HeaderMap::new(), String::new()).await;
        assert!(matches!(result, Err(DevHookError::Fetch { .. })));
    }
}
