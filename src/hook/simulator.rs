use std::sync::Arc;
use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};
use crate::config::{BackoffConfig, Config};
use crate::core::{
    CallbackPayload, CallbackResponse, DeliveryStatus, DevHookError, FileRecord, Result,
    SimulationId, SimulationOutcome, UploadDescriptor,
};
use super::client::HttpClient;
use super::dispatcher::{build_callback_url, dispatch, is_valid_response, raw_callback_url};
use super::poller::poll_until_done;
use super::signer::{sign_body, HmacSigner, PayloadSigner};

/// 开发模式下的回调模拟器
///
/// 轮询上传状态，完成后构造并签名回调，投递给开发者自己的服务器。
/// 每个上传是一条独立的顺序任务，实例可以被克隆并在多个任务间共享。
#[derive(Clone)]
pub struct DevHookSimulator {
    client: HttpClient,
    signer: Arc<dyn PayloadSigner>,
    backoff: BackoffConfig,
}

impl DevHookSimulator {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: HttpClient::new(),
            signer: Arc::new(HmacSigner::new(api_key)),
            backoff: BackoffConfig::default(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            client: HttpClient::with_timeout(config.request_timeout())?,
            signer: Arc::new(HmacSigner::new(config.api_key.clone())),
            backoff: config.backoff.clone(),
        })
    }

    pub fn with_client(mut self, client: HttpClient) -> Self {
        self.client = client;
        self
    }

    pub fn with_signer(mut self, signer: Arc<dyn PayloadSigner>) -> Self {
        self.signer = signer;
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }

    /// 运行一次完整的模拟
    ///
    /// 只有轮询确认 done 之后才会签名和投递。投递失败只记录日志，
    /// 返回的 outcome 中 delivery 为 `DeliveryFailed`；其余失败都是终止性错误，
    /// 在这里统一记录后返回。
    #[instrument(skip(self, descriptor), fields(id = %SimulationId::new(), key = %descriptor.key))]
    pub async fn simulate(&self, descriptor: UploadDescriptor) -> Result<SimulationOutcome> {
        let result = self.run(&descriptor).await;
        if let Err(e) = &result {
            error!(
                key = %descriptor.key,
                code = %e.code(),
                error = %e,
                "Failed to simulate callback for file '{}'",
                descriptor.key
            );
        }
        result
    }

    async fn run(&self, descriptor: &UploadDescriptor) -> Result<SimulationOutcome> {
        let (file, metadata) = poll_until_done(&self.client, descriptor, &self.backoff).await?;

        let target = build_callback_url(&file.callback_url, &file.callback_slug);
        let callback_url = match &target {
            Ok(url) => url.to_string(),
            Err(_) => raw_callback_url(&file.callback_url, &file.callback_slug),
        };
        info!(callback_url = %callback_url, "SIMULATING FILE UPLOAD WEBHOOK CALLBACK");

        let record = FileRecord::from_poll_file(&file, &descriptor.key);
        let payload = CallbackPayload::uploaded(record.clone(), metadata);
        let body = serde_json::to_string(&payload)
            .map_err(|e| DevHookError::internal(format!("failed to serialize payload: {}", e)))?;

        let signed = sign_body(self.signer.as_ref(), body).await.map_err(|e| {
            DevHookError::internal_with_source(format!("payload for {} could not be signed", callback_url), e)
        })?;

        // 地址无法解析与网络失败一样按投递失败处理
        let response = match &target {
            Ok(url) => dispatch(&self.client, url, &signed).await?,
            Err(e) => CallbackResponse::unreachable(e.to_string()),
        };

        let delivery = if is_valid_response(&response) {
            info!(file_key = %record.key, "Successfully simulated callback for file");
            DeliveryStatus::Delivered
        } else {
            match &response.transport_error {
                Some(transport_error) => error!(
                    file_key = %record.key,
                    callback_url = %callback_url,
                    error = %transport_error,
                    "Failed to simulate callback for file '{}': could not send the request to '{}'. \
                     Make sure your dev server is running and the callback URL is valid",
                    record.key,
                    callback_url
                ),
                None => error!(
                    file_key = %record.key,
                    callback_url = %callback_url,
                    status = response.status.as_u16(),
                    "Failed to simulate callback for file '{}'. Is your webhook configured correctly? \
                     Make sure the URL '{}' is accessible without any authentication. \
                     You can verify this by running 'curl -X POST {}' in your terminal",
                    record.key,
                    callback_url,
                    callback_url
                ),
            }
            DeliveryStatus::DeliveryFailed
        };

        Ok(SimulationOutcome {
            file: record,
            callback_url,
            delivery,
        })
    }

    /// 在后台运行模拟
    pub fn spawn(&self, descriptor: UploadDescriptor) -> JoinHandle<Result<SimulationOutcome>> {
        let simulator = self.clone();
        tokio::spawn(async move { simulator.simulate(descriptor).await })
    }

    /// 并发模拟多个相互独立的上传，结果顺序与输入一致
    pub async fn simulate_all(
        &self,
        descriptors: Vec<UploadDescriptor>,
    ) -> Vec<Result<SimulationOutcome>> {
        join_all(descriptors.into_iter().map(|d| self.simulate(d))).await
    }
}

impl std::fmt::Debug for DevHookSimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DevHookSimulator")
            .field("client", &self.client)
            .field("backoff", &self.backoff)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use tracing_test::traced_test;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FailingSigner;

    #[async_trait]
    impl PayloadSigner for FailingSigner {
        async fn sign(&self, _payload: &str) -> Result<String> {
            Err(DevHookError::sign("crypto backend unavailable"))
        }
    }

    #[tokio::test]
    async fn test_sign_failure_is_internal_and_nothing_dispatched() {
        let poll = MockServer::start().await;
        let hook = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "done",
                "file": {
                    "fileKey": "abc",
                    "fileName": "cat.png",
                    "fileSize": 10,
                    "fileType": "image/png",
                    "fileUrl": "https://files.example.com/f/abc",
                    "callbackUrl": format!("{}/api/uploadthing", hook.uri()),
                    "callbackSlug": "imageUploader"
                }
            })))
            .mount(&poll)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&hook)
            .await;

        let simulator = DevHookSimulator::new("secret").with_signer(Arc::new(FailingSigner));
        let err = simulator
            .simulate(UploadDescriptor::new("abc", poll.uri(), "jwt"))
            .await
            .unwrap_err();

        match &err {
            DevHookError::Internal { source: Some(source), .. } => {
                assert!(matches!(**source, DevHookError::Sign(_)));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.to_string().matches("Failed to sign payload").count(), 0);
        assert_eq!(err.code().as_str(), "INTERNAL_SERVER_ERROR");
    }

    #[test]
    fn test_from_config_requires_api_key() {
        let config = Config::new("");
        assert!(matches!(
            DevHookSimulator::from_config(&config),
            Err(DevHookError::Config(_))
        ));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_fatal_poll_error_is_logged() {
        let poll = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
            .expect(1)
            .mount(&poll)
            .await;

        let err = DevHookSimulator::new("secret")
            .simulate(UploadDescriptor::new("file_logged", poll.uri(), "jwt"))
            .await
            .unwrap_err();

        assert!(matches!(err, DevHookError::Internal { .. }));
        assert!(logs_contain("Failed to simulate callback for file 'file_logged'"));
        assert!(logs_contain("INTERNAL_SERVER_ERROR"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_upload_failed_is_logged_once() {
        let poll = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "done" })))
            .mount(&poll)
            .await;

        let err = DevHookSimulator::new("secret")
            .simulate(UploadDescriptor::new("file_missing", poll.uri(), "jwt"))
            .await
            .unwrap_err();

        assert!(matches!(err, DevHookError::UploadFailed { .. }));
        logs_assert(|lines: &[&str]| {
            let count = lines
                .iter()
                .filter(|line| line.contains("Failed to simulate callback for file 'file_missing'"))
                .count();
            if count == 1 {
                Ok(())
            } else {
                Err(format!("expected one failure log, found {}", count))
            }
        });
    }
}
