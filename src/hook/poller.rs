use serde_json::Value;
use crate::config::BackoffConfig;
use crate::core::{DevHookError, PollFile, PollResult, PollUploadResponse, Result, UploadDescriptor};
use crate::utils::RetryBuilder;
use super::client::HttpClient;

/// 查询一次轮询接口
pub async fn poll_once(client: &HttpClient, descriptor: &UploadDescriptor) -> Result<PollResult> {
    let response: PollUploadResponse = client
        .get_json(&descriptor.polling_url, &descriptor.polling_token)
        .await?;
    Ok(response.into())
}

/// 轮询直到状态为 done，返回文件信息与自定义元数据
///
/// 未完成时按退避策略重试；解码错误、请求失败以及重试预算耗尽都是致命错误。
/// 服务报告完成但没有文件信息时返回 `UploadFailed`。
pub async fn poll_until_done(
    client: &HttpClient,
    descriptor: &UploadDescriptor,
    backoff: &BackoffConfig,
) -> Result<(PollFile, Value)> {
    backoff.validate()?;

    let polled = RetryBuilder::new()
        .strategy(backoff.strategy())
        .max_attempts(backoff.max_attempts)
        .max_elapsed(backoff.max_elapsed())
        .run(|| async move {
            match poll_once(client, descriptor).await? {
                PollResult::Pending => {
                    tracing::debug!(key = %descriptor.key, "Upload not done yet");
                    Err(DevHookError::NotReady)
                }
                PollResult::Done { file, metadata } => Ok((file, metadata)),
            }
        })
        .await;

    let (file, metadata) = match polled {
        Ok(done) => done,
        Err(DevHookError::RetryLimitExceeded { attempts }) => {
            return Err(DevHookError::internal(format!(
                "upload {} still pending after {} polls",
                descriptor.key, attempts
            )));
        }
        Err(e @ DevHookError::Decode(_)) => {
            return Err(DevHookError::internal_with_source(
                format!("invalid polling response for {}", descriptor.key),
                e,
            ));
        }
        Err(e) => return Err(e),
    };

    file.map(|file| (file, metadata))
        .ok_or_else(|| DevHookError::upload_failed(&descriptor.key, "File took too long to upload"))
}
