use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// 单次模拟的唯一标识，仅用于日志关联
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct SimulationId(pub Uuid);

impl SimulationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SimulationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SimulationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 一个等待完成的上传
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadDescriptor {
    /// 文件 key
    pub key: String,
    /// 轮询地址
    pub polling_url: String,
    /// 轮询令牌
    pub polling_token: String,
}

impl UploadDescriptor {
    pub fn new(
        key: impl Into<String>,
        polling_url: impl Into<String>,
        polling_token: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            polling_url: polling_url.into(),
            polling_token: polling_token.into(),
        }
    }
}

/// 轮询状态，除 `done` 以外的值都视为未完成
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PollStatus {
    Done,
    #[serde(other)]
    Pending,
}

/// 轮询接口返回的文件信息
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollFile {
    #[serde(default)]
    pub file_key: Option<String>,
    pub file_name: String,
    pub file_size: u64,
    pub file_type: String,
    pub file_url: String,
    #[serde(default)]
    pub custom_id: Option<String>,
    pub callback_url: String,
    pub callback_slug: String,
}

/// 轮询接口的原始响应
#[derive(Debug, Clone, Deserialize)]
pub struct PollUploadResponse {
    pub status: PollStatus,
    #[serde(default)]
    pub file: Option<PollFile>,
    #[serde(default)]
    pub metadata: Value,
}

/// 轮询结果
#[derive(Debug, Clone, PartialEq)]
pub enum PollResult {
    Pending,
    Done {
        file: Option<PollFile>,
        metadata: Value,
    },
}

impl From<PollUploadResponse> for PollResult {
    fn from(response: PollUploadResponse) -> Self {
        match response.status {
            PollStatus::Pending => PollResult::Pending,
            PollStatus::Done => PollResult::Done {
                file: response.file,
                metadata: response.metadata,
            },
        }
    }
}

/// 上传完成后的文件属性，嵌入回调负载
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub url: String,
    pub key: String,
    pub name: String,
    pub size: u64,
    pub custom_id: Option<String>,
    #[serde(rename = "type")]
    pub content_type: String,
}

impl FileRecord {
    /// 轮询结果里 `fileKey` 为空时使用上传本身的 key
    pub fn from_poll_file(file: &PollFile, upload_key: &str) -> Self {
        Self {
            url: file.file_url.clone(),
            key: file.file_key.clone().unwrap_or_else(|| upload_key.to_string()),
            name: file.file_name.clone(),
            size: file.file_size,
            custom_id: file.custom_id.clone(),
            content_type: file.file_type.clone(),
        }
    }
}

/// 回调负载状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CallbackStatus {
    Uploaded,
}

/// 发给开发者服务器的回调请求体
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CallbackPayload {
    pub status: CallbackStatus,
    pub metadata: Value,
    pub file: FileRecord,
}

impl CallbackPayload {
    pub fn uploaded(file: FileRecord, metadata: Value) -> Self {
        Self {
            status: CallbackStatus::Uploaded,
            metadata,
            file,
        }
    }
}

/// 已签名的负载
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPayload {
    pub body: String,
    pub signature: String,
}

/// 开发者服务器的响应；网络失败时为合成的 500 响应
#[derive(Debug, Clone)]
pub struct CallbackResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub transport_error: Option<String>,
}

impl CallbackResponse {
    pub fn new(status: StatusCode, headers: HeaderMap) -> Self {
        Self {
            status,
            headers,
            transport_error: None,
        }
    }

    pub fn unreachable(error: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            headers: HeaderMap::new(),
            transport_error: Some(error.into()),
        }
    }
}

/// 回调投递结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    Delivered,
    DeliveryFailed,
}

/// 一次成功完成的模拟
#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    pub file: FileRecord,
    /// 解析后的回调地址；无法解析时为原始拼接结果
    pub callback_url: String,
    pub delivery: DeliveryStatus,
}
