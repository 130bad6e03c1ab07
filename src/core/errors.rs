use thiserror::Error;

/// 上传服务约定的错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    BadRequest,
    UploadFailed,
    InternalServerError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::UploadFailed => "UPLOAD_FAILED",
            ErrorCode::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum DevHookError {
    #[error("Fetch error for {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Polling endpoint returned status {status_code}: {message}")]
    PollStatus {
        status_code: u16,
        message: String,
    },

    #[error("Failed to decode polling response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Upload still pending")]
    NotReady,

    #[error("Retry limit exceeded after {attempts} attempts")]
    RetryLimitExceeded {
        attempts: u32,
    },

    #[error("Upload failed for file {key}: {message}")]
    UploadFailed {
        key: String,
        message: String,
    },

    #[error("Failed to sign payload: {0}")]
    Sign(String),

    #[error("Invalid callback url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<DevHookError>>,
    },
}

impl DevHookError {
    pub fn upload_failed(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UploadFailed {
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn sign(message: impl Into<String>) -> Self {
        Self::Sign(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// 包装底层错误，保留其为 source
    pub fn internal_with_source(message: impl Into<String>, source: DevHookError) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            DevHookError::UploadFailed { .. } => ErrorCode::UploadFailed,
            DevHookError::InvalidUrl { .. } | DevHookError::Config(_) => ErrorCode::BadRequest,
            _ => ErrorCode::InternalServerError,
        }
    }

    /// 只有 NotReady 可以重试，其余都是终止性错误
    pub fn is_retryable(&self) -> bool {
        matches!(self, DevHookError::NotReady)
    }
}

/// Error alias
pub type Result<T, E = DevHookError> = std::result::Result<T, E>;
