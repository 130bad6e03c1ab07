//! 回调负载的 HMAC-SHA256 签名
//!
//! 签名头的值为 `hmac-sha256=<hex>`，基于实际发送的 JSON 原文计算。

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use crate::core::{DevHookError, Result, SignedPayload};

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_PREFIX: &str = "hmac-sha256=";

/// 签名器 trait，签名失败对本次投递是致命的
#[async_trait]
pub trait PayloadSigner: Send + Sync {
    async fn sign(&self, payload: &str) -> Result<String>;
}

/// 使用 API key 的 HMAC-SHA256 签名器
#[derive(Clone)]
pub struct HmacSigner {
    secret: String,
}

impl HmacSigner {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl std::fmt::Debug for HmacSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacSigner").field("secret", &"<redacted>").finish()
    }
}

#[async_trait]
impl PayloadSigner for HmacSigner {
    async fn sign(&self, payload: &str) -> Result<String> {
        sign_payload(payload, &self.secret)
    }
}

/// 用给定密钥对负载签名，返回 `hmac-sha256={hex}` 格式
pub fn sign_payload(payload: &str, secret: &str) -> Result<String> {
    if secret.is_empty() {
        return Err(DevHookError::sign("signing secret is empty"));
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| DevHookError::sign(e.to_string()))?;
    mac.update(payload.as_bytes());
    let digest = mac.finalize().into_bytes();

    Ok(format!("{}{}", SIGNATURE_PREFIX, hex::encode(digest)))
}

/// 按原始请求体校验回调签名
pub fn verify_signature(payload: &str, signature: &str, secret: &str) -> bool {
    let Some(hex_value) = signature.strip_prefix(SIGNATURE_PREFIX) else {
        return false;
    };
    let Ok(received) = hex::decode(hex_value) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(payload.as_bytes());

    // verify_slice 是常量时间比较
    mac.verify_slice(&received).is_ok()
}

/// 对负载签名并打包
pub async fn sign_body(signer: &dyn PayloadSigner, body: String) -> Result<SignedPayload> {
    let signature = signer.sign(&body).await?;
    Ok(SignedPayload { body, signature })
}
