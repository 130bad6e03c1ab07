use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use url::Url;
use crate::core::{CallbackResponse, DevHookError, Result, SignedPayload};
use super::client::HttpClient;

pub const HOOK_HEADER: &str = "uploadthing-hook";
pub const SIGNATURE_HEADER: &str = "x-uploadthing-signature";
pub const VERSION_HEADER: &str = "x-uploadthing-version";

fn with_scheme(callback_url: &str) -> String {
    if callback_url.starts_with("http://") || callback_url.starts_with("https://") {
        callback_url.to_string()
    } else {
        format!("http://{}", callback_url)
    }
}

/// 拼出回调地址：缺少协议时补 `http://`，并附加 `slug` 查询参数
pub fn build_callback_url(callback_url: &str, slug: &str) -> Result<Url> {
    let raw = with_scheme(callback_url);
    let mut url = Url::parse(&raw).map_err(|source| DevHookError::InvalidUrl {
        url: raw.clone(),
        source,
    })?;
    url.query_pairs_mut().append_pair("slug", slug);
    Ok(url)
}

/// 不做解析的拼接结果，地址无法解析时用于日志
pub fn raw_callback_url(callback_url: &str, slug: &str) -> String {
    format!("{}?slug={}", with_scheme(callback_url), slug)
}

pub fn callback_headers(signature: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(HeaderName::from_static(HOOK_HEADER), HeaderValue::from_static("callback"));
    let signature = HeaderValue::from_str(signature)
        .map_err(|e| DevHookError::sign(format!("signature is not a valid header value: {}", e)))?;
    headers.insert(HeaderName::from_static(SIGNATURE_HEADER), signature);
    Ok(headers)
}

/// 响应是否来自正确配置的开发者端点
///
/// 状态码必须成功且小于 400，并且带有版本响应头；响应体不参与判断。
pub fn is_valid_response(response: &CallbackResponse) -> bool {
    if !response.status.is_success() {
        return false;
    }
    if response.status.as_u16() >= 400 {
        return false;
    }
    response.headers.contains_key(VERSION_HEADER)
}

/// 投递已签名的回调
///
/// 网络失败不会向上传播，而是变成一个合成的 500 响应，保留原始错误信息。
pub async fn dispatch(client: &HttpClient, url: &Url, signed: &SignedPayload) -> Result<CallbackResponse> {
    let headers = callback_headers(&signed.signature)?;
    match client.post(url, headers, signed.body.clone()).await {
        Ok(response) => Ok(response),
        Err(e) => {
            tracing::warn!(callback_url = %url, error = %e, "Callback endpoint unreachable");
            Ok(CallbackResponse::unreachable(e.to_string()))
        }
    }
}
