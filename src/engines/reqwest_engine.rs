// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::{EngineError, FetchRequest, FetchResponse, PageFetcher};
use crate::domain::models::proxy::ProxyEndpoint;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use std::time::Instant;

/// 基于 reqwest 的抓取引擎
///
/// 不使用代理的请求共用一个客户端（连接池和 Cookie 在请求间保留），
/// 使用代理的请求按代理单独构建客户端
pub struct ReqwestEngine {
    client: reqwest::Client,
}

impl ReqwestEngine {
    pub fn new() -> Result<Self, EngineError> {
        let client = Self::client_builder().build()?;
        Ok(Self { client })
    }

    fn client_builder() -> reqwest::ClientBuilder {
        reqwest::Client::builder().cookie_store(true)
    }

    fn proxied_client(proxy: &ProxyEndpoint) -> Result<reqwest::Client, EngineError> {
        let http = reqwest::Proxy::http(&proxy.http)
            .map_err(|e| EngineError::Other(format!("Invalid proxy: {}", e)))?;
        let https = reqwest::Proxy::https(&proxy.https)
            .map_err(|e| EngineError::Other(format!("Invalid proxy: {}", e)))?;
        Ok(Self::client_builder().proxy(http).proxy(https).build()?)
    }

    fn map_error(e: reqwest::Error) -> EngineError {
        if e.is_timeout() {
            EngineError::Timeout
        } else {
            EngineError::RequestFailed(e)
        }
    }
}

#[async_trait]
impl PageFetcher for ReqwestEngine {
    /// 执行HTTP抓取
    ///
    /// # 参数
    ///
    /// * `request` - 抓取请求
    ///
    /// # 返回值
    ///
    /// * `Ok(FetchResponse)` - 2xx 响应
    /// * `Err(EngineError)` - 传输错误、超时或非 2xx 状态码
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, EngineError> {
        // Build headers
        let mut headers = HeaderMap::new();
        for (k, v) in &request.headers {
            if let (Ok(k), Ok(v)) = (
                HeaderName::from_bytes(k.as_bytes()),
                HeaderValue::from_str(v),
            ) {
                headers.insert(k, v);
            }
        }
        if let Ok(agent) = HeaderValue::from_str(&request.user_agent) {
            headers.insert(USER_AGENT, agent);
        }

        let proxied;
        let client = match &request.proxy {
            Some(proxy) => {
                proxied = Self::proxied_client(proxy)?;
                &proxied
            }
            None => &self.client,
        };

        let start = Instant::now();
        let response = client
            .get(&request.url)
            .headers(headers)
            .timeout(request.timeout)
            .send()
            .await
            .map_err(Self::map_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::HttpStatus(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(Self::map_error)?;
        let (content, _, had_errors) = encoding_rs::UTF_8.decode(&bytes);
        if had_errors {
            tracing::debug!(url = %request.url, "Response body contained invalid UTF-8");
        }

        Ok(FetchResponse {
            status_code: status.as_u16(),
            content: content.into_owned(),
            response_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
