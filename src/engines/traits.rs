// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

use crate::domain::models::proxy::ProxyEndpoint;

/// 引擎错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 非 2xx 响应
    #[error("Unexpected HTTP status: {0}")]
    HttpStatus(u16),
    /// 超时
    #[error("Timeout")]
    Timeout,
    /// 其他错误
    #[error("Other error: {0}")]
    Other(String),
}

impl EngineError {
    /// 判断错误是否可重试
    ///
    /// 抓取阶段本身不重试，可重试的任务留待下一次运行
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::RequestFailed(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            EngineError::HttpStatus(code) => *code >= 500 || *code == 429,
            EngineError::Timeout => true,
            EngineError::Other(_) => false,
        }
    }
}

/// 抓取请求
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// 目标URL
    pub url: String,
    /// 请求头
    pub headers: HashMap<String, String>,
    /// User-Agent
    pub user_agent: String,
    /// 超时时间
    pub timeout: Duration,
    /// 代理
    pub proxy: Option<ProxyEndpoint>,
}

/// 抓取响应
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// HTTP状态码
    pub status_code: u16,
    /// 按 UTF-8 解码的响应内容
    pub content: String,
    /// 响应时间（毫秒）
    pub response_time_ms: u64,
}

/// 页面抓取特质
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// 执行一次 GET 请求，非 2xx 响应视为失败
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, EngineError>;

    /// 引擎名称
    fn name(&self) -> &'static str;
}
