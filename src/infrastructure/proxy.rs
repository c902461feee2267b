// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::settings::ProxySettings;
use crate::domain::models::proxy::ProxyEndpoint;

const VALIDATE_TIMEOUT: Duration = Duration::from_secs(5);

/// 代理来源
///
/// 每次调用都向代理池请求一个新代理并直接返回，不缓存共享状态
pub struct ProxySource {
    enabled: bool,
    pool_url: String,
    validate_url: String,
    client: reqwest::Client,
}

impl ProxySource {
    pub fn new(settings: &ProxySettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.pool_timeout_secs))
            .build()?;

        Ok(Self {
            enabled: settings.enabled,
            pool_url: settings.pool_url.clone(),
            validate_url: settings.validate_url.clone(),
            client,
        })
    }

    /// 未启用代理的实例
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            pool_url: String::new(),
            validate_url: String::new(),
            client: reqwest::Client::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// 从代理池获取一个代理
    ///
    /// 未启用、代理池返回空内容或请求失败时返回 `None`，抓取将不使用代理
    pub async fn acquire(&self) -> Option<ProxyEndpoint> {
        if !self.enabled {
            return None;
        }

        let response = match self
            .client
            .get(&self.pool_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
        {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to acquire proxy: {}", e);
                return None;
            }
        };

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to read proxy pool response: {}", e);
                return None;
            }
        };

        let address = body.trim();
        if address.is_empty() {
            warn!("Proxy pool returned an empty proxy");
            return None;
        }

        info!(proxy = address, "Acquired proxy");
        Some(ProxyEndpoint::from_address(address))
    }

    /// 验证代理是否可用
    ///
    /// 通过代理请求验证地址，返回 200 即视为可用。不会在 `acquire` 中自动调用。
    pub async fn validate(&self, proxy: &ProxyEndpoint) -> bool {
        let client = match proxied_client(proxy) {
            Ok(client) => client,
            Err(e) => {
                error!(proxy = %proxy.http, "Invalid proxy: {}", e);
                return false;
            }
        };

        match client.get(&self.validate_url).send().await {
            Ok(response) => response.status() == reqwest::StatusCode::OK,
            Err(e) => {
                error!(proxy = %proxy.http, "Proxy validation failed: {}", e);
                false
            }
        }
    }
}

fn proxied_client(proxy: &ProxyEndpoint) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .proxy(reqwest::Proxy::http(&proxy.http)?)
        .proxy(reqwest::Proxy::https(&proxy.https)?)
        .timeout(VALIDATE_TIMEOUT)
        .build()
}
