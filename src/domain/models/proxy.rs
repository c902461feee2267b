// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 代理地址
///
/// 由代理池返回的 `host:port` 生成的 HTTP/HTTPS 代理对
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyEndpoint {
    /// HTTP 流量使用的代理
    pub http: String,
    /// HTTPS 流量使用的代理
    pub https: String,
}

impl ProxyEndpoint {
    pub fn from_address(address: &str) -> Self {
        let address = address.trim();
        Self {
            http: format!("http://{}", address),
            https: format!("https://{}", address),
        }
    }
}
