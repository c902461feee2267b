// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::{ParseError, Url};

/// 链接是否已是绝对地址（以 `http` 开头）
pub fn is_absolute(href: &str) -> bool {
    href.starts_with("http")
}

/// 将可能为相对路径的URL转换为绝对路径URL
///
/// 已是绝对地址的链接原样返回，不做规范化
pub fn resolve_url(base_url: &Url, href: &str) -> Result<String, ParseError> {
    if is_absolute(href) {
        return Ok(href.to_string());
    }
    base_url.join(href).map(String::from)
}
