// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::queue::enumerator::parse_stock_codes;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum SettingsError {
    /// 配置加载失败
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),
    /// 配置项无效
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// 应用程序配置设置
///
/// 包含抓取基础参数、请求、代理、数据库和指标等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 基础配置
    pub base: BaseSettings,
    /// 请求配置
    pub request: RequestSettings,
    /// 代理配置
    pub proxy: ProxySettings,
    /// 数据库配置
    pub database: DatabaseSettings,
    /// 指标配置
    pub metrics: MetricsSettings,
}

/// 基础配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct BaseSettings {
    /// 日志目录
    pub log_dir: String,
    /// 断点续爬缓存目录
    pub cache_dir: String,
    /// 股票代码列表，逗号分隔
    pub stock_codes: String,
    /// 每只股票抓取的最大页码
    pub max_page: u32,
    /// 抓取工作器数量
    pub thread_num: usize,
    /// 每次请求后的固定延迟（毫秒）
    pub request_delay_ms: u64,
    /// 任务/结果通道容量
    pub queue_capacity: usize,
    /// 日志达到多少条后压缩为快照，0 表示每次写入都重写快照
    pub ledger_compact_threshold: usize,
}

/// 请求配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct RequestSettings {
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
    /// User-Agent
    pub user_agent: String,
    /// 列表页URL模板，包含 `{stock_code}` 和 `{page}` 占位符
    pub listing_url_template: String,
    /// 站点根地址，用于补全相对链接
    pub site_root: String,
}

/// 代理配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ProxySettings {
    /// 是否启用代理
    pub enabled: bool,
    /// 代理池接口地址
    pub pool_url: String,
    /// 代理池请求超时（秒）
    pub pool_timeout_secs: u64,
    /// 代理验证使用的目标地址
    pub validate_url: String,
}

/// 数据库配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL，为空时不写入数据库
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
}

/// 指标配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启用 Prometheus 导出
    pub enabled: bool,
    /// 导出器监听地址
    pub listen_addr: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次叠加默认值、`config/default`、`config/{APP_ENVIRONMENT}` 和
    /// `GUBA__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载并通过校验的配置
    /// * `Err(SettingsError)` - 配置加载失败或配置无效
    pub fn new() -> Result<Self, SettingsError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("GUBA").separator("__"));

        Self::finish(builder)
    }

    /// 从指定配置文件加载配置
    ///
    /// 文件必须存在，环境变量依然可以覆盖文件中的值
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::Invalid(format!(
                "config file not found: {}",
                path.display()
            )));
        }

        let builder = Self::defaults()?
            .add_source(File::from(path).required(true))
            .add_source(Environment::with_prefix("GUBA").separator("__"));

        Self::finish(builder)
    }

    fn defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            // Default base settings
            .set_default("base.log_dir", "./logs")?
            .set_default("base.cache_dir", "./cache")?
            .set_default("base.stock_codes", "")?
            .set_default("base.max_page", 1)?
            .set_default("base.thread_num", 4)?
            .set_default("base.request_delay_ms", 1000)?
            .set_default("base.queue_capacity", 1024)?
            .set_default("base.ledger_compact_threshold", 256)?
            // Default request settings
            .set_default("request.timeout_secs", 10)?
            .set_default(
                "request.user_agent",
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36",
            )?
            .set_default(
                "request.listing_url_template",
                "https://guba.eastmoney.com/list,{stock_code}_{page}.html",
            )?
            .set_default("request.site_root", "https://guba.eastmoney.com")?
            // Default proxy settings
            .set_default("proxy.enabled", false)?
            .set_default("proxy.pool_url", "")?
            .set_default("proxy.pool_timeout_secs", 5)?
            .set_default("proxy.validate_url", "https://www.baidu.com")?
            // Default database settings
            .set_default("database.url", "")?
            .set_default("database.max_connections", 5)?
            .set_default("database.connect_timeout", 10)?
            // Default metrics settings
            .set_default("metrics.enabled", false)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")
    }

    fn finish(
        builder: ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, SettingsError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// 校验配置
    ///
    /// 缺少必需配置时返回错误，调用方应在启动任何工作器之前终止运行
    pub fn validate(&self) -> Result<(), SettingsError> {
        if parse_stock_codes(&self.base.stock_codes).is_empty() {
            return Err(SettingsError::Invalid(
                "base.stock_codes must contain at least one stock code".to_string(),
            ));
        }
        if self.base.max_page == 0 {
            return Err(SettingsError::Invalid(
                "base.max_page must be at least 1".to_string(),
            ));
        }
        if self.base.thread_num == 0 {
            return Err(SettingsError::Invalid(
                "base.thread_num must be at least 1".to_string(),
            ));
        }
        if self.base.queue_capacity == 0 {
            return Err(SettingsError::Invalid(
                "base.queue_capacity must be at least 1".to_string(),
            ));
        }

        let template = &self.request.listing_url_template;
        if !template.contains("{stock_code}") || !template.contains("{page}") {
            return Err(SettingsError::Invalid(format!(
                "request.listing_url_template must contain {{stock_code}} and {{page}}: {}",
                template
            )));
        }
        if url::Url::parse(&self.request.site_root).is_err() {
            return Err(SettingsError::Invalid(format!(
                "request.site_root is not a valid URL: {}",
                self.request.site_root
            )));
        }

        if self.proxy.enabled && self.proxy.pool_url.trim().is_empty() {
            return Err(SettingsError::Invalid(
                "proxy.pool_url is required when proxy.enabled is true".to_string(),
            ));
        }

        Ok(())
    }

    /// 解析后的股票代码列表
    pub fn stock_codes(&self) -> Vec<String> {
        parse_stock_codes(&self.base.stock_codes)
    }

    /// 解析工作器数量：抓取线程数的一半，至少为 1
    pub fn parse_worker_count(&self) -> usize {
        (self.base.thread_num / 2).max(1)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request.timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.base.request_delay_ms)
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
