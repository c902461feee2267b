// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::DatabaseSettings;
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use std::time::Duration;

/// SQL 方言，决定参数占位符的写法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlDialect {
    Postgres,
    MySql,
    Sqlite,
}

impl SqlDialect {
    /// 根据连接URL的协议判断方言
    pub fn from_url(url: &str) -> Option<Self> {
        let scheme = url.split(':').next()?.to_ascii_lowercase();
        match scheme.as_str() {
            "postgres" | "postgresql" => Some(SqlDialect::Postgres),
            "mysql" | "mariadb" => Some(SqlDialect::MySql),
            "sqlite" => Some(SqlDialect::Sqlite),
            _ => None,
        }
    }

    /// 第 `index` 个参数（从 1 开始）的占位符
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            SqlDialect::Postgres => format!("${}", index),
            SqlDialect::MySql | SqlDialect::Sqlite => "?".to_string(),
        }
    }
}

/// 创建数据库连接池
///
/// # 参数
///
/// * `settings` - 数据库配置
///
/// # 返回值
///
/// * `Ok(AnyPool)` - 数据库连接池
/// * `Err(sqlx::Error)` - 连接过程中出现的错误
pub async fn create_pool(settings: &DatabaseSettings) -> Result<AnyPool, sqlx::Error> {
    sqlx::any::install_default_drivers();

    let mut opt = AnyPoolOptions::new().max_lifetime(Duration::from_secs(3600));

    if let Some(max) = settings.max_connections {
        opt = opt.max_connections(max);
    }

    if let Some(timeout) = settings.connect_timeout {
        opt = opt.acquire_timeout(Duration::from_secs(timeout));
    }

    opt.connect(&settings.url).await
}
