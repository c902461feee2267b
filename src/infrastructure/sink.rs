// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use sqlx::AnyPool;
use tracing::{debug, error, info, warn};

use crate::config::settings::DatabaseSettings;
use crate::domain::models::post::PostRecord;
use crate::domain::repositories::post_sink::{PostSink, SinkError};
use crate::infrastructure::database::connection::{create_pool, SqlDialect};

/// 帖子表名
pub const POST_TABLE: &str = "guba_stock_post";

const POST_COLUMNS: [&str; 10] = [
    "stock_code",
    "post_title",
    "author_name",
    "author_id",
    "author_url",
    "publish_time",
    "read_count",
    "comment_count",
    "like_count",
    "post_url",
];

const POST_COLUMN_DEFS: &str = "
    stock_code VARCHAR(20) NOT NULL,
    post_title VARCHAR(512) NOT NULL,
    author_name VARCHAR(128) NOT NULL,
    author_id VARCHAR(100) NOT NULL DEFAULT '',
    author_url VARCHAR(500) NOT NULL DEFAULT '',
    publish_time VARCHAR(32) NOT NULL,
    read_count VARCHAR(32) NOT NULL,
    comment_count VARCHAR(32) NOT NULL,
    like_count VARCHAR(32) NOT NULL,
    post_url VARCHAR(500) NOT NULL,
    crawl_time TIMESTAMP DEFAULT CURRENT_TIMESTAMP";

/// 建表与索引语句
///
/// MySQL 不支持 `CREATE INDEX IF NOT EXISTS`，索引写在建表语句中
fn schema_statements(dialect: SqlDialect) -> Vec<String> {
    let index_statements = || {
        vec![
            format!("CREATE INDEX IF NOT EXISTS idx_stock_code ON {} (stock_code)", POST_TABLE),
            format!("CREATE INDEX IF NOT EXISTS idx_publish_time ON {} (publish_time)", POST_TABLE),
        ]
    };

    match dialect {
        SqlDialect::MySql => vec![format!(
            "CREATE TABLE IF NOT EXISTS {} (
    id BIGINT AUTO_INCREMENT PRIMARY KEY,{},
    INDEX idx_stock_code (stock_code),
    INDEX idx_publish_time (publish_time)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4",
            POST_TABLE, POST_COLUMN_DEFS
        )],
        SqlDialect::Postgres => {
            let mut statements = vec![format!(
                "CREATE TABLE IF NOT EXISTS {} (\n    id BIGSERIAL PRIMARY KEY,{}\n)",
                POST_TABLE, POST_COLUMN_DEFS
            )];
            statements.extend(index_statements());
            statements
        }
        SqlDialect::Sqlite => {
            let mut statements = vec![format!(
                "CREATE TABLE IF NOT EXISTS {} (\n    id INTEGER PRIMARY KEY AUTOINCREMENT,{}\n)",
                POST_TABLE, POST_COLUMN_DEFS
            )];
            statements.extend(index_statements());
            statements
        }
    }
}

/// 基于 sqlx 的帖子存储
///
/// 每个批次在一个事务中以一条多行 INSERT 写入，失败时整批回滚
pub struct SqlPostSink {
    pool: AnyPool,
    dialect: SqlDialect,
}

impl SqlPostSink {
    pub fn new(pool: AnyPool, dialect: SqlDialect) -> Self {
        Self { pool, dialect }
    }

    /// 按配置连接数据库
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, SinkError> {
        let dialect = SqlDialect::from_url(&settings.url).ok_or_else(|| {
            SinkError::Other(format!("Unsupported database url: {}", settings.url))
        })?;
        let pool = create_pool(settings).await?;
        info!(dialect = ?dialect, "Connected to post database");
        Ok(Self::new(pool, dialect))
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// 按配置打开存储，失败时记录错误并返回 `None`
    ///
    /// 未配置数据库、连接失败或建表失败都不会中止抓取，帖子只是不再落库
    pub async fn open_optional(settings: &DatabaseSettings) -> Option<Self> {
        if settings.url.trim().is_empty() {
            warn!("database.url is empty, posts will not be stored");
            return None;
        }

        let sink = match Self::connect(settings).await {
            Ok(sink) => sink,
            Err(e) => {
                error!("Failed to connect to post database, posts will not be stored: {}", e);
                return None;
            }
        };

        if let Err(e) = sink.ensure_schema().await {
            error!("Failed to create post table, posts will not be stored: {}", e);
            return None;
        }

        info!("Post table ready");
        Some(sink)
    }

    /// 建表和索引（已存在则跳过）
    pub async fn ensure_schema(&self) -> Result<(), SinkError> {
        for statement in schema_statements(self.dialect) {
            sqlx::query(&statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl PostSink for SqlPostSink {
    async fn insert_batch(&self, records: &[PostRecord]) -> Result<u64, SinkError> {
        if records.is_empty() {
            return Ok(0);
        }

        let sql = insert_sql(self.dialect, records.len());
        let mut query = sqlx::query(&sql);
        for record in records {
            for value in record.columns() {
                query = query.bind(value.to_string());
            }
        }

        let mut tx = self.pool.begin().await?;
        let result = query.execute(&mut *tx).await?;
        tx.commit().await?;

        debug!(rows = result.rows_affected(), "Inserted post batch");
        Ok(result.rows_affected())
    }
}

/// 生成 `rows` 行的多行 INSERT 语句
fn insert_sql(dialect: SqlDialect, rows: usize) -> String {
    let width = POST_COLUMNS.len();
    let values = (0..rows)
        .map(|row| {
            let params = (1..=width)
                .map(|col| dialect.placeholder(row * width + col))
                .collect::<Vec<_>>()
                .join(", ");
            format!("({})", params)
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {} ({}) VALUES {}",
        POST_TABLE,
        POST_COLUMNS.join(", "),
        values
    )
}
