// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use crate::config::settings::Settings;
use crate::domain::models::task::CrawlTask;
use crate::domain::repositories::post_sink::PostSink;
use crate::domain::repositories::progress_repository::ProgressRepository;
use crate::domain::services::listing_parser::{ListingParser, ParseError};
use crate::engines::traits::PageFetcher;
use crate::infrastructure::proxy::ProxySource;

/// 抓取上下文
///
/// 一次运行共享的全部服务，以 `Arc` 传入每个工作器
pub struct CrawlContext {
    pub settings: Arc<Settings>,
    pub progress: Arc<dyn ProgressRepository>,
    pub proxy: Arc<ProxySource>,
    pub fetcher: Arc<dyn PageFetcher>,
    pub parser: ListingParser,
    /// 未配置数据库时为 `None`，解析结果只记录进度
    pub sink: Option<Arc<dyn PostSink>>,
}

impl CrawlContext {
    pub fn new(
        settings: Arc<Settings>,
        progress: Arc<dyn ProgressRepository>,
        proxy: Arc<ProxySource>,
        fetcher: Arc<dyn PageFetcher>,
        sink: Option<Arc<dyn PostSink>>,
    ) -> Result<Self, ParseError> {
        let parser = ListingParser::new(&settings.request.site_root)?;
        Ok(Self {
            settings,
            progress,
            proxy,
            fetcher,
            parser,
            sink,
        })
    }

    /// 替换解析器（例如固定年份）
    pub fn with_parser(mut self, parser: ListingParser) -> Self {
        self.parser = parser;
        self
    }

    /// 按模板生成任务的列表页地址
    pub fn listing_url(&self, task: &CrawlTask) -> String {
        self.settings
            .request
            .listing_url_template
            .replace("{stock_code}", &task.stock_code)
            .replace("{page}", &task.page.to_string())
    }
}
