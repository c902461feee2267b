// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::Datelike;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::domain::models::post::{PostRecord, LIKE_COUNT_PLACEHOLDER};
use crate::utils::url_utils;

/// 解析错误类型
#[derive(Error, Debug)]
pub enum ParseError {
    /// 页面整体结构异常，任务保持未完成以便下次重试
    #[error("Unexpected page structure: {0}")]
    Structure(String),
    /// 单条帖子提取失败，仅丢弃该条
    #[error("Item extraction failed: {0}")]
    Item(String),
}

/// 列表页布局
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `div.articleh.normal_post` 列表
    Classic,
    /// `tr.listitem` 表格
    Table,
    /// 页面结构正常但没有帖子
    Empty,
}

/// 一种布局对应的一组选择器
struct LayoutSelectors {
    item: Selector,
    read: Selector,
    comment: Selector,
    title: Selector,
    author: Selector,
    time: Selector,
}

impl LayoutSelectors {
    fn new(item: &str, read: &str, comment: &str, title: &str, author: &str, time: &str) -> Self {
        let parse = |s: &str| Selector::parse(s).expect("static selector must be valid");
        Self {
            item: parse(item),
            read: parse(read),
            comment: parse(comment),
            title: parse(title),
            author: parse(author),
            time: parse(time),
        }
    }
}

static CLASSIC: Lazy<LayoutSelectors> = Lazy::new(|| {
    LayoutSelectors::new(
        "div.articleh.normal_post",
        "span.l1.a1",
        "span.l2.a2",
        "span.l3.a3",
        "span.l4.a4",
        "span.l5.a5",
    )
});

static TABLE: Lazy<LayoutSelectors> = Lazy::new(|| {
    LayoutSelectors::new(
        "tr.listitem",
        "div.read",
        "div.reply",
        "div.title",
        "div.author",
        "div.update",
    )
});

static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("valid selector"));
static BODY_ELEMENTS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("body *").expect("valid selector"));
static PARTIAL_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}-\d{1,2})\s+(\d{1,2}:\d{2})$").expect("valid regex"));

/// 单页解析结果
#[derive(Debug)]
pub struct ParsedPage {
    pub layout: Layout,
    pub records: Vec<PostRecord>,
    /// 被丢弃的帖子条数
    pub dropped_items: usize,
}

/// 股吧列表页解析器
///
/// 每个文档只检测一次布局，然后使用对应布局的提取策略。
/// 单条帖子的提取错误相互隔离，不影响同页其它帖子。
#[derive(Debug, Clone)]
pub struct ListingParser {
    site_root: Url,
    current_year: i32,
}

impl ListingParser {
    /// 创建解析器
    ///
    /// # 参数
    ///
    /// * `site_root` - 站点根地址，用于补全相对链接
    pub fn new(site_root: &str) -> Result<Self, ParseError> {
        let site_root = Url::parse(site_root)
            .map_err(|e| ParseError::Structure(format!("invalid site root {}: {}", site_root, e)))?;
        Ok(Self {
            site_root,
            current_year: chrono::Local::now().year(),
        })
    }

    /// 固定补全时间使用的年份
    pub fn with_year(mut self, year: i32) -> Self {
        self.current_year = year;
        self
    }

    /// 检测页面布局
    pub fn detect_layout(document: &Html) -> Layout {
        if document.select(&CLASSIC.item).next().is_some() {
            Layout::Classic
        } else if document.select(&TABLE.item).next().is_some() {
            Layout::Table
        } else {
            Layout::Empty
        }
    }

    /// 解析列表页
    ///
    /// # 返回值
    ///
    /// * `Ok(ParsedPage)` - 页面解析成功，可能没有任何帖子
    /// * `Err(ParseError::Structure)` - 页面不是可识别的 HTML 文档
    pub fn parse(&self, stock_code: &str, html: &str) -> Result<ParsedPage, ParseError> {
        if html.trim().is_empty() {
            return Err(ParseError::Structure("empty document".to_string()));
        }

        let document = Html::parse_document(html);
        if document.select(&BODY_ELEMENTS).next().is_none() {
            return Err(ParseError::Structure(
                "document contains no markup".to_string(),
            ));
        }

        let layout = Self::detect_layout(&document);
        let selectors: &LayoutSelectors = match layout {
            Layout::Classic => &*CLASSIC,
            Layout::Table => &*TABLE,
            Layout::Empty => {
                debug!(stock_code, "No post items found on page");
                return Ok(ParsedPage {
                    layout,
                    records: Vec::new(),
                    dropped_items: 0,
                });
            }
        };

        let mut records = Vec::new();
        let mut dropped_items = 0;
        for (index, item) in document.select(&selectors.item).enumerate() {
            match self.extract_item(stock_code, item, selectors) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(stock_code, index, "Failed to extract post item: {}", e);
                    dropped_items += 1;
                }
            }
        }

        Ok(ParsedPage {
            layout,
            records,
            dropped_items,
        })
    }

    fn extract_item(
        &self,
        stock_code: &str,
        item: ElementRef<'_>,
        selectors: &LayoutSelectors,
    ) -> Result<PostRecord, ParseError> {
        let title_container = item.select(&selectors.title).next();
        let author_container = item.select(&selectors.author).next();
        if title_container.is_none() && author_container.is_none() {
            return Err(ParseError::Item(
                "item has neither a title nor an author".to_string(),
            ));
        }

        let read_count = first_text(item, &selectors.read).unwrap_or_else(|| "0".to_string());
        let comment_count =
            first_text(item, &selectors.comment).unwrap_or_else(|| "0".to_string());

        let title_anchor = title_container.and_then(|c| c.select(&ANCHOR).next());
        let (title, post_url) = match title_anchor {
            Some(anchor) => {
                let attr_title = anchor.value().attr("title").unwrap_or("").trim();
                let title = if attr_title.is_empty() {
                    element_text(anchor)
                } else {
                    attr_title.to_string()
                };
                let href = anchor.value().attr("href").unwrap_or("");
                (title, self.absolutize(href)?)
            }
            None => ("无标题".to_string(), String::new()),
        };

        let author_anchor = author_container.and_then(|c| c.select(&ANCHOR).next());
        let (author_name, author_id, author_url) = match author_anchor {
            Some(anchor) => (
                element_text(anchor),
                anchor.value().attr("data-popper").unwrap_or("").to_string(),
                self.absolutize(anchor.value().attr("href").unwrap_or(""))?,
            ),
            None => ("匿名".to_string(), String::new(), String::new()),
        };

        let publish_time = first_text(item, &selectors.time)
            .map(|raw| self.complete_publish_time(&raw))
            .unwrap_or_default();

        Ok(PostRecord {
            stock_code: stock_code.to_string(),
            title,
            author_name,
            author_id,
            author_url,
            publish_time,
            read_count,
            comment_count,
            like_count: LIKE_COUNT_PLACEHOLDER.to_string(),
            post_url,
        })
    }

    /// `MM-DD HH:MM` 补全为 `YYYY-MM-DD HH:MM:00`，其它格式原样保留
    pub fn complete_publish_time(&self, raw: &str) -> String {
        let raw = raw.trim();
        match PARTIAL_TIME.captures(raw) {
            Some(caps) => format!("{}-{} {}:00", self.current_year, &caps[1], &caps[2]),
            None => raw.to_string(),
        }
    }

    fn absolutize(&self, href: &str) -> Result<String, ParseError> {
        let href = href.trim();
        if href.is_empty() {
            return Ok(String::new());
        }
        url_utils::resolve_url(&self.site_root, href)
            .map_err(|e| ParseError::Item(format!("cannot resolve link {}: {}", href, e)))
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope.select(selector).next().map(element_text)
}

#[cfg(test)]
#[path = "listing_parser_test.rs"]
mod tests;
