// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 列表页解析（listing_parser）：检测页面布局并提取帖子记录
pub mod listing_parser;
