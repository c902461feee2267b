// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工具模块
///
/// 日志初始化与链接补全
pub mod telemetry;
pub mod url_utils;
