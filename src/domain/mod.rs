// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：抓取任务、抓取结果和帖子记录
/// - 仓库接口（repositories）：进度账本和帖子存储的抽象接口
/// - 服务（services）：列表页解析规则
///
/// 领域层只定义抽象，不依赖具体实现；例外是 `SinkError::Database` 直接携带 `sqlx::Error`。
pub mod models;
pub mod repositories;
pub mod services;
