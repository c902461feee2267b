// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 提供领域层抽象接口的具体实现，负责与外部系统交互。
///
/// 包含的子模块：
/// - 数据库（database）：连接池与SQL方言
/// - 可观测性（observability）：Prometheus 指标
/// - 进度账本（progress_store）：断点续爬的持久化记录
/// - 代理（proxy）：从代理池获取代理
/// - 落库（sink）：帖子批量写入
pub mod database;
pub mod observability;
pub mod progress_store;
pub mod proxy;
pub mod sink;
