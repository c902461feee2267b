// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含核心实体、列表页解析和仓库接口
pub mod domain;

/// 引擎模块
///
/// 实现列表页抓取引擎
pub mod engines;

/// 基础设施模块
///
/// 提供进度账本、代理、数据库和指标等外部集成
pub mod infrastructure;

/// 队列模块
///
/// 生成抓取任务
pub mod queue;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;

/// 工作器模块
///
/// 抓取与解析工作池
pub mod workers;
