//! # Poke Radar
//!
//! 按经纬度网格扫描远程服务，汇总所有精灵记录并写入快照文件
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有 HTTP 客户端，只暴露能力
//! - `HttpTransport` - 直连 / 代理，带超时的 GET
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个网格或单个文件
//! - `CellFetcher` - 查询一个网格
//! - `SnapshotWriter` - 写快照文件
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个方框"的完整处理流程
//! - `BoxResult` - 结果累加器，只结束一次
//! - `BoxAggregator` - 并发请求所有网格，第一次网络失败立即结束
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/sweep_processor` - 严格串行地处理所有方框，写入快照
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{Config, TransportMode};
pub use error::{AppError, AppResult};
pub use infrastructure::HttpTransport;
pub use models::{Bounds, Cell, CoordinateBox, FetchOutcome, Record, TransportFailure};
pub use orchestrator::{App, SweepReport};
pub use workflow::{BoxAggregator, BoxReport, BoxResult, FinalizeReason};
