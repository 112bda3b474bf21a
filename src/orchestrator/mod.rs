//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责方框调度和结果汇总，是整个系统的"指挥中心"。
//!
//! ## 层次关系
//!
//! ```text
//! sweep_processor (处理 Vec<CoordinateBox>，严格串行)
//!     ↓
//! workflow::BoxAggregator (处理单个方框，网格并发)
//!     ↓
//! services (能力层：cell_fetcher / snapshot_writer)
//!     ↓
//! infrastructure (基础设施：HttpTransport)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：sweep_processor 管方框序列，BoxAggregator 管单个方框
//! 2. **向下依赖**：编排层 → workflow → services → infrastructure
//! 3. **无业务逻辑**：只做调度和统计

pub mod sweep_processor;

// 重新导出主要类型
pub use sweep_processor::{App, SweepReport};
