//! 扫描调度器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责方框的调度和结果汇总。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：校验配置、创建 HTTP 客户端和各个服务
//! 2. **枚举方框**：按区域和方框边长列出所有完整方框
//! 3. **严格串行**：上一个方框结束后才开始下一个，避免远程服务限流或停止响应
//! 4. **结果汇总**：按方框顺序拼接所有记录
//! 5. **写入快照**：文件名使用扫描开始时间；写入失败只记录日志
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单个网格的细节
//! - **向下委托**：委托 BoxAggregator 处理单个方框

use crate::config::Config;
use crate::models::{Bounds, Record};
use crate::services::{CellFetcher, SnapshotWriter};
use crate::utils::logging::{log_box_complete, log_box_start, log_startup, print_final_stats};
use crate::workflow::BoxAggregator;
use anyhow::Result;
use std::path::PathBuf;
use tracing::{error, warn};

/// 应用主结构
pub struct App {
    config: Config,
    bounds: Bounds,
    aggregator: BoxAggregator,
    writer: SnapshotWriter,
}

/// 一次完整扫描的统计
#[derive(Debug, Clone)]
pub struct SweepReport {
    /// 扫描开始时间（秒）
    pub started_at: i64,
    pub boxes: usize,
    /// 因网络失败提前结束的方框数
    pub early_finalized: usize,
    pub records: Vec<Record>,
    /// 快照路径，写入失败时为 None
    pub snapshot_path: Option<PathBuf>,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        config.validate()?;
        let bounds = config.bounds()?;

        let fetcher = CellFetcher::from_config(&config)?;
        let aggregator = BoxAggregator::new(fetcher, config.cell_delta, config.settle_delay());
        let writer = SnapshotWriter::new(config.tmp_base.clone());

        Ok(Self {
            config,
            bounds,
            aggregator,
            writer,
        })
    }

    /// 运行完整扫描
    pub async fn run(&self) -> SweepReport {
        let started_at = chrono::Utc::now().timestamp();
        let boxes = self.bounds.boxes(self.config.box_size);
        let total_boxes = boxes.len();

        if boxes.is_empty() {
            warn!("⚠️ 区域内没有完整的方框");
        }
        log_startup(&self.config, total_boxes, started_at);

        let mut records: Vec<Record> = Vec::new();
        let mut early_finalized = 0;

        // 严格串行：一个方框结束后才开始下一个
        for (idx, bx) in boxes.iter().enumerate() {
            let box_num = idx + 1;
            log_box_start(box_num, total_boxes, bx);

            let report = self.aggregator.run(bx).await;
            if report.finished_early() {
                early_finalized += 1;
            }
            log_box_complete(box_num, &report, records.len() + report.records.len());
            records.extend(report.records);
        }

        print_final_stats(total_boxes, early_finalized, records.len());

        let snapshot_path = match self.writer.write(&records, started_at).await {
            Ok(path) => Some(path),
            Err(e) => {
                error!("❌ 快照写入失败: {}", e);
                None
            }
        };

        SweepReport {
            started_at,
            boxes: total_boxes,
            early_finalized,
            records,
            snapshot_path,
        }
    }
}
