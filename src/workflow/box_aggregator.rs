//! 方框聚合流程 - 流程层
//!
//! 核心职责：定义"一个方框"的完整处理流程
//!
//! 流程：
//! 1. 把方框切成网格，所有网格同时发出请求（不限并发）
//! 2. 按到达顺序把结果汇入 BoxResult
//! 3. 第一个网络层失败立即结束，剩余请求继续运行但结果被丢弃
//! 4. 全部返回后等待一段时间再结束，给远程服务喘息

use crate::models::{Cell, CoordinateBox, FetchOutcome, Record, TransportFailure};
use crate::services::CellFetcher;
use crate::workflow::box_result::{BoxResult, FinalizeReason, Finalized};
use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// 单个方框的处理结果
#[derive(Debug, Clone, PartialEq)]
pub struct BoxReport {
    /// 结束瞬间的记录快照
    pub records: Vec<Record>,
    /// 结束时已返回的网格数
    pub completed: usize,
    /// 网格总数
    pub expected: usize,
    pub reason: FinalizeReason,
}

impl BoxReport {
    fn from_finalized(finalized: Finalized, expected: usize) -> Self {
        Self {
            records: finalized.records,
            completed: finalized.completed,
            expected,
            reason: finalized.reason,
        }
    }

    /// 是否因为网络失败提前结束
    pub fn finished_early(&self) -> bool {
        !matches!(self.reason, FinalizeReason::Completed)
    }
}

/// 方框聚合流程
///
/// - 持有网格请求服务（已包含直连 / 代理方式）
/// - 决定何时结束，且只结束一次
pub struct BoxAggregator {
    fetcher: CellFetcher,
    cell_delta: f64,
    settle_delay: Duration,
}

impl BoxAggregator {
    pub fn new(fetcher: CellFetcher, cell_delta: f64, settle_delay: Duration) -> Self {
        Self {
            fetcher,
            cell_delta,
            settle_delay,
        }
    }

    pub async fn run(&self, bx: &CoordinateBox) -> BoxReport {
        info!("🔍 扫描方框: {}", bx);

        let fetcher = self.fetcher.clone();
        collect_box(bx.cells(self.cell_delta), self.settle_delay, move |cell| {
            let fetcher = fetcher.clone();
            async move { fetcher.fetch(cell).await }
        })
        .await
    }
}

/// 并发请求所有网格并汇总结果
///
/// 每个网格一个 tokio 任务。结束后丢弃 JoinHandle 只会让任务脱离，
/// 不会取消它们；它们的结果不再被读取。
pub async fn collect_box<F, Fut>(cells: Vec<Cell>, settle_delay: Duration, fetch: F) -> BoxReport
where
    F: Fn(Cell) -> Fut,
    Fut: Future<Output = FetchOutcome> + Send + 'static,
{
    let expected = cells.len();
    let mut state = BoxResult::new(expected);

    if expected == 0 {
        if let Some(finalized) = state.finalize(FinalizeReason::Completed) {
            return BoxReport::from_finalized(finalized, expected);
        }
    }

    let mut pending: FuturesUnordered<JoinHandle<FetchOutcome>> = cells
        .into_iter()
        .map(|cell| tokio::spawn(fetch(cell)))
        .collect();

    while let Some(joined) = pending.next().await {
        let outcome = match joined {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("网格任务异常退出: {}", e);
                FetchOutcome::TransportFailure(TransportFailure::Other(format!("任务异常: {}", e)))
            }
        };

        if let Some(finalized) = state.apply(outcome) {
            match &finalized.reason {
                FinalizeReason::TransportFailure(failure) => {
                    log_transport_failure(failure);
                    info!(
                        "⚠️ 提前结束: {}/{} 个网格已返回，共 {} 只精灵",
                        finalized.completed,
                        expected,
                        finalized.records.len()
                    );
                }
                _ => {
                    sleep(settle_delay).await;
                    info!("✓ 方框完成，共 {} 只精灵", finalized.records.len());
                }
            }
            return BoxReport::from_finalized(finalized, expected);
        }
    }

    // 每个 JoinHandle 都会产出一个结果（panic 也映射为失败），
    // 所以最后一个结果必然已在循环内触发结束
    debug_assert_eq!(state.completed_count(), expected, "网格结果数量少于预期");
    match state.finalize(FinalizeReason::Completed) {
        Some(finalized) => BoxReport::from_finalized(finalized, expected),
        None => unreachable!("方框已在循环内结束"),
    }
}

fn log_transport_failure(failure: &TransportFailure) {
    if failure.is_timeout_or_reset() {
        warn!("超时 / 连接重置: {}", failure);
    } else {
        warn!("请求错误: {}", failure);
    }
    debug!("剩余网格继续运行，结果将被忽略");
}
