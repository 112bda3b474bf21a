//! 日志工具模块
//!
//! 提供日志初始化和输出格式的辅助函数

use crate::config::Config;
use crate::models::CoordinateBox;
use crate::workflow::BoxReport;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// 使用 `RUST_LOG` 过滤，默认 info。重复调用不会报错（测试里会多次调用）。
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config, total_boxes: usize, started_at: i64) {
    info!("{}", "=".repeat(60));
    info!("🚀 开始扫描 - 区域: {}", config.region);
    info!(
        "📐 方框边长: {} / 网格步长: {} / 共 {} 个方框",
        config.box_size, config.cell_delta, total_boxes
    );
    info!("🕒 开始时间: {} ({})", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"), started_at);
    info!("{}", "=".repeat(60));
}

/// 记录方框开始信息
pub fn log_box_start(box_num: usize, total_boxes: usize, bx: &CoordinateBox) {
    info!("\n{}", "─".repeat(60));
    info!("📦 方框 {}/{}: {}", box_num, total_boxes, bx);
}

/// 记录方框完成信息
pub fn log_box_complete(box_num: usize, report: &BoxReport, total_records: usize) {
    info!(
        "✓ 方框 {} 结束: {} 只精灵 ({}/{} 个网格), 累计 {}",
        box_num,
        report.records.len(),
        report.completed,
        report.expected,
        total_records
    );
}

/// 打印最终统计信息
///
/// # 参数
/// - `boxes`: 扫描的方框数
/// - `early`: 提前结束的方框数
/// - `records`: 记录总数
pub fn print_final_stats(boxes: usize, early: usize, records: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📊 扫描完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 方框: {}", boxes);
    info!("⚠️ 提前结束: {}", early);
    info!("🐾 共找到 {} 只精灵", records);
    info!("{}", "=".repeat(60));
}
