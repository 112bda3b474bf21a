//! 快照写入服务 - 业务能力层
//!
//! 只负责"把整次扫描的结果写成一个 JSON 文件"能力

use crate::error::{AppError, AppResult};
use crate::models::Record;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// 快照子目录和文件名前缀
const SNAPSHOT_DIR: &str = "pokeRadar";
const SNAPSHOT_PREFIX: &str = "pokeRadar_";

/// 快照写入服务
///
/// 职责：
/// - 文件路径：`{tmp_base}/pokeRadar/pokeRadar_{开始时间秒}.json`
/// - 内容：所有记录组成的 JSON 数组，没有外层包装
/// - 失败不重试
pub struct SnapshotWriter {
    tmp_base: PathBuf,
}

impl SnapshotWriter {
    /// 创建新的快照写入服务
    pub fn new(tmp_base: impl Into<PathBuf>) -> Self {
        Self {
            tmp_base: tmp_base.into(),
        }
    }

    /// 快照文件路径，`started_at` 为扫描开始时间（秒）
    pub fn snapshot_path(&self, started_at: i64) -> PathBuf {
        self.tmp_base
            .join(SNAPSHOT_DIR)
            .join(format!("{}{}.json", SNAPSHOT_PREFIX, started_at))
    }

    /// 写入快照
    ///
    /// # 参数
    /// - `records`: 所有方框的记录，按方框顺序拼接
    /// - `started_at`: 扫描开始时间（秒）
    ///
    /// # 返回
    /// 返回写入的文件路径
    pub async fn write(&self, records: &[Record], started_at: i64) -> AppResult<PathBuf> {
        let path = self.snapshot_path(started_at);
        if let Some(dir) = path.parent() {
            ensure_dir(dir).await?;
        }

        let content = serde_json::to_vec(records)?;
        debug!("写入快照: {} ({} 字节)", path.display(), content.len());

        fs::write(&path, content)
            .await
            .map_err(|e| AppError::sink_write_failed(path.display().to_string(), e))?;

        info!("💾 快照已保存: {}", path.display());
        Ok(path)
    }
}

async fn ensure_dir(dir: &Path) -> AppResult<()> {
    fs::create_dir_all(dir)
        .await
        .map_err(|e| AppError::sink_create_dir_failed(dir.display().to_string(), e))
}
