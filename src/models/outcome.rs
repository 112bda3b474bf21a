//! 单个网格请求的结果

use serde_json::Value as JsonValue;
use std::fmt::Display;

/// 远程服务返回的一条记录，原样透传
pub type Record = JsonValue;

/// 网络层失败的种类
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// 超时
    Timeout,
    /// 连接被重置
    ConnectionReset,
    /// 其他请求错误（DNS、拒绝连接等）
    Other(String),
}

impl TransportFailure {
    /// 超时或连接重置：通常说明远程服务已经不再响应
    pub fn is_timeout_or_reset(&self) -> bool {
        matches!(self, TransportFailure::Timeout | TransportFailure::ConnectionReset)
    }
}

impl Display for TransportFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportFailure::Timeout => write!(f, "请求超时"),
            TransportFailure::ConnectionReset => write!(f, "连接被重置"),
            TransportFailure::Other(msg) => write!(f, "请求错误: {}", msg),
        }
    }
}

/// 网格请求结果
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// 返回了至少一条记录
    Success(Vec<Record>),
    /// 响应为空、无法解析或没有 data 字段，不算错误
    EmptySuccess,
    /// 网络层失败
    TransportFailure(TransportFailure),
}

impl FetchOutcome {
    /// 根据解析出的记录构造结果：空列表视为 EmptySuccess
    pub fn from_records(records: Vec<Record>) -> Self {
        if records.is_empty() {
            FetchOutcome::EmptySuccess
        } else {
            FetchOutcome::Success(records)
        }
    }

    pub fn record_count(&self) -> usize {
        match self {
            FetchOutcome::Success(records) => records.len(),
            _ => 0,
        }
    }
}
