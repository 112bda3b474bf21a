//! 方框结果累加器
//!
//! 一个方框的所有网格结果都汇入这里，并且只在这里决定何时结束

use crate::models::{FetchOutcome, Record, TransportFailure};

/// 结束原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalizeReason {
    /// 所有网格都已返回
    Completed,
    /// 出现网络层失败，提前结束
    TransportFailure(TransportFailure),
}

/// 结束时生成的快照
///
/// `records` 是结束瞬间 `collected` 的拷贝，之后到达的结果不会再修改它
#[derive(Debug, Clone, PartialEq)]
pub struct Finalized {
    pub records: Vec<Record>,
    pub completed: usize,
    pub reason: FinalizeReason,
}

/// 方框结果
#[derive(Debug)]
pub struct BoxResult {
    collected: Vec<Record>,
    completed_count: usize,
    expected_count: usize,
    finalized: bool,
}

impl BoxResult {
    pub fn new(expected_count: usize) -> Self {
        Self {
            collected: Vec::new(),
            completed_count: 0,
            expected_count,
            finalized: false,
        }
    }

    pub fn completed_count(&self) -> usize {
        self.completed_count
    }

    pub fn expected_count(&self) -> usize {
        self.expected_count
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// 应用一个网格结果
    ///
    /// 返回 `Some` 表示本次调用触发了结束，整个生命周期内最多一次。
    /// 结束之后到达的结果只计数，不会进入 collected。
    pub fn apply(&mut self, outcome: FetchOutcome) -> Option<Finalized> {
        self.completed_count += 1;
        if self.finalized {
            return None;
        }

        match outcome {
            FetchOutcome::Success(records) => {
                self.collected.extend(records);
            }
            FetchOutcome::EmptySuccess => {}
            FetchOutcome::TransportFailure(failure) => {
                return self.finalize(FinalizeReason::TransportFailure(failure));
            }
        }

        if self.completed_count >= self.expected_count {
            return self.finalize(FinalizeReason::Completed);
        }
        None
    }

    /// 结束并拷贝当前记录，已结束时返回 None
    pub fn finalize(&mut self, reason: FinalizeReason) -> Option<Finalized> {
        if self.finalized {
            return None;
        }
        self.finalized = true;
        Some(Finalized {
            records: self.collected.clone(),
            completed: self.completed_count,
            reason,
        })
    }
}
