// ==========================================
// 学校排课系统 - 引擎层错误类型
// ==========================================
// 职责: 结构性/致命错误,任一出现则整个生成运行失败
// 说明: 单课次落位失败不是错误,以 UnassignedSession 记录
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 引擎层错误类型(结构性失败)
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("作息模板结构无效: {0}")]
    InvalidTemplate(String),

    #[error("没有可排的教学任务")]
    NoAssignments,

    #[error("教学任务数据不一致: {0}")]
    InconsistentAssignment(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
