// ==========================================
// 学校排课系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 课表生成引擎 (贪心确定性排课)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 排课规则
pub mod engine;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{ConstraintType, GenerationStatus, Weekday};

// 领域实体
pub use domain::{
    AvailabilityConstraint, ConstraintSet, GeneratedTimetable, PeriodTemplate, PeriodTiming,
    Room, TeachingAssignment, TimetableSlot, UnassignedSession,
};

// 引擎
pub use engine::{
    EngineError, ExclusivityIndex, GenerationInput, GenerationOrchestrator, GenerationOutcome,
    PlacementRequest, RequestExpander, TimetableScheduler,
};

// API
pub use api::{ApiError, GenerateTimetableRequest, GenerateTimetableResponse, TimetableApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "学校排课系统";

// 数据库版本
pub const DB_VERSION: &str = "v0.1";

// ==========================================
// 预编译检查
// ==========================================

// 确保编译时所有模块可见
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
