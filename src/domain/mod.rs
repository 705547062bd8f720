// ==========================================
// 学校排课系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、业务规则接口
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod assignment;
pub mod constraint;
pub mod period_template;
pub mod timetable;
pub mod types;

// 重导出核心类型
pub use assignment::{Room, TeachingAssignment};
pub use constraint::{AvailabilityConstraint, ConstraintSet};
pub use period_template::{PeriodTemplate, PeriodTiming};
pub use timetable::{GeneratedTimetable, TimetableSlot, UnassignedSession};
pub use types::{ConstraintType, GenerationStatus, Weekday};
