// ==========================================
// 学校排课系统 - 数据仓储层
// ==========================================
// 职责: SQLite 数据访问,实体 ↔ 行映射
// 约定: 列表字段以 JSON 文本存储,星期/状态以小写字符串存储
// 红线: 不含排课逻辑
// ==========================================

pub mod assignment_repo;
pub mod constraint_repo;
pub mod error;
pub mod period_template_repo;
pub mod room_repo;
pub mod timetable_repo;

pub use assignment_repo::TeachingAssignmentRepository;
pub use constraint_repo::AvailabilityConstraintRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use period_template_repo::PeriodTemplateRepository;
pub use room_repo::RoomRepository;
pub use timetable_repo::GeneratedTimetableRepository;

use crate::domain::types::Weekday;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// 序列化列表字段为 JSON 文本
pub(crate) fn to_json<T: Serialize>(field: &str, value: &T) -> RepositoryResult<String> {
    serde_json::to_string(value).map_err(|e| RepositoryError::FieldValueError {
        field: field.to_string(),
        message: e.to_string(),
    })
}

/// 从 JSON 文本反序列化列表字段
pub(crate) fn from_json<T: DeserializeOwned>(field: &str, raw: &str) -> RepositoryResult<T> {
    serde_json::from_str(raw).map_err(|e| RepositoryError::FieldValueError {
        field: field.to_string(),
        message: e.to_string(),
    })
}

/// 解析星期列 (单值,小写字符串)
pub(crate) fn parse_day(field: &str, raw: &str) -> RepositoryResult<Weekday> {
    Weekday::from_str(raw).ok_or_else(|| RepositoryError::FieldValueError {
        field: field.to_string(),
        message: format!("无法识别的星期值: {}", raw),
    })
}
