// ==========================================
// 学校排课系统 - API层
// ==========================================
// 职责: 面向调用方的业务接口,编排仓储与引擎
// 红线: 不含排课算法逻辑
// ==========================================

pub mod error;
pub mod timetable_api;

pub use error::{ApiError, ApiResult};
pub use timetable_api::{
    CellFilter, GenerateTimetableRequest, GenerateTimetableResponse, TimetableApi,
};
