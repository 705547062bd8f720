// ==========================================
// 学校排课系统 - 应用层
// ==========================================
// 职责: 装配仓储与API实例,提供进程级共享状态
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
