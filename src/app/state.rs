// ==========================================
// 学校排课系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 说明: 全部仓储共享同一个 SQLite 连接
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::TimetableApi;
use crate::db::open_sqlite_connection;
use crate::repository::{
    AvailabilityConstraintRepository, GeneratedTimetableRepository, PeriodTemplateRepository,
    RoomRepository, TeachingAssignmentRepository,
};

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 课表生成API
    pub timetable_api: Arc<TimetableApi>,

    /// 作息模板仓储
    pub template_repo: Arc<PeriodTemplateRepository>,

    /// 教室仓储
    pub room_repo: Arc<RoomRepository>,

    /// 教学任务仓储
    pub assignment_repo: Arc<TeachingAssignmentRepository>,

    /// 可用性约束仓储
    pub constraint_repo: Arc<AvailabilityConstraintRepository>,

    /// 生成课表仓储
    pub timetable_repo: Arc<GeneratedTimetableRepository>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 说明
    /// 该方法会:
    /// 1. 打开共享数据库连接 (统一 PRAGMA + 幂等建表)
    /// 2. 初始化全部仓储
    /// 3. 创建API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState,数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        let template_repo = Arc::new(
            PeriodTemplateRepository::from_connection(conn.clone())
                .map_err(|e| format!("作息模板仓储初始化失败: {}", e))?,
        );
        let room_repo = Arc::new(
            RoomRepository::from_connection(conn.clone())
                .map_err(|e| format!("教室仓储初始化失败: {}", e))?,
        );
        let assignment_repo = Arc::new(
            TeachingAssignmentRepository::from_connection(conn.clone())
                .map_err(|e| format!("教学任务仓储初始化失败: {}", e))?,
        );
        let constraint_repo = Arc::new(
            AvailabilityConstraintRepository::from_connection(conn.clone())
                .map_err(|e| format!("可用性约束仓储初始化失败: {}", e))?,
        );
        let timetable_repo = Arc::new(
            GeneratedTimetableRepository::from_connection(conn)
                .map_err(|e| format!("生成课表仓储初始化失败: {}", e))?,
        );

        let timetable_api = Arc::new(TimetableApi::new(
            template_repo.clone(),
            room_repo.clone(),
            assignment_repo.clone(),
            constraint_repo.clone(),
            timetable_repo.clone(),
        ));

        tracing::info!("AppState初始化完成");
        Ok(Self {
            db_path,
            timetable_api,
            template_repo,
            room_repo,
            assignment_repo,
            constraint_repo,
            timetable_repo,
        })
    }
}

/// 获取默认数据库路径
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径 (便于调试/测试/CI)
    if let Ok(path) = std::env::var("INSTITUTE_TIMETABLE_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    // 先给一个默认回退值,后续如果能拿到 data_dir 再覆盖
    let mut path = PathBuf::from("./institute_timetable.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录,避免污染生产数据
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("institute-timetable-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("institute-timetable");
        }

        if let Err(e) = std::fs::create_dir_all(&path) {
            tracing::warn!("无法创建数据目录 {:?}: {},回退到当前目录", path, e);
            path = PathBuf::from(".");
        }

        path = path.join("institute_timetable.db");
    }

    path.to_string_lossy().to_string()
}
