// ==========================================
// 学校排课系统 - 主入口
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 课表生成引擎
// ==========================================

use institute_timetable::app::{get_default_db_path, AppState};
use institute_timetable::logging;

fn main() {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} - 课表生成引擎", institute_timetable::APP_NAME);
    tracing::info!("系统版本: {}", institute_timetable::VERSION);
    tracing::info!("==================================================");

    // 获取数据库路径
    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    // 创建AppState
    tracing::info!("正在初始化AppState...");
    match AppState::new(db_path) {
        Ok(state) => {
            tracing::info!("AppState初始化成功,数据库: {}", state.db_path);
            tracing::info!("库模式使用: institute_timetable::api::TimetableApi");
        }
        Err(e) => {
            tracing::error!("AppState初始化失败: {}", e);
            std::process::exit(1);
        }
    }
}
