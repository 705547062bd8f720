// ==========================================
// 学校排课系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免“部分模块外键开启/部分不开启”
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 提供幂等建表入口（本仓库不携带外部迁移脚本）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
///
/// 说明：
/// - 版本号用于**提示/告警**（不做自动迁移），避免静默在旧库上运行导致隐性错误。
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 初始化数据库 schema（幂等）
///
/// 所有列表字段（sections/偏好教室/日列表/日志/原因等）以 JSON 文本存储。
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS period_templates (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            academic_year TEXT NOT NULL,
            days_of_week TEXT NOT NULL,
            periods_per_day INTEGER NOT NULL,
            period_timings TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS rooms (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            capacity INTEGER NOT NULL,
            room_type TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS teaching_assignments (
            id TEXT PRIMARY KEY,
            teacher_id TEXT NOT NULL,
            subject_id TEXT NOT NULL,
            section_ids TEXT NOT NULL,
            sessions_per_week INTEGER NOT NULL,
            session_length INTEGER NOT NULL,
            preferred_room_ids TEXT NOT NULL,
            room_fixed INTEGER NOT NULL DEFAULT 0,
            allowed_days TEXT,
            fixed_day TEXT,
            fixed_period INTEGER,
            same_daily_pattern INTEGER NOT NULL DEFAULT 0,
            academic_year TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS availability_constraints (
            id TEXT PRIMARY KEY,
            constraint_type TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            day TEXT NOT NULL,
            period_number INTEGER NOT NULL,
            is_available INTEGER NOT NULL,
            academic_year TEXT NOT NULL,
            UNIQUE(constraint_type, entity_id, day, period_number, academic_year)
        );

        CREATE TABLE IF NOT EXISTS generated_timetables (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            academic_year TEXT NOT NULL,
            period_template_id TEXT NOT NULL REFERENCES period_templates(id),
            generation_status TEXT NOT NULL,
            total_sessions INTEGER NOT NULL DEFAULT 0,
            assigned_sessions INTEGER NOT NULL DEFAULT 0,
            unassigned_sessions INTEGER NOT NULL DEFAULT 0,
            generation_log TEXT NOT NULL DEFAULT '[]',
            is_active INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS timetable_slots (
            id TEXT PRIMARY KEY,
            timetable_id TEXT NOT NULL REFERENCES generated_timetables(id) ON DELETE CASCADE,
            teacher_id TEXT NOT NULL,
            subject_id TEXT NOT NULL,
            section_ids TEXT NOT NULL,
            day TEXT NOT NULL,
            period_number INTEGER NOT NULL,
            session_length INTEGER NOT NULL,
            room_id TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_slots_timetable_day
            ON timetable_slots(timetable_id, day, period_number);

        CREATE TABLE IF NOT EXISTS unassigned_sessions (
            id TEXT PRIMARY KEY,
            timetable_id TEXT NOT NULL REFERENCES generated_timetables(id) ON DELETE CASCADE,
            teaching_assignment_id TEXT NOT NULL,
            conflict_reasons TEXT NOT NULL DEFAULT '[]',
            suggested_fixes TEXT NOT NULL DEFAULT '[]'
        );

        INSERT OR IGNORE INTO schema_version (version) VALUES (1);
        "#,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));
    }
}
