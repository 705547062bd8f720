// ==========================================
// 学校排课系统 - 教学任务仓储
// ==========================================
// 职责: 管理 teaching_assignments 表
// 说明: section_ids / preferred_room_ids / allowed_days 以 JSON 文本存储
// 说明: list_by_year 按 (created_at, id) 排序,作为生成运行的确定性依据
// ==========================================

use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::assignment::TeachingAssignment;
use crate::domain::types::Weekday;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{from_json, parse_day, to_json};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex};

// 行快照,与 SELECT_BASE 列顺序一致
type AssignmentRow = (
    String,                // id
    String,                // teacher_id
    String,                // subject_id
    String,                // section_ids (JSON)
    i32,                   // sessions_per_week
    i32,                   // session_length
    String,                // preferred_room_ids (JSON)
    bool,                  // room_fixed
    Option<String>,        // allowed_days (JSON)
    Option<String>,        // fixed_day
    Option<i32>,           // fixed_period
    bool,                  // same_daily_pattern
    String,                // academic_year
    bool,                  // is_active
    NaiveDateTime,         // created_at
);

pub struct TeachingAssignmentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TeachingAssignmentRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            init_schema(&guard)?;
        }
        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入教学任务
    pub fn insert(&self, assignment: &TeachingAssignment) -> RepositoryResult<()> {
        let allowed_days_json = match &assignment.allowed_days {
            Some(days) => Some(to_json("allowed_days", days)?),
            None => None,
        };

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO teaching_assignments (
                id, teacher_id, subject_id, section_ids,
                sessions_per_week, session_length,
                preferred_room_ids, room_fixed, allowed_days,
                fixed_day, fixed_period, same_daily_pattern,
                academic_year, is_active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
            params![
                assignment.assignment_id,
                assignment.teacher_id,
                assignment.subject_id,
                to_json("section_ids", &assignment.section_ids)?,
                assignment.sessions_per_week,
                assignment.session_length,
                to_json("preferred_room_ids", &assignment.preferred_room_ids)?,
                assignment.room_fixed,
                allowed_days_json,
                assignment.fixed_day.map(|d| d.to_db_str()),
                assignment.fixed_period,
                assignment.same_daily_pattern,
                assignment.academic_year,
                assignment.is_active,
                assignment.created_at,
            ],
        )?;
        Ok(())
    }

    /// 按ID查找任务
    pub fn find_by_id(&self, assignment_id: &str) -> RepositoryResult<Option<TeachingAssignment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{} WHERE id = ?1", Self::SELECT_BASE))?;
        let result = stmt.query_row(params![assignment_id], Self::map_row);

        match result {
            Ok(row) => Ok(Some(Self::to_domain(row)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 列出某学年全部任务 (按创建顺序,确定性)
    pub fn list_by_year(&self, academic_year: &str) -> RepositoryResult<Vec<TeachingAssignment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE academic_year = ?1 ORDER BY created_at, id",
            Self::SELECT_BASE
        ))?;
        let rows = stmt
            .query_map(params![academic_year], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        rows.into_iter().map(Self::to_domain).collect()
    }

    /// 列出某学年启用任务 (按创建顺序)
    pub fn list_active_by_year(&self, academic_year: &str) -> RepositoryResult<Vec<TeachingAssignment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE academic_year = ?1 AND is_active = 1 ORDER BY created_at, id",
            Self::SELECT_BASE
        ))?;
        let rows = stmt
            .query_map(params![academic_year], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        rows.into_iter().map(Self::to_domain).collect()
    }

    /// 设置启用标记
    pub fn set_active(&self, assignment_id: &str, is_active: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE teaching_assignments SET is_active = ?2 WHERE id = ?1",
            params![assignment_id, is_active],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "TeachingAssignment".to_string(),
                id: assignment_id.to_string(),
            });
        }
        Ok(())
    }

    /// 按ID删除任务
    pub fn delete_by_id(&self, assignment_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM teaching_assignments WHERE id = ?1",
            params![assignment_id],
        )?;
        Ok(affected)
    }

    const SELECT_BASE: &'static str = r#"
        SELECT id, teacher_id, subject_id, section_ids,
               sessions_per_week, session_length,
               preferred_room_ids, room_fixed, allowed_days,
               fixed_day, fixed_period, same_daily_pattern,
               academic_year, is_active, created_at
        FROM teaching_assignments
    "#;

    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<AssignmentRow> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
            row.get(7)?,
            row.get(8)?,
            row.get(9)?,
            row.get(10)?,
            row.get(11)?,
            row.get(12)?,
            row.get(13)?,
            row.get(14)?,
        ))
    }

    fn to_domain(row: AssignmentRow) -> RepositoryResult<TeachingAssignment> {
        let section_ids: Vec<String> = from_json("section_ids", &row.3)?;
        let preferred_room_ids: Vec<String> = from_json("preferred_room_ids", &row.6)?;
        let allowed_days: Option<Vec<Weekday>> = match &row.8 {
            Some(raw) => Some(from_json("allowed_days", raw)?),
            None => None,
        };
        let fixed_day = match &row.9 {
            Some(raw) => Some(parse_day("fixed_day", raw)?),
            None => None,
        };

        Ok(TeachingAssignment {
            assignment_id: row.0,
            teacher_id: row.1,
            subject_id: row.2,
            section_ids,
            sessions_per_week: row.4,
            session_length: row.5,
            preferred_room_ids,
            room_fixed: row.7,
            allowed_days,
            fixed_day,
            fixed_period: row.10,
            same_daily_pattern: row.11,
            academic_year: row.12,
            is_active: row.13,
            created_at: row.14,
        })
    }
}
