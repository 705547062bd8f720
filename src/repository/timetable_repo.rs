// ==========================================
// 学校排课系统 - 生成课表仓储
// ==========================================
// 职责: 管理 generated_timetables / timetable_slots / unassigned_sessions 三表
// 所有权: 课表拥有其课次与未排记录,删除课表由外键级联清理
// 红线: 结果写入与激活切换必须在单事务内完成
// ==========================================

use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::timetable::{GeneratedTimetable, TimetableSlot, UnassignedSession};
use crate::domain::types::{GenerationStatus, Weekday};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{from_json, parse_day, to_json};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Result as SqliteResult, Transaction};
use std::sync::{Arc, Mutex};

// generated_timetables 行快照,与 SELECT_BASE 列顺序一致
type TimetableRow = (
    String,        // id
    String,        // name
    String,        // academic_year
    String,        // period_template_id
    String,        // generation_status
    i32,           // total_sessions
    i32,           // assigned_sessions
    i32,           // unassigned_sessions
    String,        // generation_log (JSON)
    bool,          // is_active
    NaiveDateTime, // created_at
);

// timetable_slots 行快照
type SlotRow = (
    String,         // id
    String,         // timetable_id
    String,         // teacher_id
    String,         // subject_id
    String,         // section_ids (JSON)
    String,         // day
    i32,            // period_number
    i32,            // session_length
    Option<String>, // room_id
);

pub struct GeneratedTimetableRepository {
    conn: Arc<Mutex<Connection>>,
}

impl GeneratedTimetableRepository {
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

    // ==========================================
    // 课表记录生命周期
    // ==========================================

    /// 创建课表记录 (通常为 pending 状态)
    pub fn create(&self, timetable: &GeneratedTimetable) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO generated_timetables (
                id, name, academic_year, period_template_id,
                generation_status, total_sessions, assigned_sessions, unassigned_sessions,
                generation_log, is_active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                timetable.timetable_id,
                timetable.name,
                timetable.academic_year,
                timetable.period_template_id,
                timetable.generation_status.to_db_str(),
                timetable.total_sessions,
                timetable.assigned_sessions,
                timetable.unassigned_sessions,
                to_json("generation_log", &timetable.generation_log)?,
                timetable.is_active,
                timetable.created_at,
            ],
        )?;
        Ok(())
    }

    /// 更新生成状态
    pub fn update_status(&self, timetable_id: &str, status: GenerationStatus) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE generated_timetables SET generation_status = ?2 WHERE id = ?1",
            params![timetable_id, status.to_db_str()],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "GeneratedTimetable".to_string(),
                id: timetable_id.to_string(),
            });
        }
        Ok(())
    }

    /// 按ID查找课表
    pub fn find_by_id(&self, timetable_id: &str) -> RepositoryResult<Option<GeneratedTimetable>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{} WHERE id = ?1", Self::SELECT_BASE))?;
        let result = stmt.query_row(params![timetable_id], Self::map_row);

        match result {
            Ok(row) => Ok(Some(Self::to_domain(row)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 列出某学年全部课表 (最新在前)
    pub fn list_by_year(&self, academic_year: &str) -> RepositoryResult<Vec<GeneratedTimetable>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE academic_year = ?1 ORDER BY created_at DESC, id",
            Self::SELECT_BASE
        ))?;
        let rows = stmt
            .query_map(params![academic_year], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        rows.into_iter().map(Self::to_domain).collect()
    }

    /// 独占激活: 同学年内先全部取消激活,再激活指定课表 (事务)
    pub fn set_active_exclusive(&self, timetable_id: &str) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tx.execute(
            "UPDATE generated_timetables SET is_active = 0
             WHERE academic_year = (SELECT academic_year FROM generated_timetables WHERE id = ?1)",
            params![timetable_id],
        )?;
        let affected = tx.execute(
            "UPDATE generated_timetables SET is_active = 1 WHERE id = ?1",
            params![timetable_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "GeneratedTimetable".to_string(),
                id: timetable_id.to_string(),
            });
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    /// 删除课表 (课次/未排记录外键级联删除)
    pub fn delete_by_id(&self, timetable_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM generated_timetables WHERE id = ?1",
            params![timetable_id],
        )?;
        Ok(affected)
    }

    // ==========================================
    // 生成结果写入
    // ==========================================

    /// 写入一次生成运行的完整结果 (单事务)
    ///
    /// 先清空旧的课次/未排记录再写入,保证重复生成不残留
    pub fn store_generation_result(
        &self,
        timetable_id: &str,
        status: GenerationStatus,
        total_sessions: i32,
        slots: &[TimetableSlot],
        unassigned: &[UnassignedSession],
        generation_log: &[String],
    ) -> RepositoryResult<()> {
        let log_json = to_json("generation_log", &generation_log)?;

        let mut slot_rows = Vec::with_capacity(slots.len());
        for slot in slots {
            slot_rows.push((slot, to_json("section_ids", &slot.section_ids)?));
        }
        let mut unassigned_rows = Vec::with_capacity(unassigned.len());
        for session in unassigned {
            unassigned_rows.push((
                session,
                to_json("conflict_reasons", &session.conflict_reasons)?,
                to_json("suggested_fixes", &session.suggested_fixes)?,
            ));
        }

        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Self::replace_results(&tx, timetable_id, &slot_rows, &unassigned_rows)?;

        let affected = tx.execute(
            r#"
            UPDATE generated_timetables
            SET generation_status = ?2,
                total_sessions = ?3,
                assigned_sessions = ?4,
                unassigned_sessions = ?5,
                generation_log = ?6
            WHERE id = ?1
            "#,
            params![
                timetable_id,
                status.to_db_str(),
                total_sessions,
                slots.len() as i32,
                unassigned.len() as i32,
                log_json,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "GeneratedTimetable".to_string(),
                id: timetable_id.to_string(),
            });
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    /// 标记生成失败并记录日志
    pub fn mark_failed(&self, timetable_id: &str, generation_log: &[String]) -> RepositoryResult<()> {
        let log_json = to_json("generation_log", &generation_log)?;
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE generated_timetables SET generation_status = 'failed', generation_log = ?2 WHERE id = ?1",
            params![timetable_id, log_json],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "GeneratedTimetable".to_string(),
                id: timetable_id.to_string(),
            });
        }
        Ok(())
    }

    fn replace_results(
        tx: &Transaction,
        timetable_id: &str,
        slot_rows: &[(&TimetableSlot, String)],
        unassigned_rows: &[(&UnassignedSession, String, String)],
    ) -> RepositoryResult<()> {
        tx.execute(
            "DELETE FROM timetable_slots WHERE timetable_id = ?1",
            params![timetable_id],
        )?;
        tx.execute(
            "DELETE FROM unassigned_sessions WHERE timetable_id = ?1",
            params![timetable_id],
        )?;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO timetable_slots (
                    id, timetable_id, teacher_id, subject_id, section_ids,
                    day, period_number, session_length, room_id
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )?;
            for (slot, section_ids_json) in slot_rows {
                stmt.execute(params![
                    slot.slot_id,
                    slot.timetable_id,
                    slot.teacher_id,
                    slot.subject_id,
                    section_ids_json,
                    slot.day.to_db_str(),
                    slot.period_number,
                    slot.session_length,
                    slot.room_id,
                ])?;
            }
        }

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO unassigned_sessions (
                    id, timetable_id, teaching_assignment_id, conflict_reasons, suggested_fixes
                ) VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )?;
            for (session, reasons_json, fixes_json) in unassigned_rows {
                stmt.execute(params![
                    session.session_id,
                    session.timetable_id,
                    session.teaching_assignment_id,
                    reasons_json,
                    fixes_json,
                ])?;
            }
        }

        Ok(())
    }

    // ==========================================
    // 结果查询
    // ==========================================

    /// 列出课表全部课次 (按 日/节次/ID)
    pub fn list_slots(&self, timetable_id: &str) -> RepositoryResult<Vec<TimetableSlot>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE timetable_id = ?1 ORDER BY day, period_number, id",
            Self::SELECT_SLOT_BASE
        ))?;
        let rows = stmt
            .query_map(params![timetable_id], Self::map_slot_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        rows.into_iter().map(Self::slot_to_domain).collect()
    }

    /// 查询覆盖某 (日, 节次) 格子的课次 (连排课次覆盖多格)
    pub fn find_slots_for_cell(
        &self,
        timetable_id: &str,
        day: Weekday,
        period_number: i32,
    ) -> RepositoryResult<Vec<TimetableSlot>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE timetable_id = ?1 AND day = ?2
               AND period_number <= ?3 AND period_number + session_length > ?3
             ORDER BY period_number, id",
            Self::SELECT_SLOT_BASE
        ))?;
        let rows = stmt
            .query_map(
                params![timetable_id, day.to_db_str(), period_number],
                Self::map_slot_row,
            )?
            .collect::<SqliteResult<Vec<_>>>()?;

        rows.into_iter().map(Self::slot_to_domain).collect()
    }

    /// 列出课表全部未排记录
    pub fn list_unassigned(&self, timetable_id: &str) -> RepositoryResult<Vec<UnassignedSession>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, timetable_id, teaching_assignment_id, conflict_reasons, suggested_fixes
            FROM unassigned_sessions
            WHERE timetable_id = ?1
            ORDER BY id
            "#,
        )?;
        let rows = stmt
            .query_map(params![timetable_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        rows.into_iter()
            .map(|(id, timetable_id, assignment_id, reasons, fixes)| {
                Ok(UnassignedSession {
                    session_id: id,
                    timetable_id,
                    teaching_assignment_id: assignment_id,
                    conflict_reasons: from_json("conflict_reasons", &reasons)?,
                    suggested_fixes: from_json("suggested_fixes", &fixes)?,
                })
            })
            .collect()
    }

    // ==========================================
    // 行映射
    // ==========================================

    const SELECT_BASE: &'static str = r#"
        SELECT id, name, academic_year, period_template_id,
               generation_status, total_sessions, assigned_sessions, unassigned_sessions,
               generation_log, is_active, created_at
        FROM generated_timetables
    "#;

    const SELECT_SLOT_BASE: &'static str = r#"
        SELECT id, timetable_id, teacher_id, subject_id, section_ids,
               day, period_number, session_length, room_id
        FROM timetable_slots
    "#;

    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<TimetableRow> {
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
        ))
    }

    fn to_domain(row: TimetableRow) -> RepositoryResult<GeneratedTimetable> {
        Ok(GeneratedTimetable {
            timetable_id: row.0,
            name: row.1,
            academic_year: row.2,
            period_template_id: row.3,
            generation_status: GenerationStatus::from_str(&row.4),
            total_sessions: row.5,
            assigned_sessions: row.6,
            unassigned_sessions: row.7,
            generation_log: from_json("generation_log", &row.8)?,
            is_active: row.9,
            created_at: row.10,
        })
    }

    fn map_slot_row(row: &rusqlite::Row) -> rusqlite::Result<SlotRow> {
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
        ))
    }

    fn slot_to_domain(row: SlotRow) -> RepositoryResult<TimetableSlot> {
        Ok(TimetableSlot {
            slot_id: row.0,
            timetable_id: row.1,
            teacher_id: row.2,
            subject_id: row.3,
            section_ids: from_json("section_ids", &row.4)?,
            day: parse_day("day", &row.5)?,
            period_number: row.6,
            session_length: row.7,
            room_id: row.8,
        })
    }
}
