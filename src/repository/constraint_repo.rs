// ==========================================
// 学校排课系统 - 可用性约束仓储
// ==========================================
// 职责: 管理 availability_constraints 表
// 唯一键: (constraint_type, entity_id, day, period_number, academic_year)
// 说明: upsert 后写覆盖先写,与引擎的约束集语义一致
// ==========================================

use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::constraint::AvailabilityConstraint;
use crate::domain::types::ConstraintType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::parse_day;
use rusqlite::{params, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex};

// 行快照: (id, constraint_type, entity_id, day, period_number, is_available, academic_year)
type ConstraintRow = (String, String, String, String, i32, bool, String);

pub struct AvailabilityConstraintRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AvailabilityConstraintRepository {
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

    /// 创建或更新约束 (Upsert 操作)
    /// 同一 (类型, 主体, 星期, 节次, 学年) 已存在时更新 is_available
    pub fn upsert(&self, constraint: &AvailabilityConstraint) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO availability_constraints (
                id, constraint_type, entity_id, day, period_number, is_available, academic_year
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(constraint_type, entity_id, day, period_number, academic_year)
            DO UPDATE SET is_available = excluded.is_available
            "#,
            params![
                constraint.constraint_id,
                constraint.constraint_type.to_db_str(),
                constraint.entity_id,
                constraint.day.to_db_str(),
                constraint.period_number,
                constraint.is_available,
                constraint.academic_year,
            ],
        )?;
        Ok(())
    }

    /// 列出某学年全部约束
    pub fn list_by_year(&self, academic_year: &str) -> RepositoryResult<Vec<AvailabilityConstraint>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE academic_year = ?1 ORDER BY constraint_type, entity_id, day, period_number",
            Self::SELECT_BASE
        ))?;
        let rows = stmt
            .query_map(params![academic_year], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        rows.into_iter().map(Self::to_domain).collect()
    }

    /// 列出某主体的全部约束
    pub fn list_by_entity(
        &self,
        constraint_type: ConstraintType,
        entity_id: &str,
        academic_year: &str,
    ) -> RepositoryResult<Vec<AvailabilityConstraint>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE constraint_type = ?1 AND entity_id = ?2 AND academic_year = ?3
             ORDER BY day, period_number",
            Self::SELECT_BASE
        ))?;
        let rows = stmt
            .query_map(
                params![constraint_type.to_db_str(), entity_id, academic_year],
                Self::map_row,
            )?
            .collect::<SqliteResult<Vec<_>>>()?;

        rows.into_iter().map(Self::to_domain).collect()
    }

    /// 按ID删除约束
    pub fn delete_by_id(&self, constraint_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM availability_constraints WHERE id = ?1",
            params![constraint_id],
        )?;
        Ok(affected)
    }

    /// 删除某主体的全部约束 (主体删除时清理)
    pub fn delete_by_entity(
        &self,
        constraint_type: ConstraintType,
        entity_id: &str,
        academic_year: &str,
    ) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM availability_constraints
             WHERE constraint_type = ?1 AND entity_id = ?2 AND academic_year = ?3",
            params![constraint_type.to_db_str(), entity_id, academic_year],
        )?;
        Ok(affected)
    }

    const SELECT_BASE: &'static str = r#"
        SELECT id, constraint_type, entity_id, day, period_number, is_available, academic_year
        FROM availability_constraints
    "#;

    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<ConstraintRow> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
        ))
    }

    fn to_domain(row: ConstraintRow) -> RepositoryResult<AvailabilityConstraint> {
        let constraint_type =
            ConstraintType::from_str(&row.1).ok_or_else(|| RepositoryError::FieldValueError {
                field: "constraint_type".to_string(),
                message: format!("无法识别的约束主体类型: {}", row.1),
            })?;
        Ok(AvailabilityConstraint {
            constraint_id: row.0,
            constraint_type,
            entity_id: row.2,
            day: parse_day("day", &row.3)?,
            period_number: row.4,
            is_available: row.5,
            academic_year: row.6,
        })
    }
}
