// ==========================================
// 学校排课系统 - 作息模板仓储
// ==========================================
// 职责: 管理 period_templates 表
// 说明: days_of_week / period_timings 以 JSON 文本存储
// ==========================================

use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::period_template::{PeriodTemplate, PeriodTiming};
use crate::domain::types::Weekday;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{from_json, to_json};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex};

// 行快照: (id, name, academic_year, days_of_week, periods_per_day, period_timings, is_active, created_at)
type TemplateRow = (String, String, String, String, i32, String, bool, NaiveDateTime);

pub struct PeriodTemplateRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PeriodTemplateRepository {
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

    /// 插入作息模板
    pub fn insert(&self, template: &PeriodTemplate) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO period_templates (
                id, name, academic_year, days_of_week,
                periods_per_day, period_timings, is_active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                template.template_id,
                template.name,
                template.academic_year,
                to_json("days_of_week", &template.days_of_week)?,
                template.periods_per_day,
                to_json("period_timings", &template.period_timings)?,
                template.is_active,
                template.created_at,
            ],
        )?;
        Ok(())
    }

    /// 按ID查找模板
    pub fn find_by_id(&self, template_id: &str) -> RepositoryResult<Option<PeriodTemplate>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{} WHERE id = ?1", Self::SELECT_BASE))?;
        let result = stmt.query_row(params![template_id], Self::map_row);

        match result {
            Ok(row) => Ok(Some(Self::to_domain(row)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查找某学年当前激活的模板 (至多一个,取最新)
    pub fn find_active_by_year(&self, academic_year: &str) -> RepositoryResult<Option<PeriodTemplate>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE academic_year = ?1 AND is_active = 1 ORDER BY created_at DESC, id LIMIT 1",
            Self::SELECT_BASE
        ))?;
        let result = stmt.query_row(params![academic_year], Self::map_row);

        match result {
            Ok(row) => Ok(Some(Self::to_domain(row)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 列出某学年全部模板 (按创建时间)
    pub fn list_by_year(&self, academic_year: &str) -> RepositoryResult<Vec<PeriodTemplate>> {
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

    /// 独占激活: 同学年内先全部取消激活,再激活指定模板 (事务)
    pub fn set_active_exclusive(&self, template_id: &str) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tx.execute(
            "UPDATE period_templates SET is_active = 0
             WHERE academic_year = (SELECT academic_year FROM period_templates WHERE id = ?1)",
            params![template_id],
        )?;
        let affected = tx.execute(
            "UPDATE period_templates SET is_active = 1 WHERE id = ?1",
            params![template_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "PeriodTemplate".to_string(),
                id: template_id.to_string(),
            });
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    /// 按ID删除模板
    pub fn delete_by_id(&self, template_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM period_templates WHERE id = ?1",
            params![template_id],
        )?;
        Ok(affected)
    }

    const SELECT_BASE: &'static str = r#"
        SELECT id, name, academic_year, days_of_week,
               periods_per_day, period_timings, is_active, created_at
        FROM period_templates
    "#;

    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<TemplateRow> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
            row.get(7)?,
        ))
    }

    fn to_domain(row: TemplateRow) -> RepositoryResult<PeriodTemplate> {
        let days: Vec<Weekday> = from_json("days_of_week", &row.3)?;
        let timings: Vec<PeriodTiming> = from_json("period_timings", &row.5)?;
        Ok(PeriodTemplate {
            template_id: row.0,
            name: row.1,
            academic_year: row.2,
            days_of_week: days,
            periods_per_day: row.4,
            period_timings: timings,
            is_active: row.6,
            created_at: row.7,
        })
    }
}
