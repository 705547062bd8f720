// ==========================================
// 学校排课系统 - 教室仓储
// ==========================================
// 职责: 管理 rooms 表
// ==========================================

use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::assignment::Room;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex};

pub struct RoomRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RoomRepository {
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

    /// 插入教室
    pub fn insert(&self, room: &Room) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO rooms (id, name, capacity, room_type, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                room.room_id,
                room.name,
                room.capacity,
                room.room_type,
                room.is_active,
                room.created_at,
            ],
        )?;
        Ok(())
    }

    /// 按ID查找教室
    pub fn find_by_id(&self, room_id: &str) -> RepositoryResult<Option<Room>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{} WHERE id = ?1", Self::SELECT_BASE))?;
        let result = stmt.query_row(params![room_id], Self::map_row);

        match result {
            Ok(room) => Ok(Some(room)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 列出全部教室 (按名称)
    pub fn list_all(&self) -> RepositoryResult<Vec<Room>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY name, id", Self::SELECT_BASE))?;
        let rows = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 列出启用教室 (按名称)
    pub fn list_active(&self) -> RepositoryResult<Vec<Room>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE is_active = 1 ORDER BY name, id",
            Self::SELECT_BASE
        ))?;
        let rows = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 设置启用标记
    pub fn set_active(&self, room_id: &str, is_active: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE rooms SET is_active = ?2 WHERE id = ?1",
            params![room_id, is_active],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Room".to_string(),
                id: room_id.to_string(),
            });
        }
        Ok(())
    }

    /// 按ID删除教室
    pub fn delete_by_id(&self, room_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM rooms WHERE id = ?1", params![room_id])?;
        Ok(affected)
    }

    const SELECT_BASE: &'static str =
        "SELECT id, name, capacity, room_type, is_active, created_at FROM rooms";

    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<Room> {
        Ok(Room {
            room_id: row.get(0)?,
            name: row.get(1)?,
            capacity: row.get(2)?,
            room_type: row.get(3)?,
            is_active: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}
