// ==========================================
// 露天矿运输跟踪系统 - 卡车仓储
// ==========================================
// 红线: Repository 不含引擎逻辑
// 唯一性: number_norm 唯一索引在存储层兜底
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::truck::{Truck, TruckModel};
use crate::domain::types::normalized_key;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{now_ts, parse_ts};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};

// ==========================================
// TruckRepository - 卡车仓储
// ==========================================

/// 卡车仓储
/// 职责: 管理 truck 表的 CRUD 操作
pub struct TruckRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TruckRepository {
    /// 创建新的卡车仓储实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &rusqlite::Row<'_>) -> SqliteResult<Truck> {
        Ok(Truck {
            id: row.get(0)?,
            number: row.get(1)?,
            truck_model_id: row.get(2)?,
            created_at: parse_ts(&row.get::<_, String>(3)?),
            updated_at: parse_ts(&row.get::<_, String>(4)?),
        })
    }

    /// 插入卡车
    ///
    /// # 返回
    /// - Ok(Truck): 新记录
    /// - Err(UniqueConstraintViolation): number 忽略大小写重复
    /// - Err(ForeignKeyViolation): 型号不存在
    pub fn insert(&self, number: &str, truck_model_id: i64) -> RepositoryResult<Truck> {
        let conn = self.get_conn()?;
        let now = now_ts();

        conn.execute(
            r#"
            INSERT INTO truck (number, number_norm, truck_model_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            "#,
            params![number, normalized_key(number), truck_model_id, now],
        )?;

        let id = conn.last_insert_rowid();
        Ok(Truck {
            id,
            number: number.to_string(),
            truck_model_id,
            created_at: parse_ts(&now),
            updated_at: parse_ts(&now),
        })
    }

    /// 按主键查询
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Truck>> {
        let conn = self.get_conn()?;

        let truck = conn
            .query_row(
                r#"
                SELECT id, number, truck_model_id, created_at, updated_at
                FROM truck
                WHERE id = ?1
                "#,
                params![id],
                Self::map_row,
            )
            .optional()?;

        Ok(truck)
    }

    /// 按归一化编号查询 (忽略大小写唯一性预检)
    pub fn find_by_norm(&self, number_norm: &str) -> RepositoryResult<Option<Truck>> {
        let conn = self.get_conn()?;

        let truck = conn
            .query_row(
                r#"
                SELECT id, number, truck_model_id, created_at, updated_at
                FROM truck
                WHERE number_norm = ?1
                "#,
                params![number_norm],
                Self::map_row,
            )
            .optional()?;

        Ok(truck)
    }

    /// 按主键查询卡车及其型号
    pub fn find_with_model(&self, id: i64) -> RepositoryResult<Option<(Truck, TruckModel)>> {
        let conn = self.get_conn()?;

        let pair = conn
            .query_row(
                r#"
                SELECT
                    t.id, t.number, t.truck_model_id, t.created_at, t.updated_at,
                    m.id, m.title, m.max_weight_t, m.created_at, m.updated_at
                FROM truck t
                JOIN truck_model m ON m.id = t.truck_model_id
                WHERE t.id = ?1
                "#,
                params![id],
                |row| {
                    Ok((
                        Truck {
                            id: row.get(0)?,
                            number: row.get(1)?,
                            truck_model_id: row.get(2)?,
                            created_at: parse_ts(&row.get::<_, String>(3)?),
                            updated_at: parse_ts(&row.get::<_, String>(4)?),
                        },
                        TruckModel {
                            id: row.get(5)?,
                            title: row.get(6)?,
                            max_weight_t: row.get(7)?,
                            created_at: parse_ts(&row.get::<_, String>(8)?),
                            updated_at: parse_ts(&row.get::<_, String>(9)?),
                        },
                    ))
                },
            )
            .optional()?;

        Ok(pair)
    }

    /// 全量查询 (按插入顺序)
    pub fn list_all(&self) -> RepositoryResult<Vec<Truck>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, number, truck_model_id, created_at, updated_at
            FROM truck
            ORDER BY id
            "#,
        )?;

        let trucks = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<Truck>>>()?;

        Ok(trucks)
    }

    /// 删除卡车 (级联删除名下运输单)
    pub fn delete(&self, id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM truck WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    /// 记录总数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n = conn.query_row("SELECT COUNT(*) FROM truck", [], |row| row.get(0))?;
        Ok(n)
    }
}
