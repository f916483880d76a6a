// ==========================================
// 露天矿运输跟踪系统 - 卡车型号仓储
// ==========================================
// 红线: Repository 不含引擎逻辑
// 唯一性: title_norm 唯一索引在存储层兜底
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::truck::TruckModel;
use crate::domain::types::normalized_key;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{now_ts, parse_ts};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};

// ==========================================
// TruckModelRepository - 卡车型号仓储
// ==========================================

/// 卡车型号仓储
/// 职责: 管理 truck_model 表的 CRUD 操作
pub struct TruckModelRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TruckModelRepository {
    /// 创建新的卡车型号仓储实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
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

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &rusqlite::Row<'_>) -> SqliteResult<TruckModel> {
        Ok(TruckModel {
            id: row.get(0)?,
            title: row.get(1)?,
            max_weight_t: row.get(2)?,
            created_at: parse_ts(&row.get::<_, String>(3)?),
            updated_at: parse_ts(&row.get::<_, String>(4)?),
        })
    }

    /// 插入卡车型号
    ///
    /// # 返回
    /// - Ok(TruckModel): 新记录
    /// - Err(UniqueConstraintViolation): title 忽略大小写重复
    /// - Err(CheckConstraintViolation): title 为空或 max_weight_t <= 0
    pub fn insert(&self, title: &str, max_weight_t: i64) -> RepositoryResult<TruckModel> {
        let conn = self.get_conn()?;
        let now = now_ts();

        conn.execute(
            r#"
            INSERT INTO truck_model (title, title_norm, max_weight_t, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            "#,
            params![title, normalized_key(title), max_weight_t, now],
        )?;

        let id = conn.last_insert_rowid();
        Ok(TruckModel {
            id,
            title: title.to_string(),
            max_weight_t,
            created_at: parse_ts(&now),
            updated_at: parse_ts(&now),
        })
    }

    /// 按主键查询
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<TruckModel>> {
        let conn = self.get_conn()?;

        let model = conn
            .query_row(
                r#"
                SELECT id, title, max_weight_t, created_at, updated_at
                FROM truck_model
                WHERE id = ?1
                "#,
                params![id],
                Self::map_row,
            )
            .optional()?;

        Ok(model)
    }

    /// 按归一化名称查询 (忽略大小写唯一性预检)
    pub fn find_by_norm(&self, title_norm: &str) -> RepositoryResult<Option<TruckModel>> {
        let conn = self.get_conn()?;

        let model = conn
            .query_row(
                r#"
                SELECT id, title, max_weight_t, created_at, updated_at
                FROM truck_model
                WHERE title_norm = ?1
                "#,
                params![title_norm],
                Self::map_row,
            )
            .optional()?;

        Ok(model)
    }

    /// 全量查询 (按插入顺序)
    pub fn list_all(&self) -> RepositoryResult<Vec<TruckModel>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, title, max_weight_t, created_at, updated_at
            FROM truck_model
            ORDER BY id
            "#,
        )?;

        let models = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<TruckModel>>>()?;

        Ok(models)
    }

    /// 删除型号 (级联删除名下卡车与其运输单)
    ///
    /// # 返回
    /// - Ok(true): 删除成功
    /// - Ok(false): 记录不存在
    pub fn delete(&self, id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM truck_model WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    /// 记录总数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n = conn.query_row("SELECT COUNT(*) FROM truck_model", [], |row| row.get(0))?;
        Ok(n)
    }
}
