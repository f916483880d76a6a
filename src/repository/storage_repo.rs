// ==========================================
// 露天矿运输跟踪系统 - 堆场仓储
// ==========================================
// 红线: Repository 不含引擎逻辑
// 例外: 边界两两不相交是存储层约束, SQLite 无法声明式表达,
//       因此在插入事务内用几何谓词强制 (连接互斥 + 事务关闭竞态窗口)
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::storage::Storage;
use crate::domain::types::normalized_key;
use crate::geometry;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{now_ts, parse_ts};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};

// ==========================================
// StorageRepository - 堆场仓储
// ==========================================

/// 堆场仓储
/// 职责: 管理 storage 表的 CRUD 操作, 插入时强制边界不相交
pub struct StorageRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StorageRepository {
    /// 创建新的堆场仓储实例
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

    fn map_row(row: &rusqlite::Row<'_>) -> SqliteResult<Storage> {
        Ok(Storage {
            id: row.get(0)?,
            title: row.get(1)?,
            territory_wkt: row.get(2)?,
            created_at: parse_ts(&row.get::<_, String>(3)?),
        })
    }

    /// 插入堆场
    ///
    /// 在单个事务内完成既有边界相交检查与插入:
    /// 候选边界与任何既有边界非不相交 (含共享边/公共单点) 即拒绝
    ///
    /// # 返回
    /// - Ok(Storage): 新记录
    /// - Err(TerritoryOverlap): 与既有堆场边界相交
    /// - Err(UniqueConstraintViolation): title 忽略大小写重复
    /// - Err(Geometry): territory_wkt 不是合法 POLYGON
    pub fn insert(&self, title: &str, territory_wkt: &str) -> RepositoryResult<Storage> {
        let candidate = geometry::parse_territory(territory_wkt)?;

        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        // 相交检查与插入同事务: 并发写入方串行化于此
        {
            let mut stmt = tx.prepare("SELECT title, territory_wkt FROM storage ORDER BY id")?;
            let existing = stmt
                .query_map([], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })?
                .collect::<SqliteResult<Vec<(String, String)>>>()?;

            for (existing_title, existing_wkt) in existing {
                let territory = geometry::parse_territory(&existing_wkt)?;
                if geometry::territories_intersect(&candidate, &territory) {
                    return Err(RepositoryError::TerritoryOverlap { existing_title });
                }
            }
        }

        let now = now_ts();
        tx.execute(
            r#"
            INSERT INTO storage (title, title_norm, territory_wkt, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![title, normalized_key(title), territory_wkt, now],
        )?;

        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Storage {
            id,
            title: title.to_string(),
            territory_wkt: territory_wkt.to_string(),
            created_at: parse_ts(&now),
        })
    }

    /// 按主键查询
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Storage>> {
        let conn = self.get_conn()?;

        let storage = conn
            .query_row(
                r#"
                SELECT id, title, territory_wkt, created_at
                FROM storage
                WHERE id = ?1
                "#,
                params![id],
                Self::map_row,
            )
            .optional()?;

        Ok(storage)
    }

    /// 按归一化名称查询 (忽略大小写唯一性预检)
    pub fn find_by_norm(&self, title_norm: &str) -> RepositoryResult<Option<Storage>> {
        let conn = self.get_conn()?;

        let storage = conn
            .query_row(
                r#"
                SELECT id, title, territory_wkt, created_at
                FROM storage
                WHERE title_norm = ?1
                "#,
                params![title_norm],
                Self::map_row,
            )
            .optional()?;

        Ok(storage)
    }

    /// 全量查询 (按插入顺序, 报告行序依赖此序)
    pub fn list_all(&self) -> RepositoryResult<Vec<Storage>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, title, territory_wkt, created_at
            FROM storage
            ORDER BY id
            "#,
        )?;

        let storages = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<Storage>>>()?;

        Ok(storages)
    }

    /// 记录总数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n = conn.query_row("SELECT COUNT(*) FROM storage", [], |row| row.get(0))?;
        Ok(n)
    }
}
