// ==========================================
// 露天矿运输跟踪系统 - 矿石载荷仓储
// ==========================================
// 红线: Repository 不含引擎逻辑
// 载荷仅在开单/直接入库事务内创建 (insert_in_tx),
// 成分取值范围由 CHECK 约束在存储层兜底
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::mineral::{Mineral, OreComposition};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::parse_ts;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};

// ==========================================
// MineralRepository - 矿石载荷仓储
// ==========================================

/// 矿石载荷仓储
/// 职责: mineral 表的查询; 插入仅通过 insert_in_tx 供兄弟仓储复用
pub struct MineralRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MineralRepository {
    /// 创建新的矿石载荷仓储实例
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

    /// 在已开启的事务内插入矿石载荷
    ///
    /// # 参数
    /// - conn: 事务所在连接 (Transaction Deref 到 Connection)
    /// - comp: 成分
    /// - now: 统一时间戳 (与外层记录一致)
    ///
    /// # 返回
    /// - Ok(i64): 新载荷主键
    pub(crate) fn insert_in_tx(
        conn: &Connection,
        comp: &OreComposition,
        now: &str,
    ) -> SqliteResult<i64> {
        conn.execute(
            r#"
            INSERT INTO mineral (weight_t, sio2_pct, fe_pct, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![comp.weight_t, comp.sio2_pct, comp.fe_pct, now],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 按主键查询
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Mineral>> {
        let conn = self.get_conn()?;

        let mineral = conn
            .query_row(
                r#"
                SELECT id, weight_t, sio2_pct, fe_pct, created_at
                FROM mineral
                WHERE id = ?1
                "#,
                params![id],
                |row| {
                    Ok(Mineral {
                        id: row.get(0)?,
                        weight_t: row.get(1)?,
                        sio2_pct: row.get(2)?,
                        fe_pct: row.get(3)?,
                        created_at: parse_ts(&row.get::<_, String>(4)?),
                    })
                },
            )
            .optional()?;

        Ok(mineral)
    }

    /// 记录总数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n = conn.query_row("SELECT COUNT(*) FROM mineral", [], |row| row.get(0))?;
        Ok(n)
    }
}
