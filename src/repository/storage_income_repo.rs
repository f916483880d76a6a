// ==========================================
// 露天矿运输跟踪系统 - 直接入库仓储
// ==========================================
// 红线: Repository 不含引擎逻辑
// 载荷与入库记录同事务创建, 保证 1:1 独占
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::mineral::OreComposition;
use crate::domain::storage::StorageIncome;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::mineral_repo::MineralRepository;
use crate::repository::{now_ts, parse_ts};
use rusqlite::{params, Connection, Result as SqliteResult};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

// ==========================================
// StorageIncomeTotals - 按堆场分组的入库加权合计
// ==========================================
// 用途: 报告引擎输入快照 (weighted = Σ weight × pct)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageIncomeTotals {
    pub storage_id: i64,
    pub weight_t: i64,
    pub sio2_weighted: i64,
    pub fe_weighted: i64,
}

// ==========================================
// StorageIncomeRepository - 直接入库仓储
// ==========================================

/// 直接入库仓储
/// 职责: 管理 storage_income 表与入库聚合查询
pub struct StorageIncomeRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StorageIncomeRepository {
    /// 创建新的直接入库仓储实例
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

    /// 记录一次直接入库 (载荷 + 入库记录, 单事务)
    ///
    /// # 返回
    /// - Ok(StorageIncome): 新记录
    /// - Err(ForeignKeyViolation): 堆场不存在
    /// - Err(CheckConstraintViolation): 成分越界 (存储层兜底)
    pub fn record(&self, storage_id: i64, comp: &OreComposition) -> RepositoryResult<StorageIncome> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let now = now_ts();

        let mineral_id = MineralRepository::insert_in_tx(&tx, comp, &now)?;

        tx.execute(
            r#"
            INSERT INTO storage_income (mineral_id, storage_id, created_at)
            VALUES (?1, ?2, ?3)
            "#,
            params![mineral_id, storage_id, now],
        )?;

        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(StorageIncome {
            id,
            mineral_id,
            storage_id,
            created_at: parse_ts(&now),
        })
    }

    /// 按堆场查询入库记录
    pub fn list_by_storage(&self, storage_id: i64) -> RepositoryResult<Vec<StorageIncome>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, mineral_id, storage_id, created_at
            FROM storage_income
            WHERE storage_id = ?1
            ORDER BY id
            "#,
        )?;

        let incomes = stmt
            .query_map(params![storage_id], |row| {
                Ok(StorageIncome {
                    id: row.get(0)?,
                    mineral_id: row.get(1)?,
                    storage_id: row.get(2)?,
                    created_at: parse_ts(&row.get::<_, String>(3)?),
                })
            })?
            .collect::<SqliteResult<Vec<StorageIncome>>>()?;

        Ok(incomes)
    }

    /// 按堆场分组的入库加权合计 (报告 *_before 口径)
    ///
    /// 无入库记录的堆场不产生行, 由报告引擎补零
    pub fn sum_by_storage(&self) -> RepositoryResult<Vec<StorageIncomeTotals>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT
                i.storage_id,
                COALESCE(SUM(m.weight_t), 0),
                COALESCE(SUM(m.weight_t * m.sio2_pct), 0),
                COALESCE(SUM(m.weight_t * m.fe_pct), 0)
            FROM storage_income i
            JOIN mineral m ON m.id = i.mineral_id
            GROUP BY i.storage_id
            ORDER BY i.storage_id
            "#,
        )?;

        let totals = stmt
            .query_map([], |row| {
                Ok(StorageIncomeTotals {
                    storage_id: row.get(0)?,
                    weight_t: row.get(1)?,
                    sio2_weighted: row.get(2)?,
                    fe_weighted: row.get(3)?,
                })
            })?
            .collect::<SqliteResult<Vec<StorageIncomeTotals>>>()?;

        Ok(totals)
    }

    /// 记录总数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n = conn.query_row("SELECT COUNT(*) FROM storage_income", [], |row| row.get(0))?;
        Ok(n)
    }
}
