// ==========================================
// 露天矿运输跟踪系统 - 运输单仓储
// ==========================================
// 红线: Repository 不含引擎逻辑
// 单活跃运输单由部分唯一索引在存储层兜底;
// 关单使用受卫 UPDATE, 已关单不可重开
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::mineral::OreComposition;
use crate::domain::trip::Trip;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::mineral_repo::MineralRepository;
use crate::repository::{now_ts, parse_ts};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

// ==========================================
// ActiveTripRecord - 活跃运输单联查记录
// ==========================================
// 用途: 操作员录入界面的行数据 (卡车/型号/载重联查)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveTripRecord {
    pub trip_id: i64,
    pub truck_id: i64,
    pub truck_number: String,
    pub truck_model_title: String,
    pub truck_max_weight_t: i64,
    pub mineral_weight_t: i64,
}

// ==========================================
// ClosedTripLoad - 已关单载荷快照
// ==========================================
// 用途: 报告引擎输入 (卸载点 + 成分)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosedTripLoad {
    pub trip_id: i64,
    pub unloading_point_wkt: String,
    pub weight_t: i64,
    pub sio2_pct: i64,
    pub fe_pct: i64,
}

// ==========================================
// TripRepository - 运输单仓储
// ==========================================

/// 运输单仓储
/// 职责: 管理 trip 表的开单/关单/联查
pub struct TripRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TripRepository {
    /// 创建新的运输单仓储实例
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

    fn map_row(row: &rusqlite::Row<'_>) -> SqliteResult<Trip> {
        let closed_at: Option<String> = row.get(5)?;
        Ok(Trip {
            id: row.get(0)?,
            truck_id: row.get(1)?,
            mineral_id: row.get(2)?,
            unloading_point_wkt: row.get(3)?,
            created_at: parse_ts(&row.get::<_, String>(4)?),
            closed_at: closed_at.as_deref().map(parse_ts),
        })
    }

    const SELECT_COLUMNS: &'static str =
        "id, truck_id, mineral_id, unloading_point_wkt, created_at, closed_at";

    /// 开运输单 (载荷 + 运输单, 单事务)
    ///
    /// # 返回
    /// - Ok(Trip): 新活跃运输单
    /// - Err(UniqueConstraintViolation): 该卡车已有活跃运输单
    ///   (部分唯一索引 idx_trip_one_active_per_truck 兜底)
    /// - Err(ForeignKeyViolation): 卡车不存在
    pub fn start(&self, truck_id: i64, comp: &OreComposition) -> RepositoryResult<Trip> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let now = now_ts();

        let mineral_id = MineralRepository::insert_in_tx(&tx, comp, &now)?;

        tx.execute(
            r#"
            INSERT INTO trip (truck_id, mineral_id, unloading_point_wkt, created_at, closed_at)
            VALUES (?1, ?2, NULL, ?3, NULL)
            "#,
            params![truck_id, mineral_id, now],
        )?;

        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Trip {
            id,
            truck_id,
            mineral_id,
            unloading_point_wkt: None,
            created_at: parse_ts(&now),
            closed_at: None,
        })
    }

    /// 关运输单 (录入卸载点, 仅允许 Active → Closed)
    ///
    /// 受卫 UPDATE: 只命中卸载点仍为 NULL 的行;
    /// 未命中时区分"不存在"与"已关单"
    ///
    /// # 返回
    /// - Ok(Trip): 关单后的记录
    /// - Err(NotFound): 运输单不存在
    /// - Err(InvalidStateTransition): 运输单已关
    pub fn close(&self, trip_id: i64, unloading_point_wkt: &str) -> RepositoryResult<Trip> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let now = now_ts();

        let affected = tx.execute(
            r#"
            UPDATE trip
            SET unloading_point_wkt = ?1, closed_at = ?2
            WHERE id = ?3 AND unloading_point_wkt IS NULL
            "#,
            params![unloading_point_wkt, now, trip_id],
        )?;

        if affected == 0 {
            let exists: bool = tx
                .query_row("SELECT 1 FROM trip WHERE id = ?1", params![trip_id], |_| {
                    Ok(true)
                })
                .optional()?
                .unwrap_or(false);

            return Err(if exists {
                RepositoryError::InvalidStateTransition {
                    from: "CLOSED".to_string(),
                    to: "CLOSED".to_string(),
                }
            } else {
                RepositoryError::NotFound {
                    entity: "Trip".to_string(),
                    id: trip_id.to_string(),
                }
            });
        }

        let trip = tx.query_row(
            &format!("SELECT {} FROM trip WHERE id = ?1", Self::SELECT_COLUMNS),
            params![trip_id],
            Self::map_row,
        )?;
        tx.commit()?;

        Ok(trip)
    }

    /// 按主键查询
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Trip>> {
        let conn = self.get_conn()?;

        let trip = conn
            .query_row(
                &format!("SELECT {} FROM trip WHERE id = ?1", Self::SELECT_COLUMNS),
                params![id],
                Self::map_row,
            )
            .optional()?;

        Ok(trip)
    }

    /// 查询某卡车的活跃运输单 (开单冲突预检)
    pub fn find_active_by_truck(&self, truck_id: i64) -> RepositoryResult<Option<Trip>> {
        let conn = self.get_conn()?;

        let trip = conn
            .query_row(
                &format!(
                    "SELECT {} FROM trip WHERE truck_id = ?1 AND unloading_point_wkt IS NULL",
                    Self::SELECT_COLUMNS
                ),
                params![truck_id],
                Self::map_row,
            )
            .optional()?;

        Ok(trip)
    }

    /// 活跃运输单联查 (卡车/型号/载荷, 按开单顺序)
    pub fn list_active_records(&self) -> RepositoryResult<Vec<ActiveTripRecord>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT
                t.id, tr.id, tr.number, tm.title, tm.max_weight_t, m.weight_t
            FROM trip t
            JOIN truck tr ON tr.id = t.truck_id
            JOIN truck_model tm ON tm.id = tr.truck_model_id
            JOIN mineral m ON m.id = t.mineral_id
            WHERE t.unloading_point_wkt IS NULL
            ORDER BY t.id
            "#,
        )?;

        let records = stmt
            .query_map([], |row| {
                Ok(ActiveTripRecord {
                    trip_id: row.get(0)?,
                    truck_id: row.get(1)?,
                    truck_number: row.get(2)?,
                    truck_model_title: row.get(3)?,
                    truck_max_weight_t: row.get(4)?,
                    mineral_weight_t: row.get(5)?,
                })
            })?
            .collect::<SqliteResult<Vec<ActiveTripRecord>>>()?;

        Ok(records)
    }

    /// 已关单载荷快照 (报告 *_after 口径输入)
    pub fn list_closed_loads(&self) -> RepositoryResult<Vec<ClosedTripLoad>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT t.id, t.unloading_point_wkt, m.weight_t, m.sio2_pct, m.fe_pct
            FROM trip t
            JOIN mineral m ON m.id = t.mineral_id
            WHERE t.unloading_point_wkt IS NOT NULL
            ORDER BY t.id
            "#,
        )?;

        let loads = stmt
            .query_map([], |row| {
                Ok(ClosedTripLoad {
                    trip_id: row.get(0)?,
                    unloading_point_wkt: row.get(1)?,
                    weight_t: row.get(2)?,
                    sio2_pct: row.get(3)?,
                    fe_pct: row.get(4)?,
                })
            })?
            .collect::<SqliteResult<Vec<ClosedTripLoad>>>()?;

        Ok(loads)
    }

    /// 记录总数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n = conn.query_row("SELECT COUNT(*) FROM trip", [], |row| row.get(0))?;
        Ok(n)
    }

    /// 活跃运输单总数
    pub fn count_active(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n = conn.query_row(
            "SELECT COUNT(*) FROM trip WHERE unloading_point_wkt IS NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(n)
    }
}
