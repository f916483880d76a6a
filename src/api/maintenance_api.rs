// ==========================================
// 露天矿运输跟踪系统 - 维护 API
// ==========================================
// 职责: 恢复演示数据 (清空运营数据 + 固定演示集)
// 幂等: 重复执行得到同一份演示数据
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::api::fleet_api::DEFAULT_ACTOR;
use crate::config::config_keys;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::types::normalized_key;
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::now_ts;

/// 内置管理员用户名与初始口令
const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "admin";

/// 演示堆场边界
const DEMO_TERRITORY_WKT: &str = "POLYGON ((30 10, 40 40, 20 40, 10 20, 30 10))";

// ==========================================
// MaintenanceApi - 维护 API
// ==========================================

/// 维护API
///
/// 直接持有共享连接: 清空 + 种子须在单事务内完成,
/// 跨仓储组合无法保证这一点
pub struct MaintenanceApi {
    conn: Arc<Mutex<Connection>>,
    action_log_repo: Arc<ActionLogRepository>,
}

impl MaintenanceApi {
    /// 创建新的MaintenanceApi实例
    pub fn new(conn: Arc<Mutex<Connection>>, action_log_repo: Arc<ActionLogRepository>) -> Self {
        Self {
            conn,
            action_log_repo,
        }
    }

    /// 恢复演示数据
    ///
    /// 清空全部运营数据 (运输单/入库/堆场/载荷/卡车/型号/操作日志),
    /// 可选重置管理员账号, 然后写入固定演示集:
    /// 2 型号 / 3 卡车 / 4 载荷 / 3 活跃运输单 / 1 堆场 / 1 直接入库
    ///
    /// # 参数
    /// - reset_privileged_account: 是否重置管理员账号
    pub fn factory_reset(&self, reset_privileged_account: bool) -> ApiResult<()> {
        {
            let conn = self
                .conn
                .lock()
                .map_err(|e| ApiError::LockError(e.to_string()))?;
            let tx = conn.unchecked_transaction().map_err(ApiError::from)?;

            Self::clear_operational_data(&tx)?;

            if reset_privileged_account {
                Self::reset_admin_account(&tx)?;
            }

            Self::seed_config_defaults(&tx)?;
            Self::seed_demo_data(&tx)?;

            tx.commit().map_err(ApiError::from)?;
        }

        // 重置动作本身记入新日志 (清空之后)
        self.action_log_repo.insert(&ActionLog::new(
            ActionType::FactoryReset,
            None,
            Some(json!({ "reset_privileged_account": reset_privileged_account })),
            DEFAULT_ACTOR,
        ))?;

        info!(reset_privileged_account, "演示数据已重置");
        Ok(())
    }

    /// 清空全部运营数据 (子表先删, 依赖外键序)
    fn clear_operational_data(tx: &Connection) -> ApiResult<()> {
        for table in [
            "trip",
            "storage_income",
            "storage",
            "mineral",
            "truck",
            "truck_model",
            "action_log",
        ] {
            tx.execute(&format!("DELETE FROM {}", table), [])?;
        }

        // 重置自增序列, 演示数据主键保持确定性
        let has_sequence: bool = tx
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type='table' AND name='sqlite_sequence' LIMIT 1",
                [],
                |_row| Ok(true),
            )
            .optional()?
            .unwrap_or(false);

        if has_sequence {
            tx.execute(
                "DELETE FROM sqlite_sequence WHERE name IN ('truck_model','truck','mineral','storage','storage_income','trip')",
                [],
            )?;
        }

        Ok(())
    }

    /// 重置管理员账号 (admin/admin, SHA-256 摘要)
    fn reset_admin_account(tx: &Connection) -> ApiResult<()> {
        tx.execute("DELETE FROM operator_account", [])?;

        let digest = hex::encode(Sha256::digest(ADMIN_PASSWORD.as_bytes()));
        tx.execute(
            r#"
            INSERT INTO operator_account (username, password_sha256, is_superuser, created_at)
            VALUES (?1, ?2, 1, ?3)
            "#,
            params![ADMIN_USERNAME, digest, now_ts()],
        )?;

        Ok(())
    }

    /// 配置项恢复默认值
    fn seed_config_defaults(tx: &Connection) -> ApiResult<()> {
        let now = now_ts();
        for (key, value) in [
            (config_keys::REPORT_DECIMAL_PLACES, "2"),
            (config_keys::LOCALE, "zh-CN"),
        ] {
            tx.execute(
                "INSERT OR REPLACE INTO config_kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
                params![key, value, now],
            )?;
        }
        Ok(())
    }

    /// 写入固定演示集
    fn seed_demo_data(tx: &Connection) -> ApiResult<()> {
        let now = now_ts();

        // 型号
        let insert_model = |title: &str, max_weight_t: i64| -> ApiResult<i64> {
            tx.execute(
                r#"
                INSERT INTO truck_model (title, title_norm, max_weight_t, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?4)
                "#,
                params![title, normalized_key(title), max_weight_t, now],
            )?;
            Ok(tx.last_insert_rowid())
        };
        let belaz = insert_model("БЕЛАЗ", 120)?;
        let komatsu = insert_model("Komatsu", 110)?;

        // 卡车
        let insert_truck = |number: &str, model_id: i64| -> ApiResult<i64> {
            tx.execute(
                r#"
                INSERT INTO truck (number, number_norm, truck_model_id, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?4)
                "#,
                params![number, normalized_key(number), model_id, now],
            )?;
            Ok(tx.last_insert_rowid())
        };
        let t_101 = insert_truck("101", belaz)?;
        let t_102 = insert_truck("102", belaz)?;
        let t_k103 = insert_truck("K103", komatsu)?;

        // 载荷
        let insert_mineral = |weight_t: i64, sio2_pct: i64, fe_pct: i64| -> ApiResult<i64> {
            tx.execute(
                "INSERT INTO mineral (weight_t, sio2_pct, fe_pct, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![weight_t, sio2_pct, fe_pct, now],
            )?;
            Ok(tx.last_insert_rowid())
        };
        let m_101 = insert_mineral(100, 32, 67)?;
        let m_102 = insert_mineral(125, 30, 65)?;
        let m_k103 = insert_mineral(120, 35, 62)?;
        let m_storage = insert_mineral(900, 34, 65)?;

        // 活跃运输单
        for (truck_id, mineral_id) in [(t_101, m_101), (t_102, m_102), (t_k103, m_k103)] {
            tx.execute(
                r#"
                INSERT INTO trip (truck_id, mineral_id, unloading_point_wkt, created_at, closed_at)
                VALUES (?1, ?2, NULL, ?3, NULL)
                "#,
                params![truck_id, mineral_id, now],
            )?;
        }

        // 堆场与直接入库
        tx.execute(
            r#"
            INSERT INTO storage (title, title_norm, territory_wkt, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                "一号堆场",
                normalized_key("一号堆场"),
                DEMO_TERRITORY_WKT,
                now
            ],
        )?;
        let storage_id = tx.last_insert_rowid();

        tx.execute(
            "INSERT INTO storage_income (mineral_id, storage_id, created_at) VALUES (?1, ?2, ?3)",
            params![m_storage, storage_id, now],
        )?;

        Ok(())
    }
}
