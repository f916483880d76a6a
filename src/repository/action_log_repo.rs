// ==========================================
// 露天矿运输跟踪系统 - 操作日志仓储
// ==========================================
// 红线: 所有写入操作必须记录
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::action_log::ActionLog;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{parse_ts, TS_FORMAT};
use rusqlite::{params, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex};

// ==========================================
// ActionLogRepository - 操作日志仓储
// ==========================================

/// 操作日志仓储
/// 职责: 管理 action_log 表的追加与查询
pub struct ActionLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ActionLogRepository {
    /// 创建新的操作日志仓储实例
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

    /// 追加一条操作日志
    pub fn insert(&self, log: &ActionLog) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let payload = log
            .payload_json
            .as_ref()
            .map(|v| v.to_string());

        conn.execute(
            r#"
            INSERT INTO action_log (action_id, action_type, target, payload_json, actor, action_ts)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                log.action_id,
                log.action_type,
                log.target,
                payload,
                log.actor,
                log.action_ts.format(TS_FORMAT).to_string(),
            ],
        )?;

        Ok(())
    }

    /// 查询最近的操作日志 (时间倒序)
    pub fn list_recent(&self, limit: i64) -> RepositoryResult<Vec<ActionLog>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT action_id, action_type, target, payload_json, actor, action_ts
            FROM action_log
            ORDER BY action_ts DESC, action_id DESC
            LIMIT ?1
            "#,
        )?;

        let logs = stmt
            .query_map(params![limit], |row| {
                let payload_raw: Option<String> = row.get(3)?;
                Ok(ActionLog {
                    action_id: row.get(0)?,
                    action_type: row.get(1)?,
                    target: row.get(2)?,
                    payload_json: payload_raw.and_then(|s| serde_json::from_str(&s).ok()),
                    actor: row.get(4)?,
                    action_ts: parse_ts(&row.get::<_, String>(5)?),
                })
            })?
            .collect::<SqliteResult<Vec<ActionLog>>>()?;

        Ok(logs)
    }

    /// 记录总数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n = conn.query_row("SELECT COUNT(*) FROM action_log", [], |row| row.get(0))?;
        Ok(n)
    }
}
