// ==========================================
// 露天矿运输跟踪系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、写入
// 存储: config_kv 表 (key-value)
// ==========================================

use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 配置键全集
pub mod config_keys {
    /// 报告品位显示小数位 (默认 2)
    pub const REPORT_DECIMAL_PLACES: &str = "report_decimal_places";
    /// 界面语言 (默认 zh-CN)
    pub const LOCALE: &str = "locale";
}

/// 报告品位显示小数位默认值
const DEFAULT_REPORT_DECIMAL_PLACES: usize = 2;

/// 界面语言默认值
const DEFAULT_LOCALE: &str = "zh-CN";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入配置值 (存在则覆盖)
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            "INSERT OR REPLACE INTO config_kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))",
            params![key, value],
        )?;

        Ok(())
    }

    /// 报告品位显示小数位 (非法值回退默认)
    pub fn get_report_decimal_places(&self) -> Result<usize, Box<dyn Error>> {
        let places = self
            .get_config_value(config_keys::REPORT_DECIMAL_PLACES)?
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_REPORT_DECIMAL_PLACES);

        // 过长精度无展示意义, 限制到 6 位
        Ok(places.min(6))
    }

    /// 界面语言
    pub fn get_locale(&self) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_config_value(config_keys::LOCALE)?
            .unwrap_or_else(|| DEFAULT_LOCALE.to_string()))
    }
}
