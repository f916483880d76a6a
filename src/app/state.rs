// ==========================================
// 露天矿运输跟踪系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 全部仓储/API 共享同一个连接 (写入互斥于连接锁)
// ==========================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context};
use tracing::warn;

use crate::api::{FleetApi, MaintenanceApi, ReportApi, StorageApi, TripApi};
use crate::config::config_manager::ConfigManager;
use crate::db::{
    init_schema, open_sqlite_connection, read_schema_version, CURRENT_SCHEMA_VERSION,
};
use crate::repository::{
    ActionLogRepository, MineralRepository, StorageIncomeRepository, StorageRepository,
    TripRepository, TruckModelRepository, TruckRepository,
};

/// 默认数据库路径 (数据目录下 mine-haul-tracker/haul_tracker.db)
pub fn get_default_db_path() -> String {
    let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("mine-haul-tracker")
        .join("haul_tracker.db")
        .to_string_lossy()
        .to_string()
}

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 车队API
    pub fleet_api: Arc<FleetApi>,

    /// 堆场API
    pub storage_api: Arc<StorageApi>,

    /// 运输单API
    pub trip_api: Arc<TripApi>,

    /// 报告API
    pub report_api: Arc<ReportApi>,

    /// 维护API
    pub maintenance_api: Arc<MaintenanceApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 操作日志仓储（用于审计追踪查询）
    pub action_log_repo: Arc<ActionLogRepository>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// 打开连接, 幂等初始化 schema, 装配仓储与 API
    ///
    /// # 参数
    /// - db_path: 数据库文件路径 (父目录须已存在)
    pub fn new(db_path: String) -> anyhow::Result<Self> {
        let conn =
            open_sqlite_connection(&db_path).with_context(|| format!("打开数据库失败: {}", db_path))?;
        init_schema(&conn).context("初始化 schema 失败")?;

        if let Some(version) = read_schema_version(&conn)? {
            if version != CURRENT_SCHEMA_VERSION {
                // 不做自动迁移, 仅告警避免静默运行在旧库上
                warn!(
                    found = version,
                    expected = CURRENT_SCHEMA_VERSION,
                    "schema_version 与当前代码不一致"
                );
            }
        }

        let conn = Arc::new(Mutex::new(conn));

        let truck_model_repo = Arc::new(TruckModelRepository::from_connection(conn.clone()));
        let truck_repo = Arc::new(TruckRepository::from_connection(conn.clone()));
        let mineral_repo = Arc::new(MineralRepository::from_connection(conn.clone()));
        let storage_repo = Arc::new(StorageRepository::from_connection(conn.clone()));
        let income_repo = Arc::new(StorageIncomeRepository::from_connection(conn.clone()));
        let trip_repo = Arc::new(TripRepository::from_connection(conn.clone()));
        let action_log_repo = Arc::new(ActionLogRepository::from_connection(conn.clone()));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| anyhow!("初始化配置管理器失败: {}", e))?,
        );

        let fleet_api = Arc::new(FleetApi::new(
            truck_model_repo,
            truck_repo.clone(),
            action_log_repo.clone(),
        ));
        let storage_api = Arc::new(StorageApi::new(
            storage_repo.clone(),
            income_repo.clone(),
            action_log_repo.clone(),
        ));
        let trip_api = Arc::new(TripApi::new(
            trip_repo.clone(),
            truck_repo,
            mineral_repo,
            storage_repo.clone(),
            action_log_repo.clone(),
        ));
        let report_api = Arc::new(ReportApi::new(
            storage_repo,
            income_repo,
            trip_repo,
            config_manager.clone(),
        ));
        let maintenance_api = Arc::new(MaintenanceApi::new(conn, action_log_repo.clone()));

        Ok(Self {
            db_path,
            fleet_api,
            storage_api,
            trip_api,
            report_api,
            maintenance_api,
            config_manager,
            action_log_repo,
        })
    }
}
