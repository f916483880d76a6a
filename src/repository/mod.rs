// ==========================================
// 露天矿运输跟踪系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含引擎逻辑; 实体不变量在存储层强制
// 职责: 提供数据访问接口, 屏蔽数据库细节
// 约束: 所有查询使用参数化, 防止 SQL 注入
// ==========================================

pub mod action_log_repo;
pub mod error;
pub mod mineral_repo;
pub mod storage_income_repo;
pub mod storage_repo;
pub mod trip_repo;
pub mod truck_model_repo;
pub mod truck_repo;

// 重导出核心仓储
pub use action_log_repo::ActionLogRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use mineral_repo::MineralRepository;
pub use storage_income_repo::{StorageIncomeRepository, StorageIncomeTotals};
pub use storage_repo::StorageRepository;
pub use trip_repo::{ActiveTripRecord, ClosedTripLoad, TripRepository};
pub use truck_model_repo::TruckModelRepository;
pub use truck_repo::TruckRepository;

use chrono::NaiveDateTime;

/// 时间戳统一存储格式
pub(crate) const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 当前 UTC 时间的存储形式
pub(crate) fn now_ts() -> String {
    chrono::Utc::now().naive_utc().format(TS_FORMAT).to_string()
}

/// 解析存储形式的时间戳 (非法值回退 epoch, 与列 NOT NULL 一致不应触发)
pub(crate) fn parse_ts(raw: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(raw, TS_FORMAT)
        .unwrap_or_else(|_| chrono::DateTime::from_timestamp(0, 0).unwrap().naive_utc())
}
