// ==========================================
// 露天矿运输跟踪系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + geo
// 系统定位: 运输校验与堆场质量聚合, 展示层外置
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 几何基础设施（WKT + 相交/覆盖谓词）
pub mod geometry;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    normalized_key, ActionLog, ActionType, Mineral, OreComposition, Storage, StorageIncome, Trip,
    TripOutcome, TripState, Truck, TruckModel,
};

// 引擎
pub use engine::{ReportEngine, StorageReportRow, TripLifecycleEngine};

// API
pub use api::{
    ActiveTripView, ApiError, ApiResult, FleetApi, MaintenanceApi, ReportApi, StorageApi, TripApi,
    TripStatusView,
};

// 应用
pub use app::{get_default_db_path, AppState};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "露天矿运输跟踪系统";

// 数据库版本
pub const DB_VERSION: &str = "v1";

// ==========================================
// 预编译检查
// ==========================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
