// ==========================================
// 露天矿运输跟踪系统 - 报告 API
// ==========================================
// 职责: 加载快照并委托报告引擎聚合
// 只读, 可与写入并发 (普通读已提交隔离即可)
// ==========================================

use std::sync::Arc;

use tracing::debug;

use crate::api::error::{ApiError, ApiResult};
use crate::config::config_manager::ConfigManager;
use crate::engine::report::{ReportEngine, StorageReportRow};
use crate::repository::storage_income_repo::StorageIncomeRepository;
use crate::repository::storage_repo::StorageRepository;
use crate::repository::trip_repo::TripRepository;

// ==========================================
// ReportApi - 报告 API
// ==========================================

/// 报告API
///
/// 职责：
/// 1. 加载堆场/入库合计/已关单载荷快照
/// 2. 委托 ReportEngine 聚合 (品位显示精度取自配置)
pub struct ReportApi {
    storage_repo: Arc<StorageRepository>,
    income_repo: Arc<StorageIncomeRepository>,
    trip_repo: Arc<TripRepository>,
    config_manager: Arc<ConfigManager>,
}

impl ReportApi {
    /// 创建新的ReportApi实例
    pub fn new(
        storage_repo: Arc<StorageRepository>,
        income_repo: Arc<StorageIncomeRepository>,
        trip_repo: Arc<TripRepository>,
        config_manager: Arc<ConfigManager>,
    ) -> Self {
        Self {
            storage_repo,
            income_repo,
            trip_repo,
            config_manager,
        }
    }

    /// 生成堆场质量报告
    ///
    /// 行序与堆场插入顺序一致; 每个堆场恰好一行
    pub fn build_report(&self) -> ApiResult<Vec<StorageReportRow>> {
        let storages = self.storage_repo.list_all()?;
        let income_totals = self.income_repo.sum_by_storage()?;
        let closed_loads = self.trip_repo.list_closed_loads()?;

        let decimal_places = self
            .config_manager
            .get_report_decimal_places()
            .map_err(|e| ApiError::InternalError(e.to_string()))?;

        debug!(
            storages = storages.len(),
            closed_loads = closed_loads.len(),
            "生成堆场质量报告"
        );

        let engine = ReportEngine::with_precision(decimal_places);
        engine
            .build(&storages, &income_totals, &closed_loads)
            // 落库几何数据损坏属于内部错误
            .map_err(|e| ApiError::InternalError(e.to_string()))
    }
}
