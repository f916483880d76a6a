// ==========================================
// 露天矿运输跟踪系统 - 堆场 API
// ==========================================
// 职责: 堆场创建/查询 + 非运输单直接入库
// 红线: 所有写入操作记录 ActionLog
// ==========================================

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::fleet_api::DEFAULT_ACTOR;
use crate::api::validator;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::mineral::OreComposition;
use crate::domain::storage::{Storage, StorageIncome};
use crate::domain::types::normalized_key;
use crate::geometry;
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::error::RepositoryError;
use crate::repository::storage_income_repo::StorageIncomeRepository;
use crate::repository::storage_repo::StorageRepository;

// ==========================================
// StorageApi - 堆场 API
// ==========================================

/// 堆场API
///
/// 职责：
/// 1. 堆场创建 (名称唯一 + 边界两两不相交)
/// 2. 直接入库记录 (载荷成分校验)
/// 3. ActionLog记录
pub struct StorageApi {
    storage_repo: Arc<StorageRepository>,
    income_repo: Arc<StorageIncomeRepository>,
    action_log_repo: Arc<ActionLogRepository>,
}

impl StorageApi {
    /// 创建新的StorageApi实例
    pub fn new(
        storage_repo: Arc<StorageRepository>,
        income_repo: Arc<StorageIncomeRepository>,
        action_log_repo: Arc<ActionLogRepository>,
    ) -> Self {
        Self {
            storage_repo,
            income_repo,
            action_log_repo,
        }
    }

    /// 创建堆场
    ///
    /// # 参数
    /// - title: 堆场名称
    /// - territory_wkt: 边界多边形, WKT POLYGON 文本
    ///
    /// # 返回
    /// - Ok(Storage): 新堆场
    /// - Err(DuplicateKey): title 忽略大小写重复
    /// - Err(TerritoryOverlap): 边界与既有堆场相交 (含边界接触)
    /// - Err(InvalidInput): territory_wkt 不是合法 POLYGON
    pub fn create_storage(&self, title: &str, territory_wkt: &str) -> ApiResult<Storage> {
        validator::validate_title("title", title)?;

        // 边界合法性预检 (仓储层解析同口径)
        geometry::parse_territory(territory_wkt)?;

        if self
            .storage_repo
            .find_by_norm(&normalized_key(title))?
            .is_some()
        {
            warn!(title, "堆场名称重复");
            return Err(ApiError::DuplicateKey {
                field: "title".to_string(),
                value: title.to_string(),
            });
        }

        // 相交检查在仓储插入事务内执行
        let storage = self
            .storage_repo
            .insert(title, territory_wkt)
            .map_err(|e| match e {
                RepositoryError::UniqueConstraintViolation(_) => ApiError::DuplicateKey {
                    field: "title".to_string(),
                    value: title.to_string(),
                },
                other => other.into(),
            })?;

        self.action_log_repo.insert(&ActionLog::new(
            ActionType::CreateStorage,
            Some(format!("storage/{}", storage.id)),
            Some(json!({ "title": storage.title, "territory_wkt": storage.territory_wkt })),
            DEFAULT_ACTOR,
        ))?;

        info!(id = storage.id, title = %storage.title, "堆场已创建");
        Ok(storage)
    }

    /// 查询全部堆场 (按插入顺序)
    pub fn list_storages(&self) -> ApiResult<Vec<Storage>> {
        Ok(self.storage_repo.list_all()?)
    }

    /// 记录一次直接入库 (不经运输单)
    ///
    /// # 返回
    /// - Ok(StorageIncome): 新入库记录
    /// - Err(InvalidComposition): 成分越界, 携带全部违规字段
    /// - Err(NotFound): 堆场不存在
    pub fn record_direct_income(
        &self,
        storage_id: i64,
        comp: &OreComposition,
    ) -> ApiResult<StorageIncome> {
        validator::validate_composition(comp)?;

        if self.storage_repo.find_by_id(storage_id)?.is_none() {
            return Err(ApiError::NotFound {
                entity: "Storage".to_string(),
                id: storage_id.to_string(),
            });
        }

        let income = self.income_repo.record(storage_id, comp)?;

        self.action_log_repo.insert(&ActionLog::new(
            ActionType::RecordIncome,
            Some(format!("storage_income/{}", income.id)),
            Some(json!({
                "storage_id": storage_id,
                "weight_t": comp.weight_t,
                "sio2_pct": comp.sio2_pct,
                "fe_pct": comp.fe_pct,
            })),
            DEFAULT_ACTOR,
        ))?;

        info!(id = income.id, storage_id, "直接入库已记录");
        Ok(income)
    }
}
