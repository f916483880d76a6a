// ==========================================
// 露天矿运输跟踪系统 - 车队 API
// ==========================================
// 职责: 卡车型号/卡车的创建、查询与级联删除
// 红线: 所有写入操作记录 ActionLog
// ==========================================

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::truck::{Truck, TruckModel};
use crate::domain::types::normalized_key;
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::error::RepositoryError;
use crate::repository::truck_model_repo::TruckModelRepository;
use crate::repository::truck_repo::TruckRepository;

/// 写入操作的默认操作人标识
pub(crate) const DEFAULT_ACTOR: &str = "operator";

// ==========================================
// FleetApi - 车队 API
// ==========================================

/// 车队API
///
/// 职责：
/// 1. 卡车型号创建/查询/删除 (删除级联卡车与运输单)
/// 2. 卡车创建/查询/删除 (删除级联运输单)
/// 3. ActionLog记录
pub struct FleetApi {
    truck_model_repo: Arc<TruckModelRepository>,
    truck_repo: Arc<TruckRepository>,
    action_log_repo: Arc<ActionLogRepository>,
}

impl FleetApi {
    /// 创建新的FleetApi实例
    pub fn new(
        truck_model_repo: Arc<TruckModelRepository>,
        truck_repo: Arc<TruckRepository>,
        action_log_repo: Arc<ActionLogRepository>,
    ) -> Self {
        Self {
            truck_model_repo,
            truck_repo,
            action_log_repo,
        }
    }

    // ==========================================
    // 卡车型号
    // ==========================================

    /// 创建卡车型号
    ///
    /// # 返回
    /// - Ok(TruckModel): 新型号
    /// - Err(DuplicateKey): title 忽略大小写重复
    /// - Err(InvalidComposition): max_weight <= 0 (字段名 max_weight)
    pub fn create_truck_model(&self, title: &str, max_weight_t: i64) -> ApiResult<TruckModel> {
        validator::validate_title("title", title)?;
        validator::validate_max_weight(max_weight_t)?;

        // 忽略大小写唯一性预检 (唯一索引兜底并发场景)
        if self
            .truck_model_repo
            .find_by_norm(&normalized_key(title))?
            .is_some()
        {
            warn!(title, "卡车型号名称重复");
            return Err(ApiError::DuplicateKey {
                field: "title".to_string(),
                value: title.to_string(),
            });
        }

        let model = self
            .truck_model_repo
            .insert(title, max_weight_t)
            .map_err(|e| match e {
                RepositoryError::UniqueConstraintViolation(_) => ApiError::DuplicateKey {
                    field: "title".to_string(),
                    value: title.to_string(),
                },
                other => other.into(),
            })?;

        self.action_log_repo.insert(&ActionLog::new(
            ActionType::CreateTruckModel,
            Some(format!("truck_model/{}", model.id)),
            Some(json!({ "title": model.title, "max_weight_t": model.max_weight_t })),
            DEFAULT_ACTOR,
        ))?;

        info!(id = model.id, title = %model.title, "卡车型号已创建");
        Ok(model)
    }

    /// 查询全部卡车型号 (按插入顺序)
    pub fn list_truck_models(&self) -> ApiResult<Vec<TruckModel>> {
        Ok(self.truck_model_repo.list_all()?)
    }

    /// 删除卡车型号 (级联删除名下卡车与其运输单)
    ///
    /// # 返回
    /// - Err(NotFound): 型号不存在
    pub fn delete_truck_model(&self, id: i64) -> ApiResult<()> {
        if !self.truck_model_repo.delete(id)? {
            return Err(ApiError::NotFound {
                entity: "TruckModel".to_string(),
                id: id.to_string(),
            });
        }

        self.action_log_repo.insert(&ActionLog::new(
            ActionType::DeleteTruckModel,
            Some(format!("truck_model/{}", id)),
            None,
            DEFAULT_ACTOR,
        ))?;

        info!(id, "卡车型号已删除 (级联)");
        Ok(())
    }

    // ==========================================
    // 卡车
    // ==========================================

    /// 创建卡车
    ///
    /// # 返回
    /// - Ok(Truck): 新卡车
    /// - Err(DuplicateKey): number 忽略大小写重复
    /// - Err(NotFound): 型号不存在
    pub fn create_truck(&self, number: &str, truck_model_id: i64) -> ApiResult<Truck> {
        validator::validate_title("number", number)?;

        if self.truck_model_repo.find_by_id(truck_model_id)?.is_none() {
            return Err(ApiError::NotFound {
                entity: "TruckModel".to_string(),
                id: truck_model_id.to_string(),
            });
        }

        if self
            .truck_repo
            .find_by_norm(&normalized_key(number))?
            .is_some()
        {
            warn!(number, "卡车编号重复");
            return Err(ApiError::DuplicateKey {
                field: "number".to_string(),
                value: number.to_string(),
            });
        }

        let truck = self
            .truck_repo
            .insert(number, truck_model_id)
            .map_err(|e| match e {
                RepositoryError::UniqueConstraintViolation(_) => ApiError::DuplicateKey {
                    field: "number".to_string(),
                    value: number.to_string(),
                },
                other => other.into(),
            })?;

        self.action_log_repo.insert(&ActionLog::new(
            ActionType::CreateTruck,
            Some(format!("truck/{}", truck.id)),
            Some(json!({ "number": truck.number, "truck_model_id": truck_model_id })),
            DEFAULT_ACTOR,
        ))?;

        info!(id = truck.id, number = %truck.number, "卡车已创建");
        Ok(truck)
    }

    /// 查询全部卡车 (按插入顺序)
    pub fn list_trucks(&self) -> ApiResult<Vec<Truck>> {
        Ok(self.truck_repo.list_all()?)
    }

    /// 删除卡车 (级联删除名下运输单)
    ///
    /// # 返回
    /// - Err(NotFound): 卡车不存在
    pub fn delete_truck(&self, id: i64) -> ApiResult<()> {
        if !self.truck_repo.delete(id)? {
            return Err(ApiError::NotFound {
                entity: "Truck".to_string(),
                id: id.to_string(),
            });
        }

        self.action_log_repo.insert(&ActionLog::new(
            ActionType::DeleteTruck,
            Some(format!("truck/{}", id)),
            None,
            DEFAULT_ACTOR,
        ))?;

        info!(id, "卡车已删除 (级联)");
        Ok(())
    }
}
