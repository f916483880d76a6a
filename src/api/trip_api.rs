// ==========================================
// 露天矿运输跟踪系统 - 运输单 API
// ==========================================
// 职责: 开单/关单 + 操作员界面联查 + 派生状态求值
// 红线: 所有写入操作记录 ActionLog; 成败/超载读取时重算
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::fleet_api::DEFAULT_ACTOR;
use crate::api::validator;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::mineral::OreComposition;
use crate::domain::trip::Trip;
use crate::domain::types::{TripOutcome, TripState};
use crate::engine::lifecycle::TripLifecycleEngine;
use crate::geometry;
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::error::RepositoryError;
use crate::repository::mineral_repo::MineralRepository;
use crate::repository::storage_repo::StorageRepository;
use crate::repository::trip_repo::TripRepository;
use crate::repository::truck_repo::TruckRepository;

// ==========================================
// ActiveTripView - 活跃运输单视图
// ==========================================
/// 操作员录入界面的行数据 (联查 + 派生超载)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveTripView {
    pub trip_id: i64,
    pub truck_number: String,
    pub truck_model_title: String,
    pub truck_max_weight_t: i64,
    pub mineral_weight_t: i64,
    pub overload_pct: i64,
}

// ==========================================
// TripStatusView - 运输单状态视图
// ==========================================
/// 派生状态快照 (状态/成败/卸载坐标回显)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripStatusView {
    pub trip_id: i64,
    pub state: TripState,
    pub outcome: Option<TripOutcome>,   // 仅 Closed 有值
    pub storage_id: Option<i64>,        // 成功时命中的堆场
    pub unloading_xy: Option<String>,   // "X Y" 回显
    pub overload_pct: i64,
}

// ==========================================
// TripApi - 运输单 API
// ==========================================

/// 运输单API
///
/// 职责：
/// 1. 开单 (成分校验 + 单活跃运输单约束)
/// 2. 关单 (坐标文本解析, Active → Closed 仅一次)
/// 3. 活跃运输单联查与派生状态求值
/// 4. ActionLog记录
pub struct TripApi {
    trip_repo: Arc<TripRepository>,
    truck_repo: Arc<TruckRepository>,
    mineral_repo: Arc<MineralRepository>,
    storage_repo: Arc<StorageRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    lifecycle: TripLifecycleEngine,
}

impl TripApi {
    /// 创建新的TripApi实例
    pub fn new(
        trip_repo: Arc<TripRepository>,
        truck_repo: Arc<TruckRepository>,
        mineral_repo: Arc<MineralRepository>,
        storage_repo: Arc<StorageRepository>,
        action_log_repo: Arc<ActionLogRepository>,
    ) -> Self {
        Self {
            trip_repo,
            truck_repo,
            mineral_repo,
            storage_repo,
            action_log_repo,
            lifecycle: TripLifecycleEngine::new(),
        }
    }

    /// 开运输单
    ///
    /// # 返回
    /// - Ok(Trip): 新活跃运输单
    /// - Err(InvalidComposition): 成分越界
    /// - Err(ConflictingActiveTrip): 该卡车已有活跃运输单
    /// - Err(NotFound): 卡车不存在
    pub fn start_trip(&self, truck_id: i64, comp: &OreComposition) -> ApiResult<Trip> {
        validator::validate_composition(comp)?;

        let truck = self
            .truck_repo
            .find_by_id(truck_id)?
            .ok_or_else(|| ApiError::NotFound {
                entity: "Truck".to_string(),
                id: truck_id.to_string(),
            })?;

        // 单活跃运输单预检 (部分唯一索引兜底并发场景)
        if self.trip_repo.find_active_by_truck(truck_id)?.is_some() {
            warn!(truck_number = %truck.number, "卡车已有活跃运输单");
            return Err(ApiError::ConflictingActiveTrip {
                truck_number: truck.number,
            });
        }

        let trip = self.trip_repo.start(truck_id, comp).map_err(|e| match e {
            RepositoryError::UniqueConstraintViolation(_) => ApiError::ConflictingActiveTrip {
                truck_number: truck.number.clone(),
            },
            other => other.into(),
        })?;

        self.action_log_repo.insert(&ActionLog::new(
            ActionType::StartTrip,
            Some(format!("trip/{}", trip.id)),
            Some(json!({
                "truck_id": truck_id,
                "weight_t": comp.weight_t,
                "sio2_pct": comp.sio2_pct,
                "fe_pct": comp.fe_pct,
            })),
            DEFAULT_ACTOR,
        ))?;

        info!(id = trip.id, truck_id, "运输单已开");
        Ok(trip)
    }

    /// 关运输单 (录入卸载坐标)
    ///
    /// # 参数
    /// - coordinate_text: 操作员录入的 "X Y" 文本
    ///
    /// # 返回
    /// - Ok(Trip): 关单后的记录
    /// - Err(InvalidCoordinateFormat): 坐标文本不满足 "X Y" 形状
    /// - Err(NotFound): 运输单不存在
    /// - Err(InvalidStateTransition): 运输单已关, 不可重开
    pub fn close_trip(&self, trip_id: i64, coordinate_text: &str) -> ApiResult<Trip> {
        let point = geometry::parse_xy(coordinate_text)?;
        let point_wkt = geometry::point_to_wkt(&point);

        let trip = self.trip_repo.close(trip_id, &point_wkt)?;

        self.action_log_repo.insert(&ActionLog::new(
            ActionType::CloseTrip,
            Some(format!("trip/{}", trip.id)),
            Some(json!({ "unloading_point_wkt": point_wkt })),
            DEFAULT_ACTOR,
        ))?;

        info!(id = trip.id, point = %point_wkt, "运输单已关");
        Ok(trip)
    }

    /// 活跃运输单联查 (按开单顺序)
    pub fn list_active_trips(&self) -> ApiResult<Vec<ActiveTripView>> {
        let records = self.trip_repo.list_active_records()?;

        Ok(records
            .into_iter()
            .map(|r| {
                let overload_pct = self
                    .lifecycle
                    .overload_pct(r.mineral_weight_t, r.truck_max_weight_t);
                ActiveTripView {
                    trip_id: r.trip_id,
                    truck_number: r.truck_number,
                    truck_model_title: r.truck_model_title,
                    truck_max_weight_t: r.truck_max_weight_t,
                    mineral_weight_t: r.mineral_weight_t,
                    overload_pct,
                }
            })
            .collect())
    }

    /// 运输单派生状态求值
    ///
    /// # 返回
    /// - Ok(TripStatusView): 状态快照 (Closed 时附成败与命中堆场)
    /// - Err(NotFound): 运输单不存在
    pub fn get_trip_status(&self, trip_id: i64) -> ApiResult<TripStatusView> {
        let trip = self
            .trip_repo
            .find_by_id(trip_id)?
            .ok_or_else(|| ApiError::NotFound {
                entity: "Trip".to_string(),
                id: trip_id.to_string(),
            })?;

        let (_, truck_model) = self
            .truck_repo
            .find_with_model(trip.truck_id)?
            .ok_or_else(|| ApiError::NotFound {
                entity: "Truck".to_string(),
                id: trip.truck_id.to_string(),
            })?;

        let mineral = self
            .mineral_repo
            .find_by_id(trip.mineral_id)?
            .ok_or_else(|| ApiError::NotFound {
                entity: "Mineral".to_string(),
                id: trip.mineral_id.to_string(),
            })?;

        let overload_pct = self
            .lifecycle
            .overload_pct(mineral.weight_t, truck_model.max_weight_t);

        let (outcome, storage_id, unloading_xy) = match &trip.unloading_point_wkt {
            None => (None, None, None),
            Some(point_wkt) => {
                // 落库数据损坏时报内部错误而非输入错误
                let point = geometry::parse_unloading_point(point_wkt)
                    .map_err(|e| ApiError::InternalError(e.to_string()))?;

                let mut territories = Vec::new();
                for storage in self.storage_repo.list_all()? {
                    let territory = geometry::parse_territory(&storage.territory_wkt)
                        .map_err(|e| ApiError::InternalError(e.to_string()))?;
                    territories.push((storage.id, territory));
                }

                let (outcome, storage_id) = self.lifecycle.classify_closed(&point, &territories);
                let xy = format!("{} {}", point.x(), point.y());
                (Some(outcome), storage_id, Some(xy))
            }
        };

        Ok(TripStatusView {
            trip_id: trip.id,
            state: trip.state(),
            outcome,
            storage_id,
            unloading_xy,
            overload_pct,
        })
    }
}
