// ==========================================
// 露天矿运输跟踪系统 - 运输单生命周期引擎
// ==========================================
// 职责: 运输单派生值求值 (成败分类 + 超载百分比)
// 输入: 运输单/堆场边界快照
// 红线: 成败与超载不落库, 读取时重算
// ==========================================

use crate::domain::types::TripOutcome;
use geo::{Point, Polygon};

use crate::geometry;

// ==========================================
// TripLifecycleEngine - 运输单生命周期引擎
// ==========================================
pub struct TripLifecycleEngine;

impl TripLifecycleEngine {
    /// 创建新的生命周期引擎
    pub fn new() -> Self {
        Self
    }

    /// 已关单成败分类
    ///
    /// 卸载点被任一堆场边界覆盖 (covers 语义, 边界上的点计入)
    /// 即成功; 边界两两不相交, 至多命中一个堆场
    ///
    /// # 返回
    /// - (TripOutcome, Option<i64>): 分类结果与命中的堆场 id
    pub fn classify_closed(
        &self,
        unloading_point: &Point<f64>,
        territories: &[(i64, Polygon<f64>)],
    ) -> (TripOutcome, Option<i64>) {
        for (storage_id, territory) in territories {
            if geometry::territory_covers(territory, unloading_point) {
                return (TripOutcome::Successful, Some(*storage_id));
            }
        }
        (TripOutcome::Failed, None)
    }

    /// 超载百分比 (整数, 向零截断)
    ///
    /// overload = max(0, (weight - max_weight) * 100 / max_weight)
    ///
    /// max_weight_t > 0 由 truck_model 表 CHECK 约束保证,
    /// 此处仍防御性返回 0 避免除零
    pub fn overload_pct(&self, mineral_weight_t: i64, truck_max_weight_t: i64) -> i64 {
        if truck_max_weight_t <= 0 {
            return 0;
        }
        if mineral_weight_t <= truck_max_weight_t {
            return 0;
        }
        (mineral_weight_t - truck_max_weight_t) * 100 / truck_max_weight_t
    }
}

impl Default for TripLifecycleEngine {
    fn default() -> Self {
        Self::new()
    }
}
