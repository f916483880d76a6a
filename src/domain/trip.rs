// ==========================================
// 露天矿运输跟踪系统 - 运输单领域模型
// ==========================================
// 对齐: schema.sql trip 表
// ==========================================

use crate::domain::types::TripState;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Trip - 运输单
// ==========================================
// 不变量: 每台卡车至多一张活跃运输单 (部分唯一索引强制);
//         矿石载荷 1:1 独占; 关单后不可重开
// 状态/成败/超载均为派生值, 由 engine::lifecycle 求值
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: i64,                            // 主键
    pub truck_id: i64,                      // 执行卡车 (FK)
    pub mineral_id: i64,                    // 矿石载荷 (FK, 1:1)
    pub unloading_point_wkt: Option<String>, // 卸载点 (WKT POINT; NULL=活跃)
    pub created_at: NaiveDateTime,          // 开单时间
    pub closed_at: Option<NaiveDateTime>,   // 关单时间
}

impl Trip {
    /// 当前状态 (卸载点未录入即活跃)
    pub fn state(&self) -> TripState {
        if self.unloading_point_wkt.is_none() {
            TripState::Active
        } else {
            TripState::Closed
        }
    }
}
