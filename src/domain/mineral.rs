// ==========================================
// 露天矿运输跟踪系统 - 矿石载荷领域模型
// ==========================================
// 对齐: schema.sql mineral 表
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Mineral - 矿石载荷
// ==========================================
// 不变量: weight_t > 0, sio2/fe ∈ (0,100), sio2+fe < 100
// 生命周期: 仅在开单/直接入库事务内创建, 归属后不可变 (1:1 独占)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mineral {
    pub id: i64,                    // 主键
    pub weight_t: i64,              // 重量 (吨, 整数)
    pub sio2_pct: i64,              // SiO2 百分比 (整数)
    pub fe_pct: i64,                // Fe 百分比 (整数)
    pub created_at: NaiveDateTime,  // 记录创建时间
}

// ==========================================
// OreComposition - 矿石成分输入值对象
// ==========================================
// 用途: 开单/直接入库的入参载体, 校验由 api::validator 执行
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OreComposition {
    pub weight_t: i64,
    pub sio2_pct: i64,
    pub fe_pct: i64,
}
