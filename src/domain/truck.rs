// ==========================================
// 露天矿运输跟踪系统 - 车队领域模型
// ==========================================
// 对齐: schema.sql truck_model / truck 表
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// TruckModel - 卡车型号
// ==========================================
// 不变量: title 非空且忽略大小写唯一, max_weight_t > 0
// 删除级联到名下卡车
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TruckModel {
    pub id: i64,                    // 主键
    pub title: String,              // 型号名称 (展示原文)
    pub max_weight_t: i64,          // 额定载重 (吨)
    pub created_at: NaiveDateTime,  // 记录创建时间
    pub updated_at: NaiveDateTime,  // 记录更新时间
}

// ==========================================
// Truck - 卡车
// ==========================================
// 不变量: number 非空且忽略大小写唯一
// 删除级联到名下运输单
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Truck {
    pub id: i64,                    // 主键
    pub number: String,             // 车牌/自编号 (展示原文)
    pub truck_model_id: i64,        // 所属型号 (FK)
    pub created_at: NaiveDateTime,  // 记录创建时间
    pub updated_at: NaiveDateTime,  // 记录更新时间
}
