// ==========================================
// 露天矿运输跟踪系统 - 堆场领域模型
// ==========================================
// 对齐: schema.sql storage / storage_income 表
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Storage - 矿石堆场
// ==========================================
// 不变量: title 非空且忽略大小写唯一; territory 与既有堆场两两不相交
// territory 创建后不再变更
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Storage {
    pub id: i64,                    // 主键
    pub title: String,              // 堆场名称 (展示原文)
    pub territory_wkt: String,      // 边界多边形 (WKT POLYGON 文本)
    pub created_at: NaiveDateTime,  // 记录创建时间
}

// ==========================================
// StorageIncome - 非运输单直接入库
// ==========================================
// 一份矿石载荷直接计入某堆场, 不经运输单
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageIncome {
    pub id: i64,                    // 主键
    pub mineral_id: i64,            // 矿石载荷 (FK, 1:1 独占)
    pub storage_id: i64,            // 入库堆场 (FK)
    pub created_at: NaiveDateTime,  // 记录创建时间
}
