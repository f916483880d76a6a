// ==========================================
// 露天矿运输跟踪系统 - 领域类型定义
// ==========================================
// 红线: 运输单只存储卸载点, 状态与成败均为派生值
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 唯一键归一化: 去首尾空白 + Unicode 小写
///
/// 使用 `str::to_lowercase` (Unicode 映射, 与进程 locale 无关),
/// 忽略大小写唯一性均以此归一化键比较/建索引
pub fn normalized_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

// ==========================================
// 运输单状态 (Trip State)
// ==========================================
// Active → Closed, 仅此一次, 不可回退
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库/前端一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TripState {
    Active, // 卸载点未录入
    Closed, // 卸载点已录入
}

impl fmt::Display for TripState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TripState::Active => write!(f, "ACTIVE"),
            TripState::Closed => write!(f, "CLOSED"),
        }
    }
}

// ==========================================
// 运输结果 (Trip Outcome)
// ==========================================
// 仅对 Closed 运输单求值, 不落库
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TripOutcome {
    Successful, // 卸载点被某个堆场边界覆盖
    Failed,     // 卸载点不在任何堆场内
}

impl fmt::Display for TripOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TripOutcome::Successful => write!(f, "SUCCESSFUL"),
            TripOutcome::Failed => write!(f, "FAILED"),
        }
    }
}
