// ==========================================
// 露天矿运输跟踪系统 - 操作日志领域模型
// ==========================================
// 红线: 所有写入操作必须记录
// 对齐: schema.sql action_log 表
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

// ==========================================
// ActionLog - 操作日志
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    pub action_id: String,               // 日志ID (UUID)
    pub action_type: String,             // 操作类型 (存储为字符串)
    pub target: Option<String>,          // 操作对象 (如 "truck_model/1")
    pub payload_json: Option<JsonValue>, // 操作参数 (JSON)
    pub actor: String,                   // 操作人/系统标识
    pub action_ts: NaiveDateTime,        // 操作时间戳
}

impl ActionLog {
    /// 以当前时间构造一条日志
    pub fn new(
        action_type: ActionType,
        target: Option<String>,
        payload_json: Option<JsonValue>,
        actor: &str,
    ) -> Self {
        Self {
            action_id: uuid::Uuid::new_v4().to_string(),
            action_type: action_type.as_str().to_string(),
            target,
            payload_json,
            actor: actor.to_string(),
            action_ts: chrono::Utc::now().naive_utc(),
        }
    }
}

// ==========================================
// ActionType - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    CreateTruckModel, // 新建卡车型号
    CreateTruck,      // 新建卡车
    DeleteTruckModel, // 删除卡车型号 (级联)
    DeleteTruck,      // 删除卡车 (级联)
    CreateStorage,    // 新建堆场
    RecordIncome,     // 直接入库
    StartTrip,        // 开运输单
    CloseTrip,        // 关运输单
    FactoryReset,     // 恢复演示数据
}

impl ActionType {
    /// 数据库存储形式
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::CreateTruckModel => "CREATE_TRUCK_MODEL",
            ActionType::CreateTruck => "CREATE_TRUCK",
            ActionType::DeleteTruckModel => "DELETE_TRUCK_MODEL",
            ActionType::DeleteTruck => "DELETE_TRUCK",
            ActionType::CreateStorage => "CREATE_STORAGE",
            ActionType::RecordIncome => "RECORD_INCOME",
            ActionType::StartTrip => "START_TRIP",
            ActionType::CloseTrip => "CLOSE_TRIP",
            ActionType::FactoryReset => "FACTORY_RESET",
        }
    }

    /// 从数据库存储形式解析
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CREATE_TRUCK_MODEL" => Some(ActionType::CreateTruckModel),
            "CREATE_TRUCK" => Some(ActionType::CreateTruck),
            "DELETE_TRUCK_MODEL" => Some(ActionType::DeleteTruckModel),
            "DELETE_TRUCK" => Some(ActionType::DeleteTruck),
            "CREATE_STORAGE" => Some(ActionType::CreateStorage),
            "RECORD_INCOME" => Some(ActionType::RecordIncome),
            "START_TRIP" => Some(ActionType::StartTrip),
            "CLOSE_TRIP" => Some(ActionType::CloseTrip),
            "FACTORY_RESET" => Some(ActionType::FactoryReset),
            _ => None,
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
