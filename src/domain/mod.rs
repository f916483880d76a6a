// ==========================================
// 露天矿运输跟踪系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含数据访问逻辑, 不含引擎逻辑
// ==========================================

pub mod action_log;
pub mod mineral;
pub mod storage;
pub mod trip;
pub mod truck;
pub mod types;

// 重导出核心类型
pub use action_log::{ActionLog, ActionType};
pub use mineral::{Mineral, OreComposition};
pub use storage::{Storage, StorageIncome};
pub use trip::Trip;
pub use truck::{Truck, TruckModel};
pub use types::{normalized_key, TripOutcome, TripState};
