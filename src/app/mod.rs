// ==========================================
// 露天矿运输跟踪系统 - 应用层
// ==========================================
// 职责: 装配共享连接与 API 实例, 供展示层/CLI 使用
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
