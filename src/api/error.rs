// ==========================================
// 露天矿运输跟踪系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型, 转换仓储错误为带业务语义的错误
// 约束: 所有错误信息必须包含显式原因 (可解释性)
// ==========================================

use crate::geometry::GeometryError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    /// 忽略大小写唯一性冲突 (TruckModel.title / Truck.number / Storage.title)
    #[error("必须忽略大小写唯一: {field}=\"{value}\" 已被占用")]
    DuplicateKey { field: String, value: String },

    /// 堆场边界相交 (含共享边/公共单点)
    #[error("堆场边界与 \"{existing_title}\" 相交")]
    TerritoryOverlap { existing_title: String },

    /// 矿石成分越界, 携带全部违规字段名
    #[error("矿石成分不合法: {fields:?}")]
    InvalidComposition { fields: Vec<String> },

    /// 卡车已有活跃运输单
    #[error("卡车 \"{truck_number}\" 已有活跃运输单")]
    ConflictingActiveTrip { truck_number: String },

    /// 卸载坐标文本不满足 "X Y" 形状
    #[error("坐标文本格式不合法: \"{0}\"")]
    InvalidCoordinateFormat(String),

    #[error("资源未找到: {entity} id={id}")]
    NotFound { entity: String, id: String },

    #[error("无效的状态转换: from={from} to={to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("无效输入: {0}")]
    InvalidInput(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("内部错误: {0}")]
    InternalError(String),
}

// 实现 From<RepositoryError>
// 唯一约束兜底错误在调用点按上下文细化为 DuplicateKey /
// ConflictingActiveTrip; 这里只做无上下文的通用映射
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => ApiError::NotFound { entity, id },
            RepositoryError::TerritoryOverlap { existing_title } => {
                ApiError::TerritoryOverlap { existing_title }
            }
            RepositoryError::InvalidStateTransition { from, to } => {
                ApiError::InvalidStateTransition { from, to }
            }
            RepositoryError::Geometry(e) => e.into(),
            RepositoryError::LockError(msg) => ApiError::LockError(msg),
            RepositoryError::UniqueConstraintViolation(msg)
            | RepositoryError::CheckConstraintViolation(msg)
            | RepositoryError::ForeignKeyViolation(msg)
            | RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::Other(e) => ApiError::InternalError(e.to_string()),
        }
    }
}

// 实现 From<rusqlite::Error> (维护操作直接持有连接, 经仓储错误归一)
impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        ApiError::from(RepositoryError::from(err))
    }
}

// 实现 From<GeometryError>
impl From<GeometryError> for ApiError {
    fn from(err: GeometryError) -> Self {
        match err {
            GeometryError::InvalidXyFormat(text) => ApiError::InvalidCoordinateFormat(text),
            GeometryError::InvalidPolygon(msg) | GeometryError::InvalidPoint(msg) => {
                ApiError::InvalidInput(msg)
            }
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
