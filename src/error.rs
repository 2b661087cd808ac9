use thiserror::Error;

use crate::store::FaceId;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// 人脸识别与存储过程中的错误
#[derive(Debug, Error)]
pub enum Error {
    #[error("特征向量维度不匹配: 期望 {expected}，实际 {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("人脸 {0} 不存在")]
    NotFound(FaceId),

    #[error("数据库错误: {0}")]
    Store(#[from] sqlx::Error),

    #[error("数据库迁移失败: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("内存存储的锁已损坏")]
    Poisoned,

    #[error("无效的特征向量编码，长度 {0} 不是 8 的倍数")]
    Encoding(usize),
}
