mod memory;
mod sqlite;

use std::future::Future;

use chrono::{DateTime, Utc};
pub use memory::*;
pub use sqlite::*;

use crate::error::Result;

/// 人脸 ID，由存储分配
pub type FaceId = i64;

/// 一个已知的人脸身份
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub id: FaceId,
    /// 最近一次出现时的特征向量
    pub embedding: Vec<f64>,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

/// 人脸身份的持久化存储
///
/// 每个操作都是一个独立的事务：成功则提交，失败则回滚并返回错误
pub trait FaceStore: Send + Sync {
    /// 返回所有已知人脸，按创建顺序排列
    fn list_all(&self) -> impl Future<Output = Result<Vec<Face>>> + Send;

    /// 创建新的人脸，`first_seen` 和 `last_seen` 均为 `now`
    fn create(&self, embedding: &[f64], now: DateTime<Utc>)
    -> impl Future<Output = Result<FaceId>> + Send;

    /// 更新人脸的最近出现时间，`embedding` 不为空时同时替换特征向量
    ///
    /// 人脸不存在时返回 [`crate::Error::NotFound`]，不会创建新的人脸
    fn touch(
        &self,
        id: FaceId,
        now: DateTime<Utc>,
        embedding: Option<&[f64]>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// 记录人脸在某张图片中出现
    fn record_sighting(
        &self,
        image_ref: &str,
        id: FaceId,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// 添加或覆盖图片的人脸数量
    fn upsert_image_count(
        &self,
        image_ref: &str,
        count: usize,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// 人脸 ID 在日志中的展示形式
    fn label(&self, id: FaceId) -> String {
        id.to_string()
    }
}
