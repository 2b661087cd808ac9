use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};

use crate::cache::CandidateCache;
use crate::error::Error;
use crate::metrics;
use crate::store::{FaceId, FaceStore};

/// 单个特征向量的识别结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// 与已知人脸匹配
    Matched(FaceId),
    /// 创建了新的人脸
    Created(FaceId),
    /// 存储操作失败，没有可用的人脸 ID
    Failed,
}

impl Resolution {
    pub fn face_id(&self) -> Option<FaceId> {
        match *self {
            Self::Matched(id) | Self::Created(id) => Some(id),
            Self::Failed => None,
        }
    }

    fn outcome(&self) -> &'static str {
        match self {
            Self::Matched(_) => "matched",
            Self::Created(_) => "created",
            Self::Failed => "failed",
        }
    }
}

/// 将特征向量解析为人脸身份
///
/// 先写入存储，成功后再更新缓存，保证缓存中不会出现存储里没有的状态
pub struct Resolver<S> {
    store: S,
    cache: CandidateCache,
    /// 距离严格小于该值才视为同一个人
    threshold: f64,
    /// 特征向量维度，未指定时取第一个人脸的维度
    dim: Option<usize>,
}

impl<S: FaceStore> Resolver<S> {
    /// 创建 Resolver，特征向量维度取缓存中最常见的维度
    ///
    /// # Panics
    ///
    /// `threshold` 为负数或 NaN 时 panic
    pub fn new(store: S, cache: CandidateCache, threshold: f64) -> Self {
        assert!(threshold >= 0.0, "threshold must be non-negative, got {threshold}");
        let dim = cache.dim();
        Self { store, cache, threshold, dim }
    }

    /// 从存储中加载所有已知人脸并创建 Resolver
    ///
    /// 读取失败时以空缓存启动
    pub async fn load(store: S, threshold: f64) -> Self {
        let cache = match store.list_all().await {
            Ok(faces) => CandidateCache::load(faces),
            Err(e) => {
                error!("读取已知人脸失败，将以空集合启动: {}", e);
                CandidateCache::new()
            }
        };
        info!("已加载 {} 个已知人脸", cache.len());
        if let Some(dim) = cache.dim() {
            for id in cache.mismatched(dim) {
                warn!("人脸 {} 的特征向量维度不是 {}，不会再被匹配", store.label(id), dim);
            }
        }
        Self::new(store, cache, threshold)
    }

    /// 固定特征向量维度，维度不一致的向量会被拒绝
    pub fn with_dim(mut self, dim: usize) -> Self {
        self.dim = Some(dim);
        self
    }

    pub async fn resolve(&mut self, embedding: &[f64], now: DateTime<Utc>) -> Resolution {
        let resolution = self.resolve_inner(embedding, now).await;
        metrics::inc_resolution(resolution.outcome());
        resolution
    }

    async fn resolve_inner(&mut self, embedding: &[f64], now: DateTime<Utc>) -> Resolution {
        if embedding.is_empty() {
            error!("特征向量为空");
            return Resolution::Failed;
        }
        if let Some(dim) = self.dim {
            if embedding.len() != dim {
                error!("{}", Error::DimensionMismatch { expected: dim, got: embedding.len() });
                return Resolution::Failed;
            }
        }

        if let Some((id, distance)) = self.cache.nearest(embedding) {
            metrics::observe_nearest_distance(distance);
            debug!("最近的人脸 {}，距离 {:.4}", self.store.label(id), distance);
            if distance < self.threshold {
                return match self.store.touch(id, now, Some(embedding)).await {
                    Ok(()) => {
                        self.cache.refresh(id, embedding);
                        Resolution::Matched(id)
                    }
                    Err(e) => {
                        error!("更新人脸 {} 失败: {}", self.store.label(id), e);
                        Resolution::Failed
                    }
                };
            }
        }

        match self.store.create(embedding, now).await {
            Ok(id) => {
                self.cache.insert(id, embedding.to_vec());
                self.dim.get_or_insert(embedding.len());
                Resolution::Created(id)
            }
            Err(e) => {
                error!("添加人脸失败: {}", e);
                Resolution::Failed
            }
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &CandidateCache {
        &self.cache
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
