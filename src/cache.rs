use std::collections::HashMap;

use log::warn;

use crate::distance::euclidean;
use crate::store::{Face, FaceId};

/// 已知人脸的内存副本，用于逐个比较特征向量
///
/// 条目按加载和插入的顺序保存，距离相同时靠前的条目优先
#[derive(Debug, Default, Clone)]
pub struct CandidateCache {
    ids: Vec<FaceId>,
    embeddings: Vec<Vec<f64>>,
    /// 人脸 ID 到条目位置的映射
    index: HashMap<FaceId, usize>,
}

impl CandidateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从已知人脸列表加载
    pub fn load(faces: impl IntoIterator<Item = Face>) -> Self {
        let mut cache = Self::new();
        for face in faces {
            cache.insert(face.id, face.embedding);
        }
        cache
    }

    /// 线性扫描所有条目，返回距离最近的人脸及其距离
    ///
    /// 维度与 `query` 不一致的条目会被跳过
    pub fn nearest(&self, query: &[f64]) -> Option<(FaceId, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (i, embedding) in self.embeddings.iter().enumerate() {
            let distance = match euclidean(query, embedding) {
                Ok(d) if !d.is_nan() => d,
                Ok(_) => continue,
                Err(e) => {
                    warn!("跳过人脸 {}: {}", self.ids[i], e);
                    continue;
                }
            };
            // 严格小于，保证距离相同时先出现的条目胜出
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((i, distance));
            }
        }
        best.map(|(i, d)| (self.ids[i], d))
    }

    /// 追加一个新条目
    pub fn insert(&mut self, id: FaceId, embedding: Vec<f64>) {
        self.index.insert(id, self.ids.len());
        self.ids.push(id);
        self.embeddings.push(embedding);
    }

    /// 替换已有条目的特征向量，条目不存在时什么也不做
    pub fn refresh(&mut self, id: FaceId, embedding: &[f64]) {
        if let Some(&i) = self.index.get(&id) {
            self.embeddings[i] = embedding.to_vec();
        }
    }

    pub fn get(&self, id: FaceId) -> Option<&[f64]> {
        self.index.get(&id).map(|&i| self.embeddings[i].as_slice())
    }

    /// 缓存中最常见的特征向量维度，数量相同时取先出现的维度
    ///
    /// 长度为 0 的条目不参与统计
    pub fn dim(&self) -> Option<usize> {
        let mut counts: Vec<(usize, usize)> = vec![];
        for embedding in self.embeddings.iter().filter(|e| !e.is_empty()) {
            match counts.iter_mut().find(|(dim, _)| *dim == embedding.len()) {
                Some((_, count)) => *count += 1,
                None => counts.push((embedding.len(), 1)),
            }
        }
        let mut best: Option<(usize, usize)> = None;
        for (dim, count) in counts {
            if best.is_none_or(|(_, c)| count > c) {
                best = Some((dim, count));
            }
        }
        best.map(|(dim, _)| dim)
    }

    /// 维度与 `dim` 不一致的条目
    pub fn mismatched(&self, dim: usize) -> impl Iterator<Item = FaceId> + '_ {
        self.ids
            .iter()
            .zip(&self.embeddings)
            .filter(move |(_, embedding)| embedding.len() != dim)
            .map(|(&id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// 按顺序返回所有人脸 ID
    pub fn ids(&self) -> &[FaceId] {
        &self.ids
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn face(id: FaceId, embedding: &[f64]) -> Face {
        let now = Utc::now();
        Face { id, embedding: embedding.to_vec(), first_seen: now, last_seen: now }
    }

    #[test]
    fn test_nearest_empty() {
        let cache = CandidateCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.nearest(&[0.0, 0.0]), None);
    }

    #[test]
    fn test_nearest() {
        let cache = CandidateCache::load([
            face(1, &[0.0, 0.0]),
            face(2, &[3.0, 4.0]),
            face(3, &[1.0, 0.0]),
        ]);
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.ids(), &[1, 2, 3]);
        assert_eq!(cache.nearest(&[3.0, 3.0]), Some((2, 1.0)));
        assert_eq!(cache.nearest(&[0.9, 0.0]).map(|(id, _)| id), Some(3));
    }

    #[test]
    fn test_nearest_tie_break() {
        // 7 和 5 到查询点的距离相同，先插入的 7 胜出
        let mut cache = CandidateCache::new();
        cache.insert(7, vec![1.0, 0.0]);
        cache.insert(5, vec![-1.0, 0.0]);
        assert_eq!(cache.nearest(&[0.0, 0.0]), Some((7, 1.0)));
    }

    #[test]
    fn test_nearest_skips_dimension_mismatch() {
        let mut cache = CandidateCache::new();
        cache.insert(1, vec![0.0, 0.0, 0.0]);
        cache.insert(2, vec![2.0, 0.0]);
        assert_eq!(cache.nearest(&[0.0, 0.0]), Some((2, 2.0)));
        assert_eq!(cache.nearest(&[0.0]), None);
    }

    #[test]
    fn test_dim_majority() {
        assert_eq!(CandidateCache::new().dim(), None);

        let cache = CandidateCache::load([
            face(1, &[]),
            face(2, &[0.0, 0.0]),
            face(3, &[1.0, 1.0, 1.0]),
            face(4, &[2.0, 2.0, 2.0]),
        ]);
        assert_eq!(cache.dim(), Some(3));
        assert_eq!(cache.mismatched(3).collect::<Vec<_>>(), vec![1, 2]);

        // 数量相同时先出现的维度胜出
        let cache = CandidateCache::load([face(1, &[0.0, 0.0]), face(2, &[1.0])]);
        assert_eq!(cache.dim(), Some(2));

        let cache = CandidateCache::load([face(1, &[])]);
        assert_eq!(cache.dim(), None);
    }

    #[test]
    fn test_refresh() {
        let mut cache = CandidateCache::load([face(1, &[0.0]), face(2, &[10.0])]);
        cache.refresh(2, &[1.0]);
        assert_eq!(cache.get(2), Some(&[1.0][..]));
        assert_eq!(cache.nearest(&[0.9]).map(|(id, _)| id), Some(2));

        // 不存在的条目
        cache.refresh(3, &[5.0]);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(3), None);
    }
}
