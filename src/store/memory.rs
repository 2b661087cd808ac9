use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use super::{Face, FaceId, FaceStore};
use crate::error::{Error, Result};

/// 人脸出现记录
#[derive(Debug, Clone, PartialEq)]
pub struct Sighting {
    pub image_ref: String,
    pub id: FaceId,
    pub detected_at: DateTime<Utc>,
}

/// 不落盘的 [`FaceStore`] 实现，ID 仅在本次运行中有效
///
/// 用于不连接数据库的运行模式以及测试
pub struct MemoryStore {
    inner: Mutex<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    faces: Vec<Face>,
    sightings: Vec<Sighting>,
    image_counts: BTreeMap<String, (usize, DateTime<Utc>)>,
    seq: FaceId,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self { inner: Mutex::new(MemoryStoreInner::default()) }
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryStoreInner>> {
        self.inner.lock().map_err(|_| Error::Poisoned)
    }

    /// 只读访问，锁损坏时仍然返回已有的数据
    fn snapshot(&self) -> MutexGuard<'_, MemoryStoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 当前所有人脸
    pub fn faces(&self) -> Vec<Face> {
        self.snapshot().faces.clone()
    }

    /// 所有出现记录
    pub fn sightings(&self) -> Vec<Sighting> {
        self.snapshot().sightings.clone()
    }

    /// 图片的人脸数量和处理时间
    pub fn image_count(&self, image_ref: &str) -> Option<(usize, DateTime<Utc>)> {
        self.snapshot().image_counts.get(image_ref).copied()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FaceStore for MemoryStore {
    async fn list_all(&self) -> Result<Vec<Face>> {
        Ok(self.lock()?.faces.clone())
    }

    async fn create(&self, embedding: &[f64], now: DateTime<Utc>) -> Result<FaceId> {
        let mut inner = self.lock()?;
        inner.seq += 1;
        let id = inner.seq;
        inner.faces.push(Face { id, embedding: embedding.to_vec(), first_seen: now, last_seen: now });
        Ok(id)
    }

    async fn touch(&self, id: FaceId, now: DateTime<Utc>, embedding: Option<&[f64]>) -> Result<()> {
        let mut inner = self.lock()?;
        let face = inner.faces.iter_mut().find(|f| f.id == id).ok_or(Error::NotFound(id))?;
        face.last_seen = now.max(face.first_seen);
        if let Some(embedding) = embedding {
            face.embedding = embedding.to_vec();
        }
        Ok(())
    }

    async fn record_sighting(&self, image_ref: &str, id: FaceId, now: DateTime<Utc>) -> Result<()> {
        let mut inner = self.lock()?;
        if !inner.faces.iter().any(|f| f.id == id) {
            return Err(Error::NotFound(id));
        }
        inner.sightings.push(Sighting { image_ref: image_ref.to_owned(), id, detected_at: now });
        Ok(())
    }

    async fn upsert_image_count(
        &self,
        image_ref: &str,
        count: usize,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut inner = self.lock()?;
        inner.image_counts.insert(image_ref.to_owned(), (count, now));
        Ok(())
    }

    fn label(&self, id: FaceId) -> String {
        format!("temp:{id}")
    }
}
