use std::path::Path;

use chrono::{DateTime, Utc};
use log::{debug, warn};

use super::{Face, FaceId, FaceStore};
use crate::db::utils::{decode_embedding, encode_embedding};
use crate::db::{self, Database, FaceSummaryRecord, ImageCountRecord, ImageRecord, crud};
use crate::error::{Error, Result};

/// 基于 SQLite 的人脸存储
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// 打开数据库，不存在时自动创建
    pub async fn open(filename: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(db::init_db(filename).await?))
    }

    #[cfg(test)]
    pub async fn memory() -> Result<Self> {
        Ok(Self::new(db::init_memory_db().await?))
    }

    /// 关闭数据库连接
    pub async fn close(&self) {
        self.db.close().await;
    }

    /// 所有人脸的概况及出现次数
    pub async fn face_summaries(&self) -> Result<Vec<FaceSummaryRecord>> {
        Ok(crud::get_face_summaries(&self.db).await?)
    }

    /// 某个人脸的所有出现记录
    pub async fn sightings(&self, id: FaceId) -> Result<Vec<ImageRecord>> {
        Ok(crud::get_image_records(&self.db, id).await?)
    }

    /// 所有图片的人脸数量
    pub async fn image_counts(&self) -> Result<Vec<ImageCountRecord>> {
        Ok(crud::get_image_counts(&self.db).await?)
    }
}

impl FaceStore for SqliteStore {
    async fn list_all(&self) -> Result<Vec<Face>> {
        let records = crud::get_faces(&self.db).await?;
        let mut faces = Vec::with_capacity(records.len());
        for record in records {
            match decode_embedding(&record.face_encoding) {
                Ok(embedding) => faces.push(Face {
                    id: record.face_id,
                    embedding,
                    first_seen: record.first_seen,
                    last_seen: record.last_seen,
                }),
                Err(e) => warn!("跳过人脸 {}: {}", record.face_id, e),
            }
        }
        Ok(faces)
    }

    async fn create(&self, embedding: &[f64], now: DateTime<Utc>) -> Result<FaceId> {
        let encoding = encode_embedding(embedding);
        let mut tx = self.db.begin().await?;
        let id = crud::add_face(&mut *tx, &encoding, now).await?;
        tx.commit().await?;
        debug!("新增人脸 {}", id);
        Ok(id)
    }

    async fn touch(&self, id: FaceId, now: DateTime<Utc>, embedding: Option<&[f64]>) -> Result<()> {
        let encoding = embedding.map(encode_embedding);
        // NOTE: 提前返回时 tx 被丢弃，事务自动回滚
        let mut tx = self.db.begin().await?;
        let Some(first_seen) = crud::get_face_first_seen(&mut *tx, id).await? else {
            return Err(Error::NotFound(id));
        };
        // 输入的时间不一定有序，保证 last_seen 不早于 first_seen
        let last_seen = now.max(first_seen);
        crud::update_face(&mut *tx, id, last_seen, encoding.as_deref()).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn record_sighting(&self, image_ref: &str, id: FaceId, now: DateTime<Utc>) -> Result<()> {
        let mut tx = self.db.begin().await?;
        crud::add_image_record(&mut *tx, image_ref, id, now).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn upsert_image_count(
        &self,
        image_ref: &str,
        count: usize,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut tx = self.db.begin().await?;
        crud::upsert_image_count(&mut *tx, image_ref, count as i64, now).await?;
        tx.commit().await?;
        Ok(())
    }
}
