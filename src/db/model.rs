use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// 人脸记录
#[derive(Debug, FromRow)]
pub struct FaceRecord {
    /// 人脸 ID
    pub face_id: i64,
    /// 最近一次的特征向量，格式见 [`super::utils::encode_embedding`]
    pub face_encoding: Vec<u8>,
    /// 首次出现时间
    pub first_seen: DateTime<Utc>,
    /// 最近出现时间
    pub last_seen: DateTime<Utc>,
}

/// 人脸在某张图片中出现的记录
#[derive(Debug, Serialize, FromRow)]
pub struct ImageRecord {
    pub record_id: i64,
    pub image_path: String,
    pub face_id: i64,
    pub detection_time: DateTime<Utc>,
}

/// 图片的人脸数量统计
#[derive(Debug, Serialize, FromRow)]
pub struct ImageCountRecord {
    pub image_id: i64,
    /// 图片路径，唯一
    pub image_path: String,
    pub face_count: i64,
    pub processed_time: DateTime<Utc>,
}

/// 人脸概况，附带出现次数
#[derive(Debug, Serialize, FromRow)]
pub struct FaceSummaryRecord {
    pub face_id: i64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub sightings: i64,
}
