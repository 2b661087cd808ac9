use chrono::{DateTime, Utc};
use sqlx::{Executor, Result, Sqlite};

use super::{FaceRecord, FaceSummaryRecord, ImageCountRecord, ImageRecord};

/// 获取所有人脸，按 ID 升序
pub async fn get_faces<'c, E>(executor: E) -> Result<Vec<FaceRecord>>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as::<_, FaceRecord>(
        r#"
        SELECT face_id, face_encoding, first_seen, last_seen
        FROM faces ORDER BY face_id ASC
        "#,
    )
    .fetch_all(executor)
    .await
}

/// 获取人脸的首次出现时间，人脸不存在时返回 None
pub async fn get_face_first_seen<'c, E>(executor: E, id: i64) -> Result<Option<DateTime<Utc>>>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_scalar::<_, DateTime<Utc>>(
        r#"
        SELECT first_seen FROM faces WHERE face_id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// 添加人脸，返回人脸 ID
pub async fn add_face<'c, E>(executor: E, encoding: &[u8], now: DateTime<Utc>) -> Result<i64>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO faces (face_encoding, first_seen, last_seen)
        VALUES (?, ?, ?)
        RETURNING face_id
        "#,
    )
    .bind(encoding)
    .bind(now)
    .bind(now)
    .fetch_one(executor)
    .await
}

/// 更新人脸的最近出现时间，`encoding` 不为空时同时替换特征向量
///
/// 返回受影响的行数
pub async fn update_face<'c, E>(
    executor: E,
    id: i64,
    last_seen: DateTime<Utc>,
    encoding: Option<&[u8]>,
) -> Result<u64>
where
    E: Executor<'c, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        UPDATE faces
        SET last_seen = ?, face_encoding = COALESCE(?, face_encoding)
        WHERE face_id = ?
        "#,
    )
    .bind(last_seen)
    .bind(encoding)
    .bind(id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// 添加人脸出现记录
pub async fn add_image_record<'c, E>(
    executor: E,
    path: &str,
    face_id: i64,
    detection_time: DateTime<Utc>,
) -> Result<i64>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO image_records (image_path, face_id, detection_time)
        VALUES (?, ?, ?)
        RETURNING record_id
        "#,
    )
    .bind(path)
    .bind(face_id)
    .bind(detection_time)
    .fetch_one(executor)
    .await
}

/// 获取某个人脸的所有出现记录
pub async fn get_image_records<'c, E>(executor: E, face_id: i64) -> Result<Vec<ImageRecord>>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as::<_, ImageRecord>(
        r#"
        SELECT record_id, image_path, face_id, detection_time
        FROM image_records WHERE face_id = ? ORDER BY record_id ASC
        "#,
    )
    .bind(face_id)
    .fetch_all(executor)
    .await
}

/// 添加或覆盖图片的人脸数量
pub async fn upsert_image_count<'c, E>(
    executor: E,
    path: &str,
    face_count: i64,
    processed_time: DateTime<Utc>,
) -> Result<()>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO image_counts (image_path, face_count, processed_time)
        VALUES (?, ?, ?)
        ON CONFLICT (image_path) DO UPDATE SET
            face_count = excluded.face_count,
            processed_time = excluded.processed_time
        "#,
    )
    .bind(path)
    .bind(face_count)
    .bind(processed_time)
    .execute(executor)
    .await?;

    Ok(())
}

/// 获取所有图片的人脸数量
pub async fn get_image_counts<'c, E>(executor: E) -> Result<Vec<ImageCountRecord>>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as::<_, ImageCountRecord>(
        r#"
        SELECT image_id, image_path, face_count, processed_time
        FROM image_counts ORDER BY image_id ASC
        "#,
    )
    .fetch_all(executor)
    .await
}

/// 获取所有人脸的概况及出现次数
pub async fn get_face_summaries<'c, E>(executor: E) -> Result<Vec<FaceSummaryRecord>>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as::<_, FaceSummaryRecord>(
        r#"
        SELECT faces.face_id AS face_id, first_seen, last_seen, COUNT(image_records.record_id) AS sightings
        FROM faces
        LEFT JOIN image_records ON faces.face_id = image_records.face_id
        GROUP BY faces.face_id
        ORDER BY faces.face_id ASC
        "#,
    )
    .fetch_all(executor)
    .await
}
