use std::fmt;

use log::{debug, error, info};

use crate::extract::{BoundingBox, Extraction};
use crate::metrics;
use crate::resolver::{Resolution, Resolver};
use crate::store::FaceStore;

/// 单张图片的处理结果
#[derive(Debug, Clone)]
pub struct ImageSummary {
    pub image_ref: String,
    /// 检测到的人脸数量，与识别是否成功无关
    pub face_count: usize,
    pub resolutions: Vec<Resolution>,
    /// 每张人脸的标签，供标注图片使用
    pub labels: Vec<String>,
    pub boxes: Vec<BoundingBox>,
}

/// 一次运行的统计信息
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub images: usize,
    pub faces: usize,
    pub matched: usize,
    pub created: usize,
    pub failed: usize,
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "图片 {}，人脸 {}，匹配 {}，新增 {}，失败 {}",
            self.images, self.faces, self.matched, self.created, self.failed
        )
    }
}

/// 按顺序处理每张图片的特征提取结果
pub struct Pipeline<S> {
    resolver: Resolver<S>,
    stats: RunStats,
}

impl<S: FaceStore> Pipeline<S> {
    pub fn new(resolver: Resolver<S>) -> Self {
        Self { resolver, stats: RunStats::default() }
    }

    /// 处理一张图片
    ///
    /// 依次识别每个特征向量并记录出现，最后写入图片的人脸数量。
    /// 单个特征向量失败不会影响同一张图片中的其它向量
    pub async fn process(&mut self, extraction: &Extraction) -> ImageSummary {
        let image_ref = extraction.image_ref.as_str();
        let now = extraction.detected_at;
        info!("处理图片: {}", image_ref);

        let mut resolutions = Vec::with_capacity(extraction.embeddings.len());
        let mut labels = Vec::with_capacity(extraction.embeddings.len());

        for embedding in &extraction.embeddings {
            let resolution = self.resolver.resolve(embedding, now).await;
            let store = self.resolver.store();

            match resolution {
                Resolution::Matched(id) => {
                    info!("在 {} 中匹配到人脸 {}", image_ref, store.label(id));
                    labels.push(format!("ID: {}", store.label(id)));
                    self.stats.matched += 1;
                }
                Resolution::Created(id) => {
                    info!("在 {} 中发现新人脸 {}", image_ref, store.label(id));
                    labels.push(format!("New ID: {}", store.label(id)));
                    self.stats.created += 1;
                }
                Resolution::Failed => {
                    labels.push("unresolved".to_owned());
                    self.stats.failed += 1;
                }
            }

            if let Some(id) = resolution.face_id() {
                if let Err(e) = store.record_sighting(image_ref, id, now).await {
                    error!("记录人脸 {} 在 {} 中出现失败: {}", store.label(id), image_ref, e);
                }
            }
            resolutions.push(resolution);
        }

        let face_count = extraction.embeddings.len();
        if let Err(e) = self.resolver.store().upsert_image_count(image_ref, face_count, now).await {
            error!("记录 {} 的人脸数量失败: {}", image_ref, e);
        }

        self.stats.images += 1;
        self.stats.faces += face_count;
        metrics::inc_image_count();

        debug!("{} 的人脸标签: {:?}", image_ref, labels);
        info!("在 {} 中检测到 {} 张人脸", image_ref, face_count);

        ImageSummary {
            image_ref: image_ref.to_owned(),
            face_count,
            resolutions,
            labels,
            boxes: extraction.boxes.clone(),
        }
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn resolver(&self) -> &Resolver<S> {
        &self.resolver
    }

    pub fn into_resolver(self) -> Resolver<S> {
        self.resolver
    }
}
