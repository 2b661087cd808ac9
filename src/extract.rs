use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use log::info;
use regex::Regex;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

/// 人脸位置，顺序与 face_recognition 的 (top, right, bottom, left) 一致
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

/// 单张图片的特征提取结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extraction {
    /// 图片路径或其它唯一标识
    pub image_ref: String,
    /// 检测时间，缺省为读取时的时间
    #[serde(default = "Utc::now")]
    pub detected_at: DateTime<Utc>,
    /// 每张人脸的特征向量，顺序与 `boxes` 一致
    #[serde(default)]
    pub embeddings: Vec<Vec<f64>>,
    #[serde(default)]
    pub boxes: Vec<BoundingBox>,
}

impl Extraction {
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }

    /// 读取一个特征提取结果文件
    pub async fn read(path: impl AsRef<Path>) -> Result<Self> {
        let data = tokio::fs::read(path).await?;
        Self::from_slice(&data)
    }
}

/// 扫描特征提取结果文件，按路径排序以保证处理顺序稳定
///
/// `path` 为单个文件时直接返回该文件
pub fn scan_extractions(path: &Path, regex_suf: &Regex) -> Result<Vec<PathBuf>> {
    if !path.exists() {
        bail!("路径不存在: {}", path.display());
    }
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    info!("开始扫描目录: {}", path.display());
    let mut entries = WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| {
            entry.ok().and_then(|entry| {
                let path = entry.path();
                if path.is_file() {
                    if let Some(ext) = path.extension() {
                        if regex_suf.is_match(&ext.to_string_lossy()) {
                            return Some(path.to_path_buf());
                        }
                    }
                }
                None
            })
        })
        .collect::<Vec<_>>();
    entries.sort();
    info!("扫描完成，共 {} 个文件", entries.len());

    Ok(entries)
}
