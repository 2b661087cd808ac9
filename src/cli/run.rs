use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use indicatif::ProgressBar;
use log::{error, info, warn};
use regex::Regex;
use tokio::task::spawn_blocking;

use crate::cli::SubCommandExtend;
use crate::config::{Opts, ResolveOptions};
use crate::extract::{Extraction, scan_extractions};
use crate::metrics;
use crate::pipeline::{Pipeline, RunStats};
use crate::resolver::Resolver;
use crate::store::{FaceStore, MemoryStore, SqliteStore};
use crate::utils::pb_style;

#[derive(Parser, Debug, Clone)]
pub struct RunCommand {
    #[command(flatten)]
    pub resolve: ResolveOptions,
    /// 特征提取结果文件，或包含这些文件的目录
    pub path: PathBuf,
    /// 扫描的文件后缀名，多个后缀用逗号分隔
    #[arg(short, long, default_value = "json")]
    pub suffix: String,
    /// 特征向量维度，不指定时取第一个人脸的维度
    #[arg(long, value_name = "N")]
    pub dim: Option<usize>,
    /// prometheus 主动推送地址，运行结束后推送一次
    #[arg(long, value_name = "URL")]
    pub prometheus_push: Option<String>,
    /// 自定义 instance 标签值
    #[arg(long, value_name = "NAME", default_value = "presence")]
    pub prometheus_instance: String,
}

impl SubCommandExtend for RunCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let re_suf = format!("(?i)^({})$", self.suffix.replace(',', "|"));
        let re_suf = Regex::new(&re_suf)?;
        let entries = scan_extractions(&self.path, &re_suf)?;

        let (stats, skipped) = if self.resolve.no_db {
            info!("不使用数据库，人脸 ID 仅在本次运行中有效");
            let (stats, skipped, _) = self.process(MemoryStore::new(), &entries).await;
            (stats, skipped)
        } else {
            if !opts.conf_dir.path().exists() {
                std::fs::create_dir_all(opts.conf_dir.path())?;
            }
            let store = SqliteStore::open(opts.conf_dir.database()).await?;
            let (stats, skipped, store) = self.process(store, &entries).await;
            store.close().await;
            (stats, skipped)
        };

        info!("处理完成: {}，跳过文件 {}", stats, skipped);

        if let Some(url) = self.prometheus_push.clone() {
            let instance = self.prometheus_instance.clone();
            match spawn_blocking(move || metrics::push(&url, &instance)).await? {
                Ok(()) => info!("指标推送完成"),
                Err(e) => error!("推送指标失败: {e}"),
            }
        }

        Ok(())
    }
}

impl RunCommand {
    /// 依次处理所有特征提取结果文件，返回统计信息、跳过的文件数量以及存储
    async fn process<S: FaceStore>(&self, store: S, entries: &[PathBuf]) -> (RunStats, usize, S) {
        let mut resolver = Resolver::load(store, self.resolve.threshold).await;
        if let Some(dim) = self.dim {
            resolver = resolver.with_dim(dim);
        }
        let mut pipeline = Pipeline::new(resolver);
        let mut skipped = 0;

        let pb = ProgressBar::new(entries.len() as u64).with_style(pb_style());
        for entry in entries {
            pb.inc(1);
            let extraction = match Extraction::read(entry).await {
                Ok(extraction) => extraction,
                Err(e) => {
                    warn!("跳过无法读取的文件 {}: {}", entry.display(), e);
                    skipped += 1;
                    continue;
                }
            };
            let summary = pipeline.process(&extraction).await;
            pb.set_message(format!("{}: {} 张人脸", summary.image_ref, summary.face_count));
        }
        pb.finish_and_clear();

        let stats = pipeline.stats().clone();
        (stats, skipped, pipeline.into_resolver().into_store())
    }
}
