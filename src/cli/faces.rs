use anyhow::{Result, bail};
use clap::Parser;

use crate::cli::SubCommandExtend;
use crate::config::{Opts, OutputFormat};
use crate::store::{FaceId, SqliteStore};

#[derive(Parser, Debug, Clone)]
pub struct FacesCommand {
    /// 只列出该人脸的出现记录
    #[arg(long, value_name = "ID")]
    pub id: Option<FaceId>,
    /// 输出格式
    #[arg(long, value_name = "FORMAT", value_enum, default_value_t = OutputFormat::Table)]
    pub output_format: OutputFormat,
}

impl SubCommandExtend for FacesCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let store = open_existing(opts).await?;

        match self.id {
            Some(id) => {
                let records = store.sightings(id).await?;
                match self.output_format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
                    OutputFormat::Table => {
                        for record in &records {
                            println!("{}\t{}", record.detection_time.to_rfc3339(), record.image_path);
                        }
                    }
                }
            }
            None => {
                let records = store.face_summaries().await?;
                match self.output_format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
                    OutputFormat::Table => {
                        for record in &records {
                            println!(
                                "{}\t{}\t{}\t{}",
                                record.face_id,
                                record.first_seen.to_rfc3339(),
                                record.last_seen.to_rfc3339(),
                                record.sightings
                            );
                        }
                    }
                }
            }
        }

        store.close().await;
        Ok(())
    }
}

/// 打开已有的数据库，报表命令不会创建新的数据库
pub(super) async fn open_existing(opts: &Opts) -> Result<SqliteStore> {
    let database = opts.conf_dir.database();
    if !database.exists() {
        bail!("数据库不存在: {}", database.display());
    }
    Ok(SqliteStore::open(database).await?)
}
