use anyhow::Result;
use clap::Parser;

use super::faces::open_existing;
use crate::cli::SubCommandExtend;
use crate::config::{Opts, OutputFormat};

#[derive(Parser, Debug, Clone)]
pub struct ImagesCommand {
    /// 输出格式
    #[arg(long, value_name = "FORMAT", value_enum, default_value_t = OutputFormat::Table)]
    pub output_format: OutputFormat,
}

impl SubCommandExtend for ImagesCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let store = open_existing(opts).await?;
        let records = store.image_counts().await?;

        match self.output_format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
            OutputFormat::Table => {
                for record in &records {
                    println!(
                        "{}\t{}\t{}",
                        record.face_count,
                        record.processed_time.to_rfc3339(),
                        record.image_path
                    );
                }
            }
        }

        store.close().await;
        Ok(())
    }
}
