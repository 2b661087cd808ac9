use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

use clap::{Parser, Subcommand, ValueEnum};
use directories::ProjectDirs;

use crate::cli::*;

static CONF_DIR: LazyLock<ConfDir> = LazyLock::new(|| {
    let proj_dirs =
        ProjectDirs::from("", "presence", "presence").expect("failed to get project dir");
    ConfDir { path: proj_dirs.config_dir().to_path_buf() }
});

fn default_config_dir() -> &'static str {
    CONF_DIR.path().to_str().unwrap()
}

#[derive(Parser, Debug, Clone)]
pub struct ResolveOptions {
    /// 两个特征向量被视为同一个人的距离上限（不含），必须为非负数
    #[arg(short, long, value_name = "DISTANCE", default_value_t = 0.6, value_parser = parse_threshold)]
    pub threshold: f64,
    /// 不连接数据库，人脸 ID 只在本次运行中有效
    #[arg(long)]
    pub no_db: bool,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "presence", version)]
pub struct Opts {
    #[command(subcommand)]
    pub subcmd: SubCommand,
    /// presence 配置文件目录
    #[arg(short, long, default_value = default_config_dir())]
    pub conf_dir: ConfDir,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SubCommand {
    /// 识别特征提取结果中的人脸并记录
    Run(RunCommand),
    /// 列出所有已知人脸
    Faces(FacesCommand),
    /// 列出所有已处理图片的人脸数量
    Images(ImagesCommand),
}

#[derive(Debug, Clone)]
pub struct ConfDir {
    path: PathBuf,
}

impl ConfDir {
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// 返回数据库文件的路径
    pub fn database(&self) -> PathBuf {
        self.path.join("presence.db")
    }
}

impl FromStr for ConfDir {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self { path: PathBuf::from(s) })
    }
}

fn parse_threshold(s: &str) -> anyhow::Result<f64> {
    let threshold: f64 = s.parse()?;
    if !(threshold >= 0.0) {
        return Err(anyhow::anyhow!("阈值必须为非负数: {}", s));
    }
    Ok(threshold)
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Json,
    Table,
}
