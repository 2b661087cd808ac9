use anyhow::Result;
use clap::Parser;

use presence::Opts;
use presence::cli::SubCommandExtend;
use presence::config::SubCommand;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opts = Opts::parse();

    match &opts.subcmd {
        SubCommand::Run(config) => config.run(&opts).await,
        SubCommand::Faces(config) => config.run(&opts).await,
        SubCommand::Images(config) => config.run(&opts).await,
    }
}
