mod faces;
mod images;
mod run;

pub use faces::*;
pub use images::*;
pub use run::*;

use crate::config::Opts;

pub trait SubCommandExtend {
    fn run(&self, opts: &Opts) -> impl std::future::Future<Output = anyhow::Result<()>> + Send;
}
