use clap::Parser;
use knowledge_agent::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::run::run(Cli::parse()).await
}
