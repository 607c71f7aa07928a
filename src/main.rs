use clap::Parser;
use docparse_gateway::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::TestBackends(args) => cli::test_backends::run(args).await,
    }
}
