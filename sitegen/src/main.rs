use clap::Parser;
use sitegen::cli::Cli;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = sitegen::run(cli).await {
        tracing::error!(error = %e, "site generation failed");
        std::process::exit(1);
    }
}
