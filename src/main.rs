use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = shadowtap::cli::Cli::parse();
    if let Err(e) = shadowtap::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
