use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = wakeward::cli::Cli::parse();
    if let Err(e) = wakeward::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
