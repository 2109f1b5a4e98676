//! kubeboot - bootstrap Kubernetes nodes over SSH

use clap::Parser;
use tokio_util::sync::CancellationToken;

use kubeboot_cli::cli::Cli;
use kubeboot_cli::logging;
use kubeboot_cli::output::json;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, stopping remote commands");
            on_interrupt.cancel();
        }
    });

    let as_json = cli.json;
    if let Err(e) = cli.run(cancel).await {
        let message = format!("{e:#}");
        match json::format_error(&message, json::error_code(&e)) {
            Ok(out) if as_json => println!("{out}"),
            _ => eprintln!("Error: {message}"),
        }
        std::process::exit(1);
    }
}
