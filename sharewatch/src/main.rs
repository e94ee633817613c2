//! sharewatch entry point

use clap::Parser;
use sharewatch::cli::Cli;
use sharewatch::{bootstrap, logging};
use tracing::info;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let _log_guard = match logging::init() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: failed to initialize logging: {}", e);
            std::process::exit(1);
        }
    };

    let config = cli.probe_config();
    let probe = match bootstrap::initialize(&config).await {
        Ok(probe) => probe,
        Err(e) => {
            tracing::error!("Startup failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    if cli.once {
        let report = probe.run_cycle().await;
        if cli.json {
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("Error: failed to serialize report: {}", e);
                    std::process::exit(1);
                }
            }
        } else {
            print!("{}", report);
        }
        if !report.all_healthy() {
            std::process::exit(1);
        }
        return;
    }

    probe.shutdown().listen_for_signals();
    probe.run().await;
    info!("Shutdown complete");
}
