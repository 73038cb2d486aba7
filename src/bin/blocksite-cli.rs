// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use blocksite_publisher::cli::{execute, exit_code, Cli};
use clap::Parser;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    // Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Execute the command
    if let Err(e) = execute(cli).await {
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}
