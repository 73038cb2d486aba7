// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod publish;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::error::{PublishError, PublishFailure};

/// Blocksite publisher CLI
#[derive(Parser, Debug)]
#[command(name = "blocksite-cli")]
#[command(version = crate::version::VERSION_NUMBER)]
#[command(about = "Publish large sites to the ledger one piece per transaction", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./blocksite.toml when present)
    #[arg(long, global = true, env = "BLOCKSITE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Session state file, overrides the configured one
    #[arg(long, global = true)]
    pub state_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Publish the blocksite Move package and print its package id
    PublishPackage(publish::PublishPackageArgs),

    /// Publish a file as a blocksite, resuming an interrupted publish
    Publish(publish::PublishArgs),

    /// Create an empty blockchat chat
    CreateChat(publish::CreateChatArgs),

    /// Show recorded publish sessions
    Status(publish::StatusArgs),
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let mut config = crate::config::PublisherConfig::load(cli.config.as_deref())?;
    if let Some(state_file) = cli.state_file {
        config.state_file = state_file;
    }

    match cli.command {
        Commands::PublishPackage(args) => publish::publish_package(args, config).await,
        Commands::Publish(args) => publish::publish(args, config).await,
        Commands::CreateChat(args) => publish::create_chat(args, config).await,
        Commands::Status(args) => publish::status(args, config).await,
    }
}

/// Exit code for a failed command: the innermost publish error kind decides.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(failure) = cause.downcast_ref::<PublishFailure>() {
            return failure.kind().exit_code();
        }
        if let Some(publish_err) = cause.downcast_ref::<PublishError>() {
            return publish_err.kind().exit_code();
        }
    }
    1
}
