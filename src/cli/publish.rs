// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::chunking;
use crate::config::PublisherConfig;
use crate::contracts::{self, SuiCliClient, TransactionClient};
use crate::publish::{self as publishing, PublishOrchestrator, PublishRequest};
use crate::tracker::ObjectTracker;

/// Arguments for publish-package command
#[derive(Args, Debug)]
pub struct PublishPackageArgs {
    /// Move package directory (defaults to the configured contract_dir)
    #[arg(long)]
    pub contract_dir: Option<PathBuf>,
}

/// Arguments for publish command
#[derive(Args, Debug)]
pub struct PublishArgs {
    /// File to publish, usually an inlined single-file site
    pub file: PathBuf,

    /// Publish name used to track progress (defaults to the file stem)
    #[arg(long)]
    pub name: Option<String>,

    /// Package id of the deployed blocksite contract
    #[arg(long, env = "BLOCKSITE_PACKAGE_ID")]
    pub package_id: String,

    /// zlib-compress the file before chunking
    #[arg(long)]
    pub compress: bool,

    /// Bytes per piece, overrides the configured max_piece_size
    #[arg(long)]
    pub piece_size: Option<usize>,

    /// Drop any recorded progress for this name and create a new site
    #[arg(long)]
    pub restart: bool,
}

/// Arguments for create-chat command
#[derive(Args, Debug)]
pub struct CreateChatArgs {
    /// Package id of the deployed blockchat contract
    #[arg(long, env = "BLOCKCHAT_PACKAGE_ID")]
    pub package_id: String,

    /// Display name of the chat
    #[arg(long, default_value = "Demo Chat!")]
    pub chat_name: String,

    /// Publish name the chat is tracked under
    #[arg(long, default_value = "blockchat")]
    pub name: String,
}

/// Arguments for status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Only show this publish name
    pub name: Option<String>,
}

pub async fn publish_package(args: PublishPackageArgs, mut config: PublisherConfig) -> Result<()> {
    if let Some(dir) = args.contract_dir {
        config.contract_dir = dir;
    }
    let client = SuiCliClient::new(config.client_config());
    println!("📦 Publishing package in {}...", config.contract_dir.display());
    let package_id = contracts::publish_package(&client, &config.publish_context())
        .await
        .context("Failed to publish package")?;
    println!("✅ Package ID: {}", package_id);
    Ok(())
}

pub async fn publish(args: PublishArgs, mut config: PublisherConfig) -> Result<()> {
    if let Some(piece_size) = args.piece_size {
        config.max_piece_size = piece_size;
    }
    let name = match args.name {
        Some(name) => name,
        None => publish_name(&args.file)?,
    };

    let raw = std::fs::read(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let content = if args.compress {
        chunking::compress(&raw)?
    } else {
        raw
    };
    println!("📄 Site length to publish: {} bytes", content.len());

    let tracker = Arc::new(ObjectTracker::open(&config.state_file)?);
    if args.restart {
        if let Some(old) = tracker.forget(&name).await? {
            info!("Dropped recorded progress for '{}' ({:?})", name, old.target_identifier);
        }
    }

    let client: Arc<dyn TransactionClient> = Arc::new(SuiCliClient::new(config.client_config()));
    let request = PublishRequest {
        name: name.clone(),
        content,
        package_id: args.package_id,
        layout: config.layout.clone(),
        context: config.call_context(),
        max_piece_size: config.max_piece_size,
        max_payload_size: config.max_payload_size,
    };

    let orchestrator = PublishOrchestrator::prepare(request, client, tracker).await?;
    let bar = ProgressBar::new(orchestrator.piece_count() as u64);
    bar.set_style(
        ProgressStyle::with_template("Publishing site pieces {bar:40} {pos}/{len} [{elapsed}]")?
            .progress_chars("##-"),
    );
    bar.set_position(orchestrator.session().cursor() as u64);

    let progress = bar.clone();
    let mut orchestrator =
        orchestrator.on_progress(Box::new(move |cursor, _| progress.set_position(cursor as u64)));

    match orchestrator.run().await {
        Ok(report) => {
            bar.finish();
            println!(
                "✅ Site published: {} ({} pieces, {} submitted now)",
                report.target.identifier, report.pieces, report.submitted
            );
            Ok(())
        }
        Err(failure) => {
            bar.abandon();
            eprintln!(
                "⚠️  Progress saved in {}; rerun the same command to resume",
                config.state_file.display()
            );
            Err(failure.into())
        }
    }
}

pub async fn create_chat(args: CreateChatArgs, config: PublisherConfig) -> Result<()> {
    let tracker = ObjectTracker::open(&config.state_file)?;
    let client = SuiCliClient::new(config.client_config());
    let target = publishing::create_chat(
        &client,
        &tracker,
        &config.call_context(),
        &args.package_id,
        &args.name,
        &args.chat_name,
    )
    .await?;
    println!("✅ Chat ID: {}", target.identifier);
    Ok(())
}

pub async fn status(args: StatusArgs, config: PublisherConfig) -> Result<()> {
    let tracker = ObjectTracker::open(&config.state_file)?;
    let records = match args.name {
        Some(name) => vec![tracker
            .lookup(&name)
            .await
            .ok_or_else(|| anyhow!("No session recorded for '{}'", name))?],
        None => tracker.records().await,
    };

    if records.is_empty() {
        println!("No sessions recorded in {}", config.state_file.display());
    }
    for record in records {
        let pieces = record
            .piece_count
            .map(|n| n.to_string())
            .unwrap_or_else(|| "?".to_string());
        println!(
            "{:<20} {:<12} {}/{} pieces  target: {}",
            record.name,
            record.status,
            record.cursor,
            pieces,
            record.target_identifier.as_deref().unwrap_or("-")
        );
        if let Some(err) = &record.last_error {
            println!("{:<20} last error ({}): {}", "", err.kind, err.message);
        }
    }
    Ok(())
}

fn publish_name(file: &Path) -> Result<String> {
    file.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Cannot derive a publish name from {}", file.display()))
}
