// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use super::call::MoveCall;
use super::types::TransactionReceipt;
use crate::error::PublishError;

/// Addressing for one external call.
///
/// Passed explicitly to every call instead of changing the process's current
/// directory, so sessions against different contract directories can run side
/// by side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingContext {
    /// Directory the CLI runs in (the Move package for `publish`)
    pub directory: Option<PathBuf>,
    pub gas_budget: u64,
    /// Extra environment for the child process
    pub environment: Vec<(String, String)>,
}

impl WorkingContext {
    pub fn new(gas_budget: u64) -> Self {
        Self {
            directory: None,
            gas_budget,
            environment: Vec::new(),
        }
    }

    pub fn in_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.push((key.into(), value.into()));
        self
    }
}

/// Submits one state-changing call to the ledger and returns its receipt.
///
/// Implementations must not retry or cache: each `execute` is exactly one
/// external call.
#[async_trait]
pub trait TransactionClient: Send + Sync {
    async fn execute(
        &self,
        call: &MoveCall,
        ctx: &WorkingContext,
    ) -> Result<TransactionReceipt, PublishError>;

    /// Publish the Move package found in `ctx.directory`.
    async fn publish_package(&self, ctx: &WorkingContext)
        -> Result<TransactionReceipt, PublishError>;
}

#[derive(Debug, Clone)]
pub struct SuiClientConfig {
    pub binary: String,
    pub timeout: Duration,
}

impl Default for SuiClientConfig {
    fn default() -> Self {
        Self {
            binary: "sui".to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// [`TransactionClient`] backed by the `sui` command line client
pub struct SuiCliClient {
    config: SuiClientConfig,
}

impl SuiCliClient {
    pub fn new(config: SuiClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SuiClientConfig {
        &self.config
    }

    /// Arguments for `sui client call`, excluding the binary
    pub fn call_args(call: &MoveCall, ctx: &WorkingContext) -> Vec<String> {
        let mut args = vec![
            "client".to_string(),
            "call".to_string(),
            "--function".to_string(),
            call.function().to_string(),
            "--module".to_string(),
            call.module().to_string(),
            "--package".to_string(),
            call.package_id().to_string(),
            "--gas-budget".to_string(),
            ctx.gas_budget.to_string(),
            "--json".to_string(),
        ];
        if !call.args().is_empty() {
            args.push("--args".to_string());
            args.extend(call.args().iter().map(|arg| arg.to_cli_arg()));
        }
        args
    }

    /// Arguments for `sui client publish`, excluding the binary
    pub fn publish_args(ctx: &WorkingContext) -> Vec<String> {
        vec![
            "client".to_string(),
            "publish".to_string(),
            "--json".to_string(),
            "--skip-dependency-verification".to_string(),
            "--gas-budget".to_string(),
            ctx.gas_budget.to_string(),
        ]
    }

    async fn run(&self, args: Vec<String>, ctx: &WorkingContext) -> Result<Vec<u8>, PublishError> {
        let mut command = Command::new(&self.config.binary);
        command
            .args(&args)
            .envs(ctx.environment.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &ctx.directory {
            command.current_dir(dir);
        }

        let output = tokio::time::timeout(self.config.timeout, command.output())
            .await
            .map_err(|_| {
                PublishError::Process(format!(
                    "{} {} timed out after {:?}",
                    self.config.binary,
                    args.get(1).map(String::as_str).unwrap_or(""),
                    self.config.timeout
                ))
            })?
            .map_err(|e| {
                PublishError::Process(format!("failed to run {}: {}", self.config.binary, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(
                "{} exited with {}: {}",
                self.config.binary,
                output.status,
                stderr.trim()
            );
            return Err(PublishError::Process(format!(
                "{} exited with {}: {}",
                self.config.binary,
                output.status,
                stderr.trim()
            )));
        }

        Ok(output.stdout)
    }
}

impl Default for SuiCliClient {
    fn default() -> Self {
        Self::new(SuiClientConfig::default())
    }
}

#[async_trait]
impl TransactionClient for SuiCliClient {
    async fn execute(
        &self,
        call: &MoveCall,
        ctx: &WorkingContext,
    ) -> Result<TransactionReceipt, PublishError> {
        debug!(
            "Calling {} with {} payload bytes (gas budget {})",
            call,
            call.payload_len(),
            ctx.gas_budget
        );
        let stdout = self.run(Self::call_args(call, ctx), ctx).await?;
        TransactionReceipt::from_stdout(&stdout)?.ensure_success()
    }

    async fn publish_package(
        &self,
        ctx: &WorkingContext,
    ) -> Result<TransactionReceipt, PublishError> {
        debug!("Publishing package in {:?}", ctx.directory);
        let stdout = self.run(Self::publish_args(ctx), ctx).await?;
        TransactionReceipt::from_stdout(&stdout)?.ensure_success()
    }
}
