// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Publisher configuration
//!
//! Resolved in three layers, later ones winning:
//! 1. Built-in defaults
//! 2. Optional TOML file (`blocksite.toml` or `--config`)
//! 3. `BLOCKSITE_*` environment variables (a `.env` file is honoured by the CLI)
//!
//! CLI flags are applied on top by the command handlers.

use crate::contracts::{ContractLayout, SuiClientConfig, WorkingContext};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "blocksite.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    pub sui_binary: String,
    pub gas_budget: u64,
    pub max_piece_size: usize,
    /// Ledger limit for a single pure argument
    pub max_payload_size: usize,
    pub call_timeout_secs: u64,
    /// Move package the blocksite contract lives in
    pub contract_dir: PathBuf,
    pub state_file: PathBuf,
    pub layout: ContractLayout,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            sui_binary: "sui".to_string(),
            gas_budget: 500_000_000,
            max_piece_size: 15_000,
            max_payload_size: 16_384,
            call_timeout_secs: 120,
            contract_dir: PathBuf::from("move/blocksite"),
            state_file: PathBuf::from(".blocksite-state.json"),
            layout: ContractLayout::blocksite(),
        }
    }
}

impl PublisherConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults, then `path` (or `blocksite.toml` if present), then environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `BLOCKSITE_*` variables as returned by `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("BLOCKSITE_SUI_BINARY") {
            self.sui_binary = val;
        }
        if let Some(val) = lookup("BLOCKSITE_GAS_BUDGET") {
            self.gas_budget = parse_env("BLOCKSITE_GAS_BUDGET", &val)?;
        }
        if let Some(val) = lookup("BLOCKSITE_PIECE_SIZE") {
            self.max_piece_size = parse_env("BLOCKSITE_PIECE_SIZE", &val)?;
        }
        if let Some(val) = lookup("BLOCKSITE_MAX_PAYLOAD") {
            self.max_payload_size = parse_env("BLOCKSITE_MAX_PAYLOAD", &val)?;
        }
        if let Some(val) = lookup("BLOCKSITE_CALL_TIMEOUT") {
            self.call_timeout_secs = parse_env("BLOCKSITE_CALL_TIMEOUT", &val)?;
        }
        if let Some(val) = lookup("BLOCKSITE_CONTRACT_DIR") {
            self.contract_dir = PathBuf::from(val);
        }
        if let Some(val) = lookup("BLOCKSITE_STATE_FILE") {
            self.state_file = PathBuf::from(val);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_piece_size == 0 {
            return Err(anyhow!("max_piece_size must be greater than zero"));
        }
        if self.gas_budget == 0 {
            return Err(anyhow!("gas_budget must be greater than zero"));
        }
        if self.call_timeout_secs == 0 {
            return Err(anyhow!("call_timeout_secs must be greater than zero"));
        }
        Ok(())
    }

    pub fn client_config(&self) -> SuiClientConfig {
        SuiClientConfig {
            binary: self.sui_binary.clone(),
            timeout: Duration::from_secs(self.call_timeout_secs),
        }
    }

    /// Context for calls into an already published package
    pub fn call_context(&self) -> WorkingContext {
        WorkingContext::new(self.gas_budget)
    }

    /// Context for publishing the package in `contract_dir`
    pub fn publish_context(&self) -> WorkingContext {
        WorkingContext::new(self.gas_budget).in_directory(&self.contract_dir)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, val: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    val.trim()
        .parse()
        .map_err(|e| anyhow!("Invalid value '{}' for {}: {}", val, key, e))
}
