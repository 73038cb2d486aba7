// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Publish Error Types
//!
//! Every failure in a chunked publish maps to one [`PublishError`] variant.
//! None of them are retried internally; the orchestrator stops at the current
//! piece boundary and hands the error back together with the session's last
//! consistent `{target, cursor}` (see [`PublishFailure`]).
//!
//! ## Variants
//!
//! - **Process**: the ledger CLI could not be spawned, exited non-zero, timed out,
//!   or reported an aborted transaction
//! - **Parse**: stdout was not JSON or did not have the expected shape
//! - **ObjectNotFound**: the expected object was absent from `objectChanges`
//! - **Conflict**: a publish name is already bound to different state
//! - **SizeLimit**: a piece exceeds the ledger's maximum payload
//! - **InvalidCall**: a call failed identifier or arity validation before submission
//! - **InvalidState**: an operation is not allowed in the session's current state
//! - **InvalidConfig**: unusable configuration value
//! - **Storage**: the tracker state file could not be read or written

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PublishError {
    #[error("Process error: {0}")]
    Process(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Object not found: no object of type {expected_type} in receipt")]
    ObjectNotFound { expected_type: String },

    #[error("Conflict on '{name}': {reason}")]
    Conflict { name: String, reason: String },

    #[error("Piece {index} is {size} bytes, exceeding the ledger limit of {limit} bytes")]
    SizeLimit {
        index: usize,
        size: usize,
        limit: usize,
    },

    #[error("Invalid call: {0}")]
    InvalidCall(String),

    #[error("Invalid session state: {0}")]
    InvalidState(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("State storage error: {0}")]
    Storage(String),
}

/// Discriminant of [`PublishError`], persisted with failed sessions and
/// mapped to CLI exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Process,
    Parse,
    ObjectNotFound,
    Conflict,
    SizeLimit,
    InvalidCall,
    InvalidState,
    InvalidConfig,
    Storage,
}

impl PublishError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PublishError::Process(_) => ErrorKind::Process,
            PublishError::Parse(_) => ErrorKind::Parse,
            PublishError::ObjectNotFound { .. } => ErrorKind::ObjectNotFound,
            PublishError::Conflict { .. } => ErrorKind::Conflict,
            PublishError::SizeLimit { .. } => ErrorKind::SizeLimit,
            PublishError::InvalidCall(_) => ErrorKind::InvalidCall,
            PublishError::InvalidState(_) => ErrorKind::InvalidState,
            PublishError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            PublishError::Storage(_) => ErrorKind::Storage,
        }
    }

    pub fn conflict(name: impl Into<String>, reason: impl Into<String>) -> Self {
        PublishError::Conflict {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

impl ErrorKind {
    /// Process exit code used by `blocksite-cli` when a publish fails with this kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorKind::Process => 2,
            ErrorKind::Parse => 3,
            ErrorKind::ObjectNotFound => 4,
            ErrorKind::Conflict => 5,
            ErrorKind::SizeLimit => 6,
            ErrorKind::InvalidCall => 7,
            ErrorKind::InvalidState | ErrorKind::InvalidConfig | ErrorKind::Storage => 1,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Process => "process",
            ErrorKind::Parse => "parse",
            ErrorKind::ObjectNotFound => "object_not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::SizeLimit => "size_limit",
            ErrorKind::InvalidCall => "invalid_call",
            ErrorKind::InvalidState => "invalid_state",
            ErrorKind::InvalidConfig => "invalid_config",
            ErrorKind::Storage => "storage",
        };
        f.pad(name)
    }
}

impl From<serde_json::Error> for PublishError {
    fn from(err: serde_json::Error) -> Self {
        PublishError::Parse(err.to_string())
    }
}

/// A publish that stopped at a piece boundary.
///
/// `target` and `cursor` are the last values that were committed on the
/// ledger, so a new session seeded with them resumes without resubmitting
/// anything.
#[derive(Debug, Clone, thiserror::Error)]
#[error("publish of '{name}' failed at piece {cursor} (target: {}): {source}", .target.as_deref().unwrap_or("unbound"))]
pub struct PublishFailure {
    pub name: String,
    pub target: Option<String>,
    pub cursor: usize,
    #[source]
    pub source: PublishError,
}

impl PublishFailure {
    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }
}
