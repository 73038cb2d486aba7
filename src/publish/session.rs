// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Publish session state
//!
//! A session tracks how far a chunked publish has progressed on the ledger.
//! `cursor` is the index of the next piece to submit and only ever advances;
//! `target` is bound exactly once, when piece 0's transaction succeeds.

use crate::error::{ErrorKind, PublishError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Object created by piece 0 and referenced by every append
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishTarget {
    pub identifier: String,
    /// "site", "chat", ...
    pub kind: String,
}

impl PublishTarget {
    pub fn new(identifier: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            kind: kind.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    NotStarted,
    Creating,
    Appending,
    Complete,
    Failed,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Complete | SessionStatus::Failed)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionStatus::NotStarted => "not_started",
            SessionStatus::Creating => "creating",
            SessionStatus::Appending => "appending",
            SessionStatus::Complete => "complete",
            SessionStatus::Failed => "failed",
        };
        f.pad(s)
    }
}

/// Error recorded on a failed session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&PublishError> for SessionError {
    fn from(err: &PublishError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishSession {
    name: String,
    target: Option<PublishTarget>,
    cursor: usize,
    status: SessionStatus,
    last_error: Option<SessionError>,
}

impl PublishSession {
    /// Fresh session: nothing submitted, target unbound
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: None,
            cursor: 0,
            status: SessionStatus::NotStarted,
            last_error: None,
        }
    }

    /// Session seeded from persisted state.
    ///
    /// With a target it continues in `Appending`; without one it must start
    /// over at cursor 0, since nothing can have been appended.
    pub fn resume(
        name: impl Into<String>,
        target: Option<PublishTarget>,
        cursor: usize,
    ) -> Result<Self, PublishError> {
        let name = name.into();
        match target {
            Some(target) if cursor >= 1 => Ok(Self {
                name,
                target: Some(target),
                cursor,
                status: SessionStatus::Appending,
                last_error: None,
            }),
            Some(_) => Err(PublishError::InvalidState(format!(
                "session '{}' has a target but cursor 0; piece 0 is committed by the create call",
                name
            ))),
            None if cursor == 0 => Ok(Self::new(name)),
            None => Err(PublishError::InvalidState(format!(
                "session '{}' has cursor {} but no target",
                name, cursor
            ))),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> Option<&PublishTarget> {
        self.target.as_ref()
    }

    pub fn target_id(&self) -> Option<&str> {
        self.target.as_ref().map(|t| t.identifier.as_str())
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn last_error(&self) -> Option<&SessionError> {
        self.last_error.as_ref()
    }

    pub(crate) fn set_status(&mut self, status: SessionStatus) {
        self.status = status;
    }

    /// Bind the target created by piece 0. Rebinding is refused.
    pub(crate) fn bind_target(&mut self, target: PublishTarget) -> Result<(), PublishError> {
        if let Some(existing) = &self.target {
            return Err(PublishError::conflict(
                &self.name,
                format!(
                    "session already bound to {}, refusing {}",
                    existing.identifier, target.identifier
                ),
            ));
        }
        self.target = Some(target);
        Ok(())
    }

    /// Mark one more piece committed
    pub(crate) fn advance_cursor(&mut self) {
        self.cursor += 1;
    }

    pub(crate) fn fail(&mut self, err: &PublishError) {
        self.status = SessionStatus::Failed;
        self.last_error = Some(SessionError::from(err));
    }
}
