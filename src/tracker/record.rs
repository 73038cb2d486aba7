// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Persisted form of a publish session
//!
//! Stored in the tracker's state file keyed by publish name:
//! `{"sessions": {"<name>": {name, target_identifier, cursor, status, ...}}}`

use crate::error::PublishError;
use crate::publish::session::{PublishSession, PublishTarget, SessionError, SessionStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub name: String,

    /// Absent until piece 0's transaction has succeeded
    pub target_identifier: Option<String>,

    pub kind: Option<String>,

    /// Number of pieces committed on the ledger
    pub cursor: usize,

    pub status: SessionStatus,

    #[serde(default)]
    pub piece_count: Option<usize>,

    /// Piece size the cursor counts in
    #[serde(default)]
    pub max_piece_size: Option<usize>,

    /// Hex SHA-256 of the published content
    #[serde(default)]
    pub content_digest: Option<String>,

    #[serde(default)]
    pub package_id: Option<String>,

    #[serde(default)]
    pub last_error: Option<SessionError>,

    pub updated_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target_identifier: None,
            kind: None,
            cursor: 0,
            status: SessionStatus::NotStarted,
            piece_count: None,
            max_piece_size: None,
            content_digest: None,
            package_id: None,
            last_error: None,
            updated_at: Utc::now(),
        }
    }

    pub fn target(&self) -> Option<PublishTarget> {
        self.target_identifier.as_ref().map(|id| {
            PublishTarget::new(id.clone(), self.kind.clone().unwrap_or_default())
        })
    }

    pub fn is_complete(&self) -> bool {
        self.status == SessionStatus::Complete
    }

    /// Session that continues from this record
    pub fn to_session(&self) -> Result<PublishSession, PublishError> {
        PublishSession::resume(self.name.clone(), self.target(), self.cursor)
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// On-disk layout of the tracker state file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateFile {
    #[serde(default)]
    pub sessions: BTreeMap<String, SessionRecord>,
}
