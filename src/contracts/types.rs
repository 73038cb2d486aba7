// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Transaction receipts as printed by `sui client ... --json`.
//!
//! Only the parts the publisher relies on are modelled: the ordered
//! `objectChanges` list and the execution status under `effects.status`.

use crate::error::PublishError;
use serde::{Deserialize, Serialize};

/// One entry of `objectChanges`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectChange {
    /// "created", "mutated", "published", ...
    #[serde(rename = "type")]
    pub change_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,

    /// Only present on "published" changes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_id: Option<String>,
}

impl ObjectChange {
    pub fn created(object_id: impl Into<String>, object_type: impl Into<String>) -> Self {
        Self {
            change_type: "created".to_string(),
            object_id: Some(object_id.into()),
            object_type: Some(object_type.into()),
            package_id: None,
        }
    }

    pub fn mutated(object_id: impl Into<String>, object_type: impl Into<String>) -> Self {
        Self {
            change_type: "mutated".to_string(),
            object_id: Some(object_id.into()),
            object_type: Some(object_type.into()),
            package_id: None,
        }
    }

    pub fn published(package_id: impl Into<String>) -> Self {
        Self {
            change_type: "published".to_string(),
            object_id: None,
            object_type: None,
            package_id: Some(package_id.into()),
        }
    }

    /// True when `object_type` is exactly `type_tag` or `type_tag<...>`.
    ///
    /// A bare `starts_with` would let `::BlockSite` match `::BlockSiteCap`.
    pub fn has_type(&self, type_tag: &str) -> bool {
        match self.object_type.as_deref() {
            Some(object_type) => match object_type.strip_prefix(type_tag) {
                Some(rest) => rest.is_empty() || rest.starts_with('<'),
                None => false,
            },
            None => false,
        }
    }
}

/// Structured result of one ledger call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub digest: Option<String>,
    pub object_changes: Vec<ObjectChange>,
    /// `effects.status.status`, normally "success" or "failure"
    pub status: Option<String>,
    /// `effects.status.error` when the transaction aborted
    pub status_error: Option<String>,
}

impl TransactionReceipt {
    pub fn new(object_changes: Vec<ObjectChange>) -> Self {
        Self {
            digest: None,
            object_changes,
            status: Some("success".to_string()),
            status_error: None,
        }
    }

    /// Parse the CLI's JSON stdout.
    ///
    /// Anything that is not a JSON object with an `objectChanges` array is a
    /// [`PublishError::Parse`]; it is never treated as success.
    pub fn from_stdout(stdout: &[u8]) -> Result<Self, PublishError> {
        let value: serde_json::Value = serde_json::from_slice(stdout).map_err(|e| {
            PublishError::Parse(format!("transaction output is not valid JSON: {}", e))
        })?;

        let changes = value
            .get("objectChanges")
            .ok_or_else(|| PublishError::Parse("transaction output has no objectChanges".to_string()))?;

        let object_changes: Vec<ObjectChange> = serde_json::from_value(changes.clone())
            .map_err(|e| PublishError::Parse(format!("malformed objectChanges: {}", e)))?;

        let text = |pointer: &str| {
            value
                .pointer(pointer)
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };

        Ok(Self {
            digest: text("/digest"),
            object_changes,
            status: text("/effects/status/status"),
            status_error: text("/effects/status/error"),
        })
    }

    pub fn is_failure(&self) -> bool {
        self.status.as_deref() == Some("failure")
    }

    /// Turn an on-chain abort into a [`PublishError::Process`].
    pub fn ensure_success(self) -> Result<Self, PublishError> {
        if self.is_failure() {
            return Err(PublishError::Process(format!(
                "transaction {} aborted: {}",
                self.digest.as_deref().unwrap_or("<unknown digest>"),
                self.status_error.as_deref().unwrap_or("no error reported")
            )));
        }
        Ok(self)
    }

    /// Id of the first object whose type is `type_tag` (optionally generic).
    pub fn find_object_of_type(&self, type_tag: &str) -> Option<&str> {
        self.object_changes
            .iter()
            .filter(|change| change.has_type(type_tag))
            .find_map(|change| change.object_id.as_deref())
    }

    /// Id of the first object change, the append confirmation.
    pub fn first_object_id(&self) -> Result<&str, PublishError> {
        let first = self
            .object_changes
            .first()
            .ok_or_else(|| PublishError::Parse("objectChanges is empty".to_string()))?;
        first.object_id.as_deref().ok_or_else(|| {
            PublishError::Parse(format!(
                "first object change ({}) has no objectId",
                first.change_type
            ))
        })
    }

    pub fn published_package(&self) -> Option<&str> {
        self.object_changes
            .iter()
            .filter(|change| change.change_type == "published")
            .find_map(|change| change.package_id.as_deref())
    }
}
