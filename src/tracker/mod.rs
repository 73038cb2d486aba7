// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Object tracking for publish names
//!
//! Records which ledger object a publish name is bound to and how many pieces
//! have been committed to it, so an interrupted publish can continue without
//! resubmitting anything.
//!
//! ## Persistence
//! With [`ObjectTracker::open`] every mutation rewrites the JSON state file by
//! writing a temp file next to it and renaming it over the old one. The
//! in-memory map is only updated once the write succeeded.
//!
//! ## Concurrency
//! All operations go through one mutex, so a name cannot be bound twice by
//! concurrent sessions.

pub mod record;

pub use record::{SessionRecord, StateFile};

use crate::error::PublishError;
use crate::publish::session::{PublishTarget, SessionError, SessionStatus};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

type Records = BTreeMap<String, SessionRecord>;

pub struct ObjectTracker {
    records: Mutex<Records>,
    path: Option<PathBuf>,
}

impl ObjectTracker {
    /// Tracker that forgets everything when dropped
    pub fn in_memory() -> Self {
        Self {
            records: Mutex::new(BTreeMap::new()),
            path: None,
        }
    }

    /// Tracker backed by the state file at `path`; a missing file is empty state.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PublishError> {
        let path = path.into();
        let records = match std::fs::read(&path) {
            Ok(bytes) => {
                let state: StateFile = serde_json::from_slice(&bytes).map_err(|e| {
                    PublishError::Storage(format!("corrupt state file {}: {}", path.display(), e))
                })?;
                state.sessions
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(PublishError::Storage(format!(
                    "cannot read state file {}: {}",
                    path.display(),
                    e
                )))
            }
        };
        debug!("Loaded {} session records from {}", records.len(), path.display());
        Ok(Self {
            records: Mutex::new(records),
            path: Some(path),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Bind `name` to `target`. Binding the same identifier again is a no-op.
    ///
    /// A bound target implies piece 0 is committed, so the cursor becomes at least 1.
    pub async fn bind(&self, name: &str, target: &PublishTarget) -> Result<(), PublishError> {
        self.update(|records| {
            let record = records
                .entry(name.to_string())
                .or_insert_with(|| SessionRecord::new(name));
            match &record.target_identifier {
                Some(existing) if existing == &target.identifier => return Ok(()),
                Some(existing) => {
                    return Err(PublishError::conflict(
                        name,
                        format!(
                            "already bound to {}, cannot bind {}",
                            existing, target.identifier
                        ),
                    ))
                }
                None => {}
            }
            record.target_identifier = Some(target.identifier.clone());
            record.kind = Some(target.kind.clone());
            record.cursor = record.cursor.max(1);
            record.touch();
            Ok(())
        })
        .await?;
        info!("Bound '{}' to {} ({})", name, target.identifier, target.kind);
        Ok(())
    }

    /// Associate `name` with the content it publishes.
    ///
    /// Before a target is bound the previous association is simply replaced.
    /// Once bound, the cursor counts pieces of that exact chunking, so a
    /// different digest, piece count, piece size or package is a conflict.
    pub async fn record_content(
        &self,
        name: &str,
        digest: &str,
        piece_count: usize,
        max_piece_size: Option<usize>,
        package_id: &str,
    ) -> Result<(), PublishError> {
        self.update(|records| {
            let record = records
                .entry(name.to_string())
                .or_insert_with(|| SessionRecord::new(name));
            if let Some(target) = &record.target_identifier {
                if let Some(existing) = record.content_digest.as_deref() {
                    if existing != digest {
                        return Err(PublishError::conflict(
                            name,
                            format!(
                                "{} already holds content {}, got {}",
                                target, existing, digest
                            ),
                        ));
                    }
                }
                if let (Some(existing), Some(requested)) = (record.max_piece_size, max_piece_size)
                {
                    if existing != requested {
                        return Err(PublishError::conflict(
                            name,
                            format!(
                                "{} was chunked in {}-byte pieces, not {}",
                                target, existing, requested
                            ),
                        ));
                    }
                }
                if let Some(existing) = record.piece_count {
                    if existing != piece_count {
                        return Err(PublishError::conflict(
                            name,
                            format!(
                                "{} was published as {} pieces, not {}",
                                target, existing, piece_count
                            ),
                        ));
                    }
                }
                if let Some(existing) = record.package_id.as_deref() {
                    if existing != package_id {
                        return Err(PublishError::conflict(
                            name,
                            format!("{} lives in package {}, not {}", target, existing, package_id),
                        ));
                    }
                }
            }
            record.content_digest = Some(digest.to_string());
            record.piece_count = Some(piece_count);
            if max_piece_size.is_some() || record.target_identifier.is_none() {
                record.max_piece_size = max_piece_size;
            }
            record.package_id = Some(package_id.to_string());
            record.touch();
            Ok(())
        })
        .await
    }

    /// Record that `cursor` pieces of `name` are committed. Cursors never move back.
    pub async fn record_progress(&self, name: &str, cursor: usize) -> Result<(), PublishError> {
        self.update(|records| {
            let record = records.get_mut(name).ok_or_else(|| {
                PublishError::InvalidState(format!("no session recorded for '{}'", name))
            })?;
            if record.target_identifier.is_none() {
                return Err(PublishError::InvalidState(format!(
                    "'{}' has no target yet",
                    name
                )));
            }
            if cursor < record.cursor {
                return Err(PublishError::InvalidState(format!(
                    "cursor of '{}' cannot move back from {} to {}",
                    name, record.cursor, cursor
                )));
            }
            record.cursor = cursor;
            record.touch();
            Ok(())
        })
        .await
    }

    pub async fn record_status(
        &self,
        name: &str,
        status: SessionStatus,
        last_error: Option<SessionError>,
    ) -> Result<(), PublishError> {
        self.update(|records| {
            let record = records
                .entry(name.to_string())
                .or_insert_with(|| SessionRecord::new(name));
            record.status = status;
            record.last_error = last_error;
            record.touch();
            Ok(())
        })
        .await
    }

    pub async fn lookup(&self, name: &str) -> Option<SessionRecord> {
        self.records.lock().await.get(name).cloned()
    }

    pub async fn records(&self) -> Vec<SessionRecord> {
        self.records.lock().await.values().cloned().collect()
    }

    /// Drop the record for `name`, e.g. to publish it again from scratch.
    pub async fn forget(&self, name: &str) -> Result<Option<SessionRecord>, PublishError> {
        let mut removed = None;
        self.update(|records| {
            removed = records.remove(name);
            Ok(())
        })
        .await?;
        Ok(removed)
    }

    async fn update<F>(&self, f: F) -> Result<(), PublishError>
    where
        F: FnOnce(&mut Records) -> Result<(), PublishError>,
    {
        let mut records = self.records.lock().await;
        let mut next = records.clone();
        f(&mut next)?;
        if let Some(path) = &self.path {
            persist(path, &next)?;
        }
        *records = next;
        Ok(())
    }
}

fn persist(path: &Path, records: &Records) -> Result<(), PublishError> {
    let state = StateFile {
        sessions: records.clone(),
    };
    let bytes = serde_json::to_vec_pretty(&state)
        .map_err(|e| PublishError::Storage(format!("cannot encode state: {}", e)))?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let storage_err =
        |e: std::io::Error| PublishError::Storage(format!("cannot write {}: {}", path.display(), e));

    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(storage_err)?;
    tmp.write_all(&bytes).map_err(storage_err)?;
    tmp.as_file().sync_all().map_err(storage_err)?;
    tmp.persist(path).map_err(|e| storage_err(e.error))?;
    Ok(())
}
