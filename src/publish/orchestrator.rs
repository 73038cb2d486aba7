// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Publish Orchestrator
//!
//! Drives a chunked publish one transaction at a time:
//!
//! ```text
//! NotStarted --create(piece 0)--> Appending --append(piece k)--> ... --> Complete
//!      \                              \
//!       +--> Failed (cursor 0)         +--> Failed (target, cursor kept)
//! ```
//!
//! Each piece's call completes before the next one is submitted, because
//! every append mutates the same versioned object. Nothing is retried; a
//! failure stops the session at the current piece boundary and the tracker
//! keeps the last committed `{target, cursor}` for a later resume.
//!
//! ## Usage
//! ```ignore
//! let mut orchestrator = PublishOrchestrator::prepare(request, client, tracker).await?;
//! let report = orchestrator.run().await?;
//! ```

use crate::chunking::{self, Piece};
use crate::contracts::{ContractLayout, TransactionClient, WorkingContext};
use crate::error::{PublishError, PublishFailure};
use crate::publish::session::{PublishSession, PublishTarget, SessionError, SessionStatus};
use crate::tracker::ObjectTracker;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Everything needed to publish one piece of content under a name
#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub name: String,
    pub content: Vec<u8>,
    pub package_id: String,
    pub layout: ContractLayout,
    pub context: WorkingContext,
    pub max_piece_size: usize,
    /// Largest payload the ledger accepts in one transaction
    pub max_payload_size: usize,
}

/// Summary of a completed publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub name: String,
    pub target: PublishTarget,
    pub pieces: usize,
    pub bytes: usize,
    /// Pieces submitted by this invocation (less than `pieces` after a resume)
    pub submitted: usize,
}

/// Called after each committed piece with `(cursor, piece_count)`
pub type ProgressCallback = Box<dyn Fn(usize, usize) + Send + Sync>;

pub struct PublishOrchestrator {
    client: Arc<dyn TransactionClient>,
    tracker: Arc<ObjectTracker>,
    package_id: String,
    layout: ContractLayout,
    context: WorkingContext,
    pieces: Vec<Piece>,
    content_len: usize,
    session: PublishSession,
    submitted: usize,
    on_progress: Option<ProgressCallback>,
}

impl PublishOrchestrator {
    /// Chunk the content and pick up any progress the tracker holds for the name.
    pub async fn prepare(
        request: PublishRequest,
        client: Arc<dyn TransactionClient>,
        tracker: Arc<ObjectTracker>,
    ) -> Result<Self, PublishError> {
        let pieces = chunking::chunk(&request.content, request.max_piece_size)?;
        check_payload_limit(&pieces, request.max_payload_size)?;
        record_content(&tracker, &request, pieces.len()).await?;

        let session = match tracker.lookup(&request.name).await {
            Some(record) if record.target_identifier.is_some() => {
                info!(
                    "Resuming '{}' at piece {}/{} on {}",
                    request.name,
                    record.cursor,
                    pieces.len(),
                    record.target_identifier.as_deref().unwrap_or_default()
                );
                record.to_session()?
            }
            _ => PublishSession::new(request.name.clone()),
        };
        check_session(&session, &request, pieces.len())?;

        Ok(Self::with_session(pieces, session, request, client, tracker))
    }

    /// Use an explicitly seeded session instead of the tracker's record.
    ///
    /// The seed is validated before anything is written to the tracker.
    pub async fn prepare_with_session(
        request: PublishRequest,
        session: PublishSession,
        client: Arc<dyn TransactionClient>,
        tracker: Arc<ObjectTracker>,
    ) -> Result<Self, PublishError> {
        let pieces = chunking::chunk(&request.content, request.max_piece_size)?;
        check_payload_limit(&pieces, request.max_payload_size)?;
        check_session(&session, &request, pieces.len())?;

        record_content(&tracker, &request, pieces.len()).await?;
        if let Some(target) = session.target() {
            tracker.bind(session.name(), target).await?;
            tracker.record_progress(session.name(), session.cursor()).await?;
        }

        Ok(Self::with_session(pieces, session, request, client, tracker))
    }

    fn with_session(
        pieces: Vec<Piece>,
        session: PublishSession,
        request: PublishRequest,
        client: Arc<dyn TransactionClient>,
        tracker: Arc<ObjectTracker>,
    ) -> Self {
        Self {
            client,
            tracker,
            package_id: request.package_id,
            layout: request.layout,
            context: request.context,
            pieces,
            content_len: request.content.len(),
            session,
            submitted: 0,
            on_progress: None,
        }
    }

    pub fn on_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    pub fn session(&self) -> &PublishSession {
        &self.session
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    /// Pieces this session still has to submit
    pub fn remaining(&self) -> &[Piece] {
        chunking::remaining(&self.pieces, self.session.cursor())
    }

    /// Submit the next piece and return the resulting status.
    pub async fn advance(&mut self) -> Result<SessionStatus, PublishError> {
        match self.session.status() {
            SessionStatus::Complete => return Ok(SessionStatus::Complete),
            SessionStatus::Failed => {
                return Err(PublishError::InvalidState(format!(
                    "session '{}' has failed; resume it with a new session",
                    self.session.name()
                )))
            }
            _ => {}
        }

        if self.session.cursor() == self.pieces.len() && self.session.target().is_some() {
            self.finish().await?;
            return Ok(SessionStatus::Complete);
        }

        let result = if self.session.target().is_none() {
            self.create().await
        } else {
            self.append().await
        };

        match result {
            Ok(()) => Ok(self.session.status()),
            Err(err) => {
                self.fail(&err).await;
                Err(err)
            }
        }
    }

    /// Advance until complete or the first failure.
    pub async fn run(&mut self) -> Result<PublishReport, PublishFailure> {
        info!(
            "Publishing '{}': {} bytes in {} pieces, starting at piece {}",
            self.session.name(),
            self.content_len,
            self.pieces.len(),
            self.session.cursor()
        );

        loop {
            match self.advance().await {
                Ok(SessionStatus::Complete) => break,
                Ok(_) => continue,
                Err(source) => {
                    return Err(PublishFailure {
                        name: self.session.name().to_string(),
                        target: self.session.target_id().map(str::to_string),
                        cursor: self.session.cursor(),
                        source,
                    })
                }
            }
        }

        let target = self.session.target().cloned().ok_or_else(|| PublishFailure {
            name: self.session.name().to_string(),
            target: None,
            cursor: self.session.cursor(),
            source: PublishError::InvalidState("complete session has no target".to_string()),
        })?;

        Ok(PublishReport {
            name: self.session.name().to_string(),
            target,
            pieces: self.pieces.len(),
            bytes: self.content_len,
            submitted: self.submitted,
        })
    }

    async fn create(&mut self) -> Result<(), PublishError> {
        self.session.set_status(SessionStatus::Creating);
        self.tracker
            .record_status(self.session.name(), SessionStatus::Creating, None)
            .await?;

        let piece = &self.pieces[0];
        let call = self.layout.create_call(&self.package_id, &piece.bytes)?;
        debug!("Creating '{}' with piece 0 ({} bytes)", self.session.name(), piece.len());

        let receipt = self.client.execute(&call, &self.context).await?;
        self.submitted += 1;
        let identifier = self.layout.created_target(&receipt, &self.package_id)?;
        let target = PublishTarget::new(identifier, self.layout.kind.clone());

        // Piece 0 is committed from here on, even if tracking fails below.
        self.session.bind_target(target.clone())?;
        self.session.advance_cursor();
        info!(
            "Created {} {} for '{}'",
            target.kind,
            target.identifier,
            self.session.name()
        );

        self.tracker.bind(self.session.name(), &target).await?;
        self.committed().await
    }

    async fn append(&mut self) -> Result<(), PublishError> {
        let target_id = self
            .session
            .target_id()
            .ok_or_else(|| PublishError::InvalidState("append without target".to_string()))?
            .to_string();
        let cursor = self.session.cursor();
        let piece = &self.pieces[cursor];
        let call = self
            .layout
            .append_call(&self.package_id, &target_id, &piece.bytes)?;
        debug!(
            "Appending piece {}/{} ({} bytes) to {}",
            cursor,
            self.pieces.len(),
            piece.len(),
            target_id
        );

        let receipt = self.client.execute(&call, &self.context).await?;
        self.submitted += 1;
        let confirmed = receipt.first_object_id()?;
        if confirmed != target_id {
            debug!("Append of piece {} confirmed by {}", cursor, confirmed);
        }

        self.session.advance_cursor();
        self.committed().await
    }

    /// Persist the new cursor and move to the next state.
    async fn committed(&mut self) -> Result<(), PublishError> {
        let cursor = self.session.cursor();
        self.tracker
            .record_progress(self.session.name(), cursor)
            .await?;

        if let Some(callback) = &self.on_progress {
            callback(cursor, self.pieces.len());
        }

        if cursor == self.pieces.len() {
            self.finish().await
        } else {
            self.session.set_status(SessionStatus::Appending);
            self.tracker
                .record_status(self.session.name(), SessionStatus::Appending, None)
                .await
        }
    }

    async fn finish(&mut self) -> Result<(), PublishError> {
        self.session.set_status(SessionStatus::Complete);
        self.tracker
            .record_status(self.session.name(), SessionStatus::Complete, None)
            .await?;
        info!(
            "Published '{}' to {} ({} pieces)",
            self.session.name(),
            self.session.target_id().unwrap_or_default(),
            self.pieces.len()
        );
        Ok(())
    }

    async fn fail(&mut self, err: &PublishError) {
        self.session.fail(err);
        error!(
            "Publish of '{}' failed at piece {} (target {:?}): {}",
            self.session.name(),
            self.session.cursor(),
            self.session.target_id(),
            err
        );
        if let Err(track_err) = self
            .tracker
            .record_status(
                self.session.name(),
                SessionStatus::Failed,
                Some(SessionError::from(err)),
            )
            .await
        {
            warn!("Could not record failure of '{}': {}", self.session.name(), track_err);
        }
    }
}

async fn record_content(
    tracker: &ObjectTracker,
    request: &PublishRequest,
    piece_count: usize,
) -> Result<(), PublishError> {
    let digest = chunking::content_digest(&request.content);
    tracker
        .record_content(
            &request.name,
            &digest,
            piece_count,
            Some(request.max_piece_size),
            &request.package_id,
        )
        .await
}

fn check_session(
    session: &PublishSession,
    request: &PublishRequest,
    piece_count: usize,
) -> Result<(), PublishError> {
    if session.name() != request.name {
        return Err(PublishError::InvalidState(format!(
            "session '{}' used for request '{}'",
            session.name(),
            request.name
        )));
    }
    if session.cursor() > piece_count {
        return Err(PublishError::InvalidState(format!(
            "cursor {} is past the last of {} pieces",
            session.cursor(),
            piece_count
        )));
    }
    Ok(())
}

fn check_payload_limit(pieces: &[Piece], max_payload_size: usize) -> Result<(), PublishError> {
    match pieces.iter().find(|p| p.len() > max_payload_size) {
        Some(piece) => Err(PublishError::SizeLimit {
            index: piece.index,
            size: piece.len(),
            limit: max_payload_size,
        }),
        None => Ok(()),
    }
}
