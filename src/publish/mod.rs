// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Chunked publishing
//!
//! Content larger than one transaction's payload is published as a target
//! object created from piece 0 plus one append per remaining piece.
//!
//! ## Flow
//! 1. Chunk content (optionally zlib-compressed first)
//! 2. Check every piece against the ledger payload limit
//! 3. Create the target with piece 0, bind it in the tracker
//! 4. Append pieces 1..n in order, recording the cursor after each
//!
//! ## Resumption
//! A failed publish leaves the tracker at the last committed piece. Running
//! the same name with the same content again skips the create call and
//! continues appending from there.

pub mod chat;
pub mod orchestrator;
pub mod session;

pub use chat::create_chat;
pub use orchestrator::{PublishOrchestrator, PublishReport, PublishRequest};
pub use session::{PublishSession, PublishTarget, SessionError, SessionStatus};
