// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod chunking;
pub mod cli;
pub mod config;
pub mod contracts;
pub mod error;
pub mod publish;
pub mod tracker;
pub mod version;

// Re-export main types
pub use chunking::{chunk, Piece};
pub use config::PublisherConfig;
pub use contracts::{
    CallArg, ContractLayout, MoveCall, SuiCliClient, TransactionClient, TransactionReceipt,
    WorkingContext,
};
pub use error::{ErrorKind, PublishError, PublishFailure};
pub use publish::{
    PublishOrchestrator, PublishReport, PublishRequest, PublishSession, PublishTarget,
    SessionStatus,
};
pub use tracker::{ObjectTracker, SessionRecord};
