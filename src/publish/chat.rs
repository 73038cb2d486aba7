// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Chat creation on the `blockchat` contract.
//!
//! A chat is a single-transaction target: `create_chat(name)` creates a
//! `blockchat::Chat` object which the chat dApp then appends messages to.

use crate::chunking;
use crate::contracts::{CallArg, EntryFunction, MoveCall, TransactionClient, WorkingContext};
use crate::error::PublishError;
use crate::publish::session::{PublishTarget, SessionStatus};
use crate::tracker::ObjectTracker;
use tracing::info;

pub const CHAT_MODULE: &str = "blockchat";
pub const CHAT_TYPE: &str = "Chat";
pub const CHAT_KIND: &str = "chat";

/// Create a chat called `chat_name` and bind it to `name` in the tracker.
///
/// If `name` is already bound to a chat in `package_id`, that chat is returned
/// and nothing is submitted. Any other binding is a conflict.
pub async fn create_chat(
    client: &dyn TransactionClient,
    tracker: &ObjectTracker,
    ctx: &WorkingContext,
    package_id: &str,
    name: &str,
    chat_name: &str,
) -> Result<PublishTarget, PublishError> {
    if let Some(record) = tracker.lookup(name).await {
        if let Some(target) = record.target() {
            if target.kind != CHAT_KIND {
                return Err(PublishError::conflict(
                    name,
                    format!("bound to {} {}, not a chat", target.kind, target.identifier),
                ));
            }
            if record.package_id.as_deref() != Some(package_id) {
                return Err(PublishError::conflict(
                    name,
                    format!(
                        "chat {} lives in package {}, not {}",
                        target.identifier,
                        record.package_id.as_deref().unwrap_or("<unknown>"),
                        package_id
                    ),
                ));
            }
            info!("'{}' already bound to chat {}", name, target.identifier);
            return Ok(target);
        }
    }

    tracker
        .record_content(
            name,
            &chunking::content_digest(chat_name.as_bytes()),
            1,
            None,
            package_id,
        )
        .await?;

    let call = MoveCall::new(
        package_id,
        CHAT_MODULE,
        &EntryFunction::new("create_chat", 1),
        vec![CallArg::Str(chat_name.to_string())],
    )?;
    let receipt = client.execute(&call, ctx).await?;

    let type_tag = format!("{}::{}::{}", package_id, CHAT_MODULE, CHAT_TYPE);
    let identifier = receipt
        .find_object_of_type(&type_tag)
        .map(str::to_string)
        .ok_or(PublishError::ObjectNotFound {
            expected_type: type_tag,
        })?;

    let target = PublishTarget::new(identifier, CHAT_KIND);
    tracker.bind(name, &target).await?;
    tracker.record_progress(name, 1).await?;
    tracker
        .record_status(name, SessionStatus::Complete, None)
        .await?;
    info!("Created chat '{}' as {}", chat_name, target.identifier);
    Ok(target)
}
