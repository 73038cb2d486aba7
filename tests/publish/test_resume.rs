// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Resumption Tests
//!
//! A publish that fails mid-way must continue from its last committed piece
//! without resubmitting anything already on the ledger.

use anyhow::Result;
use blocksite_publisher::contracts::{ContractLayout, MockTransactionClient, WorkingContext};
use blocksite_publisher::error::{ErrorKind, PublishError};
use blocksite_publisher::publish::{
    PublishOrchestrator, PublishRequest, PublishSession, PublishTarget, SessionStatus,
};
use blocksite_publisher::tracker::ObjectTracker;
use std::sync::Arc;
use tempfile::TempDir;

const PACKAGE: &str = "0xb10c";

fn request(name: &str, content: Vec<u8>) -> PublishRequest {
    sized_request(name, content, 10_000)
}

fn sized_request(name: &str, content: Vec<u8>, max_piece_size: usize) -> PublishRequest {
    PublishRequest {
        name: name.to_string(),
        content,
        package_id: PACKAGE.to_string(),
        layout: ContractLayout::blocksite(),
        context: WorkingContext::new(500_000_000),
        max_piece_size,
        max_payload_size: 16_384,
    }
}

fn site_content() -> Vec<u8> {
    (0..25_000u32).map(|i| (i * 7 % 256) as u8).collect()
}

/// Runs a publish whose third call (piece 2) fails.
async fn fail_at_piece_two(
    client: &Arc<MockTransactionClient>,
    tracker: &Arc<ObjectTracker>,
    content: &[u8],
) -> Result<String> {
    client
        .fail_call(2, PublishError::Process("gas exhausted".to_string()))
        .await;

    let mut orchestrator = PublishOrchestrator::prepare(
        request("landing", content.to_vec()),
        client.clone(),
        tracker.clone(),
    )
    .await?;
    let failure = orchestrator.run().await.unwrap_err();

    assert_eq!(failure.kind(), ErrorKind::Process);
    assert_eq!(failure.cursor, 2);
    assert_eq!(orchestrator.session().status(), SessionStatus::Failed);
    Ok(failure.target.expect("target bound by piece 0"))
}

#[tokio::test]
async fn test_failed_append_keeps_target_and_cursor() -> Result<()> {
    let client = Arc::new(MockTransactionClient::new("BlockSite"));
    let tracker = Arc::new(ObjectTracker::in_memory());
    let content = site_content();

    let site = fail_at_piece_two(&client, &tracker, &content).await?;

    let record = tracker.lookup("landing").await.unwrap();
    assert_eq!(record.target_identifier.as_deref(), Some(site.as_str()));
    assert_eq!(record.cursor, 2);
    assert_eq!(record.status, SessionStatus::Failed);
    assert_eq!(record.last_error.unwrap().kind, ErrorKind::Process);

    // Only the first two pieces reached the ledger
    assert_eq!(client.object_bytes(&site).await.unwrap(), &content[..20_000]);
    Ok(())
}

#[tokio::test]
async fn test_resume_from_explicit_session() -> Result<()> {
    let client = Arc::new(MockTransactionClient::new("BlockSite"));
    let content = site_content();
    let site = {
        let tracker = Arc::new(ObjectTracker::in_memory());
        fail_at_piece_two(&client, &tracker, &content).await?
    };

    // Fresh tracker: progress comes only from the seeded session
    let tracker = Arc::new(ObjectTracker::in_memory());
    let session =
        PublishSession::resume("landing", Some(PublishTarget::new(site.clone(), "site")), 2)?;
    let mut orchestrator = PublishOrchestrator::prepare_with_session(
        request("landing", content.clone()),
        session,
        client.clone(),
        tracker.clone(),
    )
    .await?;
    assert_eq!(orchestrator.remaining().len(), 1);

    let report = orchestrator.run().await?;
    assert_eq!(report.submitted, 1);
    assert_eq!(report.target.identifier, site);

    let calls = client.calls().await;
    assert_eq!(calls.len(), 4);
    assert_eq!(calls[3].function, "add_piece");
    assert_eq!(calls[3].target(), Some(site.as_str()));
    assert_eq!(calls[3].payload().unwrap(), &content[20_000..]);
    assert_eq!(client.object_bytes(&site).await.unwrap(), content);
    assert_eq!(tracker.lookup("landing").await.unwrap().cursor, 3);
    Ok(())
}

#[tokio::test]
async fn test_resume_from_tracker() -> Result<()> {
    let client = Arc::new(MockTransactionClient::new("BlockSite"));
    let tracker = Arc::new(ObjectTracker::in_memory());
    let content = site_content();
    let site = fail_at_piece_two(&client, &tracker, &content).await?;

    let mut orchestrator = PublishOrchestrator::prepare(
        request("landing", content.clone()),
        client.clone(),
        tracker.clone(),
    )
    .await?;
    assert_eq!(orchestrator.session().status(), SessionStatus::Appending);
    assert_eq!(orchestrator.session().cursor(), 2);

    let report = orchestrator.run().await?;
    assert_eq!(report.submitted, 1);
    assert_eq!(client.call_count().await, 4);
    assert_eq!(client.object_count().await, 1);
    assert_eq!(client.object_bytes(&site).await.unwrap(), content);

    let record = tracker.lookup("landing").await.unwrap();
    assert_eq!(record.status, SessionStatus::Complete);
    assert!(record.last_error.is_none());
    Ok(())
}

#[tokio::test]
async fn test_resume_survives_restart() -> Result<()> {
    let dir = TempDir::new()?;
    let state = dir.path().join("state.json");
    let client = Arc::new(MockTransactionClient::new("BlockSite"));
    let content = site_content();

    let site = {
        let tracker = Arc::new(ObjectTracker::open(&state)?);
        fail_at_piece_two(&client, &tracker, &content).await?
    };

    let tracker = Arc::new(ObjectTracker::open(&state)?);
    let mut orchestrator = PublishOrchestrator::prepare(
        request("landing", content.clone()),
        client.clone(),
        tracker,
    )
    .await?;
    orchestrator.run().await?;

    assert_eq!(client.call_count().await, 4);
    assert_eq!(client.object_bytes(&site).await.unwrap(), content);
    Ok(())
}

#[tokio::test]
async fn test_completed_publish_is_not_resubmitted() -> Result<()> {
    let client = Arc::new(MockTransactionClient::new("BlockSite"));
    let tracker = Arc::new(ObjectTracker::in_memory());
    let content = site_content();

    PublishOrchestrator::prepare(request("landing", content.clone()), client.clone(), tracker.clone())
        .await?
        .run()
        .await?;
    assert_eq!(client.call_count().await, 3);

    let report = PublishOrchestrator::prepare(request("landing", content), client.clone(), tracker)
        .await?
        .run()
        .await?;
    assert_eq!(report.submitted, 0);
    assert_eq!(report.pieces, 3);
    assert_eq!(client.call_count().await, 3);
    Ok(())
}

#[tokio::test]
async fn test_different_content_under_same_name_conflicts() -> Result<()> {
    let client = Arc::new(MockTransactionClient::new("BlockSite"));
    let tracker = Arc::new(ObjectTracker::in_memory());
    fail_at_piece_two(&client, &tracker, &site_content()).await?;

    let err = PublishOrchestrator::prepare(
        request("landing", b"something else".to_vec()),
        client.clone(),
        tracker.clone(),
    )
    .await
    .err()
    .unwrap();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(client.call_count().await, 3);

    // Forgetting the name allows a fresh publish
    tracker.forget("landing").await?;
    PublishOrchestrator::prepare(
        request("landing", b"something else".to_vec()),
        client.clone(),
        tracker,
    )
    .await?
    .run()
    .await?;
    assert_eq!(client.object_count().await, 2);
    Ok(())
}

#[tokio::test]
async fn test_failed_create_restarts_from_piece_zero() -> Result<()> {
    let client = Arc::new(MockTransactionClient::new("BlockSite"));
    client
        .fail_call(0, PublishError::Process("timed out".to_string()))
        .await;
    let tracker = Arc::new(ObjectTracker::in_memory());
    let content = site_content();

    let failure = PublishOrchestrator::prepare(
        request("landing", content.clone()),
        client.clone(),
        tracker.clone(),
    )
    .await?
    .run()
    .await
    .unwrap_err();
    assert_eq!(failure.cursor, 0);
    assert!(failure.target.is_none());

    let mut orchestrator =
        PublishOrchestrator::prepare(request("landing", content.clone()), client.clone(), tracker)
            .await?;
    assert_eq!(orchestrator.session().status(), SessionStatus::NotStarted);
    let report = orchestrator.run().await?;

    let calls = client.calls().await;
    assert_eq!(calls.len(), 4);
    assert_eq!(calls[1].function, "create_to_sender");
    assert_eq!(client.object_bytes(&report.target.identifier).await.unwrap(), content);
    Ok(())
}

#[tokio::test]
async fn test_resume_with_different_piece_size_conflicts() -> Result<()> {
    let client = Arc::new(MockTransactionClient::new("BlockSite"));
    let tracker = Arc::new(ObjectTracker::in_memory());
    let content = site_content();
    let site = fail_at_piece_two(&client, &tracker, &content).await?;

    // 15,000 gives two pieces and would skip bytes; 5,000 gives five and
    // would append bytes 10,000..15,000 twice.
    for piece_size in [15_000, 5_000] {
        let err = PublishOrchestrator::prepare(
            sized_request("landing", content.clone(), piece_size),
            client.clone(),
            tracker.clone(),
        )
        .await
        .err()
        .unwrap();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }
    assert_eq!(client.call_count().await, 3);

    let record = tracker.lookup("landing").await.unwrap();
    assert_eq!(record.max_piece_size, Some(10_000));
    assert_eq!(record.cursor, 2);

    // The original piece size still resumes to the exact content
    PublishOrchestrator::prepare(request("landing", content.clone()), client.clone(), tracker)
        .await?
        .run()
        .await?;
    assert_eq!(client.object_bytes(&site).await.unwrap(), content);
    Ok(())
}

#[tokio::test]
async fn test_unbound_name_accepts_new_content() -> Result<()> {
    let client = Arc::new(MockTransactionClient::new("BlockSite"));
    client
        .fail_call(0, PublishError::Process("timed out".to_string()))
        .await;
    let tracker = Arc::new(ObjectTracker::in_memory());

    let failure = PublishOrchestrator::prepare(
        request("landing", site_content()),
        client.clone(),
        tracker.clone(),
    )
    .await?
    .run()
    .await
    .unwrap_err();
    assert!(failure.target.is_none());

    // Nothing reached the ledger, so a corrected file publishes without --restart
    let corrected: Vec<u8> = b"<html>fixed</html>".repeat(1_000);
    let report = PublishOrchestrator::prepare(
        sized_request("landing", corrected.clone(), 15_000),
        client.clone(),
        tracker.clone(),
    )
    .await?
    .run()
    .await?;

    assert_eq!(client.object_bytes(&report.target.identifier).await.unwrap(), corrected);
    let record = tracker.lookup("landing").await.unwrap();
    assert_eq!(record.status, SessionStatus::Complete);
    assert_eq!(record.max_piece_size, Some(15_000));
    Ok(())
}

#[tokio::test]
async fn test_invalid_seed_leaves_tracker_untouched() -> Result<()> {
    let client = Arc::new(MockTransactionClient::new("BlockSite"));
    let tracker = Arc::new(ObjectTracker::in_memory());
    let content = site_content();

    let session =
        PublishSession::resume("landing", Some(PublishTarget::new("0x51", "site")), 7)?;
    let err = PublishOrchestrator::prepare_with_session(
        request("landing", content.clone()),
        session,
        client.clone(),
        tracker.clone(),
    )
    .await
    .err()
    .unwrap();
    assert!(matches!(err, PublishError::InvalidState(_)));

    let misnamed = PublishSession::resume("other", Some(PublishTarget::new("0x51", "site")), 1)?;
    let err = PublishOrchestrator::prepare_with_session(
        request("landing", content.clone()),
        misnamed,
        client.clone(),
        tracker.clone(),
    )
    .await
    .err()
    .unwrap();
    assert!(matches!(err, PublishError::InvalidState(_)));
    assert!(tracker.lookup("landing").await.is_none());
    assert!(tracker.lookup("other").await.is_none());

    // A plain publish of the name is still possible
    let report = PublishOrchestrator::prepare(request("landing", content.clone()), client.clone(), tracker)
        .await?
        .run()
        .await?;
    assert_eq!(report.submitted, 3);
    assert_eq!(client.object_bytes(&report.target.identifier).await.unwrap(), content);
    Ok(())
}
