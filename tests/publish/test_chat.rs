// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use blocksite_publisher::contracts::{CallArg, MockTransactionClient, WorkingContext};
use blocksite_publisher::error::ErrorKind;
use blocksite_publisher::publish::{create_chat, PublishTarget, SessionStatus};
use blocksite_publisher::tracker::ObjectTracker;

#[tokio::test]
async fn test_create_chat_binds_name() -> Result<()> {
    let client = MockTransactionClient::new("Chat");
    let tracker = ObjectTracker::in_memory();
    let ctx = WorkingContext::new(500_000_000);

    let chat = create_chat(&client, &tracker, &ctx, "0xc4a7", "blockchat", "Demo Chat!").await?;
    assert_eq!(chat.kind, "chat");

    let calls = client.calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].module, "blockchat");
    assert_eq!(calls[0].function, "create_chat");
    assert_eq!(calls[0].args, vec![CallArg::Str("Demo Chat!".to_string())]);

    let record = tracker.lookup("blockchat").await.unwrap();
    assert_eq!(record.status, SessionStatus::Complete);
    assert_eq!(record.target_identifier, Some(chat.identifier));
    Ok(())
}

#[tokio::test]
async fn test_existing_chat_is_reused() -> Result<()> {
    let client = MockTransactionClient::new("Chat");
    let tracker = ObjectTracker::in_memory();
    let ctx = WorkingContext::new(500_000_000);

    let first = create_chat(&client, &tracker, &ctx, "0xc4a7", "blockchat", "Demo Chat!").await?;
    let second = create_chat(&client, &tracker, &ctx, "0xc4a7", "blockchat", "Demo Chat!").await?;
    assert_eq!(first, second);
    assert_eq!(client.call_count().await, 1);
    Ok(())
}

#[tokio::test]
async fn test_chat_type_mismatch() -> Result<()> {
    // Ledger creates BlockSite objects, not chats
    let client = MockTransactionClient::new("BlockSite");
    let tracker = ObjectTracker::in_memory();
    let ctx = WorkingContext::new(500_000_000);

    let err = create_chat(&client, &tracker, &ctx, "0xc4a7", "blockchat", "Demo Chat!")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("0xc4a7::blockchat::Chat"));
    assert!(tracker
        .lookup("blockchat")
        .await
        .map_or(true, |record| record.target_identifier.is_none()));
    Ok(())
}

#[tokio::test]
async fn test_name_bound_to_site_is_not_a_chat() -> Result<()> {
    let client = MockTransactionClient::new("Chat");
    let tracker = ObjectTracker::in_memory();
    let ctx = WorkingContext::new(500_000_000);
    tracker
        .record_content("landing", "ab12", 1, Some(15_000), "0xc4a7")
        .await?;
    tracker
        .bind("landing", &PublishTarget::new("0x51", "site"))
        .await?;

    let err = create_chat(&client, &tracker, &ctx, "0xc4a7", "landing", "Demo Chat!")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(client.call_count().await, 0);
    Ok(())
}

#[tokio::test]
async fn test_chat_in_other_package_conflicts() -> Result<()> {
    let client = MockTransactionClient::new("Chat");
    let tracker = ObjectTracker::in_memory();
    let ctx = WorkingContext::new(500_000_000);

    create_chat(&client, &tracker, &ctx, "0xc4a7", "blockchat", "Demo Chat!").await?;
    let err = create_chat(&client, &tracker, &ctx, "0xd00d", "blockchat", "Demo Chat!")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(client.call_count().await, 1);
    Ok(())
}
