// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use blocksite_publisher::contracts::{
    publish_package, ContractLayout, MockTransactionClient, TransactionClient, WorkingContext,
};
use blocksite_publisher::error::PublishError;

#[tokio::test]
async fn test_create_then_append_accumulates_bytes() -> Result<()> {
    let client = MockTransactionClient::new("BlockSite");
    let layout = ContractLayout::blocksite();
    let ctx = WorkingContext::new(1);

    let receipt = client
        .execute(&layout.create_call("0xb10c", b"abc")?, &ctx)
        .await?;
    let site = layout.created_target(&receipt, "0xb10c")?;

    let receipt = client
        .execute(&layout.append_call("0xb10c", &site, b"def")?, &ctx)
        .await?;
    assert_eq!(receipt.first_object_id()?, site);
    assert_eq!(client.object_bytes(&site).await.unwrap(), b"abcdef");
    assert_eq!(client.call_count().await, 2);
    Ok(())
}

#[tokio::test]
async fn test_injected_failure() -> Result<()> {
    let client = MockTransactionClient::new("BlockSite");
    client
        .fail_call(0, PublishError::Process("gas exhausted".to_string()))
        .await;
    let layout = ContractLayout::blocksite();
    let result = client
        .execute(&layout.create_call("0xb10c", b"abc")?, &WorkingContext::new(1))
        .await;
    assert!(matches!(result, Err(PublishError::Process(_))));
    assert_eq!(client.object_count().await, 0);
    assert_eq!(client.call_count().await, 1);
    Ok(())
}

#[tokio::test]
async fn test_publish_package_on_mock() -> Result<()> {
    let client = MockTransactionClient::new("BlockSite");
    let first = publish_package(&client, &WorkingContext::new(1)).await?;
    let second = publish_package(&client, &WorkingContext::new(1)).await?;
    assert_ne!(first, second);
    Ok(())
}
