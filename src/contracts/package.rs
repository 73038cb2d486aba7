// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use tracing::info;

use super::client::{TransactionClient, WorkingContext};
use crate::error::PublishError;

/// Publish the Move package in `ctx.directory` and return its package id.
pub async fn publish_package(
    client: &dyn TransactionClient,
    ctx: &WorkingContext,
) -> Result<String, PublishError> {
    let receipt = client.publish_package(ctx).await?;
    let package_id = receipt
        .published_package()
        .map(str::to_string)
        .ok_or_else(|| PublishError::ObjectNotFound {
            expected_type: "published package".to_string(),
        })?;
    info!("Published package {}", package_id);
    Ok(package_id)
}
