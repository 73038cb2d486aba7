// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! In-memory ledger for tests.
//!
//! `MockTransactionClient` behaves like a tiny chain: a call whose first
//! argument names an existing object appends the call's bytes to it, any other
//! call creates a new object of the configured type. Failures can be injected
//! by call ordinal and whole receipts can be scripted.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::call::{CallArg, MoveCall};
use super::client::{TransactionClient, WorkingContext};
use super::types::{ObjectChange, TransactionReceipt};
use crate::error::PublishError;

const GAS_COIN_TYPE: &str = "0x2::coin::Coin<0x2::sui::SUI>";

/// A call as seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub package_id: String,
    pub module: String,
    pub function: String,
    pub args: Vec<CallArg>,
    pub directory: Option<std::path::PathBuf>,
}

impl RecordedCall {
    /// First `Bytes` argument, the piece payload
    pub fn payload(&self) -> Option<&[u8]> {
        self.args.iter().find_map(|arg| match arg {
            CallArg::Bytes(bytes) => Some(bytes.as_slice()),
            _ => None,
        })
    }

    pub fn target(&self) -> Option<&str> {
        match self.args.first() {
            Some(CallArg::Object(id)) => Some(id.as_str()),
            _ => None,
        }
    }
}

#[derive(Default)]
struct MockLedger {
    calls: Vec<RecordedCall>,
    scripted: VecDeque<Result<TransactionReceipt, PublishError>>,
    failures: HashMap<usize, PublishError>,
    objects: HashMap<String, Vec<u8>>,
    next_id: u64,
    publishes: usize,
}

impl MockLedger {
    fn fresh_id(&mut self) -> String {
        self.next_id += 1;
        format!("0x{:064x}", self.next_id)
    }
}

#[derive(Clone)]
pub struct MockTransactionClient {
    type_name: String,
    ledger: Arc<Mutex<MockLedger>>,
}

impl MockTransactionClient {
    /// Ledger whose create calls produce objects of struct `type_name`
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ledger: Arc::new(Mutex::new(MockLedger::default())),
        }
    }

    /// Fail the `ordinal`-th call (0-based, counting every call) with `error`.
    pub async fn fail_call(&self, ordinal: usize, error: PublishError) {
        self.ledger.lock().await.failures.insert(ordinal, error);
    }

    /// Return `receipt` from the next call instead of simulating it.
    pub async fn push_receipt(&self, receipt: Result<TransactionReceipt, PublishError>) {
        self.ledger.lock().await.scripted.push_back(receipt);
    }

    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.ledger.lock().await.calls.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.ledger.lock().await.calls.len()
    }

    /// Bytes stored on the simulated object `id`
    pub async fn object_bytes(&self, id: &str) -> Option<Vec<u8>> {
        self.ledger.lock().await.objects.get(id).cloned()
    }

    pub async fn object_count(&self) -> usize {
        self.ledger.lock().await.objects.len()
    }

    /// Pre-existing object, e.g. one created by an earlier run.
    pub async fn insert_object(&self, id: impl Into<String>, bytes: Vec<u8>) {
        self.ledger.lock().await.objects.insert(id.into(), bytes);
    }
}

#[async_trait]
impl TransactionClient for MockTransactionClient {
    async fn execute(
        &self,
        call: &MoveCall,
        ctx: &WorkingContext,
    ) -> Result<TransactionReceipt, PublishError> {
        let mut ledger = self.ledger.lock().await;
        let ordinal = ledger.calls.len();
        let recorded = RecordedCall {
            package_id: call.package_id().to_string(),
            module: call.module().to_string(),
            function: call.function().to_string(),
            args: call.args().to_vec(),
            directory: ctx.directory.clone(),
        };
        ledger.calls.push(recorded.clone());

        if let Some(error) = ledger.failures.remove(&ordinal) {
            return Err(error);
        }
        if let Some(scripted) = ledger.scripted.pop_front() {
            return scripted;
        }

        let payload = recorded.payload().unwrap_or_default().to_vec();
        let object_type = format!("{}::{}::{}", call.package_id(), call.module(), self.type_name);

        let existing = recorded
            .target()
            .filter(|id| ledger.objects.contains_key(*id))
            .map(str::to_string);

        match existing {
            Some(target) => {
                if let Some(stored) = ledger.objects.get_mut(&target) {
                    stored.extend_from_slice(&payload);
                }
                Ok(TransactionReceipt::new(vec![
                    ObjectChange::mutated(target, object_type),
                    ObjectChange::mutated("0x2a", GAS_COIN_TYPE),
                ]))
            }
            None => {
                let id = ledger.fresh_id();
                ledger.objects.insert(id.clone(), payload);
                Ok(TransactionReceipt::new(vec![
                    ObjectChange::mutated("0x2a", GAS_COIN_TYPE),
                    ObjectChange::created(id, object_type),
                ]))
            }
        }
    }

    async fn publish_package(
        &self,
        _ctx: &WorkingContext,
    ) -> Result<TransactionReceipt, PublishError> {
        let mut ledger = self.ledger.lock().await;
        if let Some(scripted) = ledger.scripted.pop_front() {
            return scripted;
        }
        ledger.publishes += 1;
        let package_id = format!("0x{:064x}", 0xface_0000u64 + ledger.publishes as u64);
        let cap = ledger.fresh_id();
        Ok(TransactionReceipt::new(vec![
            ObjectChange::created(cap, "0x2::package::UpgradeCap"),
            ObjectChange::published(package_id),
        ]))
    }
}
