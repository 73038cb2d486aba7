// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Which module, type and entry functions a target kind is published through.

use super::call::{CallArg, EntryFunction, MoveCall};
use super::types::TransactionReceipt;
use crate::error::PublishError;
use serde::{Deserialize, Serialize};

/// Contract layout for one target kind
///
/// `create` receives `[payload, fixed_args...]`; `append` receives
/// `[target, payload, fixed_args...]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractLayout {
    /// Tag recorded on the target, e.g. "site"
    pub kind: String,
    pub module: String,
    /// Struct name of the created object, e.g. "BlockSite"
    pub type_name: String,
    pub create: EntryFunction,
    pub append: EntryFunction,
    #[serde(default)]
    pub fixed_args: Vec<CallArg>,
}

impl ContractLayout {
    /// `blocksite::create_to_sender(payload, clock)` / `blocksite::add_piece(site, payload, clock)`
    pub fn blocksite() -> Self {
        Self {
            kind: "site".to_string(),
            module: "blocksite".to_string(),
            type_name: "BlockSite".to_string(),
            create: EntryFunction::new("create_to_sender", 2),
            append: EntryFunction::new("add_piece", 3),
            fixed_args: vec![CallArg::clock()],
        }
    }

    /// `<package_id>::<module>::<Kind>`
    pub fn type_tag(&self, package_id: &str) -> String {
        format!("{}::{}::{}", package_id, self.module, self.type_name)
    }

    pub fn create_call(&self, package_id: &str, payload: &[u8]) -> Result<MoveCall, PublishError> {
        let mut args = vec![CallArg::Bytes(payload.to_vec())];
        args.extend(self.fixed_args.iter().cloned());
        MoveCall::new(package_id, &self.module, &self.create, args)
    }

    pub fn append_call(
        &self,
        package_id: &str,
        target_id: &str,
        payload: &[u8],
    ) -> Result<MoveCall, PublishError> {
        let mut args = vec![
            CallArg::Object(target_id.to_string()),
            CallArg::Bytes(payload.to_vec()),
        ];
        args.extend(self.fixed_args.iter().cloned());
        MoveCall::new(package_id, &self.module, &self.append, args)
    }

    /// Id of the target created by a create call.
    pub fn created_target(
        &self,
        receipt: &TransactionReceipt,
        package_id: &str,
    ) -> Result<String, PublishError> {
        let type_tag = self.type_tag(package_id);
        receipt
            .find_object_of_type(&type_tag)
            .map(str::to_string)
            .ok_or(PublishError::ObjectNotFound {
                expected_type: type_tag,
            })
    }
}

impl Default for ContractLayout {
    fn default() -> Self {
        Self::blocksite()
    }
}
