// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Structured Move calls.
//!
//! A [`MoveCall`] is validated when it is built: identifiers must be valid
//! Move identifiers and the argument list must match the entry function's
//! declared arity. Nothing reaches the CLI as an interpolated string.

use crate::error::PublishError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Well-known shared `Clock` object
pub const CLOCK_OBJECT_ID: &str = "0x6";

/// A positional argument to an entry function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CallArg {
    /// `vector<u8>` payload
    Bytes(Vec<u8>),
    /// Object id (owned or shared)
    Object(String),
    Str(String),
    U64(u64),
}

impl CallArg {
    pub fn clock() -> Self {
        CallArg::Object(CLOCK_OBJECT_ID.to_string())
    }

    /// Render as a single `--args` value for `sui client call`.
    pub fn to_cli_arg(&self) -> String {
        match self {
            CallArg::Bytes(bytes) => {
                let items: Vec<String> = bytes.iter().map(|b| b.to_string()).collect();
                format!("[{}]", items.join(","))
            }
            CallArg::Object(id) => id.clone(),
            CallArg::Str(s) => s.clone(),
            CallArg::U64(n) => n.to_string(),
        }
    }

    pub fn payload_len(&self) -> usize {
        match self {
            CallArg::Bytes(bytes) => bytes.len(),
            CallArg::Str(s) => s.len(),
            CallArg::Object(_) | CallArg::U64(_) => 0,
        }
    }
}

/// Name and arity of a contract entry function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFunction {
    pub name: String,
    pub arity: usize,
}

impl EntryFunction {
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
        }
    }
}

/// A validated call to `package::module::function(args...)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveCall {
    package_id: String,
    module: String,
    function: String,
    args: Vec<CallArg>,
}

impl MoveCall {
    pub fn new(
        package_id: &str,
        module: &str,
        function: &EntryFunction,
        args: Vec<CallArg>,
    ) -> Result<Self, PublishError> {
        validate_package_id(package_id)?;
        validate_identifier("module", module)?;
        validate_identifier("function", &function.name)?;

        if args.len() != function.arity {
            return Err(PublishError::InvalidCall(format!(
                "{}::{} takes {} arguments, got {}",
                module,
                function.name,
                function.arity,
                args.len()
            )));
        }

        for arg in &args {
            if let CallArg::Object(id) = arg {
                validate_object_id(id)?;
            }
        }

        Ok(Self {
            package_id: package_id.to_string(),
            module: module.to_string(),
            function: function.name.clone(),
            args,
        })
    }

    pub fn package_id(&self) -> &str {
        &self.package_id
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn args(&self) -> &[CallArg] {
        &self.args
    }

    /// Total payload bytes carried by the call's arguments
    pub fn payload_len(&self) -> usize {
        self.args.iter().map(CallArg::payload_len).sum()
    }
}

impl fmt::Display for MoveCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}::{}::{}({} args)",
            self.package_id,
            self.module,
            self.function,
            self.args.len()
        )
    }
}

fn validate_identifier(what: &str, ident: &str) -> Result<(), PublishError> {
    let mut chars = ident.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if !valid {
        return Err(PublishError::InvalidCall(format!(
            "'{}' is not a valid Move {} name",
            ident, what
        )));
    }
    Ok(())
}

fn validate_package_id(package_id: &str) -> Result<(), PublishError> {
    validate_object_id(package_id)
        .map_err(|_| PublishError::InvalidCall(format!("'{}' is not a valid package id", package_id)))
}

fn validate_object_id(id: &str) -> Result<(), PublishError> {
    let hex = id
        .strip_prefix("0x")
        .ok_or_else(|| PublishError::InvalidCall(format!("object id '{}' must start with 0x", id)))?;
    if hex.is_empty() || hex.len() > 64 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(PublishError::InvalidCall(format!(
            "object id '{}' is not a hex address",
            id
        )));
    }
    Ok(())
}
