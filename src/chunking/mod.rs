// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Content chunking for multi-transaction publishing
//!
//! A single ledger transaction can only carry a bounded payload, so content is
//! split into ordered pieces. Piece 0 goes into the creating transaction, every
//! later piece into its own append transaction.
//!
//! ## Guarantees
//! - Concatenating all pieces in index order reproduces the content exactly
//! - All pieces but the last are exactly `max_piece_size` bytes
//! - Empty content still yields one (empty) piece, since creating a target
//!   always takes one transaction

pub mod compress;

pub use compress::{compress, decompress};

use crate::error::PublishError;
use sha2::{Digest, Sha256};

/// One ordered fragment of content, submitted in a single transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub index: usize,
    pub bytes: Vec<u8>,
}

impl Piece {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Split `content` into pieces of at most `max_piece_size` bytes.
pub fn chunk(content: &[u8], max_piece_size: usize) -> Result<Vec<Piece>, PublishError> {
    if max_piece_size == 0 {
        return Err(PublishError::InvalidConfig(
            "max_piece_size must be greater than zero".to_string(),
        ));
    }

    if content.is_empty() {
        return Ok(vec![Piece {
            index: 0,
            bytes: Vec::new(),
        }]);
    }

    Ok(content
        .chunks(max_piece_size)
        .enumerate()
        .map(|(index, bytes)| Piece {
            index,
            bytes: bytes.to_vec(),
        })
        .collect())
}

/// Number of pieces `chunk` produces for `len` bytes.
pub fn piece_count(len: usize, max_piece_size: usize) -> usize {
    if len == 0 || max_piece_size == 0 {
        1
    } else {
        len.div_ceil(max_piece_size)
    }
}

/// Pieces still to submit for a session resumed at `cursor`.
///
/// A cursor past the last piece yields an empty slice; callers that must
/// reject such a cursor check it against `pieces.len()` first.
pub fn remaining(pieces: &[Piece], cursor: usize) -> &[Piece] {
    &pieces[cursor.min(pieces.len())..]
}

/// Hex SHA-256 of the content, used to tie a publish name to what it publishes
pub fn content_digest(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}
