// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! zlib compression applied to site content before chunking.
//!
//! The portal inflates the reassembled pieces with a zlib decoder, so the
//! format here must stay plain zlib (not gzip or raw deflate).

use crate::error::PublishError;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{Read, Write};

pub fn compress(content: &[u8]) -> Result<Vec<u8>, PublishError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(content)
        .map_err(|e| PublishError::InvalidConfig(format!("zlib compression failed: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| PublishError::InvalidConfig(format!("zlib compression failed: {}", e)))
}

pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>, PublishError> {
    let mut decoder = ZlibDecoder::new(bytes);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| PublishError::Parse(format!("zlib stream is corrupt: {}", e)))?;
    Ok(out)
}
