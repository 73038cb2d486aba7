// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Chunking properties over randomized content and piece sizes.

use blocksite_publisher::chunking::{chunk, piece_count, remaining, Piece};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

fn random_content(rng: &mut StdRng, len: usize) -> Vec<u8> {
    (0..len).map(|_| rng.gen()).collect()
}

fn concat(pieces: &[Piece]) -> Vec<u8> {
    pieces.iter().flat_map(|p| p.bytes.clone()).collect()
}

#[test]
fn test_concatenation_reproduces_content() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let len = rng.gen_range(0..5_000);
        let size = rng.gen_range(1..700);
        let content = random_content(&mut rng, len);

        let pieces = chunk(&content, size).unwrap();
        assert_eq!(concat(&pieces), content, "len {} size {}", len, size);
    }
}

#[test]
fn test_piece_count_and_last_length() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..200 {
        let len = rng.gen_range(1..5_000);
        let size = rng.gen_range(1..700);
        let content = random_content(&mut rng, len);
        let pieces = chunk(&content, size).unwrap();

        let expected_count = (len + size - 1) / size;
        assert_eq!(pieces.len(), expected_count);
        assert_eq!(piece_count(len, size), expected_count);

        for piece in &pieces[..pieces.len() - 1] {
            assert_eq!(piece.len(), size);
        }
        let last = pieces.last().unwrap();
        assert_eq!(last.len(), len - (expected_count - 1) * size);
        if len % size == 0 {
            assert_eq!(last.len(), size);
        }
    }
}

#[test]
fn test_deterministic() {
    let content = b"the same site published twice".to_vec();
    assert_eq!(chunk(&content, 4).unwrap(), chunk(&content, 4).unwrap());
}

#[test]
fn test_resume_slices_match_tail() {
    let mut rng = StdRng::seed_from_u64(3);
    let content = random_content(&mut rng, 2_345);
    let pieces = chunk(&content, 100).unwrap();

    for k in 0..=pieces.len() {
        let rest = remaining(&pieces, k);
        assert_eq!(rest, &pieces[k..]);
        if let Some(first) = rest.first() {
            assert_eq!(first.index, k);
            assert_eq!(first.bytes, content[k * 100..(k * 100 + 100).min(content.len())]);
        }
    }
}

#[test]
fn test_piece_larger_than_content() {
    let pieces = chunk(b"tiny", 15_000).unwrap();
    assert_eq!(pieces.len(), 1);
    assert_eq!(pieces[0].bytes, b"tiny");
}
