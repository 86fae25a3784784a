//! Edge case tests for the raw DEFLATE backend.

use oxizip_deflate::{deflate, inflate};

#[test]
fn test_empty_input() {
    let input = b"";
    let compressed = deflate(input, 6).unwrap();
    let decompressed = inflate(&compressed, 0).unwrap();
    assert_eq!(decompressed, input);
}

#[test]
fn test_single_byte() {
    let input = b"A";
    let compressed = deflate(input, 8).unwrap();
    let decompressed = inflate(&compressed, 1).unwrap();
    assert_eq!(decompressed, input);
}

#[test]
fn test_all_zeros() {
    let input = vec![0u8; 1000];
    let compressed = deflate(&input, 6).unwrap();
    let decompressed = inflate(&compressed, input.len()).unwrap();
    assert_eq!(decompressed, input);
    // All zeros should compress very well
    assert!(compressed.len() < input.len() / 10);
}

#[test]
fn test_stored_level() {
    let input = b"level zero still produces a valid raw stream";
    let compressed = deflate(input, 0).unwrap();
    // Stored block: 5 bytes of framing around the literal bytes
    assert!(compressed.len() >= input.len());
    assert_eq!(inflate(&compressed, input.len()).unwrap(), input);
}

#[test]
fn test_incompressible_bound() {
    // Pseudo-random bytes do not compress; output stays within a small slack
    let mut seed: u64 = 0x1234_5678_9ABC_DEF0;
    let input: Vec<u8> = (0..8192)
        .map(|_| {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            (seed >> 33) as u8
        })
        .collect();

    let compressed = deflate(&input, 9).unwrap();
    assert!(compressed.len() <= input.len() + 64);
    assert_eq!(inflate(&compressed, input.len()).unwrap(), input);
}

#[test]
fn test_large_input() {
    let pattern = b"The quick brown fox jumps over the lazy dog. ";
    let input: Vec<u8> = pattern.iter().copied().cycle().take(1024 * 1024).collect();

    let compressed = deflate(&input, 5).unwrap();
    let decompressed = inflate(&compressed, input.len()).unwrap();
    assert_eq!(decompressed, input);
}

#[test]
fn test_garbage_input() {
    // BTYPE=11 is reserved and always invalid
    let garbage = [0x07u8, 0xFF, 0xFF, 0xFF];
    assert!(inflate(&garbage, 16).is_err());
}

#[test]
fn test_expansion_is_capped() {
    // A small stream expanding to 64 KiB is refused when 1 KiB is declared
    let input = vec![b'z'; 64 * 1024];
    let compressed = deflate(&input, 9).unwrap();
    assert!(inflate(&compressed, 1024).is_err());
}
