//! Two's-complement checksum used by Aux frames.
//!
//! The checksum covers every byte between SOM and CHK (LEN, SRC, RCV, CMD
//! and the payload) and is chosen so that those bytes plus CHK sum to zero
//! modulo 256.

/// Computes the checksum byte for the given LEN..payload bytes.
pub fn compute(bytes: &[u8]) -> u8 {
    let sum = bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    sum.wrapping_neg()
}

/// Returns true if `bytes` (LEN through CHK inclusive) sums to zero.
pub fn verify(bytes: &[u8]) -> bool {
    bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b)) == 0
}
