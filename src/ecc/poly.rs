//! Polynomial helpers over GF(256).
//!
//! The syndrome, locator, and evaluator polynomials in the decoder store
//! coefficients lowest degree first. The encoder's generator polynomial
//! keeps the opposite order; the convolution in [`multiply`] is the same
//! computation either way.

use super::gf256::Gf256;

/// Evaluate a polynomial (coefficients lowest degree first) at `x` with
/// Horner's method.
pub fn evaluate(coeffs: &[u8], x: u8) -> u8 {
    let mut acc = 0u8;
    for &c in coeffs.iter().rev() {
        acc = Gf256::mul(acc, x) ^ c;
    }
    acc
}

/// Multiply two polynomials.
pub fn multiply(a: &[u8], b: &[u8]) -> Vec<u8> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0u8; a.len() + b.len() - 1];
    for (i, &ai) in a.iter().enumerate() {
        if ai == 0 {
            continue;
        }
        for (j, &bj) in b.iter().enumerate() {
            out[i + j] ^= Gf256::mul(ai, bj);
        }
    }
    out
}

/// Multiply two polynomials, truncated to the low `limit` coefficients.
/// Used for the error evaluator Omega = S * Lambda mod x^2t.
pub fn multiply_mod(a: &[u8], b: &[u8], limit: usize) -> Vec<u8> {
    let mut out = vec![0u8; limit];
    for (i, &ai) in a.iter().enumerate() {
        if ai == 0 || i >= limit {
            continue;
        }
        for (j, &bj) in b.iter().enumerate() {
            if i + j >= limit {
                break;
            }
            out[i + j] ^= Gf256::mul(ai, bj);
        }
    }
    out
}
