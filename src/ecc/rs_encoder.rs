//! Reed-Solomon encoder: computes the error correction codewords appended
//! to each data block.

use super::gf256::Gf256;
use super::poly;

/// Build the degree-`ec_count` generator polynomial, the product of
/// (x - alpha^i) for i in 0..ec_count. Coefficients are stored highest
/// degree first; the leading coefficient is always 1.
pub fn generator_polynomial(ec_count: usize) -> Vec<u8> {
    let mut g = vec![1u8];
    for i in 0..ec_count {
        g = poly::multiply(&g, &[1, Gf256::exp(i)]);
    }
    g
}

/// Compute `ec_count` error correction codewords for a data block. The
/// codewords are the remainder of the message polynomial (shifted up by
/// x^ec_count) divided by the generator.
pub fn encode(data: &[u8], ec_count: usize) -> Vec<u8> {
    let generator = generator_polynomial(ec_count);
    let mut work = data.to_vec();
    work.resize(data.len() + ec_count, 0);

    for i in 0..data.len() {
        let factor = work[i];
        if factor == 0 {
            continue;
        }
        // The generator is monic, so this zeroes work[i] as a side effect.
        for (j, &g) in generator.iter().enumerate() {
            work[i + j] ^= Gf256::mul(g, factor);
        }
    }
    work[data.len()..].to_vec()
}
