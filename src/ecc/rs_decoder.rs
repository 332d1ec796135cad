//! Reed-Solomon decoder: syndrome computation, Berlekamp-Massey locator
//! search, Chien root finding, and Forney magnitude evaluation, followed
//! by a mandatory re-verification of the corrected block.

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::error::RsError;

use super::blocks::CodewordBlock;
use super::gf256::Gf256;
use super::poly;

/// Outcome of correcting a single block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockCorrection {
    /// The repaired codeword block.
    pub corrected: Vec<u8>,
    /// Array indices of the codewords that were repaired.
    pub error_positions: Vec<usize>,
}

/// Decoder for blocks carrying a fixed number of EC codewords.
pub struct ReedSolomonDecoder {
    ec_count: usize,
}

impl ReedSolomonDecoder {
    /// Create a decoder for blocks with `ec_count` EC codewords.
    pub fn new(ec_count: usize) -> Self {
        Self { ec_count }
    }

    /// Largest number of codeword errors this block geometry can repair.
    pub fn max_correctable(&self) -> usize {
        self.ec_count / 2
    }

    /// Detect and repair errors in one block (data followed by EC
    /// codewords). Errors beyond capacity are reported, never guessed at.
    pub fn correct(&self, codewords: &[u8]) -> Result<BlockCorrection, RsError> {
        let syndromes = self.syndromes(codewords);
        if syndromes.iter().all(|&s| s == 0) {
            return Ok(BlockCorrection {
                corrected: codewords.to_vec(),
                error_positions: Vec::new(),
            });
        }

        let lambda = error_locator(&syndromes)?;
        let positions = error_positions(&lambda, codewords.len());
        trace!(degree = lambda.len() - 1, found = positions.len(), "chien search");

        if positions.len() > self.max_correctable() {
            return Err(RsError::ExceedsCapacity {
                detected: positions.len(),
                max_correctable: self.max_correctable(),
            });
        }
        if positions.len() != lambda.len() - 1 {
            return Err(RsError::LocatorMismatch {
                degree: lambda.len() - 1,
                found: positions.len(),
            });
        }

        let magnitudes = error_magnitudes(&lambda, &syndromes, &positions, codewords.len())?;
        let mut corrected = codewords.to_vec();
        for (&pos, &mag) in positions.iter().zip(&magnitudes) {
            corrected[pos] ^= mag;
        }

        // The corrected block must itself be a valid codeword.
        if self.syndromes(&corrected).iter().any(|&s| s != 0) {
            return Err(RsError::VerificationFailed);
        }
        Ok(BlockCorrection {
            corrected,
            error_positions: positions,
        })
    }

    /// S_i = sum over codewords c_j of c_j * alpha^(i * (n-1-j)), for
    /// i in 0..ec_count. All zero means the block is error free.
    fn syndromes(&self, codewords: &[u8]) -> Vec<u8> {
        let n = codewords.len();
        (0..self.ec_count)
            .map(|i| {
                let mut s = 0u8;
                for (j, &c) in codewords.iter().enumerate() {
                    if c != 0 {
                        s ^= Gf256::mul(c, Gf256::exp(i * (n - 1 - j)));
                    }
                }
                s
            })
            .collect()
    }
}

/// Berlekamp-Massey: find the minimal error locator polynomial Lambda
/// (coefficients lowest degree first, Lambda[0] == 1).
fn error_locator(syndromes: &[u8]) -> Result<Vec<u8>, RsError> {
    let mut lambda = vec![1u8];
    let mut prev = vec![1u8];
    let mut l = 0usize;
    let mut m = 1usize;
    let mut prev_delta = 1u8;

    for r in 0..syndromes.len() {
        let mut delta = syndromes[r];
        for i in 1..lambda.len() {
            if i > r {
                break;
            }
            delta ^= Gf256::mul(lambda[i], syndromes[r - i]);
        }
        if delta == 0 {
            m += 1;
            continue;
        }

        let snapshot = lambda.clone();
        let coef = Gf256::div(delta, prev_delta)?;
        if lambda.len() < prev.len() + m {
            lambda.resize(prev.len() + m, 0);
        }
        for (i, &p) in prev.iter().enumerate() {
            lambda[i + m] ^= Gf256::mul(coef, p);
        }

        if 2 * l <= r {
            l = r + 1 - l;
            prev = snapshot;
            prev_delta = delta;
            m = 1;
        } else {
            m += 1;
        }
    }

    while lambda.len() > 1 && lambda.last() == Some(&0) {
        lambda.pop();
    }
    Ok(lambda)
}

/// Chien search: array index i is an error position when Lambda vanishes
/// at alpha^-(n-1-i).
fn error_positions(lambda: &[u8], n: usize) -> Vec<usize> {
    let mut positions = Vec::new();
    for i in 0..n {
        let exponent = (n - 1 - i) % 255;
        let x_inv = Gf256::exp(255 - exponent);
        if poly::evaluate(lambda, x_inv) == 0 {
            positions.push(i);
        }
    }
    positions
}

/// Forney's formula: e_k = X_k * Omega(X_k^-1) / Lambda'(X_k^-1), with
/// Omega = S * Lambda mod x^2t and X_k = alpha^(n-1-k).
fn error_magnitudes(
    lambda: &[u8],
    syndromes: &[u8],
    positions: &[usize],
    n: usize,
) -> Result<Vec<u8>, RsError> {
    let omega = poly::multiply_mod(syndromes, lambda, syndromes.len());
    positions
        .iter()
        .map(|&pos| {
            let exponent = (n - 1 - pos) % 255;
            let x_inv = Gf256::exp(255 - exponent);

            let omega_val = poly::evaluate(&omega, x_inv);
            // The formal derivative keeps only odd-degree terms.
            let mut derivative = 0u8;
            for d in (1..lambda.len()).step_by(2) {
                derivative ^= Gf256::mul(lambda[d], Gf256::pow(x_inv, d - 1));
            }
            if derivative == 0 {
                return Err(RsError::DerivativeZero { position: pos });
            }
            let x_k = Gf256::exp(exponent);
            Ok(Gf256::mul(x_k, Gf256::div(omega_val, derivative)?))
        })
        .collect()
}

/// Correction outcome for one block within a symbol.
#[derive(Debug, Clone)]
pub struct BlockOutcome {
    /// Block index in deinterleaved order.
    pub index: usize,
    /// Repaired codewords (the raw input when correction failed).
    pub corrected: Vec<u8>,
    /// Positions repaired within the block.
    pub error_positions: Vec<usize>,
    /// Why correction failed, if it did.
    pub failure: Option<RsError>,
}

impl BlockOutcome {
    /// True when the block verified clean after correction.
    pub fn verified(&self) -> bool {
        self.failure.is_none()
    }
}

/// Aggregate result over every block of a symbol.
#[derive(Debug, Clone)]
pub struct CorrectionReport {
    /// Per-block outcomes in deinterleaved order.
    pub blocks: Vec<BlockOutcome>,
    /// Data codewords of all blocks concatenated, best effort for blocks
    /// that failed.
    pub corrected_data: Vec<u8>,
    /// Total codewords repaired across all blocks.
    pub total_errors: usize,
    /// Fraction of blocks that verified clean.
    pub confidence: f32,
}

impl CorrectionReport {
    /// True when every block verified clean.
    pub fn recoverable(&self) -> bool {
        self.blocks.iter().all(BlockOutcome::verified)
    }

    /// Number of blocks whose correction failed.
    pub fn failed_blocks(&self) -> usize {
        self.blocks.iter().filter(|b| !b.verified()).count()
    }
}

/// Correct every block of a symbol. Blocks are independent and are
/// processed in parallel.
pub fn correct_blocks(blocks: &[CodewordBlock]) -> CorrectionReport {
    let outcomes: Vec<BlockOutcome> = blocks
        .par_iter()
        .enumerate()
        .map(|(index, block)| {
            let decoder = ReedSolomonDecoder::new(block.ec_len);
            match decoder.correct(&block.codewords) {
                Ok(result) => BlockOutcome {
                    index,
                    corrected: result.corrected,
                    error_positions: result.error_positions,
                    failure: None,
                },
                Err(err) => BlockOutcome {
                    index,
                    corrected: block.codewords.clone(),
                    error_positions: Vec::new(),
                    failure: Some(err),
                },
            }
        })
        .collect();

    let corrected_data = outcomes
        .iter()
        .zip(blocks)
        .flat_map(|(outcome, block)| outcome.corrected.iter().copied().take(block.data_len))
        .collect();
    let total_errors = outcomes.iter().map(|o| o.error_positions.len()).sum();
    let verified = outcomes.iter().filter(|o| o.verified()).count();
    let confidence = if outcomes.is_empty() {
        0.0
    } else {
        verified as f32 / outcomes.len() as f32
    };
    debug!(
        blocks = outcomes.len(),
        verified, total_errors, "block correction finished"
    );

    CorrectionReport {
        blocks: outcomes,
        corrected_data,
        total_errors,
        confidence,
    }
}
