//! Mask application and the four penalty rules used to pick one.
//!
//! Masking XORs a pattern over the data region only; applying the same
//! mask twice restores the original, which is exactly how the decoder
//! removes it.

use tracing::trace;

use crate::models::{BitGrid, MaskPattern, RoleGrid};

/// XOR `pattern` over every data module. Self-inverse.
pub fn apply(grid: &mut BitGrid, roles: &RoleGrid, pattern: MaskPattern) {
    let size = grid.size();
    for row in 0..size {
        for col in 0..size {
            if roles.is_data(row, col) && pattern.is_masked(row, col) {
                grid.toggle(row, col);
            }
        }
    }
}

/// Penalty breakdown of one mask candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenaltyScore {
    /// Runs of five or more same-colored modules.
    pub runs: u32,
    /// 2x2 blocks of a single color.
    pub blocks: u32,
    /// Finder-like 1:1:3:1:1 sequences.
    pub finder_like: u32,
    /// Deviation of the dark-module ratio from 50%.
    pub balance: u32,
}

impl PenaltyScore {
    /// Sum of the four rules.
    pub fn total(&self) -> u32 {
        self.runs + self.blocks + self.finder_like + self.balance
    }
}

/// Score a fully rendered matrix with the four ISO penalty rules
/// (weights 3, 3, 40, 10).
pub fn penalty(grid: &BitGrid) -> PenaltyScore {
    PenaltyScore {
        runs: penalty_runs(grid),
        blocks: penalty_blocks(grid),
        finder_like: penalty_finder_like(grid),
        balance: penalty_balance(grid),
    }
}

/// Try all eight masks on a copy of `grid` and keep the one with the
/// lowest total penalty; ties go to the lower pattern number.
pub fn select(grid: &BitGrid, roles: &RoleGrid) -> (MaskPattern, PenaltyScore) {
    let mut best = None;
    for pattern in MaskPattern::ALL {
        let mut candidate = grid.clone();
        apply(&mut candidate, roles, pattern);
        let score = penalty(&candidate);
        trace!(pattern = pattern.index(), total = score.total(), "mask candidate");
        let better = match &best {
            None => true,
            Some((_, prev)) => score.total() < PenaltyScore::total(prev),
        };
        if better {
            best = Some((pattern, score));
        }
    }
    // MaskPattern::ALL is never empty.
    best.unwrap_or((MaskPattern::Pattern0, penalty(grid)))
}

fn penalty_runs(grid: &BitGrid) -> u32 {
    let size = grid.size();
    let mut score = 0;
    for line in 0..size {
        score += run_score((0..size).map(|i| grid.get(line, i)));
        score += run_score((0..size).map(|i| grid.get(i, line)));
    }
    score
}

fn run_score(line: impl Iterator<Item = bool>) -> u32 {
    let mut score = 0;
    let mut run = 0u32;
    let mut current = None;
    for module in line {
        if Some(module) == current {
            run += 1;
        } else {
            if run >= 5 {
                score += 3 + (run - 5);
            }
            current = Some(module);
            run = 1;
        }
    }
    if run >= 5 {
        score += 3 + (run - 5);
    }
    score
}

fn penalty_blocks(grid: &BitGrid) -> u32 {
    let size = grid.size();
    let mut score = 0;
    for row in 0..size - 1 {
        for col in 0..size - 1 {
            let v = grid.get(row, col);
            if grid.get(row, col + 1) == v
                && grid.get(row + 1, col) == v
                && grid.get(row + 1, col + 1) == v
            {
                score += 3;
            }
        }
    }
    score
}

// dark-light-dark-dark-dark-light-dark with four lights on either side.
const FINDER_SEQ: [bool; 7] = [true, false, true, true, true, false, true];

fn penalty_finder_like(grid: &BitGrid) -> u32 {
    let size = grid.size();
    let mut count = 0;
    for line in 0..size {
        for start in 0..=size.saturating_sub(7) {
            let row_hit = (0..7).all(|k| grid.get(line, start + k) == FINDER_SEQ[k]);
            if row_hit && has_light_flank(|i| grid.get(line, i), start, size) {
                count += 1;
            }
            let col_hit = (0..7).all(|k| grid.get(start + k, line) == FINDER_SEQ[k]);
            if col_hit && has_light_flank(|i| grid.get(i, line), start, size) {
                count += 1;
            }
        }
    }
    count * 40
}

fn has_light_flank(get: impl Fn(usize) -> bool, start: usize, size: usize) -> bool {
    let before = start >= 4 && (start - 4..start).all(|i| !get(i));
    let after = start + 11 <= size && (start + 7..start + 11).all(|i| !get(i));
    before || after
}

fn penalty_balance(grid: &BitGrid) -> u32 {
    let size = grid.size();
    let total = (size * size) as i64;
    let dark = grid.count_dark() as i64;
    let percent = dark * 100 / total;
    let deviation = (percent - 50).unsigned_abs() as u32 / 5;
    deviation * 10
}
