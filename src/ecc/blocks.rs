//! Codeword block geometry: how a symbol's codewords split into blocks,
//! and the interleaved transmission order.
//!
//! The per-version block structure is derived from three compact tables
//! (EC codewords per block, block count, total codewords) instead of the
//! full groups table: data codewords divide as evenly as possible over
//! the blocks, shorter blocks first.

use crate::models::{ECLevel, Version};

// Tables from the QR Code specification (Model 2) via Nayuki QR Code generator.
// Index: [ec_level][version]
const ECC_CODEWORDS_PER_BLOCK: [[i8; 41]; 4] = [
    [
        -1, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28,
        30, 30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Low
    [
        -1, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ], // Medium
    [
        -1, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30,
        30, 30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Quartile
    [
        -1, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // High
];

const NUM_ERROR_CORRECTION_BLOCKS: [[i8; 41]; 4] = [
    [
        -1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12,
        13, 14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ], // Low
    [
        -1, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21,
        23, 25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ], // Medium
    [
        -1, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27,
        29, 34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ], // Quartile
    [
        -1, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32,
        35, 37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ], // High
];

// Total codewords per version (all levels share the symbol capacity).
const TOTAL_CODEWORDS: [u16; 41] = [
    0, 26, 44, 70, 100, 134, 172, 196, 242, 292, 346, 404, 466, 532, 581, 655, 733, 815, 901, 991,
    1085, 1156, 1258, 1364, 1474, 1588, 1706, 1828, 1921, 2051, 2185, 2323, 2465, 2611, 2761, 2876,
    3034, 3196, 3362, 3532, 3706,
];

/// One deinterleaved block: data codewords followed by EC codewords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodewordBlock {
    /// Data then EC codewords, possibly truncated on damaged input.
    pub codewords: Vec<u8>,
    /// Expected number of data codewords.
    pub data_len: usize,
    /// Expected number of EC codewords.
    pub ec_len: usize,
}

/// Block geometry of one (version, level) combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPlan {
    /// Number of blocks.
    pub block_count: usize,
    /// EC codewords in every block.
    pub ec_per_block: usize,
    /// Codeword capacity of the symbol.
    pub total_codewords: usize,
    /// Data codewords across all blocks.
    pub data_codewords: usize,
    short_blocks: usize,
    short_data_len: usize,
}

impl BlockPlan {
    /// Look up the geometry for a version and level.
    pub fn lookup(version: Version, level: ECLevel) -> Self {
        let v = version.number() as usize;
        let idx = level.table_index();
        let ec_per_block = ECC_CODEWORDS_PER_BLOCK[idx][v] as usize;
        let block_count = NUM_ERROR_CORRECTION_BLOCKS[idx][v] as usize;
        let total_codewords = TOTAL_CODEWORDS[v] as usize;
        let data_codewords = total_codewords - ec_per_block * block_count;

        let short_data_len = data_codewords / block_count;
        let long_blocks = data_codewords % block_count;
        Self {
            block_count,
            ec_per_block,
            total_codewords,
            data_codewords,
            short_blocks: block_count - long_blocks,
            short_data_len,
        }
    }

    /// Data codeword count of the block at `index` (short blocks first).
    pub fn data_len(&self, index: usize) -> usize {
        if index < self.short_blocks {
            self.short_data_len
        } else {
            self.short_data_len + 1
        }
    }

    /// Split the full data codeword sequence into per-block runs.
    pub fn split_data(&self, data: &[u8]) -> Vec<Vec<u8>> {
        debug_assert_eq!(data.len(), self.data_codewords);
        let mut blocks = Vec::with_capacity(self.block_count);
        let mut offset = 0;
        for b in 0..self.block_count {
            let len = self.data_len(b);
            blocks.push(data[offset..offset + len].to_vec());
            offset += len;
        }
        blocks
    }

    /// Interleave data and EC blocks into transmission order: data
    /// codewords round-robin (long blocks keep contributing after the
    /// short ones run out), then EC codewords round-robin.
    pub fn interleave(&self, data_blocks: &[Vec<u8>], ec_blocks: &[Vec<u8>]) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.total_codewords);
        let max_data = self.data_len(self.block_count - 1);
        for i in 0..max_data {
            for block in data_blocks {
                if let Some(&c) = block.get(i) {
                    out.push(c);
                }
            }
        }
        for i in 0..self.ec_per_block {
            for block in ec_blocks {
                out.push(block[i]);
            }
        }
        out
    }

    /// Undo the interleave. Short input stops early and leaves the tail
    /// blocks truncated; block correction reports those as failures.
    pub fn deinterleave(&self, codewords: &[u8]) -> Vec<CodewordBlock> {
        let mut data: Vec<Vec<u8>> = (0..self.block_count)
            .map(|b| Vec::with_capacity(self.data_len(b) + self.ec_per_block))
            .collect();
        let mut input = codewords.iter().copied();

        let max_data = self.data_len(self.block_count - 1);
        'data: for i in 0..max_data {
            for (b, block) in data.iter_mut().enumerate() {
                if i < self.data_len(b) {
                    match input.next() {
                        Some(c) => block.push(c),
                        None => break 'data,
                    }
                }
            }
        }

        let mut ec: Vec<Vec<u8>> = vec![Vec::with_capacity(self.ec_per_block); self.block_count];
        'ec: for _ in 0..self.ec_per_block {
            for block in ec.iter_mut() {
                match input.next() {
                    Some(c) => block.push(c),
                    None => break 'ec,
                }
            }
        }

        data.into_iter()
            .zip(ec)
            .enumerate()
            .map(|(b, (mut codewords, ec))| {
                codewords.extend(ec);
                CodewordBlock {
                    codewords,
                    data_len: self.data_len(b),
                    ec_len: self.ec_per_block,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(version: u8, level: ECLevel) -> BlockPlan {
        BlockPlan::lookup(Version::new(version).unwrap(), level)
    }

    #[test]
    fn test_v1_m_geometry() {
        let p = plan(1, ECLevel::M);
        assert_eq!(p.block_count, 1);
        assert_eq!(p.ec_per_block, 10);
        assert_eq!(p.total_codewords, 26);
        assert_eq!(p.data_codewords, 16);
        assert_eq!(p.data_len(0), 16);
    }

    #[test]
    fn test_v5_q_geometry() {
        // Reference geometry: two blocks of 15 data, two of 16, 18 EC each.
        let p = plan(5, ECLevel::Q);
        assert_eq!(p.block_count, 4);
        assert_eq!(p.ec_per_block, 18);
        assert_eq!(p.total_codewords, 134);
        assert_eq!(p.data_codewords, 62);
        assert_eq!(
            (0..4).map(|b| p.data_len(b)).collect::<Vec<_>>(),
            vec![15, 15, 16, 16]
        );
    }

    #[test]
    fn test_data_splits_cover_all_versions() {
        for version in 1..=40u8 {
            for level in [ECLevel::L, ECLevel::M, ECLevel::Q, ECLevel::H] {
                let p = plan(version, level);
                let split_total: usize = (0..p.block_count).map(|b| p.data_len(b)).sum();
                assert_eq!(split_total, p.data_codewords);
                assert!(p.data_codewords > 0);
                assert_eq!(
                    p.data_codewords + p.block_count * p.ec_per_block,
                    p.total_codewords
                );
            }
        }
    }

    #[test]
    fn test_interleave_roundtrip() {
        let p = plan(5, ECLevel::Q);
        let data: Vec<u8> = (0..p.data_codewords as u8).collect();
        let data_blocks = p.split_data(&data);
        let ec_blocks: Vec<Vec<u8>> = (0..p.block_count)
            .map(|b| (0..p.ec_per_block).map(|i| (b * 20 + i) as u8).collect())
            .collect();

        let wire = p.interleave(&data_blocks, &ec_blocks);
        assert_eq!(wire.len(), p.total_codewords);

        let blocks = p.deinterleave(&wire);
        assert_eq!(blocks.len(), p.block_count);
        for (b, block) in blocks.iter().enumerate() {
            assert_eq!(&block.codewords[..block.data_len], &data_blocks[b][..]);
            assert_eq!(&block.codewords[block.data_len..], &ec_blocks[b][..]);
        }
    }

    #[test]
    fn test_interleave_order_long_blocks_last() {
        let p = plan(5, ECLevel::Q);
        let data: Vec<u8> = (0..62).collect();
        let data_blocks = p.split_data(&data);
        let ec_blocks: Vec<Vec<u8>> = vec![vec![0; 18]; 4];
        let wire = p.interleave(&data_blocks, &ec_blocks);

        // First round-robin pass: first codeword of each block.
        assert_eq!(&wire[..4], &[0, 15, 30, 46]);
        // After 15 full passes only the two long blocks contribute.
        assert_eq!(wire[60], 45);
        assert_eq!(wire[61], 61);
    }

    #[test]
    fn test_deinterleave_short_input() {
        let p = plan(1, ECLevel::M);
        let blocks = p.deinterleave(&[1, 2, 3]);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].codewords, vec![1, 2, 3]);
        assert_eq!(blocks[0].data_len, 16);
    }
}
