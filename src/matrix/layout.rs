//! Placement coordinates of the two format copies and two version
//! blocks. Both pipelines read and write through these functions, so the
//! bit order cannot drift between them.

use crate::models::{BitGrid, Module, TriMatrix};

/// Module coordinates of the two 15-bit format copies, most significant
/// bit first. Copy 0 wraps around the top-left finder; copy 1 is split
/// between the bottom-left and top-right finders.
pub fn format_positions(size: usize) -> [[(usize, usize); 15]; 2] {
    let copy0 = [
        (8, 0),
        (8, 1),
        (8, 2),
        (8, 3),
        (8, 4),
        (8, 5),
        (8, 7),
        (8, 8),
        (7, 8),
        (5, 8),
        (4, 8),
        (3, 8),
        (2, 8),
        (1, 8),
        (0, 8),
    ];
    let mut copy1 = [(0usize, 0usize); 15];
    for (k, slot) in copy1.iter_mut().enumerate() {
        *slot = if k < 7 {
            (size - 1 - k, 8)
        } else {
            (8, size - 15 + k)
        };
    }
    [copy0, copy1]
}

/// Module coordinates of the two 18-bit version blocks, indexed by bit
/// number (0 = least significant). Block 0 sits above the bottom-left
/// finder, block 1 left of the top-right finder.
pub fn version_positions(size: usize) -> [[(usize, usize); 18]; 2] {
    let mut bottom_left = [(0usize, 0usize); 18];
    let mut top_right = [(0usize, 0usize); 18];
    for i in 0..18 {
        bottom_left[i] = (size - 11 + i % 3, i / 3);
        top_right[i] = (i / 3, size - 11 + i % 3);
    }
    [bottom_left, top_right]
}

/// Write the masked format word into both copies.
pub fn write_format(grid: &mut BitGrid, word: u16) {
    let positions = format_positions(grid.size());
    for copy in &positions {
        for (k, &(row, col)) in copy.iter().enumerate() {
            grid.set(row, col, (word >> (14 - k)) & 1 == 1);
        }
    }
}

/// Read one format copy from a sampled matrix. Unknown modules read as
/// 0; the count of unknowns is returned alongside the raw word.
pub fn read_format(matrix: &TriMatrix, copy: usize) -> (u16, usize) {
    let positions = format_positions(matrix.size());
    let mut word = 0u16;
    let mut unknown = 0;
    for (k, &(row, col)) in positions[copy].iter().enumerate() {
        match matrix.get(row, col) {
            Module::Dark => word |= 1 << (14 - k),
            Module::Light => {}
            Module::Unknown => unknown += 1,
        }
    }
    (word, unknown)
}

/// Write the 18-bit version word into both blocks.
pub fn write_version(grid: &mut BitGrid, word: u32) {
    let positions = version_positions(grid.size());
    for block in &positions {
        for (i, &(row, col)) in block.iter().enumerate() {
            grid.set(row, col, (word >> i) & 1 == 1);
        }
    }
}

/// Read one version block from a sampled matrix, unknowns as 0.
pub fn read_version(matrix: &TriMatrix, copy: usize) -> (u32, usize) {
    let positions = version_positions(matrix.size());
    let mut word = 0u32;
    let mut unknown = 0;
    for (i, &(row, col)) in positions[copy].iter().enumerate() {
        match matrix.get(row, col) {
            Module::Dark => word |= 1 << i,
            Module::Light => {}
            Module::Unknown => unknown += 1,
        }
    }
    (word, unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_positions_distinct_and_in_bounds() {
        for size in [21usize, 25, 45, 177] {
            let positions = format_positions(size);
            let mut all: Vec<(usize, usize)> =
                positions.iter().flatten().copied().collect();
            assert_eq!(all.len(), 30);
            for &(r, c) in &all {
                assert!(r < size && c < size);
                // Format modules never sit on the timing lines.
                assert!(r != 6 && c != 6);
            }
            all.sort_unstable();
            all.dedup();
            assert_eq!(all.len(), 30, "copies must not overlap");
        }
    }

    #[test]
    fn test_format_write_read_roundtrip() {
        let mut grid = BitGrid::new(21);
        write_format(&mut grid, 0x40CE);
        let matrix = TriMatrix::from_bits(&grid);
        assert_eq!(read_format(&matrix, 0), (0x40CE, 0));
        assert_eq!(read_format(&matrix, 1), (0x40CE, 0));
    }

    #[test]
    fn test_format_read_counts_unknowns() {
        let mut grid = BitGrid::new(21);
        write_format(&mut grid, 0x7FFF);
        let mut matrix = TriMatrix::from_bits(&grid);
        // Blank out two modules of copy 0.
        matrix.set(8, 0, Module::Unknown);
        matrix.set(0, 8, Module::Unknown);

        let (word, unknown) = read_format(&matrix, 0);
        assert_eq!(unknown, 2);
        // MSB (8,0) and LSB (0,8) read as zero.
        assert_eq!(word, 0x7FFF & !(1 << 14) & !1);
        // Copy 1 is untouched.
        assert_eq!(read_format(&matrix, 1), (0x7FFF, 0));
    }

    #[test]
    fn test_version_positions_blocks() {
        let size = 45; // version 7
        let [bottom_left, top_right] = version_positions(size);
        // Bit 0 sits at the block corners nearest the finders.
        assert_eq!(bottom_left[0], (34, 0));
        assert_eq!(top_right[0], (0, 34));
        assert_eq!(bottom_left[17], (36, 5));
        assert_eq!(top_right[17], (5, 36));
        for i in 0..18 {
            let (r, c) = bottom_left[i];
            assert_eq!(top_right[i], (c, r), "blocks are transposes");
        }
    }

    #[test]
    fn test_version_write_read_roundtrip() {
        let mut grid = BitGrid::new(45);
        write_version(&mut grid, 0x07C94);
        let matrix = TriMatrix::from_bits(&grid);
        assert_eq!(read_version(&matrix, 0), (0x07C94, 0));
        assert_eq!(read_version(&matrix, 1), (0x07C94, 0));
    }
}
