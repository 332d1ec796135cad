//! The zigzag traversal that maps bit stream positions to data modules.
//!
//! Column pairs are walked from the right edge leftward, alternating
//! upward and downward, right column before left, skipping the vertical
//! timing column. Encode and decode both consume this one function, so
//! the orders cannot diverge.

use crate::models::RoleGrid;

/// Data module coordinates in bit stream order.
pub fn data_coordinates(roles: &RoleGrid) -> Vec<(usize, usize)> {
    let size = roles.size();
    let mut coords = Vec::with_capacity(roles.data_module_count());
    let mut upward = true;
    let mut col = size as isize - 1;

    while col > 0 {
        if col == 6 {
            // The vertical timing column is not part of any pair.
            col -= 1;
        }
        for step in 0..size {
            let row = if upward { size - 1 - step } else { step };
            for c in [col, col - 1] {
                let c = c as usize;
                if roles.is_data(row, c) {
                    coords.push((row, c));
                }
            }
        }
        upward = !upward;
        col -= 2;
    }
    coords
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::builder::FunctionMatrix;
    use crate::models::Version;

    fn coords(version: u8) -> (FunctionMatrix, Vec<(usize, usize)>) {
        let f = FunctionMatrix::build(Version::new(version).unwrap());
        let c = data_coordinates(&f.roles);
        (f, c)
    }

    #[test]
    fn test_covers_every_data_module_once() {
        for version in [1u8, 2, 7, 14, 40] {
            let (f, c) = coords(version);
            assert_eq!(c.len(), f.data_module_count());
            let mut sorted = c.clone();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(sorted.len(), c.len(), "duplicate coordinate");
            for &(_, col) in &c {
                assert_ne!(col, 6, "timing column must be skipped");
            }
        }
    }

    #[test]
    fn test_starts_bottom_right_upward() {
        let (_, c) = coords(1);
        assert_eq!(c[0], (20, 20));
        assert_eq!(c[1], (20, 19));
        assert_eq!(c[2], (19, 20));
        assert_eq!(c[3], (19, 19));
    }

    #[test]
    fn test_v1_has_208_positions() {
        let (_, c) = coords(1);
        assert_eq!(c.len(), 208);
    }

    #[test]
    fn test_second_pair_descends() {
        let (_, c) = coords(1);
        // First pair exhausts rows 20..=9 (24 modules, rows 0..=8 are
        // format/timing/finder territory), then the next pair walks down.
        assert_eq!(c[23], (9, 19));
        assert_eq!(c[24], (9, 18));
        assert_eq!(c[25], (9, 17));
        assert_eq!(c[26], (10, 18));
    }
}
