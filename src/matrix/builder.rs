//! Function pattern placement and the per-module role map.
//!
//! Patterns are stamped in a fixed order (finders, separators, timing,
//! alignment, reserved format/version areas, dark module) and each step
//! only writes modules no earlier step claimed. Whatever is left is the
//! data region.

use crate::models::{BitGrid, ModuleRole, RoleGrid, Version};

use super::layout;

// Alignment pattern center coordinates per version (row and column sets
// are identical). ISO 18004 Annex E.
#[rustfmt::skip]
const ALIGNMENT_CENTERS: [&[usize]; 41] = [
    &[],
    &[], &[6, 18], &[6, 22], &[6, 26], &[6, 30], &[6, 34],
    &[6, 22, 38], &[6, 24, 42], &[6, 26, 46], &[6, 28, 52], &[6, 30, 56],
    &[6, 32, 60], &[6, 34, 64], &[6, 26, 46, 66], &[6, 26, 48, 70],
    &[6, 26, 50, 74], &[6, 30, 54, 78], &[6, 30, 56, 82], &[6, 30, 58, 86],
    &[6, 34, 62, 90], &[6, 28, 50, 72, 94], &[6, 26, 50, 74, 98],
    &[6, 30, 54, 78, 102], &[6, 28, 54, 80, 106], &[6, 32, 58, 84, 110],
    &[6, 30, 58, 86, 114], &[6, 34, 62, 90, 118], &[6, 26, 50, 74, 98, 122],
    &[6, 30, 54, 78, 102, 126], &[6, 26, 52, 78, 104, 130],
    &[6, 30, 56, 82, 108, 134], &[6, 34, 60, 86, 112, 138],
    &[6, 30, 58, 86, 114, 142], &[6, 34, 62, 90, 118, 146],
    &[6, 30, 54, 78, 102, 126, 150], &[6, 24, 50, 76, 102, 128, 154],
    &[6, 28, 54, 80, 106, 132, 158], &[6, 32, 58, 84, 110, 136, 162],
    &[6, 26, 54, 82, 110, 138, 166], &[6, 30, 58, 86, 114, 142, 170],
];

/// Alignment pattern center coordinates for a version.
pub fn alignment_centers(version: Version) -> &'static [usize] {
    ALIGNMENT_CENTERS[version.number() as usize]
}

/// A version's function patterns: module values plus the role map that
/// tells the data region apart from everything else.
#[derive(Debug, Clone)]
pub struct FunctionMatrix {
    /// Function module values; format/version areas are reserved light.
    pub modules: BitGrid,
    /// Role of every module.
    pub roles: RoleGrid,
    /// Symbol version.
    pub version: Version,
}

impl FunctionMatrix {
    /// Stamp every function pattern of `version`.
    pub fn build(version: Version) -> Self {
        Builder::new(version).finish()
    }

    /// Number of modules available for codeword and remainder bits.
    pub fn data_module_count(&self) -> usize {
        self.roles.data_module_count()
    }
}

struct Builder {
    version: Version,
    size: usize,
    modules: BitGrid,
    roles: Vec<Option<ModuleRole>>,
}

impl Builder {
    fn new(version: Version) -> Self {
        let size = version.size();
        Self {
            version,
            size,
            modules: BitGrid::new(size),
            roles: vec![None; size * size],
        }
    }

    fn finish(mut self) -> FunctionMatrix {
        self.place_finders_and_separators();
        self.place_timing();
        self.place_alignment();
        self.reserve_format();
        self.place_dark_module();
        self.reserve_version();

        let roles = self
            .roles
            .into_iter()
            .map(|r| r.unwrap_or(ModuleRole::Data))
            .collect();
        FunctionMatrix {
            modules: self.modules,
            roles: RoleGrid::from_roles(self.size, roles),
            version: self.version,
        }
    }

    fn claim(&mut self, row: usize, col: usize, role: ModuleRole, dark: bool) {
        if row >= self.size || col >= self.size {
            return;
        }
        let slot = &mut self.roles[row * self.size + col];
        if slot.is_some() {
            return;
        }
        *slot = Some(role);
        self.modules.set(row, col, dark);
    }

    fn place_finders_and_separators(&mut self) {
        let corners = [(0usize, 0usize), (0, self.size - 7), (self.size - 7, 0)];
        for &(top, left) in &corners {
            for dr in 0..7 {
                for dc in 0..7 {
                    let dark = dr == 0
                        || dr == 6
                        || dc == 0
                        || dc == 6
                        || ((2..=4).contains(&dr) && (2..=4).contains(&dc));
                    self.claim(top + dr, left + dc, ModuleRole::Finder, dark);
                }
            }
        }
        // One-module light strip around each finder, clipped at the edges.
        for &(top, left) in &corners {
            let row_lo = top.saturating_sub(1);
            let row_hi = (top + 7).min(self.size - 1);
            let col_lo = left.saturating_sub(1);
            let col_hi = (left + 7).min(self.size - 1);
            for r in row_lo..=row_hi {
                for c in col_lo..=col_hi {
                    self.claim(r, c, ModuleRole::Separator, false);
                }
            }
        }
    }

    fn place_timing(&mut self) {
        for i in 0..self.size {
            let dark = i % 2 == 0;
            self.claim(6, i, ModuleRole::Timing, dark);
            self.claim(i, 6, ModuleRole::Timing, dark);
        }
    }

    fn place_alignment(&mut self) {
        let centers = alignment_centers(self.version);
        for &cr in centers {
            for &cc in centers {
                // The three finder corners carry no alignment pattern.
                let near_tl = cr <= 8 && cc <= 8;
                let near_tr = cr <= 8 && cc >= self.size - 9;
                let near_bl = cr >= self.size - 9 && cc <= 8;
                if near_tl || near_tr || near_bl {
                    continue;
                }
                for dr in 0..5usize {
                    for dc in 0..5usize {
                        let dark = dr == 0
                            || dr == 4
                            || dc == 0
                            || dc == 4
                            || (dr == 2 && dc == 2);
                        self.claim(cr + dr - 2, cc + dc - 2, ModuleRole::Alignment, dark);
                    }
                }
            }
        }
    }

    fn reserve_format(&mut self) {
        for copy in &layout::format_positions(self.size) {
            for &(row, col) in copy {
                self.claim(row, col, ModuleRole::Format, false);
            }
        }
    }

    fn place_dark_module(&mut self) {
        self.claim(4 * self.version.number() as usize + 9, 8, ModuleRole::Dark, true);
    }

    fn reserve_version(&mut self) {
        if !self.version.has_version_info() {
            return;
        }
        for block in &layout::version_positions(self.size) {
            for &(row, col) in block {
                self.claim(row, col, ModuleRole::Version, false);
            }
        }
    }
}
