/// Compact bit-packed square module grid (true = dark, false = light).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitGrid {
    size: usize,
    data: Vec<u8>,
}

impl BitGrid {
    /// Create a grid of `size` x `size` light modules.
    pub fn new(size: usize) -> Self {
        let bytes_needed = (size * size).div_ceil(8);
        Self {
            size,
            data: vec![0; bytes_needed],
        }
    }

    /// Side length in modules.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Get module at (row, col). Out-of-bounds reads as light.
    pub fn get(&self, row: usize, col: usize) -> bool {
        if row >= self.size || col >= self.size {
            return false;
        }
        let index = row * self.size + col;
        (self.data[index / 8] >> (index % 8)) & 1 == 1
    }

    /// Set module at (row, col). Out-of-bounds writes are ignored.
    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        if row >= self.size || col >= self.size {
            return;
        }
        let index = row * self.size + col;
        if value {
            self.data[index / 8] |= 1 << (index % 8);
        } else {
            self.data[index / 8] &= !(1 << (index % 8));
        }
    }

    /// Toggle module at (row, col).
    pub fn toggle(&mut self, row: usize, col: usize) {
        if row >= self.size || col >= self.size {
            return;
        }
        let index = row * self.size + col;
        self.data[index / 8] ^= 1 << (index % 8);
    }

    /// Count of dark modules.
    pub fn count_dark(&self) -> usize {
        self.data.iter().map(|b| b.count_ones() as usize).sum()
    }
}

/// One sampled module of a symbol before it is binarized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Module {
    /// Dark module (bit value 1).
    Dark,
    /// Light module (bit value 0).
    #[default]
    Light,
    /// Sampling could not determine the value.
    Unknown,
}

/// Tri-state module grid as handed over by a detector.
#[derive(Debug, Clone)]
pub struct TriMatrix {
    size: usize,
    cells: Vec<Module>,
}

impl TriMatrix {
    /// Create an all-light grid.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![Module::Light; size * size],
        }
    }

    /// Build a fully-known grid from a binary one.
    pub fn from_bits(grid: &BitGrid) -> Self {
        let size = grid.size();
        let mut out = Self::new(size);
        for row in 0..size {
            for col in 0..size {
                if grid.get(row, col) {
                    out.set(row, col, Module::Dark);
                }
            }
        }
        out
    }

    /// Side length in modules.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Get module at (row, col). Out-of-bounds reads as unknown.
    pub fn get(&self, row: usize, col: usize) -> Module {
        if row >= self.size || col >= self.size {
            return Module::Unknown;
        }
        self.cells[row * self.size + col]
    }

    /// Set module at (row, col). Out-of-bounds writes are ignored.
    pub fn set(&mut self, row: usize, col: usize, value: Module) {
        if row >= self.size || col >= self.size {
            return;
        }
        self.cells[row * self.size + col] = value;
    }

    /// Binarize, mapping unknown modules to light. Returns the binary grid
    /// and the number of unknown modules encountered.
    pub fn to_bits(&self) -> (BitGrid, usize) {
        let mut grid = BitGrid::new(self.size);
        let mut unknown = 0;
        for row in 0..self.size {
            for col in 0..self.size {
                match self.get(row, col) {
                    Module::Dark => grid.set(row, col, true),
                    Module::Light => {}
                    Module::Unknown => unknown += 1,
                }
            }
        }
        (grid, unknown)
    }
}

/// Structural role of a module within the symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleRole {
    /// Part of one of the three finder patterns.
    Finder,
    /// Light separator strip around a finder.
    Separator,
    /// Alternating timing pattern in row 6 or column 6.
    Timing,
    /// Part of a 5x5 alignment pattern.
    Alignment,
    /// Reserved for one of the two 15-bit format copies.
    Format,
    /// Reserved for one of the two 18-bit version blocks.
    Version,
    /// The always-dark module at (4*version + 9, 8).
    Dark,
    /// Carries codeword or remainder bits.
    Data,
}

/// Per-module role map produced alongside the function patterns.
#[derive(Debug, Clone)]
pub struct RoleGrid {
    size: usize,
    roles: Vec<ModuleRole>,
}

impl RoleGrid {
    pub(crate) fn from_roles(size: usize, roles: Vec<ModuleRole>) -> Self {
        debug_assert_eq!(roles.len(), size * size);
        Self { size, roles }
    }

    /// Side length in modules.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Role of the module at (row, col).
    pub fn get(&self, row: usize, col: usize) -> ModuleRole {
        self.roles[row * self.size + col]
    }

    /// True when the module carries codeword or remainder bits.
    pub fn is_data(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size && self.get(row, col) == ModuleRole::Data
    }

    /// Number of data modules in the symbol.
    pub fn data_module_count(&self) -> usize {
        self.roles.iter().filter(|&&r| r == ModuleRole::Data).count()
    }
}
